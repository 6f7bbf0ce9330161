//! Location models (warehouses, stores, service centers).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{default_true, Audit, PageRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum LocationType {
    #[default]
    Warehouse,
    Store,
    ServiceCenter,
    Other,
}

impl LocationType {
    pub fn label(&self) -> &'static str {
        match self {
            LocationType::Warehouse => "Warehouse",
            LocationType::Store => "Store",
            LocationType::ServiceCenter => "Service Center",
            LocationType::Other => "Other",
        }
    }

    /// Types offered by the location form. `Other` only appears on legacy rows.
    pub fn selectable() -> [LocationType; 3] {
        [
            LocationType::Warehouse,
            LocationType::Store,
            LocationType::ServiceCenter,
        ]
    }
}

impl std::str::FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(' ', "_").as_str() {
            "WAREHOUSE" => Ok(LocationType::Warehouse),
            "STORE" => Ok(LocationType::Store),
            "SERVICE_CENTER" => Ok(LocationType::ServiceCenter),
            "OTHER" => Ok(LocationType::Other),
            other => Err(format!("Unknown location type: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Location {
    pub id: String,
    pub location_code: String,
    pub location_name: String,
    pub location_type: LocationType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub manager_user_id: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Location {
    /// Single-line address, skipping blank parts.
    pub fn full_address(&self) -> String {
        [&self.address, &self.city, &self.state, &self.postal_code, &self.country]
            .iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Payload for `POST /locations/` and `PUT /locations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocationPayload {
    pub location_code: String,
    pub location_name: String,
    pub location_type: LocationType,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_user_id: Option<String>,
}

/// Filters for `GET /locations/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_address_skips_blanks() {
        let location: Location = serde_json::from_value(serde_json::json!({
            "id": "l1",
            "location_code": "WH-01",
            "location_name": "Main Warehouse",
            "location_type": "WAREHOUSE",
            "address": "1 Dock Road",
            "city": "Leeds",
            "state": " ",
            "country": "UK"
        }))
        .unwrap();
        assert_eq!(location.full_address(), "1 Dock Road, Leeds, UK");
    }

    #[test]
    fn test_location_type_parse() {
        assert_eq!("service center".parse::<LocationType>().unwrap(), LocationType::ServiceCenter);
        assert_eq!(LocationType::ServiceCenter.label(), "Service Center");
        assert!("garage".parse::<LocationType>().is_err());
    }
}
