//! Serialized inventory units: status, condition and location moves.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{default_true, timestamp, Audit, PageRequest};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum InventoryStatus {
    Available,
    Reserved,
    Rented,
    InTransit,
    Maintenance,
    Inspection,
    Damaged,
    Lost,
    Sold,
}

impl InventoryStatus {
    pub const ALL: [InventoryStatus; 9] = [
        InventoryStatus::Available,
        InventoryStatus::Reserved,
        InventoryStatus::Rented,
        InventoryStatus::InTransit,
        InventoryStatus::Maintenance,
        InventoryStatus::Inspection,
        InventoryStatus::Damaged,
        InventoryStatus::Lost,
        InventoryStatus::Sold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Available => "AVAILABLE",
            InventoryStatus::Reserved => "RESERVED",
            InventoryStatus::Rented => "RENTED",
            InventoryStatus::InTransit => "IN_TRANSIT",
            InventoryStatus::Maintenance => "MAINTENANCE",
            InventoryStatus::Inspection => "INSPECTION",
            InventoryStatus::Damaged => "DAMAGED",
            InventoryStatus::Lost => "LOST",
            InventoryStatus::Sold => "SOLD",
        }
    }

    /// Units that left the fleet for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InventoryStatus::Lost | InventoryStatus::Sold)
    }

    /// Only units sitting on a shelf can be moved between locations.
    pub fn can_transfer(&self) -> bool {
        matches!(
            self,
            InventoryStatus::Available | InventoryStatus::Maintenance | InventoryStatus::Inspection
        )
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InventoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace([' ', '-'], "_");
        InventoryStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("Unknown inventory status: '{}'", s))
    }
}

/// Physical grade, A (as new) through D (heavily worn).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub enum ConditionGrade {
    #[default]
    A,
    B,
    C,
    D,
}

impl ConditionGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionGrade::A => "A",
            ConditionGrade::B => "B",
            ConditionGrade::C => "C",
            ConditionGrade::D => "D",
        }
    }

    /// True when `current` is a worse grade than `self`.
    pub fn downgraded_to(&self, current: ConditionGrade) -> bool {
        current > *self
    }
}

// =============================================================================
// Inventory Unit
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryUnit {
    pub id: String,
    pub sku_id: String,
    #[serde(default)]
    pub inventory_code: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub location_id: String,
    pub status: InventoryStatus,
    #[serde(default)]
    pub condition_grade: ConditionGrade,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub last_inspection_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub next_inspection_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub audit: Audit,
}

impl InventoryUnit {
    /// Code shown in tables: inventory code, then serial, then id.
    pub fn label(&self) -> &str {
        self.inventory_code
            .as_deref()
            .or(self.serial_number.as_deref())
            .unwrap_or(&self.id)
    }

    /// Inspection date has passed as of `now`.
    pub fn inspection_overdue(&self, now: DateTime<Utc>) -> bool {
        self.next_inspection_date.is_some_and(|due| due < now)
    }
}

/// Payload for `POST /inventory/units`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryUnitCreate {
    pub sku_id: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    pub condition_grade: ConditionGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `PUT /inventory/units/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryStatusUpdate {
    pub status: InventoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `POST /inventory/units/{id}/transfer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitTransfer {
    pub to_location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_notes: Option<String>,
}

/// Payload for `POST /inventory/units/transfer/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkTransfer {
    pub unit_ids: Vec<String>,
    pub from_location_id: String,
    pub to_location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferFailure {
    pub unit_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkTransferResult {
    #[serde(default)]
    pub transferred: Vec<String>,
    #[serde(default)]
    pub failed: Vec<TransferFailure>,
}

/// `GET /inventory/units/status-count`. Statuses the backend omits count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCounts(pub BTreeMap<InventoryStatus, u64>);

impl StatusCounts {
    pub fn get(&self, status: InventoryStatus) -> u64 {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Share of non-terminal units currently out on rent, 0..=100.
    pub fn utilization(&self) -> f64 {
        let fleet: u64 = self
            .0
            .iter()
            .filter(|(status, _)| !status.is_terminal())
            .map(|(_, n)| n)
            .sum();
        if fleet == 0 {
            0.0
        } else {
            self.get(InventoryStatus::Rented) as f64 * 100.0 / fleet as f64
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Filters for `GET /inventory/units`.
///
/// Multi-valued filters go out as repeated keys
/// (`statuses=AVAILABLE&statuses=RENTED`), which is why the wire form is
/// built by [`InventoryFilters::to_query`] rather than serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryFilters {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sku_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<InventoryStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_grades: Vec<ConditionGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl InventoryFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("skip", self.page.skip.to_string()),
            ("limit", self.page.limit.to_string()),
        ];
        query.extend(self.location_ids.iter().map(|id| ("location_ids", id.clone())));
        query.extend(self.sku_ids.iter().map(|id| ("sku_ids", id.clone())));
        query.extend(self.statuses.iter().map(|s| ("statuses", s.as_str().to_string())));
        query.extend(
            self.condition_grades
                .iter()
                .map(|g| ("condition_grades", g.as_str().to_string())),
        );
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("search", search.trim().to_string()));
        }
        query
    }
}

/// Narrows `GET /inventory/units/status-count` to one location or SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCountParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names_and_parse() {
        assert_eq!(
            serde_json::to_value(InventoryStatus::InTransit).unwrap(),
            serde_json::json!("IN_TRANSIT")
        );
        assert_eq!("in transit".parse::<InventoryStatus>().unwrap(), InventoryStatus::InTransit);
        assert_eq!("sold".parse::<InventoryStatus>().unwrap(), InventoryStatus::Sold);
        assert!("missing".parse::<InventoryStatus>().is_err());
    }

    #[test]
    fn test_unit_decodes_with_defaults() {
        let unit: InventoryUnit = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "sku_id": "s1",
            "serial_number": "SN-9",
            "location_id": "l1",
            "status": "AVAILABLE",
            "purchase_date": "2024-03-01",
        }))
        .unwrap();
        assert_eq!(unit.condition_grade, ConditionGrade::A);
        assert!(unit.is_active);
        assert_eq!(unit.label(), "SN-9");
        assert!(unit.purchase_date.is_some());
    }

    #[test]
    fn test_condition_downgrade() {
        assert!(ConditionGrade::A.downgraded_to(ConditionGrade::C));
        assert!(!ConditionGrade::C.downgraded_to(ConditionGrade::B));
        assert!(!ConditionGrade::B.downgraded_to(ConditionGrade::B));
    }

    #[test]
    fn test_filters_repeat_multi_valued_keys() {
        let filters = InventoryFilters {
            statuses: vec![InventoryStatus::Available, InventoryStatus::Rented],
            condition_grades: vec![ConditionGrade::B],
            search: Some("  ".into()),
            ..Default::default()
        };
        let query = filters.to_query();
        let statuses: Vec<&str> = query
            .iter()
            .filter(|(k, _)| *k == "statuses")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(statuses, ["AVAILABLE", "RENTED"]);
        assert!(query.contains(&("condition_grades", "B".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "search"));
        assert!(query.contains(&("limit", "100".to_string())));
    }

    #[test]
    fn test_status_counts() {
        let counts: StatusCounts = serde_json::from_value(serde_json::json!({
            "AVAILABLE": 6,
            "RENTED": 3,
            "MAINTENANCE": 1,
            "SOLD": 10,
        }))
        .unwrap();
        assert_eq!(counts.get(InventoryStatus::Rented), 3);
        assert_eq!(counts.get(InventoryStatus::Lost), 0);
        assert_eq!(counts.total(), 20);
        assert_eq!(counts.utilization(), 30.0);
        assert_eq!(StatusCounts::default().utilization(), 0.0);
    }

    #[test]
    fn test_transfer_rules() {
        assert!(InventoryStatus::Available.can_transfer());
        assert!(!InventoryStatus::Rented.can_transfer());
        assert!(InventoryStatus::Sold.is_terminal());
    }
}
