//! SKU models. A SKU is a sellable/rentable variant of an item master.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{default_true, Audit, PageRequest};

fn default_min_rental_days() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sku {
    pub id: String,
    pub sku_code: String,
    pub sku_name: String,
    pub item_id: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub model_number: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<serde_json::Value>,
    #[serde(default)]
    pub is_rentable: bool,
    #[serde(default)]
    pub is_saleable: bool,
    #[serde(default = "default_min_rental_days")]
    pub min_rental_days: u32,
    #[serde(default)]
    pub max_rental_days: Option<u32>,
    #[serde(default)]
    pub rental_base_price: Option<f64>,
    #[serde(default)]
    pub sale_base_price: Option<f64>,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Sku {
    /// Rental price for a number of days, clamped to the allowed range.
    ///
    /// Returns `None` when the SKU is not rentable or has no base price.
    pub fn rental_quote(&self, days: u32) -> Option<f64> {
        if !self.is_rentable {
            return None;
        }
        let price = self.rental_base_price?;
        let mut billed = days.max(self.min_rental_days);
        if let Some(max) = self.max_rental_days {
            billed = billed.min(max);
        }
        Some(price * f64::from(billed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkuCreate {
    pub sku_code: String,
    pub sku_name: String,
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub is_rentable: bool,
    pub is_saleable: bool,
    pub min_rental_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rental_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_base_price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkuUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Payload for `PUT /skus/{id}/rental`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkuRentalSettings {
    pub is_rentable: bool,
    pub min_rental_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rental_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_base_price: Option<f64>,
}

/// Payload for `PUT /skus/{id}/sale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkuSaleSettings {
    pub is_saleable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_base_price: Option<f64>,
}

/// Filters for `GET /skus/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkuListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rentable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_saleable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rentable(min: u32, max: Option<u32>) -> Sku {
        serde_json::from_value(serde_json::json!({
            "id": "s1",
            "sku_code": "CAM-001",
            "sku_name": "Canon R5",
            "item_id": "i1",
            "is_rentable": true,
            "min_rental_days": min,
            "max_rental_days": max,
            "rental_base_price": 25.0
        }))
        .unwrap()
    }

    #[test]
    fn test_rental_quote_clamps_days() {
        let sku = rentable(2, Some(7));
        assert_eq!(sku.rental_quote(1), Some(50.0));
        assert_eq!(sku.rental_quote(3), Some(75.0));
        assert_eq!(sku.rental_quote(30), Some(175.0));
    }

    #[test]
    fn test_rental_quote_requires_rentable() {
        let mut sku = rentable(1, None);
        sku.is_rentable = false;
        assert_eq!(sku.rental_quote(3), None);
    }
}
