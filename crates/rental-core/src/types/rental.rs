//! Rentals-due-today report rows.
//!
//! Every field here is computed server-side; the client only reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{timestamp, PageRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalDueItem {
    pub sku_code: String,
    pub item_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalDueToday {
    pub transaction_id: String,
    pub transaction_number: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub rental_start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub rental_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rental_days: u32,
    #[serde(default)]
    pub is_overdue: bool,
    #[serde(default)]
    pub days_overdue: u32,
    #[serde(default)]
    pub days_remaining: u32,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub deposit_amount: f64,
    #[serde(default)]
    pub balance_due: f64,
    #[serde(default)]
    pub items: Vec<RentalDueItem>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Urgency bucket used to color rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DueUrgency {
    Overdue,
    DueToday,
    Upcoming,
}

impl RentalDueToday {
    pub fn urgency(&self) -> DueUrgency {
        if self.is_overdue {
            DueUrgency::Overdue
        } else if self.days_remaining == 0 {
            DueUrgency::DueToday
        } else {
            DueUrgency::Upcoming
        }
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// `summary` block of the report, also served by `/rentals-due-today/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalsDueSummary {
    #[serde(default)]
    pub total_due_today: u64,
    #[serde(default)]
    pub total_overdue: u64,
    #[serde(default)]
    pub total_due_soon: u64,
    #[serde(default)]
    pub total_revenue_at_risk: f64,
    #[serde(default)]
    pub total_deposits_held: f64,
}

/// Filters for `GET /rentals-due-today/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentalsDueParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    pub include_overdue: bool,
    pub days_ahead: u32,
}

impl Default for RentalsDueParams {
    fn default() -> Self {
        RentalsDueParams {
            page: PageRequest::default(),
            location_id: None,
            include_overdue: true,
            days_ahead: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(overdue: bool, remaining: u32) -> RentalDueToday {
        serde_json::from_value(serde_json::json!({
            "transaction_id": "t1",
            "transaction_number": "RNT-1",
            "customer_id": "c1",
            "customer_name": "Ada",
            "is_overdue": overdue,
            "days_remaining": remaining,
            "items": [
                {"sku_code": "CAM-1", "item_name": "Camera", "quantity": 2},
                {"sku_code": "TRI-1", "item_name": "Tripod", "quantity": 1}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_urgency() {
        assert_eq!(row(true, 0).urgency(), DueUrgency::Overdue);
        assert_eq!(row(false, 0).urgency(), DueUrgency::DueToday);
        assert_eq!(row(false, 2).urgency(), DueUrgency::Upcoming);
        assert_eq!(row(false, 2).item_count(), 3);
    }

    #[test]
    fn test_params_default_includes_overdue() {
        let params = RentalsDueParams::default();
        assert!(params.include_overdue);
        assert_eq!(params.days_ahead, 0);
    }
}
