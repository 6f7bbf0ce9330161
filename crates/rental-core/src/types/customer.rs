//! Customer models, tiers and the blacklist flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{default_true, timestamp, Audit, PageRequest};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum CustomerType {
    Individual,
    Business,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum CustomerTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl CustomerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::Bronze => "BRONZE",
            CustomerTier::Silver => "SILVER",
            CustomerTier::Gold => "GOLD",
            CustomerTier::Platinum => "PLATINUM",
        }
    }
}

impl std::str::FromStr for CustomerTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BRONZE" => Ok(CustomerTier::Bronze),
            "SILVER" => Ok(CustomerTier::Silver),
            "GOLD" => Ok(CustomerTier::Gold),
            "PLATINUM" => Ok(CustomerTier::Platinum),
            other => Err(format!("Unknown customer tier: '{}'", other)),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum BlacklistStatus {
    #[default]
    Clear,
    Blacklisted,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub customer_code: String,
    pub customer_type: CustomerType,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub customer_tier: CustomerTier,
    #[serde(default)]
    pub credit_limit: f64,
    #[serde(default)]
    pub blacklist_status: BlacklistStatus,
    #[serde(default)]
    pub lifetime_value: f64,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub last_transaction_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Customer {
    /// Business name for companies, "first last" for people, the code
    /// when neither is on file.
    pub fn display_name(&self) -> String {
        let business = self
            .business_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if self.customer_type == CustomerType::Business {
            if let Some(name) = business {
                return name.to_string();
            }
        }
        let person: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        if !person.is_empty() {
            return person.join(" ");
        }
        business
            .map(String::from)
            .unwrap_or_else(|| self.customer_code.clone())
    }

    pub fn is_blacklisted(&self) -> bool {
        self.blacklist_status == BlacklistStatus::Blacklisted
    }
}

/// Payload for `POST /customers/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerCreate {
    pub customer_code: String,
    pub customer_type: CustomerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_tier: Option<CustomerTier>,
    pub credit_limit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_tier: Option<CustomerTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
}

/// Payload for `POST /customers/{id}/blacklist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "lowercase")]
#[ts(export)]
pub enum BlacklistAction {
    Blacklist,
    Unblacklist,
}

impl BlacklistAction {
    /// The action that flips a customer's current flag.
    pub fn toggle_for(customer: &Customer) -> Self {
        if customer.is_blacklisted() {
            BlacklistAction::Unblacklist
        } else {
            BlacklistAction::Blacklist
        }
    }
}

/// Filters for `GET /customers/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_tier: Option<CustomerTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist_status: Option<BlacklistStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
