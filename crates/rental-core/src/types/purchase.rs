//! # Purchases and Purchase Returns
//!
//! Stock arrives through a recorded purchase and leaves again through a
//! return against that purchase.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  PurchaseRecord ──POST /transactions/purchases──► Purchase           │
//! │                                                     │ items          │
//! │                                                     ▼                │
//! │  returnable(purchase, returns) ──► ReturnableItem per SKU            │
//! │        original_quantity - already_returned = max_returnable         │
//! │                                                     │                │
//! │  PurchaseReturnRecord ──POST /transactions/purchase-returns──►       │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelled returns give their quantities back.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{timestamp, Audit, PageRequest};
use super::inventory::ConditionGrade;

// =============================================================================
// Enumerations
// =============================================================================

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PurchaseStatus {
    #[default]
    Completed,
    Cancelled,
    PartiallyReturned,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ReturnStatus {
    #[default]
    Processing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ReturnReason {
    Defective,
    WrongItem,
    Overstocked,
    QualityIssue,
    Other,
}

impl ReturnReason {
    /// Reasons that explain a worse condition than when the item arrived.
    pub fn explains_damage(&self) -> bool {
        matches!(self, ReturnReason::Defective | ReturnReason::QualityIssue)
    }
}

// =============================================================================
// Purchase
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseItem {
    pub id: String,
    pub sku_id: String,
    pub quantity: u32,
    pub unit_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub condition: ConditionGrade,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
}

/// Supplier fields the backend embeds in purchase responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierRef {
    pub id: String,
    pub company_name: String,
    pub supplier_code: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub status: PurchaseStatus,
    /// Free-form on the wire (`PAID`, `PENDING`, `PARTIALLY_REFUNDED`, ...).
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
    #[serde(default)]
    pub supplier: Option<SupplierRef>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Purchase {
    /// Reference shown in tables; falls back to a short id.
    pub fn label(&self) -> String {
        match self.reference_number.as_deref().filter(|r| !r.is_empty()) {
            Some(reference) => reference.to_string(),
            None => format!("#{}", self.id.chars().take(8).collect::<String>()),
        }
    }

    pub fn quantity_of(&self, sku_id: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.sku_id == sku_id)
            .map(|i| i.quantity)
            .sum()
    }
}

/// One line of [`PurchaseRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseItemRecord {
    pub sku_id: String,
    pub quantity: u32,
    pub unit_cost: f64,
    pub condition: ConditionGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl PurchaseItemRecord {
    pub fn line_total(&self) -> f64 {
        self.unit_cost * f64::from(self.quantity)
    }
}

/// Payload for `POST /transactions/purchases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseRecord {
    pub supplier_id: String,
    pub purchase_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    pub items: Vec<PurchaseItemRecord>,
}

impl PurchaseRecord {
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(PurchaseItemRecord::line_total).sum()
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Filters for `GET /transactions/purchases`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PurchaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Date window for `GET /transactions/purchases/supplier/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseHistoryParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

// =============================================================================
// Purchase Return
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseReturnItem {
    #[serde(default)]
    pub id: Option<String>,
    pub sku_id: String,
    pub quantity: u32,
    pub unit_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
    pub return_reason: ReturnReason,
    #[serde(default)]
    pub condition: Option<ConditionGrade>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseReturn {
    pub id: String,
    pub supplier_id: String,
    pub original_purchase_id: String,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refund_amount: f64,
    #[serde(default)]
    pub return_authorization: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ReturnStatus,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub items: Vec<PurchaseReturnItem>,
    #[serde(flatten)]
    pub audit: Audit,
}

/// One line of [`PurchaseReturnRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseReturnItemRecord {
    pub sku_id: String,
    pub quantity: u32,
    pub unit_cost: f64,
    pub return_reason: ReturnReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `POST /transactions/purchase-returns` and `/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseReturnRecord {
    pub supplier_id: String,
    pub original_purchase_id: String,
    pub return_date: NaiveDate,
    pub refund_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_authorization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<PurchaseReturnItemRecord>,
}

impl PurchaseReturnRecord {
    /// Value of the goods going back at their recorded cost.
    pub fn items_value(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.unit_cost * f64::from(i.quantity))
            .sum()
    }
}

/// Filters for `GET /transactions/purchase-returns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseReturnListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_purchase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReturnStatus>,
}

// =============================================================================
// Returnable Quantities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnableItem {
    pub sku_id: String,
    pub max_returnable_quantity: u32,
    pub original_quantity: u32,
    pub already_returned: u32,
}

/// `POST /transactions/purchase-returns/validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnValidation {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub available_items: Vec<ReturnableItem>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ReturnValidation {
    pub fn max_for(&self, sku_id: &str) -> Option<u32> {
        self.available_items
            .iter()
            .find(|i| i.sku_id == sku_id)
            .map(|i| i.max_returnable_quantity)
    }
}

/// What is still returnable from `purchase`, one entry per SKU in the order
/// the SKUs first appear on the purchase.
pub fn returnable(purchase: &Purchase, returns: &[PurchaseReturn]) -> Vec<ReturnableItem> {
    let mut returned: BTreeMap<&str, u32> = BTreeMap::new();
    for ret in returns
        .iter()
        .filter(|r| r.original_purchase_id == purchase.id && r.status != ReturnStatus::Cancelled)
    {
        for item in &ret.items {
            let seen = returned.entry(item.sku_id.as_str()).or_insert(0);
            *seen = seen.saturating_add(item.quantity);
        }
    }

    let mut out: Vec<ReturnableItem> = Vec::new();
    for item in &purchase.items {
        if out.iter().any(|r| r.sku_id == item.sku_id) {
            continue;
        }
        let original = purchase.quantity_of(&item.sku_id);
        let already = returned.get(item.sku_id.as_str()).copied().unwrap_or(0);
        out.push(ReturnableItem {
            sku_id: item.sku_id.clone(),
            max_returnable_quantity: original.saturating_sub(already),
            original_quantity: original,
            already_returned: already,
        });
    }
    out
}
