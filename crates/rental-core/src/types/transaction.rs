//! Transaction (sale/rental/return) models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{timestamp, Audit, PageRequest};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransactionType {
    Sale,
    Rental,
    Return,
    Refund,
}

/// Transaction lifecycle status.
///
/// ```text
/// DRAFT ──► PENDING_PAYMENT ──► PAID ──► CONFIRMED ──► IN_PROGRESS ──► COMPLETED
///   │              │                                                       │
///   └──────────────┴──────────────► CANCELLED                    REFUNDED ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransactionStatus {
    Draft,
    PendingPayment,
    Paid,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Refunded,
}

impl TransactionStatus {
    /// True when no further action can be taken on the transaction.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Cancelled | TransactionStatus::Refunded
        )
    }

    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Draft | TransactionStatus::PendingPayment | TransactionStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Partial,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Credit,
    Cheque,
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "UPI" => Ok(PaymentMethod::Upi),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "CREDIT" => Ok(PaymentMethod::Credit),
            "CHEQUE" => Ok(PaymentMethod::Cheque),
            other => Err(format!("Unknown payment method: '{}'", other)),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionLine {
    #[serde(default)]
    pub id: Option<String>,
    pub item_id: String,
    #[serde(default)]
    pub sku_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub transaction_number: String,
    pub transaction_type: TransactionType,
    pub customer_id: String,
    pub location_id: String,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub transaction_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub deposit_amount: f64,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<TransactionLine>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Transaction {
    pub fn balance_due(&self) -> f64 {
        (self.total_amount - self.paid_amount).max(0.0)
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub item_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
}

impl SaleItem {
    pub fn line_total(&self) -> f64 {
        let gross = self.unit_price * f64::from(self.quantity);
        let discount = self.discount_percentage.unwrap_or(0.0) / 100.0;
        gross * (1.0 - discount)
    }
}

/// Payload for `POST /transactions/sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub customer_id: String,
    pub location_id: String,
    pub items: Vec<SaleItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reserve_inventory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateSaleRequest {
    /// Subtotal after line discounts, before tax.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(SaleItem::line_total).sum()
    }

    pub fn total(&self) -> f64 {
        let subtotal = self.subtotal();
        subtotal + subtotal * self.tax_rate.unwrap_or(0.0) / 100.0
    }
}

/// Payload for `POST /transactions/{id}/payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRequest {
    pub payment_amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Payload for `POST /transactions/{id}/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancelRequest {
    pub reason: String,
}

/// Filters for `GET /transactions/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// `GET /transactions/reports/daily`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySummary {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub total_rentals: f64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_tax: f64,
    #[serde(default)]
    pub total_discounts: f64,
}
