//! Supplier models and the locally computed analytics fallback.

use std::collections::BTreeMap;

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
pub enum SupplierType {
    Manufacturer,
    Distributor,
    Wholesaler,
    Retailer,
    ServiceProvider,
}

impl SupplierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierType::Manufacturer => "MANUFACTURER",
            SupplierType::Distributor => "DISTRIBUTOR",
            SupplierType::Wholesaler => "WHOLESALER",
            SupplierType::Retailer => "RETAILER",
            SupplierType::ServiceProvider => "SERVICE_PROVIDER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum SupplierTier {
    Preferred,
    Standard,
    Restricted,
}

impl SupplierTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierTier::Preferred => "PREFERRED",
            SupplierTier::Standard => "STANDARD",
            SupplierTier::Restricted => "RESTRICTED",
        }
    }
}

impl std::fmt::Display for SupplierTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SupplierTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PREFERRED" => Ok(SupplierTier::Preferred),
            "STANDARD" => Ok(SupplierTier::Standard),
            "RESTRICTED" => Ok(SupplierTier::Restricted),
            other => Err(format!("Unknown supplier tier: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PaymentTerms {
    Net15,
    Net30,
    Net45,
    Net60,
    Net90,
    Cod,
    Prepaid,
}

impl PaymentTerms {
    /// Days until payment is due; `None` for terms settled at delivery or before.
    pub fn due_days(&self) -> Option<u32> {
        match self {
            PaymentTerms::Net15 => Some(15),
            PaymentTerms::Net30 => Some(30),
            PaymentTerms::Net45 => Some(45),
            PaymentTerms::Net60 => Some(60),
            PaymentTerms::Net90 => Some(90),
            PaymentTerms::Cod | PaymentTerms::Prepaid => None,
        }
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub supplier_code: String,
    pub company_name: String,
    pub supplier_type: SupplierType,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(default)]
    pub credit_limit: f64,
    pub supplier_tier: SupplierTier,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_spend: f64,
    #[serde(default)]
    pub average_delivery_days: f64,
    #[serde(default)]
    pub quality_rating: f64,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub last_order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub performance_score: Option<f64>,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Supplier {
    /// Name shown in lists; the backend may precompute it.
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("{} ({})", self.company_name, self.supplier_code))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierCreate {
    pub supplier_code: String,
    pub company_name: String,
    pub supplier_type: SupplierType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_tier: Option<SupplierTier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_type: Option<SupplierType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_tier: Option<SupplierTier>,
}

/// Payload for `PATCH /suppliers/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierStatusUpdate {
    pub is_active: bool,
}

/// Payload for `PATCH /suppliers/{id}/performance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPerformanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_spend: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_delivery_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_rating: Option<f64>,
}

/// Filters for `GET /suppliers/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_type: Option<SupplierType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_tier: Option<SupplierTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =============================================================================
// Analytics
// =============================================================================

/// How many suppliers the fallback keeps in `top_suppliers`.
pub const TOP_SUPPLIER_COUNT: usize = 10;

/// `GET /analytics/suppliers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierAnalytics {
    #[serde(default)]
    pub total_suppliers: u64,
    #[serde(default)]
    pub active_suppliers: u64,
    #[serde(default)]
    pub supplier_type_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub supplier_tier_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub top_suppliers: Vec<Supplier>,
    #[serde(default)]
    pub total_spend: f64,
    #[serde(default)]
    pub average_quality_rating: f64,
}

impl SupplierAnalytics {
    /// Computes analytics from a supplier list when the analytics endpoint
    /// is unavailable.
    pub fn from_suppliers(suppliers: &[Supplier]) -> Self {
        let mut type_distribution = BTreeMap::new();
        let mut tier_distribution = BTreeMap::new();
        for supplier in suppliers {
            *type_distribution
                .entry(supplier.supplier_type.as_str().to_string())
                .or_insert(0) += 1;
            *tier_distribution
                .entry(supplier.supplier_tier.as_str().to_string())
                .or_insert(0) += 1;
        }

        let mut top: Vec<Supplier> = suppliers.to_vec();
        top.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
        top.truncate(TOP_SUPPLIER_COUNT);

        let total_spend = suppliers.iter().map(|s| s.total_spend).sum();
        let average_quality_rating = if suppliers.is_empty() {
            0.0
        } else {
            suppliers.iter().map(|s| s.quality_rating).sum::<f64>() / suppliers.len() as f64
        };

        SupplierAnalytics {
            total_suppliers: suppliers.len() as u64,
            active_suppliers: suppliers.iter().filter(|s| s.is_active).count() as u64,
            supplier_type_distribution: type_distribution,
            supplier_tier_distribution: tier_distribution,
            top_suppliers: top,
            total_spend,
            average_quality_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(code: &str, kind: SupplierType, tier: SupplierTier, spend: f64, quality: f64) -> Supplier {
        serde_json::from_value(serde_json::json!({
            "id": code.to_lowercase(),
            "supplier_code": code,
            "company_name": format!("{} Ltd", code),
            "supplier_type": kind,
            "supplier_tier": tier,
            "total_spend": spend,
            "quality_rating": quality,
        }))
        .unwrap()
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(SupplierType::ServiceProvider).unwrap(),
            serde_json::json!("SERVICE_PROVIDER")
        );
        assert_eq!(serde_json::to_value(PaymentTerms::Net30).unwrap(), serde_json::json!("NET30"));
        assert_eq!(serde_json::to_value(PaymentTerms::Cod).unwrap(), serde_json::json!("COD"));
        assert_eq!("preferred".parse::<SupplierTier>().unwrap(), SupplierTier::Preferred);
        assert!("gold".parse::<SupplierTier>().is_err());
    }

    #[test]
    fn test_analytics_fallback() {
        let suppliers = vec![
            supplier("A", SupplierType::Manufacturer, SupplierTier::Preferred, 500.0, 4.0),
            supplier("B", SupplierType::Distributor, SupplierTier::Standard, 1500.0, 5.0),
            supplier("C", SupplierType::Manufacturer, SupplierTier::Standard, 100.0, 3.0),
        ];
        let analytics = SupplierAnalytics::from_suppliers(&suppliers);

        assert_eq!(analytics.total_suppliers, 3);
        assert_eq!(analytics.active_suppliers, 3);
        assert_eq!(analytics.supplier_type_distribution["MANUFACTURER"], 2);
        assert_eq!(analytics.supplier_tier_distribution["STANDARD"], 2);
        assert_eq!(analytics.top_suppliers[0].supplier_code, "B");
        assert_eq!(analytics.total_spend, 2100.0);
        assert_eq!(analytics.average_quality_rating, 4.0);
    }

    #[test]
    fn test_analytics_of_nothing() {
        let analytics = SupplierAnalytics::from_suppliers(&[]);
        assert_eq!(analytics.total_suppliers, 0);
        assert_eq!(analytics.average_quality_rating, 0.0);
        assert!(analytics.top_suppliers.is_empty());
    }

    #[test]
    fn test_payment_terms_due_days() {
        assert_eq!(PaymentTerms::Net45.due_days(), Some(45));
        assert_eq!(PaymentTerms::Prepaid.due_days(), None);
    }
}
