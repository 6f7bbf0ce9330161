//! Brand models.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{default_true, Audit, PageRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Brand {
    pub id: String,
    pub brand_name: String,
    #[serde(default)]
    pub brand_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Brand {
    /// `"Canon (CAN)"` when a code exists, otherwise just the name.
    pub fn display_name(&self) -> String {
        match &self.brand_code {
            Some(code) if !code.is_empty() => format!("{} ({})", self.brand_name, code),
            _ => self.brand_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BrandCreate {
    pub brand_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BrandUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Filters for `GET /brands/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut brand: Brand = serde_json::from_value(serde_json::json!({
            "id": "b1", "brand_name": "Canon", "brand_code": "CAN"
        }))
        .unwrap();
        assert_eq!(brand.display_name(), "Canon (CAN)");
        brand.brand_code = None;
        assert_eq!(brand.display_name(), "Canon");
    }
}
