//! Category models.
//!
//! Categories form a tree through `parent_category_id`. The backend keeps a
//! materialized `category_path` (`Electronics/Cameras/DSLR`) and a
//! `category_level` so lists can be shown hierarchically without walking
//! the parent chain on every render.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{default_true, Audit, PageRequest};

/// A category as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub category_name: String,
    #[serde(default)]
    pub parent_category_id: Option<String>,
    /// Materialized path, segments joined with `/`.
    pub category_path: String,
    /// Depth in the tree. Root categories are level 0.
    #[serde(default)]
    pub category_level: u32,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_leaf: bool,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_category_id.is_none()
    }
}

/// Payload for `POST /categories/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryCreate {
    pub category_name: String,
    /// `None` creates a root category.
    pub parent_category_id: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

/// Payload for `PUT /categories/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Payload for `POST /categories/{id}/move`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryMove {
    pub new_parent_id: Option<String>,
}

/// A node of `GET /categories/tree/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryTree {
    pub id: String,
    pub category_name: String,
    #[serde(default)]
    pub parent_category_id: Option<String>,
    pub category_path: String,
    #[serde(default)]
    pub category_level: u32,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_leaf: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub children: Vec<CategoryTree>,
}

impl CategoryTree {
    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CategoryTree::size).sum::<usize>()
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&CategoryTree> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// `GET /categories/statistics/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryStatistics {
    #[serde(default)]
    pub total_categories: u64,
    #[serde(default)]
    pub active_categories: u64,
    #[serde(default)]
    pub root_categories: u64,
    #[serde(default)]
    pub leaf_categories: u64,
    #[serde(default)]
    pub max_depth: u32,
}

/// Filters for `GET /categories/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryListParams {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_leaf: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_deserializes_with_audit_and_defaults() {
        let json = r#"{
            "id": "c1",
            "category_name": "Cameras",
            "parent_category_id": "c0",
            "category_path": "Electronics/Cameras",
            "category_level": 1,
            "created_at": "2024-05-01T10:00:00",
            "created_by": "admin"
        }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.category_level, 1);
        assert!(category.is_leaf);
        assert!(category.is_active);
        assert!(!category.is_root());
        assert_eq!(category.audit.created_by.as_deref(), Some("admin"));
        assert!(category.audit.created_at.is_some());
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = CategoryUpdate {
            category_name: Some("Lenses".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"category_name": "Lenses"}));
    }

    #[test]
    fn test_tree_find_and_size() {
        let tree: CategoryTree = serde_json::from_value(serde_json::json!({
            "id": "root",
            "category_name": "Electronics",
            "category_path": "Electronics",
            "children": [
                {"id": "cam", "category_name": "Cameras", "category_path": "Electronics/Cameras",
                 "category_level": 1, "children": [
                    {"id": "dslr", "category_name": "DSLR", "category_path": "Electronics/Cameras/DSLR",
                     "category_level": 2}
                 ]}
            ]
        }))
        .unwrap();
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.find("dslr").map(|n| n.category_level), Some(2));
        assert!(tree.find("missing").is_none());
    }
}
