//! # Query Keys
//!
//! Hierarchical cache keys. A key is a list of segments; any prefix of a
//! key is a *group*, and invalidating a group touches every key under it.
//!
//! ```text
//! ["categories"]                                  ◄── group: everything
//! ["categories", "list"]                          ◄── group: every list
//! ["categories", "list", {"skip":0,"limit":100}]  ◄── one cached list
//! ["categories", "detail", "c1"]                  ◄── one cached record
//! ["categories", "tree"]
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Backend resources that own cache groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Auth,
    Categories,
    Brands,
    Suppliers,
    Locations,
    Skus,
    Transactions,
    RentalsDueToday,
    Purchases,
    PurchaseReturns,
    InventoryUnits,
    Customers,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Auth => "auth",
            Resource::Categories => "categories",
            Resource::Brands => "brands",
            Resource::Suppliers => "suppliers",
            Resource::Locations => "locations",
            Resource::Skus => "skus",
            Resource::Transactions => "transactions",
            Resource::RentalsDueToday => "rentals-due-today",
            Resource::Purchases => "purchases",
            Resource::PurchaseReturns => "purchase-returns",
            Resource::InventoryUnits => "inventory-units",
            Resource::Customers => "customers",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One key segment. Parameters are kept as canonical JSON so two equal
/// filter structs always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Name(String),
    Params(String),
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Name(name) => f.write_str(name),
            KeySegment::Params(json) => f.write_str(json),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    /// `[resource]`, the widest group for a resource.
    pub fn resource(resource: Resource) -> Self {
        QueryKey(vec![KeySegment::Name(resource.as_str().to_string())])
    }

    /// `[resource, "list"]`, the group of every list of a resource.
    pub fn lists(resource: Resource) -> Self {
        QueryKey::resource(resource).push("list")
    }

    /// `[resource, "list", params]`.
    pub fn list<P: Serialize>(resource: Resource, params: &P) -> Self {
        QueryKey::lists(resource).with_params(params)
    }

    /// `[resource, "detail", id]`.
    pub fn detail(resource: Resource, id: &str) -> Self {
        QueryKey::resource(resource).push("detail").push(id)
    }

    /// `[resource, "search", term]`.
    pub fn search(resource: Resource, term: &str) -> Self {
        QueryKey::resource(resource).push("search").push(term)
    }

    /// Appends a named segment.
    pub fn push(mut self, name: impl Into<String>) -> Self {
        self.0.push(KeySegment::Name(name.into()));
        self
    }

    /// Appends a parameter segment.
    pub fn with_params<P: Serialize>(mut self, params: &P) -> Self {
        let json = serde_json::to_value(params)
            .map(|v| canonical(&v))
            .unwrap_or_else(|_| "null".to_string());
        self.0.push(KeySegment::Params(json));
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// True if `self` equals `group` or lies underneath it.
    pub fn starts_with(&self, group: &QueryKey) -> bool {
        self.0.starts_with(&group.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", segment)?;
        }
        f.write_str("]")
    }
}

/// JSON with object keys sorted and nulls dropped, so `{"a":1,"b":null}`
/// and `{"a":1}` are the same key.
fn canonical(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| !v.is_null()).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}
