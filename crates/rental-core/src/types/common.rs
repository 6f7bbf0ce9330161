//! Shared building blocks for the wire models: audit fields, pages,
//! pagination requests and lenient timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Default page size used by list endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

// =============================================================================
// Audit Fields
// =============================================================================

/// Who touched a record and when. Flattened into every entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Audit {
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

// =============================================================================
// Pages
// =============================================================================

/// A normalized list result.
///
/// Every list shape the backend produces (raw array, `{items, skip, limit}`,
/// `{items, page, size}`, `{rentals, ...}`) is folded into this one type by
/// [`crate::envelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    /// Wraps a complete, unpaginated list.
    pub fn from_items(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Page {
            items,
            total,
            skip: 0,
            limit: total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when more rows exist past this page.
    pub fn has_more(&self) -> bool {
        self.skip + (self.items.len() as u64) < self.total
    }

    /// Zero-based page index derived from skip/limit.
    pub fn page_index(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.skip / self.limit
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            items: Vec::new(),
            total: 0,
            skip: 0,
            limit: 0,
        }
    }
}

/// Skip/limit pagination carried by every list parameter struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub skip: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(skip: u64, limit: u64) -> Self {
        PageRequest { skip, limit }
    }

    /// Converts a one-based page number and page size.
    pub fn from_page(page: u64, size: u64) -> Self {
        PageRequest {
            skip: page.saturating_sub(1).saturating_mul(size),
            limit: size,
        }
    }

    pub fn next(&self) -> Self {
        PageRequest {
            skip: self.skip + self.limit,
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Timestamps
// =============================================================================

/// Serde helpers for optional timestamps.
///
/// The backend emits both RFC 3339 (`2024-05-01T10:00:00Z`) and naive
/// ISO strings without an offset (`2024-05-01T10:00:00.123456`); naive
/// values are taken as UTC. Bare dates (`2024-05-01`) read as midnight UTC.
pub mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .or_else(|_| {
                chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map(|date| date.and_time(chrono::NaiveTime::MIN))
            })
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_timestamp_accepts_rfc3339_and_naive() {
        let a = timestamp::parse("2024-05-01T10:00:00Z").unwrap();
        let b = timestamp::parse("2024-05-01T10:00:00.250000").unwrap();
        assert_eq!(a.hour(), 10);
        assert_eq!(b.day(), 1);
        let c = timestamp::parse("2024-05-01").unwrap();
        assert_eq!((c.day(), c.hour()), (1, 0));
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_audit_defaults_when_missing() {
        let audit: Audit = serde_json::from_str("{}").unwrap();
        assert!(audit.created_at.is_none());
        assert!(audit.created_by.is_none());
    }

    #[test]
    fn test_optional_timestamps_export_as_nullable_strings() {
        let decl = Audit::decl();
        assert!(decl.contains("created_at: string | null"));
        assert!(decl.contains("updated_at: string | null"));
    }

    #[test]
    fn test_page_has_more() {
        let page = Page {
            items: vec![1, 2],
            total: 5,
            skip: 0,
            limit: 2,
        };
        assert!(page.has_more());
        assert_eq!(page.page_index(), 0);

        let last = Page {
            items: vec![5],
            total: 5,
            skip: 4,
            limit: 2,
        };
        assert!(!last.has_more());
        assert_eq!(last.page_index(), 2);
    }

    #[test]
    fn test_page_request_from_page() {
        assert_eq!(PageRequest::from_page(1, 20), PageRequest::new(0, 20));
        assert_eq!(PageRequest::from_page(3, 20), PageRequest::new(40, 20));
        assert_eq!(PageRequest::from_page(0, 20), PageRequest::new(0, 20));
        assert_eq!(PageRequest::from_page(u64::MAX, 50).skip, u64::MAX);
        assert_eq!(PageRequest::new(0, 20).next(), PageRequest::new(20, 20));
    }
}
