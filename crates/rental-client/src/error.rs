//! # Client Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     HTTP                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Api {status, message}  │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Unauthorized           │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │    Response     │  │     Stores (StoreError)                     │  │
//! │  │                 │  │                                             │  │
//! │  │  Core (shape,   │  │  Io, Serialization, ShuttingDown,           │  │
//! │  │  decode, valid.)│  │  ChannelError                               │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use rental_core::envelope::DEFAULT_ERROR_MESSAGE;
use rental_core::{CoreError, FormErrors};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown when the backend cannot be reached at all.
pub const TRANSPORT_MESSAGE: &str = "Unable to reach the server. Please check your connection.";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response.
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // HTTP Errors
    // =========================================================================
    /// Non-2xx response. `message` is already the user-facing text.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },

    /// 401. The session has been cleared by the time this is returned.
    #[error("{0}")]
    Unauthorized(String),

    // =========================================================================
    // Response / Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the persisted stores.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Stored snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("Store is shutting down")]
    ShuttingDown,

    #[error("Channel error: {0}")]
    ChannelError(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(0)
        } else if err.is_decode() {
            ClientError::Serialization(err.to_string())
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

impl From<FormErrors> for ClientError {
    fn from(err: FormErrors) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Builds an API error from a status and an already-extracted message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// True when the backend was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Connection(_) | ClientError::Timeout(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    /// True for client-side schema failures, which never hit the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Core(e) if e.is_validation())
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Server-side field errors, if the response carried any.
    pub fn field_errors(&self) -> FormErrors {
        match self {
            ClientError::Api { field_errors, .. } => FormErrors::from(field_errors.clone()),
            ClientError::Core(CoreError::Validation(errors)) => errors.clone(),
            _ => FormErrors::new(),
        }
    }

    /// Text a page can put in a toast or banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Connection(_) | ClientError::Timeout(_) => TRANSPORT_MESSAGE.to_string(),
            ClientError::Api { message, .. } | ClientError::Unauthorized(message) => {
                if message.trim().is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    message.clone()
                }
            }
            ClientError::Core(CoreError::Rejected { message }) => message.clone(),
            ClientError::Core(CoreError::Validation(_)) => {
                "Please fix the highlighted fields.".to_string()
            }
            _ => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// The server's own text, when it sent one. Pages fall back to their
    /// page-specific message when this is `None`.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } | ClientError::Unauthorized(message)
                if !message.trim().is_empty() && message != DEFAULT_ERROR_MESSAGE =>
            {
                Some(message.as_str())
            }
            ClientError::Core(CoreError::Rejected { message }) => Some(message.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(ClientError::Connection("refused".into()).is_transport());
        assert!(ClientError::Timeout(10).is_transport());
        assert!(!ClientError::api(500, "boom").is_transport());
        assert!(ClientError::api(404, "missing").is_not_found());
        assert!(ClientError::Unauthorized("expired".into()).is_unauthorized());
        assert!(ClientError::from(FormErrors::new()).is_validation());
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(ClientError::Connection("refused".into()).user_message(), TRANSPORT_MESSAGE);
        assert_eq!(ClientError::api(400, "Name taken").user_message(), "Name taken");
        assert_eq!(ClientError::api(500, "  ").user_message(), DEFAULT_ERROR_MESSAGE);
        let rejected = ClientError::Core(CoreError::Rejected {
            message: "Insufficient stock".into(),
        });
        assert_eq!(rejected.user_message(), "Insufficient stock");
    }

    #[test]
    fn test_server_message_skips_generic_fallback() {
        assert_eq!(ClientError::api(400, "Duplicate").server_message(), Some("Duplicate"));
        assert_eq!(ClientError::api(500, DEFAULT_ERROR_MESSAGE).server_message(), None);
        assert_eq!(ClientError::Timeout(10).server_message(), None);
    }

    #[test]
    fn test_field_errors_carried() {
        let mut map = BTreeMap::new();
        map.insert("category_name".to_string(), vec!["already exists".to_string()]);
        let err = ClientError::Api {
            status: 422,
            message: "Validation error".into(),
            field_errors: map,
        };
        assert_eq!(err.field_errors().first("category_name"), Some("already exists"));
        assert_eq!(err.status(), Some(422));
    }
}
