//! # App Error Type
//!
//! Unified error type for page controllers and CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Error Flow in the Rental Admin                        │
//! │                                                                         │
//! │  Page controller              Lower layers                              │
//! │  ───────────────              ────────────                              │
//! │                                                                         │
//! │  CategoryNewPage::submit()                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Form schema fails? ── CoreError::Validation ──┐                 │  │
//! │  │         │                                      │                 │  │
//! │  │         ▼                                      ▼                 │  │
//! │  │  Backend says no? ──── ClientError::Api ────► AppError ─────────►│  │
//! │  │         │                                      ▲                 │  │
//! │  │         ▼                                      │                 │  │
//! │  │  Store gone? ───────── StoreError ─────────────┘                 │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The page has already put the text in its banner / toast by the time   │
//! │  the AppError is returned; callers only branch on `code`.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rental_client::{ClientError, StoreError};
use rental_core::{CoreError, FormErrors};
use serde::Serialize;

/// Error returned from page controllers.
///
/// ## Serialization
/// This is what `--json` CLI output shows when a command fails:
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Category name is required"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for page and command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Client-side or server-side validation failed (400/422)
    ValidationError,

    /// Session missing or rejected (401)
    Unauthorized,

    /// Backend unreachable or timed out
    NetworkError,

    /// Backend answered with an error status
    ServerError,

    /// A page received an action it cannot take in its current state
    InvalidState,

    /// Auth or app store failure
    StoreError,

    /// Bad configuration
    ConfigError,

    /// Anything unexpected
    Internal,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::InvalidState, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    pub fn is_validation(&self) -> bool {
        self.code == ErrorCode::ValidationError
    }
}

/// Converts client errors to app errors.
impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let message = err.user_message();
        match err {
            ClientError::Connection(_) | ClientError::Timeout(_) => {
                AppError::new(ErrorCode::NetworkError, message)
            }
            ClientError::Unauthorized(_) => AppError::new(ErrorCode::Unauthorized, message),
            ClientError::Api { status, .. } => match status {
                404 => AppError::new(ErrorCode::NotFound, message),
                400 | 409 | 422 => AppError::new(ErrorCode::ValidationError, message),
                _ => AppError::new(ErrorCode::ServerError, message),
            },
            ClientError::Core(core) => AppError::from(core),
            ClientError::Store(store) => AppError::from(store),
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => {
                AppError::new(ErrorCode::ConfigError, err.to_string())
            }
            ClientError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                AppError::internal("Failed to read the server response")
            }
        }
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => AppError::from(errors),
            CoreError::Rejected { message } => AppError::new(ErrorCode::ServerError, message),
            CoreError::InvalidTransition { .. } => AppError::invalid_state(err.to_string()),
            CoreError::CategoryNotFound(id) => AppError::not_found("Category", &id),
            CoreError::CategoryCycle(_) => AppError::validation(err.to_string()),
            CoreError::UnexpectedShape(_) | CoreError::Decode { .. } => {
                tracing::error!("Unreadable server response: {}", err);
                AppError::internal("Failed to read the server response")
            }
        }
    }
}

/// Field errors collapse to their first message; the form keeps the rest.
impl From<FormErrors> for AppError {
    fn from(errors: FormErrors) -> Self {
        let first = errors
            .fields()
            .find_map(|field| errors.first(field))
            .unwrap_or("Please fix the highlighted fields.")
            .to_string();
        AppError::validation(first)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Store failure: {}", err);
        AppError::new(ErrorCode::StoreError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_codes() {
        let cases = [
            (ClientError::Connection("refused".into()), ErrorCode::NetworkError),
            (ClientError::Timeout(10), ErrorCode::NetworkError),
            (ClientError::Unauthorized("expired".into()), ErrorCode::Unauthorized),
            (ClientError::api(404, "Category not found"), ErrorCode::NotFound),
            (ClientError::api(400, "Name taken"), ErrorCode::ValidationError),
            (ClientError::api(500, "boom"), ErrorCode::ServerError),
            (ClientError::InvalidUrl("ws://x".into()), ErrorCode::ConfigError),
            (ClientError::Store(StoreError::ShuttingDown), ErrorCode::StoreError),
        ];
        for (err, code) in cases {
            assert_eq!(AppError::from(err).code, code);
        }
    }

    #[test]
    fn test_server_text_is_kept() {
        let err = AppError::from(ClientError::api(400, "Category with name 'Cameras' already exists"));
        assert_eq!(err.message, "Category with name 'Cameras' already exists");
    }

    #[test]
    fn test_form_errors_take_first_message() {
        let mut errors = FormErrors::new();
        errors.add("name", "Category name is required");
        let err = AppError::from(CoreError::Validation(errors));
        assert!(err.is_validation());
        assert_eq!(err.message, "Category name is required");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(AppError::not_found("Brand", "b1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Brand not found: b1");
    }

    #[test]
    fn test_display() {
        let err = AppError::invalid_state("cannot submit while submitting");
        assert_eq!(err.to_string(), "[InvalidState] cannot submit while submitting");
    }
}
