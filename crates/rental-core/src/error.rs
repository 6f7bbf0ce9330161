//! # Error Types
//!
//! Domain-specific error types for rental-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rental-core errors (this file)                                        │
//! │  ├── CoreError        - Envelope, hierarchy and state machine failures │
//! │  └── FormErrors       - Per-field validation failures (validation.rs)  │
//! │                                                                         │
//! │  rental-client errors (separate crate)                                 │
//! │  └── ClientError      - Transport / HTTP status / decode failures      │
//! │                                                                         │
//! │  rental-admin errors (in app)                                          │
//! │  └── AppError         - What a page renders (code + message)           │
//! │                                                                         │
//! │  Flow: FormErrors → CoreError → ClientError → AppError → Page banner   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::validation::FormErrors;

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core domain errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    /// Client-side validation failed before any network call.
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    /// The backend answered with a `{success: false}` wrapper.
    #[error("{message}")]
    Rejected { message: String },

    /// The body did not match any known response shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// A payload could not be decoded into the requested model.
    #[error("Failed to decode {target}: {reason}")]
    Decode { target: String, reason: String },

    /// A category references a parent that is not in the supplied set.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Following parent references came back to a category already visited.
    #[error("Category hierarchy contains a cycle at {0}")]
    CategoryCycle(String),

    /// A page state machine received an event that is illegal in its state.
    #[error("Invalid transition: cannot {event} while {state}")]
    InvalidTransition { state: String, event: String },
}

impl CoreError {
    /// Creates a decode error for the given target type.
    pub fn decode(target: impl Into<String>, reason: impl ToString) -> Self {
        CoreError::Decode {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid transition error.
    pub fn transition(state: impl Into<String>, event: impl Into<String>) -> Self {
        CoreError::InvalidTransition {
            state: state.into(),
            event: event.into(),
        }
    }

    /// Returns true if this is a client-side validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

impl From<FormErrors> for CoreError {
    fn from(errors: FormErrors) -> Self {
        CoreError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_server_message() {
        let err = CoreError::Rejected {
            message: "Brand code already exists".into(),
        };
        assert_eq!(err.to_string(), "Brand code already exists");
    }

    #[test]
    fn test_transition_message() {
        let err = CoreError::transition("submitting", "submit");
        assert_eq!(err.to_string(), "Invalid transition: cannot submit while submitting");
    }

    #[test]
    fn test_validation_category() {
        let mut errors = FormErrors::default();
        errors.add("name", "Category name is required");
        assert!(CoreError::from(errors).is_validation());
        assert!(!CoreError::CategoryCycle("a".into()).is_validation());
    }
}
