//! Error types for criteria compilation and evaluation
//!
//! Every variant is a configuration defect in the exported criteria. Variants
//! other than [`CriteriaError::TypeMismatch`] are raised while compiling the
//! wire records; `TypeMismatch` is raised while evaluating a user snapshot.

use thiserror::Error;

use crate::predicate::Predicate;
use crate::value::ValueKind;

/// Criteria error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    /// Predicate string is not one of the recognised operators
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    /// Criterion has an empty key
    #[error("Criterion in or-group {or_group} has no key")]
    MissingKey {
        /// Or-group of the offending criterion
        or_group: i64,
    },

    /// Criterion has no value to compare against
    #[error("Criterion `{key}` has no value")]
    MissingValue {
        /// Attribute key of the offending criterion
        key: String,
    },

    /// Value cannot be represented as a criterion value
    #[error("Unsupported value for `{key}`: {message}")]
    UnsupportedValue {
        /// Attribute key the value belongs to
        key: String,
        /// What was wrong with the value
        message: String,
    },

    /// Predicate is not defined for the criterion's value type
    #[error("Predicate `{predicate}` cannot be applied to {kind} value of criterion `{key}`")]
    InvalidPredicate {
        /// Attribute key of the offending criterion
        key: String,
        /// The predicate that was requested
        predicate: Predicate,
        /// Type of the criterion value
        kind: ValueKind,
    },

    /// Attribute type is incompatible with the criterion
    #[error("Predicate `{predicate}` cannot compare {attribute} attribute `{key}` with {expected} value")]
    TypeMismatch {
        /// Attribute key that was evaluated
        key: String,
        /// The predicate being applied
        predicate: Predicate,
        /// Type of the user's attribute value
        attribute: ValueKind,
        /// Type of the criterion value
        expected: ValueKind,
    },
}

/// Result type for criteria operations.
pub type CriteriaResult<T> = Result<T, CriteriaError>;

impl CriteriaError {
    /// Check if this error was raised while compiling criteria records.
    ///
    /// Load-time errors can be reported before any user is evaluated.
    pub fn is_load_error(&self) -> bool {
        !self.is_evaluation_error()
    }

    /// Check if this error was raised while evaluating a user snapshot.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, CriteriaError::TypeMismatch { .. })
    }

    /// Attribute key the error relates to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            CriteriaError::UnknownPredicate(_) | CriteriaError::MissingKey { .. } => None,
            CriteriaError::MissingValue { key }
            | CriteriaError::UnsupportedValue { key, .. }
            | CriteriaError::InvalidPredicate { key, .. }
            | CriteriaError::TypeMismatch { key, .. } => Some(key),
        }
    }

    /// Get error code for reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            CriteriaError::UnknownPredicate(_) => "UNKNOWN_PREDICATE",
            CriteriaError::MissingKey { .. } => "MISSING_KEY",
            CriteriaError::MissingValue { .. } => "MISSING_VALUE",
            CriteriaError::UnsupportedValue { .. } => "UNSUPPORTED_VALUE",
            CriteriaError::InvalidPredicate { .. } => "INVALID_PREDICATE",
            CriteriaError::TypeMismatch { .. } => "TYPE_MISMATCH",
        }
    }
}
