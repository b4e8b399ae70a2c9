//! Error types for membership resolution
//!
//! A failing usergroup is normally isolated and recorded in the report; these
//! errors surface only when the importer is configured to abort the batch, or
//! through [`RoleFailure`](crate::resolver::RoleFailure) entries.

use forum_criteria::CriteriaError;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Membership resolution error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A usergroup's criteria failed to compile or evaluate
    #[error("Usergroup {usergroup_id}: {source}")]
    Criteria {
        /// The failing usergroup
        usergroup_id: i64,
        /// The underlying criteria error
        #[source]
        source: CriteriaError,
    },

    /// A usergroup lists users alongside criteria under strict membership
    #[error("Usergroup {usergroup_id} lists explicit users alongside criteria")]
    RedundantMembership {
        /// The failing usergroup
        usergroup_id: i64,
    },

    /// Several differing usergroups share an id
    #[error("Usergroup {usergroup_id} is defined more than once with different contents")]
    DuplicateUsergroup {
        /// The repeated id
        usergroup_id: i64,
    },

    /// The batch was aborted because a usergroup failed
    #[error("Import aborted at usergroup {usergroup_id}: {reason}")]
    Aborted {
        /// The usergroup that triggered the abort
        usergroup_id: i64,
        /// Description of the failure
        reason: String,
    },

    /// The import configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for membership resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

impl ResolveError {
    /// Usergroup the error relates to, if any.
    pub fn usergroup_id(&self) -> Option<i64> {
        match self {
            ResolveError::Criteria { usergroup_id, .. }
            | ResolveError::RedundantMembership { usergroup_id }
            | ResolveError::DuplicateUsergroup { usergroup_id }
            | ResolveError::Aborted { usergroup_id, .. } => Some(*usergroup_id),
            ResolveError::Config(_) => None,
        }
    }

    /// Get error code for reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::Criteria { source, .. } => source.error_code(),
            ResolveError::RedundantMembership { .. } => "REDUNDANT_MEMBERSHIP",
            ResolveError::DuplicateUsergroup { .. } => "DUPLICATE_USERGROUP",
            ResolveError::Aborted { .. } => "IMPORT_ABORTED",
            ResolveError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert into the abort error for the batch.
    pub(crate) fn into_abort(self) -> Self {
        match self {
            ResolveError::Aborted { .. } | ResolveError::Config(_) => self,
            other => ResolveError::Aborted {
                usergroup_id: other.usergroup_id().unwrap_or_default(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for ResolveError {
    fn from(err: ConfigError) -> Self {
        ResolveError::Config(err.to_string())
    }
}

impl Serialize for ResolveError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ResolveError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_criteria::{Predicate, ValueKind};

    #[test]
    fn test_criteria_error_code_passes_through() {
        let err = ResolveError::Criteria {
            usergroup_id: 3,
            source: CriteriaError::TypeMismatch {
                key: "name".to_string(),
                predicate: Predicate::GreaterThanOrEquals,
                attribute: ValueKind::Text,
                expected: ValueKind::Integer,
            },
        };
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
        assert_eq!(err.usergroup_id(), Some(3));
    }

    #[test]
    fn test_into_abort() {
        let err = ResolveError::RedundantMembership { usergroup_id: 9 }.into_abort();
        assert_eq!(
            err,
            ResolveError::Aborted {
                usergroup_id: 9,
                reason: "Usergroup 9 lists explicit users alongside criteria".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_usergroup_code() {
        let err = ResolveError::DuplicateUsergroup { usergroup_id: 4 };
        assert_eq!(err.error_code(), "DUPLICATE_USERGROUP");
        assert_eq!(err.usergroup_id(), Some(4));
    }

    #[test]
    fn test_serialize() {
        let err = ResolveError::RedundantMembership { usergroup_id: 1 };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "REDUNDANT_MEMBERSHIP");
    }
}
