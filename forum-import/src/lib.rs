//! # Forum Import
//!
//! This crate resolves usergroup memberships when importing a forum
//! interchange export.
//!
//! ## Overview
//!
//! The forum-import crate handles:
//! - **Snapshots**: Per-user attributes assembled from the export
//! - **Activity**: Comment, conversation and attachment counts by author
//! - **Resolution**: Explicit, implicit and registered usergroup membership
//! - **Reports**: Resolved members and isolated usergroup failures
//! - **Configuration**: Environment-driven resolution settings
//!
//! ## Architecture
//!
//! ```text
//! Export ─→ ActivityLedger ─→ UserSnapshot
//!   └─ Usergroups ─→ MembershipResolver::compile
//!                          └─ resolve(snapshots) ─→ MembershipReport
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use forum_import::{ActivityLedger, ImportConfig, MembershipResolver, UserSnapshot};
//! use forum_schema::{Association, Comment, User, Usergroup};
//!
//! let usergroups: Vec<Usergroup> = serde_json::from_str(r#"[
//!     {"id": 1, "name": "Members", "includeRegisteredUsers": true},
//!     {"id": 4, "name": "Regulars", "criteria": [
//!         {"orGroup": 0, "key": "comments", "predicate": "ge", "value": 2}
//!     ]}
//! ]"#).unwrap();
//!
//! let users = vec![
//!     User::new(1, "alice", "alice@example.com"),
//!     User::new(2, "bob", "bob@example.com"),
//! ];
//! let comments = vec![
//!     Comment::new(1, Association::conversation(1), 1),
//!     Comment::new(2, Association::conversation(1), 1),
//! ];
//!
//! let ledger = ActivityLedger::new().with_comments(&comments);
//! let snapshots = UserSnapshot::from_users(&users, &ledger);
//!
//! let resolver = MembershipResolver::compile(ImportConfig::default(), &usergroups).unwrap();
//! let report = resolver.resolve(&snapshots).unwrap();
//!
//! assert_eq!(report.members_of(1), vec![1, 2]);
//! assert_eq!(report.members_of(4), vec![1]);
//! ```
//!
//! ## Logging
//!
//! Resolution logs through `tracing`. The crate never installs a subscriber.
//!
//! ## Integration
//!
//! - `forum-criteria`: Criteria evaluation
//! - `forum-schema`: Exported records

pub mod config;
pub mod error;
pub mod resolver;
pub mod snapshot;

// Re-export main types for convenience
pub use config::{ConfigError, ImportConfig};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{MembershipReport, MembershipResolver, MembershipSource, RoleFailure};
pub use snapshot::{keys, ActivityLedger, UserActivity, UserSnapshot};
