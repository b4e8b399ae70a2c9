//! # Forum Criteria
//!
//! This crate provides implicit usergroup membership for the forum
//! interchange format, shared by exporters and importers.
//!
//! ## Overview
//!
//! The forum-criteria crate handles:
//! - **Criteria**: The exported `{orGroup, key, predicate, value}` records
//! - **Predicates**: `eq`, `ne`, `lt`, `le`, `ge`, `gt`, `substr`, `nsubstr`
//! - **Values**: Typed criterion and attribute values
//! - **Criteria Sets**: Compiled criteria of one usergroup
//! - **Attributes**: Per-user attribute snapshots to evaluate against
//!
//! ## Evaluation
//!
//! ```text
//! Criteria with the same orGroup are AND-ed, distinct orGroups are OR-ed.
//!
//!   {0, comments,  ge, 1500}
//!   {0, is_member, eq, true}     =>  (comments >= 1500 AND is_member == true)
//!   {1, foo,       eq, "bar"}        OR foo == "bar"
//! ```
//!
//! An empty criteria list matches nobody. A missing attribute makes its
//! criterion false. Predicates applied to an incompatible value type are
//! configuration errors: compile time for the criterion value, evaluation
//! time for the user's attribute.
//!
//! ## Usage
//!
//! ```rust
//! use forum_criteria::{CriteriaSet, Criterion, UserAttributes};
//!
//! let criteria: Vec<Criterion> = serde_json::from_str(r#"[
//!     {"orGroup": 0, "key": "comments", "predicate": "ge", "value": 1500},
//!     {"orGroup": 0, "key": "is_member", "predicate": "eq", "value": true},
//!     {"orGroup": 1, "key": "foo", "predicate": "eq", "value": "bar"}
//! ]"#).unwrap();
//!
//! let set = CriteriaSet::compile(&criteria).unwrap();
//!
//! let attrs = UserAttributes::new()
//!     .with("comments", 100)
//!     .with("is_member", true)
//!     .with("foo", "bar");
//! assert!(set.matches(&attrs).unwrap());
//! ```
//!
//! ## Integration
//!
//! - `forum-schema`: `Usergroup` records carry `Criterion` lists
//! - `forum-import`: Builds attribute snapshots and resolves memberships

pub mod attributes;
pub mod criterion;
pub mod error;
pub mod evaluator;
pub mod predicate;
pub mod value;

// Re-export main types for convenience
pub use attributes::UserAttributes;
pub use criterion::{Criterion, Rule};
pub use error::{CriteriaError, CriteriaResult};
pub use evaluator::{matches, CriteriaSet};
pub use predicate::Predicate;
pub use value::{Timestamp, Value, ValueKind};
