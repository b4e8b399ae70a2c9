//! # Forum Schema
//!
//! This crate provides the interchange records for exporting discussion-forum
//! content from one forum platform and importing it into another.
//!
//! ## Overview
//!
//! The forum-schema crate handles:
//! - **Users**: Accounts and their explicit usergroup memberships
//! - **Usergroups**: Permission groups with explicit members and implicit criteria
//! - **Forums**: Containers for content, with per-forum usergroup permissions
//! - **Conversations**: Threads within a forum
//! - **Comments**: Posts with threaded replies and edit history
//! - **Attachments, Follows, Messages**: Files, subscriptions and private messages
//!
//! ## Architecture
//!
//! ```text
//! Forum
//!   ├─ Usergroups (ForumPermissions, Users, Criteria)
//!   ├─ Moderators
//!   └─ Conversations
//!         └─ Comments ─→ CommentVersions
//!               └─ Attachments
//! User ─→ Usergroups, Follows ─→ Associations
//! ```
//!
//! ## Wire Format
//!
//! Records serialize to JSON with camelCase keys. Optional fields holding
//! their zero value are omitted on output and default on input. Unset dates
//! written as `0001-01-01T00:00:00Z` are read as absent.
//!
//! ## Usage
//!
//! ```rust
//! use forum_schema::{Usergroup, User};
//!
//! let group: Usergroup = serde_json::from_str(r#"{
//!     "id": 4,
//!     "name": "Veterans",
//!     "criteria": [{"orGroup": 0, "key": "comments", "predicate": "ge", "value": 1500}]
//! }"#).unwrap();
//!
//! assert!(group.has_criteria());
//! assert!(group.compile_criteria().is_ok());
//!
//! let user = User::new(1, "alice", "alice@example.com");
//! assert_eq!(
//!     serde_json::to_string(&user).unwrap(),
//!     r#"{"id":1,"name":"alice","email":"alice@example.com"}"#
//! );
//! ```
//!
//! ## Integration
//!
//! - `forum-criteria`: Criterion records and their evaluation
//! - `forum-import`: Membership resolution over exported usergroups
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod comment;
pub mod content;
mod format;
pub mod forum;
pub mod user;
pub mod usergroup;

// Re-export main types for convenience
pub use comment::{Comment, CommentVersion};
pub use content::{Association, Attachment, Follow, Message};
pub use forum::{Conversation, Forum};
pub use user::{IdRef, User};
pub use usergroup::{ForumPermissions, Usergroup};

pub use forum_criteria::Criterion;
