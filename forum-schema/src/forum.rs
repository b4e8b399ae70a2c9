//! Forum and conversation records
//!
//! A forum (group, section) is the container for content; usergroup
//! permissions are applied at the forum level rather than to individual
//! items. Conversations are the threads within a forum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format;
use crate::user::IdRef;
use crate::usergroup::Usergroup;

/// A forum of a discussion site.
///
/// # Examples
///
/// ```
/// use forum_schema::Forum;
///
/// let forum = Forum::new(1, "General").with_moderator(42);
/// assert!(forum.is_moderated_by(42));
/// assert!(!forum.is_deleted);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    /// Identifier of the forum
    pub id: i64,

    /// Display name
    pub name: String,

    /// Description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Position among sibling forums
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub display_order: i64,

    /// Whether new content may be posted
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_open: bool,

    /// Whether the forum is pinned
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_sticky: bool,

    /// Whether content requires approval
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_moderated: bool,

    /// Whether the forum is deleted
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_deleted: bool,

    /// Usergroups with permissions on this forum
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usergroups: Vec<Usergroup>,

    /// Users moderating this forum
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moderators: Vec<IdRef>,
}

impl Forum {
    /// Creates an open forum with no usergroups or moderators.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            text: String::new(),
            display_order: 0,
            is_open: true,
            is_sticky: false,
            is_moderated: false,
            is_deleted: false,
            usergroups: Vec::new(),
            moderators: Vec::new(),
        }
    }

    /// Attach a usergroup with its permissions.
    pub fn with_usergroup(mut self, usergroup: Usergroup) -> Self {
        self.usergroups.push(usergroup);
        self
    }

    /// Add a moderator.
    pub fn with_moderator(mut self, user_id: i64) -> Self {
        if !self.is_moderated_by(user_id) {
            self.moderators.push(IdRef::from(user_id));
        }
        self
    }

    /// Check if a user moderates this forum.
    pub fn is_moderated_by(&self, user_id: i64) -> bool {
        self.moderators.iter().any(|m| m.id == user_id)
    }

    /// Find an attached usergroup.
    pub fn usergroup(&self, usergroup_id: i64) -> Option<&Usergroup> {
        self.usergroups.iter().find(|g| g.id == usergroup_id)
    }
}

/// A discussion (thread) within a forum.
///
/// `forumId` is always written, even when zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Identifier of the conversation
    pub id: i64,

    /// Title
    pub name: String,

    /// Forum the conversation belongs to
    #[serde(default)]
    pub forum_id: i64,

    /// User who started the conversation
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub author: i64,

    /// When the conversation was started
    #[serde(
        default,
        deserialize_with = "format::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<DateTime<Utc>>,

    /// Number of times the conversation was viewed
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub view_count: i64,

    /// Whether replies may be posted
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_open: bool,

    /// Whether the conversation is pinned
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_sticky: bool,

    /// Whether replies require approval
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_moderated: bool,

    /// Whether the conversation is deleted
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_deleted: bool,
}

impl Conversation {
    /// Creates an open conversation in a forum.
    pub fn new(id: i64, name: impl Into<String>, forum_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            forum_id,
            author: 0,
            date_created: None,
            view_count: 0,
            is_open: true,
            is_sticky: false,
            is_moderated: false,
            is_deleted: false,
        }
    }

    /// Set the author.
    pub fn with_author(mut self, user_id: i64) -> Self {
        self.author = user_id;
        self
    }

    /// Set the creation date.
    pub fn with_date_created(mut self, at: DateTime<Utc>) -> Self {
        self.date_created = Some(at);
        self
    }

    /// Check if the conversation has a known author.
    pub fn has_author(&self) -> bool {
        self.author != 0
    }
}
