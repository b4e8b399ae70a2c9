//! Comment records
//!
//! A comment is attached to a conversation or any other content (a profile
//! bio, for instance), optionally threaded through `in_reply_to`. Comments
//! keep their edit history as versions; the latest version is the live one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Association;
use crate::format;

/// A post or comment.
///
/// # Examples
///
/// ```
/// use forum_schema::{Association, Comment, CommentVersion};
///
/// let comment = Comment::new(1, Association::conversation(10), 7)
///     .with_version(CommentVersion::new(7, "first draft"))
///     .with_version(CommentVersion::new(7, "final text"));
///
/// assert_eq!(comment.text(), Some("final text"));
/// assert!(!comment.is_reply());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Identifier of the comment
    pub id: i64,

    /// Content the comment belongs to
    #[serde(flatten)]
    pub association: Association,

    /// Comment this one replies to
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub in_reply_to: i64,

    /// User who wrote the comment
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub author: i64,

    /// When the comment was posted
    #[serde(
        default,
        deserialize_with = "format::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<DateTime<Utc>>,

    /// IP address the comment was posted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Whether the comment awaits approval
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_moderated: bool,

    /// Whether the comment is deleted
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_deleted: bool,

    /// Edit history
    #[serde(default)]
    pub versions: Vec<CommentVersion>,
}

impl Comment {
    /// Creates a comment with no versions.
    pub fn new(id: i64, association: Association, author: i64) -> Self {
        Self {
            id,
            association,
            in_reply_to: 0,
            author,
            date_created: None,
            ip_address: None,
            is_moderated: false,
            is_deleted: false,
            versions: Vec::new(),
        }
    }

    /// Thread the comment under another.
    pub fn replying_to(mut self, comment_id: i64) -> Self {
        self.in_reply_to = comment_id;
        self
    }

    /// Set the posting date.
    pub fn with_date_created(mut self, at: DateTime<Utc>) -> Self {
        self.date_created = Some(at);
        self
    }

    /// Append a version.
    pub fn with_version(mut self, version: CommentVersion) -> Self {
        self.versions.push(version);
        self
    }

    /// Check if the comment is threaded under another.
    pub fn is_reply(&self) -> bool {
        self.in_reply_to != 0
    }

    /// Get the live version.
    ///
    /// The version with the latest `date_modified` wins. Undated versions
    /// sort before dated ones, and among equals the later list entry wins.
    pub fn latest_version(&self) -> Option<&CommentVersion> {
        self.versions
            .iter()
            .enumerate()
            .max_by_key(|(index, version)| (version.date_modified, *index))
            .map(|(_, version)| version)
    }

    /// Get the text of the live version.
    pub fn text(&self) -> Option<&str> {
        self.latest_version().map(|v| v.text.as_str())
    }
}

/// One version of a comment's body.
///
/// `text` holds common markup only (plain text, BBCode, Markdown or HTML).
/// Exporters strip or convert any markup specific to their platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentVersion {
    /// User who wrote this version
    pub editor: i64,

    /// When this version was written
    #[serde(
        default,
        deserialize_with = "format::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_modified: Option<DateTime<Utc>>,

    /// Title of the comment
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub headline: String,

    /// Body
    pub text: String,

    /// Why the comment was edited
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub edit_reason: String,

    /// IP address the edit was made from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl CommentVersion {
    /// Creates an undated version.
    pub fn new(editor: i64, text: impl Into<String>) -> Self {
        Self {
            editor,
            date_modified: None,
            headline: String::new(),
            text: text.into(),
            edit_reason: String::new(),
            ip_address: None,
        }
    }

    /// Set the modification date.
    pub fn modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.date_modified = Some(at);
        self
    }

    /// Set the edit reason.
    pub fn with_edit_reason(mut self, reason: impl Into<String>) -> Self {
        self.edit_reason = reason.into();
        self
    }
}
