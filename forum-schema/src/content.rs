//! Associations, attachments, follows and private messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format;
use crate::user::IdRef;

/// Reference to any content by type and identifier.
///
/// `Association::new("conversation", 123)` means conversation 123.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    /// Content type, e.g. `forum`, `conversation`, `comment`, `user`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub on_type: String,

    /// Identifier of the content
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub on_id: i64,
}

impl Association {
    /// Content type of forums.
    pub const FORUM: &'static str = "forum";
    /// Content type of conversations.
    pub const CONVERSATION: &'static str = "conversation";
    /// Content type of comments.
    pub const COMMENT: &'static str = "comment";
    /// Content type of user profiles.
    pub const USER: &'static str = "user";

    /// Creates an association.
    pub fn new(on_type: impl Into<String>, on_id: i64) -> Self {
        Self {
            on_type: on_type.into(),
            on_id,
        }
    }

    /// Association with a forum.
    pub fn forum(id: i64) -> Self {
        Self::new(Self::FORUM, id)
    }

    /// Association with a conversation.
    pub fn conversation(id: i64) -> Self {
        Self::new(Self::CONVERSATION, id)
    }

    /// Association with a comment.
    pub fn comment(id: i64) -> Self {
        Self::new(Self::COMMENT, id)
    }

    /// Association with a user profile.
    pub fn user(id: i64) -> Self {
        Self::new(Self::USER, id)
    }

    /// Check if the association refers to nothing.
    pub fn is_empty(&self) -> bool {
        self.on_type.is_empty() && self.on_id == 0
    }

    /// Check if the association refers to content of the given type.
    pub fn is_type(&self, on_type: &str) -> bool {
        self.on_type == on_type
    }
}

/// A file attached to a comment or other content.
///
/// # Examples
///
/// ```
/// use forum_schema::{Association, Attachment};
///
/// let attachment = Attachment::new(1, "https://cdn.example.com/a.png")
///     .on(Association::comment(5))
///     .with_author(3);
///
/// let json = serde_json::to_value(&attachment).unwrap();
/// assert_eq!(json["onType"], "comment");
/// assert_eq!(json["contentUrl"], "https://cdn.example.com/a.png");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Identifier of the attachment
    pub id: i64,

    /// Content the file is attached to
    #[serde(flatten)]
    pub association: Association,

    /// User who uploaded the file
    #[serde(default, skip_serializing_if = "format::is_zero_i64")]
    pub author: i64,

    /// When the file was uploaded
    #[serde(
        default,
        deserialize_with = "format::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<DateTime<Utc>>,

    /// File name; numeric names from older exporters are read as text
    #[serde(
        default,
        deserialize_with = "format::string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// Size in bytes
    #[serde(default, skip_serializing_if = "format::is_zero_u64")]
    pub content_size: u64,

    /// Where the file can be fetched
    pub content_url: String,
}

impl Attachment {
    /// Creates an attachment with only the required fields set.
    pub fn new(id: i64, content_url: impl Into<String>) -> Self {
        Self {
            id,
            association: Association::default(),
            author: 0,
            date_created: None,
            name: None,
            content_size: 0,
            content_url: content_url.into(),
        }
    }

    /// Attach to content.
    pub fn on(mut self, association: Association) -> Self {
        self.association = association;
        self
    }

    /// Set the uploader.
    pub fn with_author(mut self, user_id: i64) -> Self {
        self.author = user_id;
        self
    }

    /// Set the file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the size in bytes.
    pub fn with_content_size(mut self, bytes: u64) -> Self {
        self.content_size = bytes;
        self
    }
}

/// A user's like, follow or subscription to content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    /// Following user
    pub author: i64,

    /// Followed content
    #[serde(default)]
    pub follows: Vec<Association>,
}

impl Follow {
    /// Creates a follow record with nothing followed yet.
    pub fn new(author: i64) -> Self {
        Self {
            author,
            follows: Vec::new(),
        }
    }

    /// Follow a piece of content.
    pub fn with(mut self, association: Association) -> Self {
        if !self.is_following(&association) {
            self.follows.push(association);
        }
        self
    }

    /// Check if the user follows a piece of content.
    pub fn is_following(&self, association: &Association) -> bool {
        self.follows.contains(association)
    }
}

/// A private message between one or more users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identifier of the message
    pub id: i64,

    /// Subject
    pub name: String,

    /// Participants
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<IdRef>,
}

impl Message {
    /// Creates a message with no participants.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            users: Vec::new(),
        }
    }

    /// Add a participant.
    pub fn with_participant(mut self, user_id: i64) -> Self {
        if !self.includes(user_id) {
            self.users.push(IdRef::from(user_id));
        }
        self
    }

    /// Check if a user takes part in the message.
    pub fn includes(&self, user_id: i64) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }
}
