//! User attribute snapshots
//!
//! Builds the [`UserAttributes`] criteria are evaluated against, from the
//! exported user record plus activity metrics derived from the rest of the
//! export.

use forum_criteria::{UserAttributes, Value};
use forum_schema::{Attachment, Comment, Conversation, User};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known attribute keys populated by [`UserSnapshot::from_user`].
pub mod keys {
    /// User identifier
    pub const ID: &str = "id";
    /// Username
    pub const NAME: &str = "name";
    /// Email address
    pub const EMAIL: &str = "email";
    /// Registration date
    pub const DATE_CREATED: &str = "dateCreated";
    /// Last activity date
    pub const LAST_ACTIVE: &str = "lastActive";
    /// Last known IP address
    pub const IP_ADDRESS: &str = "ipAddress";
    /// Ban flag
    pub const IS_BANNED: &str = "isBanned";
    /// Accepts email from administrators
    pub const RECEIVE_EMAIL_FROM_ADMINS: &str = "receiveEmailFromAdmins";
    /// Accepts notification emails
    pub const RECEIVE_EMAIL_NOTIFICATIONS: &str = "receiveEmailNotifications";
    /// Number of comments written
    pub const COMMENTS: &str = "comments";
    /// Number of conversations started
    pub const CONVERSATIONS: &str = "conversations";
    /// Number of attachments uploaded
    pub const ATTACHMENTS: &str = "attachments";
}

/// Activity metrics of a single user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    /// Comments written
    pub comments: u32,
    /// Conversations started
    pub conversations: u32,
    /// Attachments uploaded
    pub attachments: u32,
}

/// Per-author activity tallied across an export.
///
/// Deleted comments and conversations are not counted.
///
/// # Example
///
/// ```
/// use forum_import::ActivityLedger;
/// use forum_schema::{Association, Comment};
///
/// let comments = vec![
///     Comment::new(1, Association::conversation(1), 7),
///     Comment::new(2, Association::conversation(1), 7),
/// ];
///
/// let ledger = ActivityLedger::new().with_comments(&comments);
/// assert_eq!(ledger.activity(7).comments, 2);
/// assert_eq!(ledger.activity(8).comments, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    by_author: HashMap<i64, UserActivity>,
}

impl ActivityLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            by_author: HashMap::new(),
        }
    }

    /// Count comments by author.
    pub fn with_comments(mut self, comments: &[Comment]) -> Self {
        for comment in comments.iter().filter(|c| c.author != 0 && !c.is_deleted) {
            self.entry(comment.author).comments += 1;
        }
        self
    }

    /// Count conversations by author.
    pub fn with_conversations(mut self, conversations: &[Conversation]) -> Self {
        for conversation in conversations.iter().filter(|c| c.has_author() && !c.is_deleted) {
            self.entry(conversation.author).conversations += 1;
        }
        self
    }

    /// Count attachments by author.
    pub fn with_attachments(mut self, attachments: &[Attachment]) -> Self {
        for attachment in attachments.iter().filter(|a| a.author != 0) {
            self.entry(attachment.author).attachments += 1;
        }
        self
    }

    /// Get a user's activity; users with none get zeroes.
    pub fn activity(&self, user_id: i64) -> UserActivity {
        self.by_author.get(&user_id).copied().unwrap_or_default()
    }

    /// Get the number of authors with any activity.
    pub fn len(&self) -> usize {
        self.by_author.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }

    fn entry(&mut self, author: i64) -> &mut UserActivity {
        self.by_author.entry(author).or_default()
    }
}

/// The attributes of one user at import time.
///
/// # Example
///
/// ```
/// use forum_criteria::Value;
/// use forum_import::{UserActivity, UserSnapshot};
/// use forum_schema::User;
///
/// let user = User::new(1, "alice", "alice@example.com");
/// let activity = UserActivity { comments: 2000, ..UserActivity::default() };
///
/// let snapshot = UserSnapshot::from_user(&user, activity).with_attribute("is_member", true);
/// assert_eq!(snapshot.attributes.get("comments"), Some(&Value::Integer(2000)));
/// assert!(snapshot.attributes.get("lastActive").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSnapshot {
    /// The user the snapshot describes
    pub user_id: i64,
    /// Attributes criteria are evaluated against
    pub attributes: UserAttributes,
}

impl UserSnapshot {
    /// Create a snapshot from arbitrary attributes.
    pub fn new(user_id: i64, attributes: UserAttributes) -> Self {
        Self {
            user_id,
            attributes,
        }
    }

    /// Build a snapshot from a user record and its activity.
    ///
    /// Unset optional fields are left out, so criteria on them behave as
    /// missing attributes.
    pub fn from_user(user: &User, activity: UserActivity) -> Self {
        let mut attributes = UserAttributes::new()
            .with(keys::ID, user.id)
            .with(keys::NAME, user.name.as_str())
            .with(keys::EMAIL, user.email.as_str())
            .with(keys::IS_BANNED, user.is_banned)
            .with(keys::RECEIVE_EMAIL_FROM_ADMINS, user.receive_email_from_admins)
            .with(keys::RECEIVE_EMAIL_NOTIFICATIONS, user.receive_email_notifications)
            .with(keys::COMMENTS, activity.comments)
            .with(keys::CONVERSATIONS, activity.conversations)
            .with(keys::ATTACHMENTS, activity.attachments);

        if let Some(at) = user.date_created {
            attributes.insert(keys::DATE_CREATED, at);
        }
        if let Some(at) = user.last_active {
            attributes.insert(keys::LAST_ACTIVE, at);
        }
        if let Some(ip) = user.ip_address.as_deref().filter(|ip| !ip.is_empty()) {
            attributes.insert(keys::IP_ADDRESS, ip);
        }

        Self::new(user.id, attributes)
    }

    /// Build snapshots for every user of an export.
    pub fn from_users(users: &[User], ledger: &ActivityLedger) -> Vec<Self> {
        users
            .iter()
            .map(|user| Self::from_user(user, ledger.activity(user.id)))
            .collect()
    }

    /// Add an importer-defined attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Check if the snapshot marks the user as banned.
    pub fn is_banned(&self) -> bool {
        self.attributes
            .get(keys::IS_BANNED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use forum_schema::Association;

    #[test]
    fn test_ledger_skips_deleted_and_anonymous() {
        let mut deleted = Comment::new(2, Association::conversation(1), 5);
        deleted.is_deleted = true;
        let comments = vec![
            Comment::new(1, Association::conversation(1), 5),
            deleted,
            Comment::new(3, Association::conversation(1), 0),
        ];
        let conversations = vec![
            Conversation::new(1, "a", 1).with_author(5),
            Conversation::new(2, "b", 1),
        ];
        let attachments = vec![Attachment::new(1, "u").with_author(6)];

        let ledger = ActivityLedger::new()
            .with_comments(&comments)
            .with_conversations(&conversations)
            .with_attachments(&attachments);

        assert_eq!(
            ledger.activity(5),
            UserActivity {
                comments: 1,
                conversations: 1,
                attachments: 0,
            }
        );
        assert_eq!(ledger.activity(6).attachments, 1);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.activity(0) == UserActivity::default());
    }

    #[test]
    fn test_snapshot_from_user() {
        let joined = Utc.with_ymd_and_hms(2010, 10, 10, 0, 0, 0).unwrap();
        let mut user = User::new(4, "dave", "dave@example.com")
            .with_date_created(joined)
            .banned();
        user.ip_address = Some(String::new());

        let snapshot = UserSnapshot::from_user(&user, UserActivity::default());

        assert_eq!(snapshot.user_id, 4);
        assert_eq!(snapshot.attributes.get(keys::DATE_CREATED), Some(&Value::from(joined)));
        assert_eq!(snapshot.attributes.get(keys::COMMENTS), Some(&Value::Integer(0)));
        assert!(snapshot.attributes.get(keys::LAST_ACTIVE).is_none());
        assert!(snapshot.attributes.get(keys::IP_ADDRESS).is_none());
        assert!(snapshot.is_banned());
    }

    #[test]
    fn test_from_users_uses_ledger() {
        let users = vec![
            User::new(1, "a", "a@example.com"),
            User::new(2, "b", "b@example.com"),
        ];
        let comments = vec![Comment::new(1, Association::conversation(1), 2)];
        let ledger = ActivityLedger::new().with_comments(&comments);

        let snapshots = UserSnapshot::from_users(&users, &ledger);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].attributes.get(keys::COMMENTS), Some(&Value::Integer(0)));
        assert_eq!(snapshots[1].attributes.get(keys::COMMENTS), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_extra_attributes_override() {
        let user = User::new(1, "a", "a@example.com");
        let snapshot = UserSnapshot::from_user(&user, UserActivity::default())
            .with_attribute(keys::COMMENTS, 42)
            .with_attribute("is_member", true);

        assert_eq!(snapshot.attributes.get(keys::COMMENTS), Some(&Value::Integer(42)));
        assert_eq!(snapshot.attributes.get("is_member"), Some(&Value::Boolean(true)));
    }
}
