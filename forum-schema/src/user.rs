//! User records
//!
//! Every forum is presumed to know a user's name, email address and
//! identifier. Everything else is optional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format;

/// Reference to another record by identifier.
///
/// # Examples
///
/// ```
/// use forum_schema::IdRef;
///
/// let json = serde_json::to_string(&IdRef::from(7)).unwrap();
/// assert_eq!(json, r#"{"id":7}"#);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdRef {
    /// Identifier of the referenced record
    pub id: i64,
}

impl From<i64> for IdRef {
    fn from(id: i64) -> Self {
        Self { id }
    }
}

/// A user of the forum.
///
/// # Examples
///
/// ```
/// use forum_schema::User;
///
/// let user = User::new(1, "alice", "alice@example.com").with_usergroup(3);
/// assert!(user.in_usergroup(3));
/// assert!(!user.is_banned);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier of the user
    pub id: i64,

    /// Username
    pub name: String,

    /// Email address
    pub email: String,

    /// When the account was registered
    #[serde(
        default,
        deserialize_with = "format::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<DateTime<Utc>>,

    /// When the user was last seen
    #[serde(
        default,
        deserialize_with = "format::optional_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_active: Option<DateTime<Utc>>,

    /// Last known IP address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Whether the user accepts email from administrators
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub receive_email_from_admins: bool,

    /// Whether the user accepts notification emails
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub receive_email_notifications: bool,

    /// Whether the user is banned
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_banned: bool,

    /// Usergroups the user is explicitly a member of
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usergroups: Vec<IdRef>,
}

impl User {
    /// Creates a user with only the required fields set.
    ///
    /// # Arguments
    ///
    /// * `id` - The user ID
    /// * `name` - The username
    /// * `email` - The email address
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            date_created: None,
            last_active: None,
            ip_address: None,
            receive_email_from_admins: false,
            receive_email_notifications: false,
            is_banned: false,
            usergroups: Vec::new(),
        }
    }

    /// Set the registration date.
    pub fn with_date_created(mut self, at: DateTime<Utc>) -> Self {
        self.date_created = Some(at);
        self
    }

    /// Set the last activity date.
    pub fn with_last_active(mut self, at: DateTime<Utc>) -> Self {
        self.last_active = Some(at);
        self
    }

    /// Mark the user as banned.
    pub fn banned(mut self) -> Self {
        self.is_banned = true;
        self
    }

    /// Add an explicit usergroup membership.
    pub fn with_usergroup(mut self, usergroup_id: i64) -> Self {
        if !self.in_usergroup(usergroup_id) {
            self.usergroups.push(IdRef::from(usergroup_id));
        }
        self
    }

    /// Check if the user explicitly lists a usergroup.
    pub fn in_usergroup(&self, usergroup_id: i64) -> bool {
        self.usergroups.iter().any(|g| g.id == usergroup_id)
    }
}
