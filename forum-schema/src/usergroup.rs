//! Usergroup records
//!
//! A usergroup is a set of users sharing permissions. Users are included
//! either explicitly (listed in `users`) or implicitly (matching `criteria`).
//!
//! When a usergroup carries criteria, importers assume the explicit list does
//! not apply unless the source system documents otherwise, so exporters need
//! not enumerate every qualifying user. A source system's automatic
//! promotions into a group are exported as criteria of that group.

use forum_criteria::{CriteriaResult, CriteriaSet, Criterion};
use serde::{Deserialize, Serialize};

use crate::format;
use crate::user::IdRef;

/// Permissions members of a usergroup hold on a forum.
///
/// # Examples
///
/// ```
/// use forum_schema::ForumPermissions;
///
/// let perms = ForumPermissions::read_only();
/// assert!(perms.can_view);
/// assert!(!perms.can_post_new);
/// assert!(!perms.can_moderate());
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ForumPermissions {
    /// May view the forum
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_view: bool,

    /// May start new conversations
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_post_new: bool,

    /// May edit own comments
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_edit_own: bool,

    /// May edit other users' comments
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_edit_others: bool,

    /// May delete own comments
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_delete_own: bool,

    /// May delete other users' comments
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_delete_others: bool,

    /// May close own conversations
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_close_own: bool,

    /// May reopen own conversations
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub can_open_own: bool,
}

impl ForumPermissions {
    /// View-only access.
    pub fn read_only() -> Self {
        Self {
            can_view: true,
            ..Self::default()
        }
    }

    /// Access typical of a registered member: post and manage own content.
    pub fn member() -> Self {
        Self {
            can_view: true,
            can_post_new: true,
            can_edit_own: true,
            can_delete_own: true,
            can_close_own: true,
            can_open_own: true,
            ..Self::default()
        }
    }

    /// Every permission.
    pub fn full() -> Self {
        Self {
            can_edit_others: true,
            can_delete_others: true,
            ..Self::member()
        }
    }

    /// Check if the permissions extend to other users' content.
    pub fn can_moderate(&self) -> bool {
        self.can_edit_others || self.can_delete_others
    }

    /// Check if no permission is granted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A group of users sharing a set of permissions.
///
/// # Examples
///
/// ```
/// use forum_criteria::{Criterion, Predicate};
/// use forum_schema::Usergroup;
///
/// let veterans = Usergroup::new(4, "Veterans")
///     .with_criterion(Criterion::new(0, "comments", Predicate::GreaterThanOrEquals, 1500));
///
/// assert!(veterans.has_criteria());
/// assert!(!veterans.has_redundant_membership());
/// assert_eq!(veterans.compile_criteria().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usergroup {
    /// Identifier of the usergroup
    pub id: i64,

    /// Display name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Whether members of this group are banned
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_banned: bool,

    /// Whether members of this group are moderators
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub is_moderator: bool,

    /// Permissions on forums the group is attached to
    #[serde(default, skip_serializing_if = "ForumPermissions::is_empty")]
    pub forum_permissions: ForumPermissions,

    /// Whether every registered user belongs to the group
    #[serde(
        rename = "includeRegisteredUsers",
        default,
        skip_serializing_if = "format::is_false"
    )]
    pub include_registered: bool,

    /// Whether guests belong to the group
    #[serde(default, skip_serializing_if = "format::is_false")]
    pub include_guests: bool,

    /// Explicit members
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<IdRef>,

    /// Implicit membership criteria
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<Criterion>,
}

impl Usergroup {
    /// Creates a usergroup with no members, criteria or permissions.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            text: String::new(),
            is_banned: false,
            is_moderator: false,
            forum_permissions: ForumPermissions::default(),
            include_registered: false,
            include_guests: false,
            users: Vec::new(),
            criteria: Vec::new(),
        }
    }

    /// Set the forum permissions.
    pub fn with_permissions(mut self, permissions: ForumPermissions) -> Self {
        self.forum_permissions = permissions;
        self
    }

    /// Add an explicit member.
    pub fn with_user(mut self, user_id: i64) -> Self {
        if !self.lists_user(user_id) {
            self.users.push(IdRef::from(user_id));
        }
        self
    }

    /// Add an implicit membership criterion.
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Include every registered user.
    pub fn including_registered(mut self) -> Self {
        self.include_registered = true;
        self
    }

    /// Check if membership is defined by criteria.
    pub fn has_criteria(&self) -> bool {
        !self.criteria.is_empty()
    }

    /// Check if members are listed explicitly.
    pub fn has_explicit_users(&self) -> bool {
        !self.users.is_empty()
    }

    /// Check if the group lists explicit members alongside criteria.
    ///
    /// Well-formed exports use one or the other.
    pub fn has_redundant_membership(&self) -> bool {
        self.has_criteria() && self.has_explicit_users()
    }

    /// Check if a user is listed explicitly.
    pub fn lists_user(&self, user_id: i64) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    /// Compile the group's criteria for evaluation.
    ///
    /// # Errors
    ///
    /// Returns the first criterion that fails to compile.
    pub fn compile_criteria(&self) -> CriteriaResult<CriteriaSet> {
        CriteriaSet::compile(&self.criteria)
    }
}
