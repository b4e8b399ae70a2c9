//! # Membership resolution
//!
//! Compiles the usergroups of an export into roles and resolves which
//! imported users belong to each.
//!
//! ## Membership Sources
//!
//! ```text
//! Explicit    listed in the usergroup's users
//! Implicit    satisfies the usergroup's criteria
//! Registered  the usergroup includes every registered user
//! ```
//!
//! When several sources apply the first one in this list is recorded.
//!
//! ## Failures
//!
//! A usergroup whose criteria fail to compile or evaluate is a role failure.
//! Its partial results are discarded and the remaining usergroups are still
//! resolved, unless [`ImportConfig::abort_on_role_error`] is set.

use chrono::{DateTime, Utc};
use forum_criteria::CriteriaSet;
use forum_schema::{IdRef, User, Usergroup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::ImportConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::snapshot::UserSnapshot;

/// How a user came to be a member of a usergroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipSource {
    /// Listed in the usergroup's users
    Explicit,
    /// Satisfies the usergroup's criteria
    Implicit,
    /// The usergroup includes all registered users
    Registered,
}

impl MembershipSource {
    /// Get source name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipSource::Explicit => "explicit",
            MembershipSource::Implicit => "implicit",
            MembershipSource::Registered => "registered",
        }
    }
}

impl std::fmt::Display for MembershipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A usergroup that could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleFailure {
    /// The failing usergroup
    pub usergroup_id: i64,
    /// Why it failed
    pub error: ResolveError,
}

/// Outcome of resolving a batch of users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipReport {
    /// Report identifier
    pub id: Uuid,
    /// When resolution started
    pub started_at: DateTime<Utc>,
    /// When resolution finished
    pub finished_at: DateTime<Utc>,
    /// Members of each resolved usergroup, by user id
    pub memberships: BTreeMap<i64, BTreeMap<i64, MembershipSource>>,
    /// Usergroups that failed
    pub failures: Vec<RoleFailure>,
}

impl MembershipReport {
    /// Get the member ids of a usergroup, in ascending order.
    pub fn members_of(&self, usergroup_id: i64) -> Vec<i64> {
        self.memberships
            .get(&usergroup_id)
            .map(|members| members.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Get how a user is a member of a usergroup.
    pub fn source(&self, usergroup_id: i64, user_id: i64) -> Option<MembershipSource> {
        self.memberships
            .get(&usergroup_id)
            .and_then(|members| members.get(&user_id))
            .copied()
    }

    /// Check if a user is a member of a usergroup.
    pub fn is_member(&self, usergroup_id: i64, user_id: i64) -> bool {
        self.source(usergroup_id, user_id).is_some()
    }

    /// Get the usergroups a user belongs to.
    pub fn usergroups_of(&self, user_id: i64) -> Vec<i64> {
        self.memberships
            .iter()
            .filter(|(_, members)| members.contains_key(&user_id))
            .map(|(usergroup_id, _)| *usergroup_id)
            .collect()
    }

    /// Check if a usergroup was resolved.
    pub fn is_resolved(&self, usergroup_id: i64) -> bool {
        self.memberships.contains_key(&usergroup_id)
    }

    /// Get the failure of a usergroup, if it failed.
    pub fn failure(&self, usergroup_id: i64) -> Option<&RoleFailure> {
        self.failures.iter().find(|f| f.usergroup_id == usergroup_id)
    }

    /// Check if any usergroup failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Get the total number of memberships.
    pub fn membership_count(&self) -> usize {
        self.memberships.values().map(BTreeMap::len).sum()
    }

    /// Record resolved memberships on the users' usergroup lists.
    ///
    /// Existing entries are kept; new ones are appended in usergroup order.
    pub fn assign(&self, users: &mut [User]) {
        for user in users.iter_mut() {
            for usergroup_id in self.usergroups_of(user.id) {
                if !user.in_usergroup(usergroup_id) {
                    user.usergroups.push(IdRef::from(usergroup_id));
                }
            }
        }
    }
}

/// A usergroup compiled for resolution.
#[derive(Debug, Clone)]
struct Role {
    usergroup_id: i64,
    criteria: CriteriaSet,
    explicit_users: BTreeSet<i64>,
    include_registered: bool,
}

impl Role {
    fn compile(config: &ImportConfig, usergroup: &Usergroup) -> ResolveResult<Self> {
        let usergroup_id = usergroup.id;

        if usergroup.has_redundant_membership() {
            warn!(
                usergroup_id,
                users = usergroup.users.len(),
                criteria = usergroup.criteria.len(),
                "Usergroup lists explicit users alongside criteria"
            );
            if config.strict_membership {
                return Err(ResolveError::RedundantMembership { usergroup_id });
            }
        }

        let criteria = usergroup
            .compile_criteria()
            .map_err(|source| ResolveError::Criteria {
                usergroup_id,
                source,
            })?;

        let explicit_users = if !usergroup.has_criteria() || config.honor_explicit_users {
            usergroup.users.iter().map(|u| u.id).collect()
        } else {
            BTreeSet::new()
        };

        debug!(
            usergroup_id,
            rules = criteria.len(),
            or_groups = criteria.or_groups().len(),
            explicit_users = explicit_users.len(),
            include_registered = usergroup.include_registered,
            "Compiled usergroup role"
        );

        Ok(Self {
            usergroup_id,
            criteria,
            explicit_users,
            include_registered: usergroup.include_registered,
        })
    }

    fn resolve(
        &self,
        config: &ImportConfig,
        users: &[UserSnapshot],
    ) -> ResolveResult<BTreeMap<i64, MembershipSource>> {
        let mut members = BTreeMap::new();

        for user in users {
            // Criteria are evaluated for every user so type errors always surface.
            let implicit = if self.criteria.is_empty() {
                false
            } else {
                self.criteria
                    .matches(&user.attributes)
                    .map_err(|source| ResolveError::Criteria {
                        usergroup_id: self.usergroup_id,
                        source,
                    })?
            };

            let eligible = !(config.skip_banned_users && user.is_banned());
            let source = if self.explicit_users.contains(&user.user_id) {
                MembershipSource::Explicit
            } else if implicit && eligible {
                MembershipSource::Implicit
            } else if self.include_registered && eligible {
                MembershipSource::Registered
            } else {
                continue;
            };

            members.insert(user.user_id, source);
        }

        Ok(members)
    }
}

/// Resolves usergroup memberships for imported users.
///
/// A resolver holds no mutable state once compiled and can be shared across
/// threads to resolve batches concurrently.
///
/// # Example
///
/// ```
/// use forum_criteria::{Criterion, Predicate, UserAttributes};
/// use forum_import::{ImportConfig, MembershipResolver, MembershipSource, UserSnapshot};
/// use forum_schema::Usergroup;
///
/// let veterans = Usergroup::new(4, "Veterans")
///     .with_criterion(Criterion::new(0, "comments", Predicate::GreaterThanOrEquals, 1500));
/// let resolver = MembershipResolver::compile(ImportConfig::default(), &[veterans]).unwrap();
///
/// let users = vec![
///     UserSnapshot::new(1, UserAttributes::new().with("comments", 2000)),
///     UserSnapshot::new(2, UserAttributes::new().with("comments", 10)),
/// ];
/// let report = resolver.resolve(&users).unwrap();
///
/// assert_eq!(report.members_of(4), vec![1]);
/// assert_eq!(report.source(4, 1), Some(MembershipSource::Implicit));
/// ```
#[derive(Debug, Clone)]
pub struct MembershipResolver {
    config: ImportConfig,
    roles: Vec<Role>,
    failures: Vec<RoleFailure>,
}

impl MembershipResolver {
    /// Compile usergroups into roles.
    ///
    /// Usergroups that fail to compile are kept as failures and reported by
    /// every [`MembershipResolver::resolve`]. A usergroup repeated with
    /// identical contents, as when collected from several forums, is
    /// compiled once. Differing usergroups sharing an id all fail with
    /// [`ResolveError::DuplicateUsergroup`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] for an inconsistent configuration, or
    /// [`ResolveError::Aborted`] for the first failing usergroup when
    /// `abort_on_role_error` is set.
    pub fn compile(config: ImportConfig, usergroups: &[Usergroup]) -> ResolveResult<Self> {
        config.validate()?;

        let mut first_by_id: BTreeMap<i64, &Usergroup> = BTreeMap::new();
        let mut unique = Vec::with_capacity(usergroups.len());
        let mut conflicting = BTreeSet::new();

        for usergroup in usergroups {
            match first_by_id.get(&usergroup.id) {
                Some(first) if *first == usergroup => {
                    debug!(usergroup_id = usergroup.id, "Skipping repeated usergroup");
                }
                Some(_) => {
                    conflicting.insert(usergroup.id);
                }
                None => {
                    first_by_id.insert(usergroup.id, usergroup);
                    unique.push(usergroup);
                }
            }
        }

        let mut roles = Vec::with_capacity(unique.len());
        let mut failures = Vec::new();

        for usergroup in unique {
            let compiled = if conflicting.contains(&usergroup.id) {
                Err(ResolveError::DuplicateUsergroup {
                    usergroup_id: usergroup.id,
                })
            } else {
                Role::compile(&config, usergroup)
            };

            match compiled {
                Ok(role) => roles.push(role),
                Err(err) => {
                    error!(usergroup_id = usergroup.id, error = %err, "Usergroup failed to compile");
                    if config.abort_on_role_error {
                        return Err(err.into_abort());
                    }
                    failures.push(RoleFailure {
                        usergroup_id: usergroup.id,
                        error: err,
                    });
                }
            }
        }

        Ok(Self {
            config,
            roles,
            failures,
        })
    }

    /// Get the configuration the resolver was compiled with.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Get the ids of the usergroups that compiled.
    pub fn usergroup_ids(&self) -> Vec<i64> {
        self.roles.iter().map(|r| r.usergroup_id).collect()
    }

    /// Get the usergroups that failed to compile.
    pub fn compile_failures(&self) -> &[RoleFailure] {
        &self.failures
    }

    /// Resolve the memberships of a batch of users.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Aborted`] for the first failing usergroup when
    /// `abort_on_role_error` is set. Otherwise failures are recorded in the
    /// report.
    #[instrument(skip_all, fields(users = users.len(), roles = self.roles.len()))]
    pub fn resolve(&self, users: &[UserSnapshot]) -> ResolveResult<MembershipReport> {
        let id = Uuid::now_v7();
        let started_at = Utc::now();
        let mut memberships = BTreeMap::new();
        let mut failures = self.failures.clone();

        for role in &self.roles {
            match role.resolve(&self.config, users) {
                Ok(members) => {
                    memberships.insert(role.usergroup_id, members);
                }
                Err(err) => {
                    error!(usergroup_id = role.usergroup_id, error = %err, "Usergroup failed to resolve");
                    if self.config.abort_on_role_error {
                        return Err(err.into_abort());
                    }
                    failures.push(RoleFailure {
                        usergroup_id: role.usergroup_id,
                        error: err,
                    });
                }
            }
        }

        let report = MembershipReport {
            id,
            started_at,
            finished_at: Utc::now(),
            memberships,
            failures,
        };

        info!(
            report_id = %report.id,
            roles = report.memberships.len(),
            members = report.membership_count(),
            failures = report.failures.len(),
            "Resolved usergroup memberships"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_criteria::{CriteriaError, Criterion, Predicate, UserAttributes};

    fn snapshot(user_id: i64, comments: i64) -> UserSnapshot {
        UserSnapshot::new(
            user_id,
            UserAttributes::new()
                .with("comments", comments)
                .with("isBanned", false),
        )
    }

    fn veterans() -> Usergroup {
        Usergroup::new(4, "Veterans").with_criterion(Criterion::new(
            0,
            "comments",
            Predicate::GreaterThanOrEquals,
            1500,
        ))
    }

    #[test]
    fn test_explicit_membership() {
        let group = Usergroup::new(1, "Staff").with_user(2).with_user(99);
        let resolver = MembershipResolver::compile(ImportConfig::default(), &[group]).unwrap();

        let report = resolver.resolve(&[snapshot(1, 0), snapshot(2, 0)]).unwrap();

        // 99 is not in the batch
        assert_eq!(report.members_of(1), vec![2]);
        assert_eq!(report.source(1, 2), Some(MembershipSource::Explicit));
    }

    #[test]
    fn test_implicit_membership() {
        let resolver = MembershipResolver::compile(ImportConfig::default(), &[veterans()]).unwrap();

        let report = resolver
            .resolve(&[snapshot(1, 2000), snapshot(2, 1500), snapshot(3, 1499)])
            .unwrap();

        assert_eq!(report.members_of(4), vec![1, 2]);
        assert!(!report.is_member(4, 3));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_registered_membership() {
        let group = Usergroup::new(2, "Members").including_registered();
        let resolver = MembershipResolver::compile(ImportConfig::default(), &[group]).unwrap();

        let report = resolver.resolve(&[snapshot(1, 0), snapshot(2, 0)]).unwrap();
        assert_eq!(report.members_of(2), vec![1, 2]);
        assert_eq!(report.source(2, 1), Some(MembershipSource::Registered));
    }

    #[test]
    fn test_explicit_users_ignored_with_criteria() {
        let group = veterans().with_user(3);
        let resolver = MembershipResolver::compile(ImportConfig::default(), &[group]).unwrap();

        let report = resolver.resolve(&[snapshot(1, 2000), snapshot(3, 10)]).unwrap();
        assert_eq!(report.members_of(4), vec![1]);
    }

    #[test]
    fn test_honor_explicit_users() {
        let config = ImportConfig {
            honor_explicit_users: true,
            ..ImportConfig::default()
        };
        let group = veterans().with_user(1).with_user(3);
        let resolver = MembershipResolver::compile(config, &[group]).unwrap();

        let report = resolver.resolve(&[snapshot(1, 2000), snapshot(3, 10)]).unwrap();
        assert_eq!(report.members_of(4), vec![1, 3]);
        assert_eq!(report.source(4, 1), Some(MembershipSource::Explicit));
    }

    #[test]
    fn test_source_priority() {
        let config = ImportConfig {
            honor_explicit_users: true,
            ..ImportConfig::default()
        };
        let group = veterans().including_registered().with_user(3);
        let resolver = MembershipResolver::compile(config, &[group]).unwrap();

        let report = resolver
            .resolve(&[snapshot(1, 2000), snapshot(2, 0), snapshot(3, 2000)])
            .unwrap();

        assert_eq!(report.source(4, 1), Some(MembershipSource::Implicit));
        assert_eq!(report.source(4, 2), Some(MembershipSource::Registered));
        assert_eq!(report.source(4, 3), Some(MembershipSource::Explicit));
    }

    #[test]
    fn test_strict_membership_rejects_redundant_group() {
        let config = ImportConfig {
            strict_membership: true,
            ..ImportConfig::default()
        };
        let resolver =
            MembershipResolver::compile(config, &[veterans().with_user(1), Usergroup::new(5, "x")])
                .unwrap();

        assert_eq!(resolver.usergroup_ids(), vec![5]);
        let report = resolver.resolve(&[snapshot(1, 2000)]).unwrap();
        assert_eq!(
            report.failure(4).map(|f| &f.error),
            Some(&ResolveError::RedundantMembership { usergroup_id: 4 })
        );
        assert!(!report.is_resolved(4));
    }

    #[test]
    fn test_compile_failure_is_isolated() {
        let broken = Usergroup::new(6, "Broken").with_criterion(Criterion {
            or_group: 0,
            key: "name".to_string(),
            predicate: "like".to_string(),
            value: Some(serde_json::json!("a")),
        });
        let resolver =
            MembershipResolver::compile(ImportConfig::default(), &[broken, veterans()]).unwrap();

        assert_eq!(resolver.compile_failures().len(), 1);
        let report = resolver.resolve(&[snapshot(1, 2000)]).unwrap();
        assert_eq!(report.members_of(4), vec![1]);
        assert_eq!(report.failure(6).map(|f| f.error.error_code()), Some("UNKNOWN_PREDICATE"));
    }

    #[test]
    fn test_type_mismatch_discards_role() {
        let resolver = MembershipResolver::compile(
            ImportConfig::default(),
            &[veterans(), Usergroup::new(2, "Members").including_registered()],
        )
        .unwrap();

        let users = vec![
            snapshot(1, 2000),
            UserSnapshot::new(2, UserAttributes::new().with("comments", "lots")),
        ];
        let report = resolver.resolve(&users).unwrap();

        assert!(!report.is_resolved(4));
        assert!(!report.is_member(4, 1));
        assert_eq!(report.members_of(2), vec![1, 2]);

        let failure = report.failure(4).unwrap();
        assert!(matches!(
            failure.error,
            ResolveError::Criteria {
                source: CriteriaError::TypeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_abort_on_role_error() {
        let config = ImportConfig {
            abort_on_role_error: true,
            ..ImportConfig::default()
        };
        let resolver = MembershipResolver::compile(config, &[veterans()]).unwrap();

        let users = vec![UserSnapshot::new(
            2,
            UserAttributes::new().with("comments", "lots"),
        )];
        let err = resolver.resolve(&users).unwrap_err();
        assert_eq!(err.error_code(), "IMPORT_ABORTED");
        assert_eq!(err.usergroup_id(), Some(4));
    }

    #[test]
    fn test_abort_on_compile_error() {
        let config = ImportConfig {
            abort_on_role_error: true,
            strict_membership: true,
            ..ImportConfig::default()
        };
        let result = MembershipResolver::compile(config, &[veterans().with_user(1)]);
        assert!(matches!(
            result,
            Err(ResolveError::Aborted { usergroup_id: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ImportConfig {
            honor_explicit_users: true,
            strict_membership: true,
            ..ImportConfig::default()
        };
        let result = MembershipResolver::compile(config, &[]);
        assert!(matches!(result, Err(ResolveError::Config(_))));
    }

    #[test]
    fn test_skip_banned_users() {
        let config = ImportConfig {
            skip_banned_users: true,
            ..ImportConfig::default()
        };
        let groups = vec![
            veterans(),
            Usergroup::new(2, "Members").including_registered(),
            Usergroup::new(3, "Staff").with_user(9),
        ];
        let resolver = MembershipResolver::compile(config, &groups).unwrap();

        let banned = UserSnapshot::new(
            9,
            UserAttributes::new()
                .with("comments", 5000)
                .with("isBanned", true),
        );
        let report = resolver.resolve(&[snapshot(1, 2000), banned]).unwrap();

        assert_eq!(report.members_of(4), vec![1]);
        assert_eq!(report.members_of(2), vec![1]);
        assert_eq!(report.members_of(3), vec![9]);
    }

    #[test]
    fn test_empty_criteria_group_without_users() {
        let resolver =
            MembershipResolver::compile(ImportConfig::default(), &[Usergroup::new(7, "Empty")])
                .unwrap();
        let report = resolver.resolve(&[snapshot(1, 2000)]).unwrap();

        assert!(report.is_resolved(7));
        assert!(report.members_of(7).is_empty());
    }

    #[test]
    fn test_assign_usergroups() {
        let resolver = MembershipResolver::compile(
            ImportConfig::default(),
            &[veterans(), Usergroup::new(2, "Members").including_registered()],
        )
        .unwrap();
        let report = resolver.resolve(&[snapshot(1, 2000)]).unwrap();

        let mut users = vec![User::new(1, "a", "a@example.com").with_usergroup(2)];
        report.assign(&mut users);

        let ids: Vec<i64> = users[0].usergroups.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(report.usergroups_of(1), vec![2, 4]);
    }

    #[test]
    fn test_report_serializes() {
        let resolver = MembershipResolver::compile(ImportConfig::default(), &[veterans()]).unwrap();
        let report = resolver.resolve(&[snapshot(1, 2000)]).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["memberships"]["4"]["1"], "implicit");
        assert!(report.started_at <= report.finished_at);
    }

    #[test]
    fn test_repeated_usergroup_compiled_once() {
        let resolver = MembershipResolver::compile(
            ImportConfig::default(),
            &[veterans(), Usergroup::new(2, "Members"), veterans()],
        )
        .unwrap();

        assert_eq!(resolver.usergroup_ids(), vec![4, 2]);
        let report = resolver.resolve(&[snapshot(1, 2000)]).unwrap();
        assert_eq!(report.members_of(4), vec![1]);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_conflicting_usergroup_ids_fail() {
        let other = Usergroup::new(4, "Everyone").including_registered();
        let resolver = MembershipResolver::compile(
            ImportConfig::default(),
            &[veterans(), other.clone(), other, Usergroup::new(2, "Members")],
        )
        .unwrap();

        assert_eq!(resolver.usergroup_ids(), vec![2]);
        let report = resolver.resolve(&[snapshot(1, 0)]).unwrap();
        assert!(!report.is_resolved(4));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failure(4).map(|f| &f.error),
            Some(&ResolveError::DuplicateUsergroup { usergroup_id: 4 })
        );
    }

    #[test]
    fn test_conflicting_usergroup_ids_abort() {
        let config = ImportConfig {
            abort_on_role_error: true,
            ..ImportConfig::default()
        };
        let result = MembershipResolver::compile(
            config,
            &[veterans(), Usergroup::new(4, "Everyone").including_registered()],
        );
        assert!(matches!(
            result,
            Err(ResolveError::Aborted { usergroup_id: 4, .. })
        ));
    }

    #[test]
    fn test_resolver_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MembershipResolver>();
        assert_send_sync::<MembershipReport>();
    }
}
