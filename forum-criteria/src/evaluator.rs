//! # Criteria sets
//!
//! Compiled criteria for one usergroup and the membership evaluation over
//! them. Rules with the same or-group are AND-ed; groups are OR-ed.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::attributes::UserAttributes;
use crate::criterion::{Criterion, Rule};
use crate::error::CriteriaResult;

/// Rules of a usergroup partitioned by or-group.
///
/// # Example
///
/// ```
/// use forum_criteria::{CriteriaSet, Criterion, Predicate, UserAttributes};
///
/// let set = CriteriaSet::compile(&[
///     Criterion::new(0, "comments", Predicate::GreaterThanOrEquals, 1500),
///     Criterion::new(0, "is_member", Predicate::Equals, true),
///     Criterion::new(1, "foo", Predicate::Equals, "bar"),
/// ]).unwrap();
///
/// let veteran = UserAttributes::new()
///     .with("comments", 2000)
///     .with("is_member", true)
///     .with("foo", "baz");
/// assert!(set.matches(&veteran).unwrap());
///
/// let newcomer = UserAttributes::new()
///     .with("comments", 100)
///     .with("is_member", false)
///     .with("foo", "baz");
/// assert!(!set.matches(&newcomer).unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CriteriaSet {
    groups: BTreeMap<i64, Vec<Rule>>,
}

impl CriteriaSet {
    /// Create an empty set, which matches nobody.
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Compile exported criteria.
    ///
    /// # Errors
    ///
    /// Returns the error of the first criterion that fails to compile.
    pub fn compile(criteria: &[Criterion]) -> CriteriaResult<Self> {
        let mut set = Self::new();
        for criterion in criteria {
            set.add(criterion.compile()?);
        }
        tracing::debug!(
            rules = set.len(),
            or_groups = set.groups.len(),
            "Compiled criteria"
        );
        Ok(set)
    }

    /// Add a rule to its or-group.
    pub fn add(&mut self, rule: Rule) {
        self.groups.entry(rule.or_group).or_default().push(rule);
    }

    /// Get the or-group ids, ascending.
    pub fn or_groups(&self) -> Vec<i64> {
        self.groups.keys().copied().collect()
    }

    /// Get the rules of one or-group.
    pub fn group(&self, or_group: i64) -> &[Rule] {
        self.groups.get(&or_group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every rule, grouped by ascending or-group.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.values().flatten()
    }

    /// Get the total number of rules.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Convert back into exportable criteria.
    pub fn to_criteria(&self) -> Vec<Criterion> {
        self.rules().map(Criterion::from).collect()
    }

    /// Find the or-groups whose rules all hold for the user.
    ///
    /// Every rule is evaluated, so a type mismatch is reported whenever the
    /// attribute is present, whatever the outcome of other rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`CriteriaError::TypeMismatch`](crate::CriteriaError::TypeMismatch)
    /// encountered.
    pub fn matching_groups(&self, attributes: &UserAttributes) -> CriteriaResult<Vec<i64>> {
        let mut satisfied = Vec::new();
        for (or_group, rules) in &self.groups {
            let mut all_hold = true;
            for rule in rules {
                all_hold &= rule.evaluate(attributes)?;
            }
            if all_hold {
                satisfied.push(*or_group);
            }
        }
        Ok(satisfied)
    }

    /// Check whether the user is implicitly a member.
    ///
    /// An empty set never matches.
    ///
    /// # Errors
    ///
    /// As [`CriteriaSet::matching_groups`].
    pub fn matches(&self, attributes: &UserAttributes) -> CriteriaResult<bool> {
        let satisfied = self.matching_groups(attributes)?;
        if !satisfied.is_empty() {
            tracing::debug!(or_groups = ?satisfied, "Criteria satisfied");
        }
        Ok(!satisfied.is_empty())
    }
}

impl FromIterator<Rule> for CriteriaSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        let mut set = CriteriaSet::new();
        for rule in iter {
            set.add(rule);
        }
        set
    }
}

/// Check whether exported criteria implicitly include a user.
///
/// Compiles `criteria` and evaluates them against `attributes`. Prefer
/// [`CriteriaSet::compile`] when evaluating many users against the same
/// usergroup.
///
/// # Errors
///
/// Any compile error of the criteria, or a type mismatch during evaluation.
///
/// # Example
///
/// ```
/// use forum_criteria::{matches, UserAttributes};
///
/// assert!(!matches(&UserAttributes::new(), &[]).unwrap());
/// ```
pub fn matches(attributes: &UserAttributes, criteria: &[Criterion]) -> CriteriaResult<bool> {
    CriteriaSet::compile(criteria)?.matches(attributes)
}
