//! # Criteria
//!
//! The exported [`Criterion`] record and its validated form, [`Rule`].
//!
//! Criteria belonging to the same usergroup are combined by `or_group`:
//! criteria sharing a value are AND-ed, distinct values are OR-ed.
//!
//! ```text
//! Criterion{orGroup: 0, key: "comments",  predicate: "ge", value: 1500}
//! Criterion{orGroup: 0, key: "is_member", predicate: "eq", value: true}
//! Criterion{orGroup: 1, key: "foo",       predicate: "eq", value: "bar"}
//!
//! (comments >= 1500 AND is_member == true) OR foo == "bar"
//! ```
//!
//! The meaning of `key` is decided by the importing system.

use serde::{Deserialize, Serialize};

use crate::attributes::UserAttributes;
use crate::error::{CriteriaError, CriteriaResult};
use crate::predicate::Predicate;
use crate::value::Value;

/// An implicit-inclusion test as it appears in an export.
///
/// The predicate and value are kept raw so that a malformed criterion fails
/// only its own usergroup when compiled, instead of failing deserialization
/// of the whole document.
///
/// # Example
///
/// ```
/// use forum_criteria::{Criterion, Predicate};
///
/// let criterion: Criterion = serde_json::from_str(
///     r#"{"orGroup": 0, "key": "comments", "predicate": "ge", "value": 1500}"#,
/// ).unwrap();
///
/// let rule = criterion.compile().unwrap();
/// assert_eq!(rule.predicate, Predicate::GreaterThanOrEquals);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    /// Grouping key: equal values are AND-ed, distinct values OR-ed
    pub or_group: i64,

    /// User attribute the criterion tests
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,

    /// Predicate name (`eq`, `ne`, `lt`, `le`, `ge`, `gt`, `substr`, `nsubstr`)
    pub predicate: String,

    /// Value the attribute is compared with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Criterion {
    /// Create a criterion from typed parts.
    ///
    /// # Arguments
    ///
    /// * `or_group` - The or-group the criterion belongs to
    /// * `key` - The user attribute to test
    /// * `predicate` - The comparison to apply
    /// * `value` - The value to compare with
    pub fn new(
        or_group: i64,
        key: impl Into<String>,
        predicate: Predicate,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            or_group,
            key: key.into(),
            predicate: predicate.as_str().to_string(),
            value: Some(value.into().to_json()),
        }
    }

    /// Validate the criterion into a [`Rule`].
    ///
    /// Checks, in order: the predicate is known, the key is non-empty, a
    /// value is present and comparable, and the predicate is defined for the
    /// value's type.
    ///
    /// # Errors
    ///
    /// Returns the first [`CriteriaError`] found.
    ///
    /// # Example
    ///
    /// ```
    /// use forum_criteria::{Criterion, CriteriaError, Predicate};
    ///
    /// let bad = Criterion::new(0, "comments", Predicate::Substring, 10);
    /// assert!(matches!(bad.compile(), Err(CriteriaError::InvalidPredicate { .. })));
    /// ```
    pub fn compile(&self) -> CriteriaResult<Rule> {
        let predicate = Predicate::parse(&self.predicate)
            .ok_or_else(|| CriteriaError::UnknownPredicate(self.predicate.clone()))?;

        if self.key.is_empty() {
            return Err(CriteriaError::MissingKey {
                or_group: self.or_group,
            });
        }

        let raw = self.value.as_ref().ok_or_else(|| CriteriaError::MissingValue {
            key: self.key.clone(),
        })?;

        let value = Value::from_json(raw).map_err(|message| CriteriaError::UnsupportedValue {
            key: self.key.clone(),
            message,
        })?;

        Rule::new(self.or_group, self.key.clone(), predicate, value)
    }
}

impl From<&Rule> for Criterion {
    fn from(rule: &Rule) -> Self {
        Self {
            or_group: rule.or_group,
            key: rule.key.clone(),
            predicate: rule.predicate.as_str().to_string(),
            value: Some(rule.value.to_json()),
        }
    }
}

/// A validated criterion.
///
/// A `Rule` always carries a predicate that is defined for its value's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Grouping key
    pub or_group: i64,
    /// User attribute the rule tests
    pub key: String,
    /// Comparison to apply
    pub predicate: Predicate,
    /// Value the attribute is compared with
    pub value: Value,
}

impl Rule {
    /// Create a rule, checking that the predicate accepts the value.
    ///
    /// # Errors
    ///
    /// - [`CriteriaError::MissingKey`] if `key` is empty
    /// - [`CriteriaError::InvalidPredicate`] if the predicate is not defined for the value
    pub fn new(
        or_group: i64,
        key: impl Into<String>,
        predicate: Predicate,
        value: impl Into<Value>,
    ) -> CriteriaResult<Self> {
        let key = key.into();
        let value = value.into();

        if key.is_empty() {
            return Err(CriteriaError::MissingKey { or_group });
        }

        if !predicate.accepts_value(&value) {
            return Err(CriteriaError::InvalidPredicate {
                key,
                predicate,
                kind: value.kind(),
            });
        }

        Ok(Self {
            or_group,
            key,
            predicate,
            value,
        })
    }

    /// Evaluate the rule against a user's attributes.
    ///
    /// A missing attribute makes the rule false.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::TypeMismatch`] if the attribute's type cannot
    /// be compared with the rule's value under its predicate.
    pub fn evaluate(&self, attributes: &UserAttributes) -> CriteriaResult<bool> {
        let Some(attribute) = attributes.get(&self.key) else {
            tracing::trace!(key = %self.key, "Attribute missing, criterion not satisfied");
            return Ok(false);
        };

        let outcome = match self.predicate {
            Predicate::Equals | Predicate::NotEquals => {
                let equal = attribute
                    .equals(&self.value)
                    .ok_or_else(|| self.mismatch(attribute))?;
                equal == (self.predicate == Predicate::Equals)
            }
            Predicate::LessThan
            | Predicate::LessThanOrEquals
            | Predicate::GreaterThanOrEquals
            | Predicate::GreaterThan => {
                let kind = attribute.kind();
                if !kind.is_orderable() || !kind.is_comparable_with(self.value.kind()) {
                    return Err(self.mismatch(attribute));
                }
                match attribute.ordering(&self.value) {
                    Some(ordering) => match self.predicate {
                        Predicate::LessThan => ordering.is_lt(),
                        Predicate::LessThanOrEquals => ordering.is_le(),
                        Predicate::GreaterThanOrEquals => ordering.is_ge(),
                        _ => ordering.is_gt(),
                    },
                    None => false,
                }
            }
            Predicate::Substring | Predicate::NotSubstring => {
                let (Some(haystack), Some(needle)) = (attribute.as_str(), self.value.as_str())
                else {
                    return Err(self.mismatch(attribute));
                };
                haystack.contains(needle) == (self.predicate == Predicate::Substring)
            }
        };

        tracing::trace!(
            key = %self.key,
            predicate = %self.predicate,
            outcome,
            "Evaluated criterion"
        );
        Ok(outcome)
    }

    fn mismatch(&self, attribute: &Value) -> CriteriaError {
        CriteriaError::TypeMismatch {
            key: self.key.clone(),
            predicate: self.predicate,
            attribute: attribute.kind(),
            expected: self.value.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn attrs() -> UserAttributes {
        UserAttributes::new()
            .with("comments", 2000)
            .with("rating", 4.5)
            .with("name", "administrator")
            .with("is_member", true)
            .with(
                "dateCreated",
                Utc.with_ymd_and_hms(2015, 5, 1, 0, 0, 0).unwrap(),
            )
    }

    #[test]
    fn test_criterion_json_field_names() {
        let criterion = Criterion::new(1, "foo", Predicate::Equals, "bar");
        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(
            json,
            json!({"orGroup": 1, "key": "foo", "predicate": "eq", "value": "bar"})
        );
    }

    #[test]
    fn test_criterion_omitted_fields() {
        let criterion: Criterion = serde_json::from_str(r#"{"orGroup": 0, "predicate": "eq"}"#).unwrap();
        assert!(criterion.key.is_empty());
        assert!(criterion.value.is_none());

        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json, json!({"orGroup": 0, "predicate": "eq"}));
    }

    #[test]
    fn test_compile_errors_in_order() {
        let mut criterion = Criterion {
            or_group: 3,
            key: String::new(),
            predicate: "like".to_string(),
            value: None,
        };
        assert_eq!(
            criterion.compile(),
            Err(CriteriaError::UnknownPredicate("like".to_string()))
        );

        criterion.predicate = "eq".to_string();
        assert_eq!(criterion.compile(), Err(CriteriaError::MissingKey { or_group: 3 }));

        criterion.key = "foo".to_string();
        assert_eq!(
            criterion.compile(),
            Err(CriteriaError::MissingValue {
                key: "foo".to_string()
            })
        );

        criterion.value = Some(json!([1, 2]));
        assert!(matches!(
            criterion.compile(),
            Err(CriteriaError::UnsupportedValue { .. })
        ));

        criterion.predicate = "gt".to_string();
        criterion.value = Some(json!("bar"));
        assert_eq!(
            criterion.compile(),
            Err(CriteriaError::InvalidPredicate {
                key: "foo".to_string(),
                predicate: Predicate::GreaterThan,
                kind: ValueKind::Text,
            })
        );
    }

    #[test]
    fn test_compile_accepts_date_ordering() {
        let criterion = Criterion {
            or_group: 0,
            key: "dateCreated".to_string(),
            predicate: "lt".to_string(),
            value: Some(json!("2016-01-01T00:00:00Z")),
        };
        let rule = criterion.compile().unwrap();
        assert_eq!(rule.value.kind(), ValueKind::Timestamp);
        assert!(rule.evaluate(&attrs()).unwrap());
    }

    #[test]
    fn test_rule_to_criterion() {
        let rule = Rule::new(2, "comments", Predicate::GreaterThan, 10).unwrap();
        let criterion = Criterion::from(&rule);
        assert_eq!(criterion.compile().unwrap(), rule);
    }

    #[test]
    fn test_equality() {
        let eq = Rule::new(0, "is_member", Predicate::Equals, true).unwrap();
        assert!(eq.evaluate(&attrs()).unwrap());

        let ne = Rule::new(0, "name", Predicate::NotEquals, "guest").unwrap();
        assert!(ne.evaluate(&attrs()).unwrap());

        // Integers and floats compare numerically.
        let eq = Rule::new(0, "comments", Predicate::Equals, 2000.0).unwrap();
        assert!(eq.evaluate(&attrs()).unwrap());
    }

    #[test]
    fn test_equality_type_mismatch() {
        let rule = Rule::new(0, "is_member", Predicate::Equals, "yes").unwrap();
        assert_eq!(
            rule.evaluate(&attrs()),
            Err(CriteriaError::TypeMismatch {
                key: "is_member".to_string(),
                predicate: Predicate::Equals,
                attribute: ValueKind::Boolean,
                expected: ValueKind::Text,
            })
        );
    }

    #[test]
    fn test_ordering() {
        let cases = [
            (Predicate::LessThan, 2000, false),
            (Predicate::LessThanOrEquals, 2000, true),
            (Predicate::GreaterThanOrEquals, 2000, true),
            (Predicate::GreaterThan, 2000, false),
            (Predicate::GreaterThanOrEquals, 1500, true),
            (Predicate::LessThan, 1500, false),
        ];
        for (predicate, value, expected) in cases {
            let rule = Rule::new(0, "comments", predicate, value).unwrap();
            assert_eq!(rule.evaluate(&attrs()).unwrap(), expected, "{} {}", predicate, value);
        }
    }

    #[test]
    fn test_ordering_mixed_numeric() {
        let rule = Rule::new(0, "rating", Predicate::GreaterThan, 4).unwrap();
        assert!(rule.evaluate(&attrs()).unwrap());
    }

    #[test]
    fn test_ordering_on_text_attribute_is_error() {
        let rule = Rule::new(0, "name", Predicate::GreaterThanOrEquals, 1500).unwrap();
        let err = rule.evaluate(&attrs()).unwrap_err();
        assert!(err.is_evaluation_error());
    }

    #[test]
    fn test_ordering_date_against_number_is_error() {
        let rule = Rule::new(0, "dateCreated", Predicate::GreaterThan, 0).unwrap();
        assert!(rule.evaluate(&attrs()).is_err());
    }

    #[test]
    fn test_substring() {
        let rule = Rule::new(0, "name", Predicate::Substring, "admin").unwrap();
        assert!(rule.evaluate(&attrs()).unwrap());

        let guest = UserAttributes::new().with("name", "guest");
        assert!(!rule.evaluate(&guest).unwrap());

        // Case-sensitive.
        let upper = UserAttributes::new().with("name", "ADMINISTRATOR");
        assert!(!rule.evaluate(&upper).unwrap());

        let rule = Rule::new(0, "name", Predicate::NotSubstring, "admin").unwrap();
        assert!(rule.evaluate(&guest).unwrap());
    }

    #[test]
    fn test_substring_on_numeric_attribute_is_error() {
        let rule = Rule::new(0, "comments", Predicate::Substring, "20").unwrap();
        assert!(matches!(
            rule.evaluate(&attrs()),
            Err(CriteriaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_substring_with_date_like_value() {
        let criterion = Criterion {
            or_group: 0,
            key: "title".to_string(),
            predicate: "substr".to_string(),
            value: Some(json!("2020-01-01T00:00:00Z")),
        };
        let rule = criterion.compile().unwrap();

        let attrs = UserAttributes::new().with("title", "Report 2020-01-01T00:00:00Z final");
        assert!(rule.evaluate(&attrs).unwrap());
        let attrs = UserAttributes::new().with("title", "Report");
        assert!(!rule.evaluate(&attrs).unwrap());
    }

    #[test]
    fn test_substring_on_date_like_attribute() {
        let rule = Rule::new(0, "name", Predicate::Substring, "2020").unwrap();

        let parsed = UserAttributes::from_json(&json!({"name": "2020-01-01T00:00:00Z"})).unwrap();
        let built = UserAttributes::new().with("name", "2020-01-01T00:00:00Z");
        assert_eq!(rule.evaluate(&parsed), Ok(true));
        assert_eq!(rule.evaluate(&built), Ok(true));

        let rule = Rule::new(0, "name", Predicate::Equals, "2020-01-01T00:00:00Z").unwrap();
        assert_eq!(rule.evaluate(&parsed), Ok(true));

        // Still ordered chronologically.
        let rule = Rule::new(0, "name", Predicate::LessThan, "2021-01-01T00:00:00Z").unwrap();
        assert_eq!(rule.evaluate(&parsed), Ok(true));
    }

    #[test]
    fn test_substring_on_chrono_timestamp_is_error() {
        let joined = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let rule = Rule::new(0, "dateCreated", Predicate::Substring, "2020").unwrap();
        let attrs = UserAttributes::new().with("dateCreated", joined);
        assert!(matches!(
            rule.evaluate(&attrs),
            Err(CriteriaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_complementary_predicates_both_false() {
        let eq = Rule::new(0, "unknown", Predicate::Equals, "x").unwrap();
        let ne = Rule::new(0, "unknown", Predicate::NotEquals, "x").unwrap();
        assert_eq!(eq.evaluate(&attrs()), Ok(false));
        assert_eq!(ne.evaluate(&attrs()), Ok(false));

        let nan = UserAttributes::new().with("score", f64::NAN);
        let lt = Rule::new(0, "score", Predicate::LessThan, 1).unwrap();
        let ge = Rule::new(0, "score", Predicate::GreaterThanOrEquals, 1).unwrap();
        assert_eq!(lt.evaluate(&nan), Ok(false));
        assert_eq!(ge.evaluate(&nan), Ok(false));
    }

    #[test]
    fn test_missing_attribute_is_false() {
        let rule = Rule::new(0, "unknown", Predicate::NotEquals, "x").unwrap();
        assert_eq!(rule.evaluate(&attrs()), Ok(false));

        let rule = Rule::new(0, "unknown", Predicate::NotSubstring, "x").unwrap();
        assert_eq!(rule.evaluate(&attrs()), Ok(false));
    }
}
