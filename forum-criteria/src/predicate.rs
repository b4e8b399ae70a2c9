//! # Predicates
//!
//! Defines the comparison operators a criterion may apply to a user attribute.
//! Which operators are valid depends on the type of the criterion value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::{Value, ValueKind};

/// Comparison operator applied by a criterion.
///
/// The user's attribute is always the left operand, so
/// `GreaterThanOrEquals` with value `1500` reads "attribute >= 1500".
///
/// - **Equality** (`eq`, `ne`): every value type
/// - **Ordering** (`lt`, `le`, `ge`, `gt`): numbers and dates
/// - **Containment** (`substr`, `nsubstr`): strings, case-sensitive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Attribute equals the value.
    #[serde(rename = "eq")]
    Equals,

    /// Attribute differs from the value.
    #[serde(rename = "ne")]
    NotEquals,

    /// Attribute is strictly less than the value.
    #[serde(rename = "lt")]
    LessThan,

    /// Attribute is less than or equal to the value.
    #[serde(rename = "le")]
    LessThanOrEquals,

    /// Attribute is greater than or equal to the value.
    #[serde(rename = "ge")]
    GreaterThanOrEquals,

    /// Attribute is strictly greater than the value.
    #[serde(rename = "gt")]
    GreaterThan,

    /// Attribute contains the value as a substring.
    #[serde(rename = "substr")]
    Substring,

    /// Attribute does not contain the value as a substring.
    #[serde(rename = "nsubstr")]
    NotSubstring,
}

impl Predicate {
    /// Get the wire representation of the predicate.
    ///
    /// # Example
    ///
    /// ```
    /// use forum_criteria::Predicate;
    ///
    /// assert_eq!(Predicate::GreaterThanOrEquals.as_str(), "ge");
    /// assert_eq!(Predicate::NotSubstring.as_str(), "nsubstr");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Predicate::Equals => "eq",
            Predicate::NotEquals => "ne",
            Predicate::LessThan => "lt",
            Predicate::LessThanOrEquals => "le",
            Predicate::GreaterThanOrEquals => "ge",
            Predicate::GreaterThan => "gt",
            Predicate::Substring => "substr",
            Predicate::NotSubstring => "nsubstr",
        }
    }

    /// Parse a predicate from its wire representation.
    ///
    /// Surrounding whitespace and letter case are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use forum_criteria::Predicate;
    ///
    /// assert_eq!(Predicate::parse("ge"), Some(Predicate::GreaterThanOrEquals));
    /// assert_eq!(Predicate::parse(" SUBSTR "), Some(Predicate::Substring));
    /// assert_eq!(Predicate::parse("like"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "eq" => Some(Predicate::Equals),
            "ne" => Some(Predicate::NotEquals),
            "lt" => Some(Predicate::LessThan),
            "le" => Some(Predicate::LessThanOrEquals),
            "ge" => Some(Predicate::GreaterThanOrEquals),
            "gt" => Some(Predicate::GreaterThan),
            "substr" => Some(Predicate::Substring),
            "nsubstr" => Some(Predicate::NotSubstring),
            _ => None,
        }
    }

    /// Get all predicates.
    pub fn all() -> Vec<Self> {
        vec![
            Predicate::Equals,
            Predicate::NotEquals,
            Predicate::LessThan,
            Predicate::LessThanOrEquals,
            Predicate::GreaterThanOrEquals,
            Predicate::GreaterThan,
            Predicate::Substring,
            Predicate::NotSubstring,
        ]
    }

    /// Check if this is an equality predicate (`eq`, `ne`).
    pub fn is_equality(&self) -> bool {
        matches!(self, Predicate::Equals | Predicate::NotEquals)
    }

    /// Check if this is an ordering predicate (`lt`, `le`, `ge`, `gt`).
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Predicate::LessThan
                | Predicate::LessThanOrEquals
                | Predicate::GreaterThanOrEquals
                | Predicate::GreaterThan
        )
    }

    /// Check if this is a containment predicate (`substr`, `nsubstr`).
    pub fn is_containment(&self) -> bool {
        matches!(self, Predicate::Substring | Predicate::NotSubstring)
    }

    /// Check if this predicate is defined for values of the given kind.
    ///
    /// # Example
    ///
    /// ```
    /// use forum_criteria::{Predicate, ValueKind};
    ///
    /// assert!(Predicate::Equals.accepts(ValueKind::Boolean));
    /// assert!(Predicate::LessThan.accepts(ValueKind::Timestamp));
    /// assert!(!Predicate::LessThan.accepts(ValueKind::Text));
    /// assert!(!Predicate::Substring.accepts(ValueKind::Integer));
    /// ```
    pub fn accepts(&self, kind: ValueKind) -> bool {
        if self.is_ordering() {
            kind.is_orderable()
        } else if self.is_containment() {
            kind == ValueKind::Text
        } else {
            true
        }
    }

    /// Check if this predicate is defined for a value.
    ///
    /// As [`Predicate::accepts`], except that containment also accepts
    /// timestamps read from strings, which keep their text.
    ///
    /// # Example
    ///
    /// ```
    /// use forum_criteria::{Predicate, Value};
    ///
    /// assert!(Predicate::Substring.accepts_value(&Value::from("2020-01-01T00:00:00Z")));
    /// assert!(!Predicate::LessThan.accepts_value(&Value::from("2020-01-01")));
    /// ```
    pub fn accepts_value(&self, value: &Value) -> bool {
        self.accepts(value.kind()) || (self.is_containment() && value.as_str().is_some())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
