//! User attribute snapshots
//!
//! The importer assembles one [`UserAttributes`] per user from the exported
//! user record and any metrics it derives (comment counts and the like).

use serde::Serialize;
use std::collections::HashMap;

use crate::error::{CriteriaError, CriteriaResult};
use crate::value::Value;

/// Mapping from attribute key to typed value for a single user.
///
/// # Example
///
/// ```
/// use forum_criteria::{UserAttributes, Value};
///
/// let attrs = UserAttributes::new()
///     .with("comments", 2000)
///     .with("is_member", true);
///
/// assert_eq!(attrs.get("comments"), Some(&Value::Integer(2000)));
/// assert!(attrs.get("foo").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserAttributes {
    values: HashMap<String, Value>,
}

impl UserAttributes {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Add an attribute, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an attribute.
    ///
    /// # Returns
    ///
    /// The previous value, if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove an attribute.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Look up an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Check if an attribute is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get the number of attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the attributes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another snapshot into this one; its values win on conflict.
    pub fn merge(&mut self, other: UserAttributes) {
        self.values.extend(other.values);
    }

    /// Build a snapshot from a JSON object.
    ///
    /// Members that are `null` are treated as absent.
    ///
    /// # Errors
    ///
    /// - [`CriteriaError::UnsupportedValue`] if `json` is not an object, or a
    ///   member is an array or object
    ///
    /// # Example
    ///
    /// ```
    /// use forum_criteria::UserAttributes;
    /// use serde_json::json;
    ///
    /// let attrs = UserAttributes::from_json(&json!({
    ///     "comments": 100,
    ///     "foo": "bar",
    ///     "lastActive": null,
    /// })).unwrap();
    ///
    /// assert_eq!(attrs.len(), 2);
    /// assert!(!attrs.contains_key("lastActive"));
    /// ```
    pub fn from_json(json: &serde_json::Value) -> CriteriaResult<Self> {
        let object = json.as_object().ok_or_else(|| CriteriaError::UnsupportedValue {
            key: String::new(),
            message: "user attributes must be a JSON object".to_string(),
        })?;

        let mut attrs = Self::new();
        for (key, raw) in object {
            if raw.is_null() {
                continue;
            }
            let value = Value::from_json(raw).map_err(|message| CriteriaError::UnsupportedValue {
                key: key.clone(),
                message,
            })?;
            attrs.values.insert(key.clone(), value);
        }
        Ok(attrs)
    }
}

impl<K, V> FromIterator<(K, V)> for UserAttributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = UserAttributes::new();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}
