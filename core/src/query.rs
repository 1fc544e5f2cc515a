//! Ordered query parameters and the identity merge.
//!
//! # Design
//! Query parameters are a plain ordered list of pairs. Merging the session
//! identity never mutates the base set: `with_identity` returns a new one,
//! so a request's shape is a pure function of its inputs.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Name of the query parameter that carries the session identity.
pub const USER_ID_PARAM: &str = "user_id";

/// An ordered set of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a pair, keeping any existing pair with the same name.
    pub fn push(mut self, name: &str, value: impl ToString) -> Self {
        self.0.push((name.to_string(), value.to_string()));
        self
    }

    /// Flatten a serializable filter into pairs.
    ///
    /// The filter must serialize to a JSON object. Scalars become one pair,
    /// arrays repeat the key per element and `null` fields are skipped.
    pub fn from_filter<F: Serialize + ?Sized>(filter: &F) -> Result<Self, ApiError> {
        let value = serde_json::to_value(filter).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(ApiError::Serialization(format!(
                    "query filter must be an object, got {other}"
                )))
            }
        };

        let mut pairs = Vec::with_capacity(object.len());
        for (name, value) in object {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar(&item) {
                            pairs.push((name.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar(&other) {
                        pairs.push((name, text));
                    }
                }
            }
        }
        Ok(Self(pairs))
    }

    /// Return a new set with `user_id` set to `identity`.
    ///
    /// Any `user_id` already present is replaced. With no identity the
    /// result is an unchanged copy.
    pub fn with_identity(&self, identity: Option<&str>) -> Self {
        let Some(user_id) = identity else {
            return self.clone();
        };
        let mut pairs: Vec<(String, String)> = self
            .0
            .iter()
            .filter(|(name, _)| name != USER_ID_PARAM)
            .cloned()
            .collect();
        pairs.push((USER_ID_PARAM.to_string(), user_id.to_string()));
        Self(pairs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as an `application/x-www-form-urlencoded` string.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Nested objects have no query-string form; send their JSON text.
        other => Some(other.to_string()),
    }
}
