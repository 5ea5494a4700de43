//! Effective client configuration.
//!
//! A [`Collection`] is an ordered option name → JSON value mapping. The builder
//! produces one with [`prepare_config`] by layering explicit values over
//! defaults and then checking the required keys.

use crate::Error;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    data: Map<String, Value>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`Error::InvalidConfigType`] unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(Error::InvalidConfigType(format!(
                "the config must be provided as an object, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    /// Non-empty string value of `key`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// `true` for a JSON `true` or the string `"true"`
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Subset of the collection restricted to `keys`; absent keys are skipped.
    pub fn get_all<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Collection {
        let data = keys
            .into_iter()
            .filter_map(|k| self.get(k).map(|v| (k.to_owned(), v.clone())))
            .collect();
        Collection { data }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

impl From<Map<String, Value>> for Collection {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses a list of required option names.
pub fn process_requirements(value: Value) -> Result<Vec<String>, Error> {
    let Value::Array(items) = value else {
        return Err(Error::InvalidConfigType(format!(
            "the config requirements must be provided as an array, got {}",
            type_name(&value)
        )));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(Error::InvalidConfigType(format!(
                "config requirement names must be strings, got {}",
                type_name(&other)
            ))),
        })
        .collect()
}

/// Layers `config` over `defaults` and validates `required`.
///
/// Explicit values always win; explicit nulls never shadow a default.
pub fn prepare_config(
    config: Collection,
    defaults: Collection,
    required: &[String],
) -> Result<Collection, Error> {
    let mut merged = defaults;
    for (k, v) in config.data {
        if !v.is_null() {
            merged.data.insert(k, v);
        }
    }

    let missing = required
        .iter()
        .filter(|k| !merged.has_key(k))
        .map(String::as_str)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "config is missing the following keys: {}",
            missing.join(", ")
        )));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coll(v: Value) -> Collection {
        Collection::from_value(v).unwrap()
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let merged = prepare_config(
            coll(json!({"scheme": "http", "region": "us-west-2"})),
            coll(json!({"scheme": "https", "service": "glacier"})),
            &[],
        )
        .unwrap();
        assert_eq!(merged.get_str("scheme"), Some("http"));
        assert_eq!(merged.get_str("service"), Some("glacier"));
        assert_eq!(merged.get_str("region"), Some("us-west-2"));
    }

    #[test]
    fn null_does_not_shadow_default() {
        let merged = prepare_config(
            coll(json!({"scheme": null})),
            coll(json!({"scheme": "https"})),
            &[],
        )
        .unwrap();
        assert_eq!(merged.get_str("scheme"), Some("https"));
    }

    #[test]
    fn reports_every_missing_key() {
        let err = prepare_config(
            coll(json!({"a": 1})),
            Collection::new(),
            &["a".to_owned(), "region".to_owned(), "service".to_owned()],
        )
        .unwrap_err();
        match err {
            Error::InvalidArgument(msg) => {
                assert!(msg.contains("region, service"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_config() {
        assert!(matches!(
            Collection::from_value(json!(["region"])),
            Err(Error::InvalidConfigType(_))
        ));
        assert!(matches!(
            Collection::from_value(json!("region=us-east-1")),
            Err(Error::InvalidConfigType(_))
        ));
        assert!(matches!(
            process_requirements(json!({"region": true})),
            Err(Error::InvalidConfigType(_))
        ));
        assert!(matches!(
            process_requirements(json!([1])),
            Err(Error::InvalidConfigType(_))
        ));
    }

    #[test]
    fn reads_bool_like_values() {
        let c = coll(json!({"a": true, "b": "true", "c": "yes", "d": false}));
        assert!(c.get_bool("a"));
        assert!(c.get_bool("b"));
        assert!(!c.get_bool("c"));
        assert!(!c.get_bool("d"));
        assert!(!c.get_bool("missing"));
    }

    #[test]
    fn selects_subset() {
        let c = coll(json!({"key": "k", "secret": "s", "region": "r"}));
        let subset = c.get_all(["key", "secret", "token"]);
        assert_eq!(subset.len(), 2);
        assert!(!subset.has_key("region"));
    }
}
