use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Parameters of the `create-user` action
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CreateUserParams {
    /// The uid of the user to look up or create.
    pub username: String,
}

impl CreateUserParams {
    pub fn validate(self) -> Result<Self> {
        if self.username.trim().is_empty() {
            return Err(Error::IllegalParams("username must not be empty".into()));
        }

        Ok(self)
    }
}

/// Flatten a JSON value into the dotted keys understood by `action-set`.
///
/// Objects nest by key, arrays by index. Empty containers are kept as `{}`
/// and `[]` so they remain visible in the results.
pub fn flatten_results(prefix: &str, value: &Value) -> BTreeMap<String, String> {
    let mut results = BTreeMap::new();
    flatten_into(prefix, value, &mut results);
    results
}

fn flatten_into(key: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                flatten_into(&format!("{key}.{k}"), v, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, v) in items.iter().enumerate() {
                flatten_into(&format!("{key}.{index}"), v, out);
            }
        }
        Value::Object(_) => {
            out.insert(key.into(), "{}".into());
        }
        Value::Array(_) => {
            out.insert(key.into(), "[]".into());
        }
        Value::Null => {
            out.insert(key.into(), String::new());
        }
        Value::String(s) => {
            out.insert(key.into(), s.clone());
        }
        other => {
            out.insert(key.into(), other.to_string());
        }
    }
}
