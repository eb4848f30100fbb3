// graphrestore/src/restore/decoder.rs
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{RestoreError, Result};

/// Decodes one dump line of the form `{"<key>": [record, ...]}`.
pub fn read_list<T: DeserializeOwned>(key: &str, content: &str) -> Result<Vec<T>> {
    let mut root: Value = serde_json::from_str(content)
        .map_err(|e| RestoreError::decode(key, format!("line is not valid JSON: {}", e)))?;

    let element = root
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| RestoreError::decode(key, "can't find the key in json"))?;

    serde_json::from_value(element).map_err(|e| RestoreError::decode(key, e))
}
