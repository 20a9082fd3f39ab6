//! Canonical JSON encoding used to key values by structure rather than identity.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{EnumError, ErrorInfo};

fn serde_error(code: &str, err: impl ToString) -> EnumError {
    EnumError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into a canonical JSON string with sorted object keys.
///
/// Two values that are deep-equal produce the same key.
pub fn canonical_key<T: Serialize + ?Sized>(value: &T) -> Result<String, EnumError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("key-serialize", err))?;
    serde_json::to_string(&canonicalize(value)).map_err(|err| serde_error("key-write", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_equal_values_share_a_key() {
        let a = json!({"b": [1, 2], "a": {"y": true, "x": null}});
        let b = json!({"a": {"x": null, "y": true}, "b": [1, 2]});
        assert_eq!(canonical_key(&a).unwrap(), canonical_key(&b).unwrap());
    }

    #[test]
    fn array_order_is_significant() {
        assert_ne!(
            canonical_key(&json!([1, 2])).unwrap(),
            canonical_key(&json!([2, 1])).unwrap()
        );
    }
}
