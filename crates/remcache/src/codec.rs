// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! JSON encoding of cache values.

use serde::Serialize;

use crate::Value;

/// Encodes a value as compact JSON.
pub(crate) fn encode(value: &Value) -> String {
    value.to_string()
}

/// Decodes a stored value. A missing key decodes to [`Value::Null`].
pub(crate) fn decode(raw: Option<&str>) -> Result<Value, serde_json::Error> {
    raw.map_or(Ok(Value::Null), serde_json::from_str)
}

/// Converts a serializable value into a [`Value`], failing for anything JSON cannot represent.
pub(crate) fn validate<T>(value: &T) -> Result<Value, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::ser::{Error as _, Serializer};
    use serde_json::json;

    use super::*;

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("opaque"))
        }
    }

    #[test]
    fn encode_is_compact() {
        assert_eq!(encode(&json!({"a": [1, 2], "b": null})), r#"{"a":[1,2],"b":null}"#);
        assert_eq!(encode(&json!("text")), r#""text""#);
    }

    #[test]
    fn missing_decodes_to_null() {
        assert_eq!(decode(None).unwrap(), Value::Null);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(Some("{not json")).is_err());
    }

    #[test]
    fn validate_accepts_json_shapes() {
        let mut map = BTreeMap::new();
        let _previous = map.insert("k", vec![1.5, 2.0]);
        assert_eq!(validate(&map).unwrap(), json!({"k": [1.5, 2.0]}));
        assert_eq!(validate(&(true, "x")).unwrap(), json!([true, "x"]));
    }

    #[test]
    fn validate_rejects_unrepresentable_values() {
        let mut map = BTreeMap::new();
        let _previous = map.insert(vec![1_u8], 1);
        assert!(validate(&map).is_err());
        assert!(validate(&Opaque).is_err());
    }
}
