//! Generic JSON flattening
//!
//! Decomposes an arbitrary JSON value into dotted field names with typed
//! scalar values:
//! `{"a": {"b": [1, "x"]}}` -> `a.b.0 = 1i`, `a.b.1 = "x"`

use serde_json::Value as JsonValue;

use crate::domain::metrics::{FieldSet, FieldValue};

/// Flatten `value` under `prefix`.
///
/// Objects recurse with `prefix.member`, arrays with `prefix.index`. Nulls are
/// dropped. With `convert_strings_to_numbers`, string leaves are parsed as
/// i64, then u64, then f64 before falling back to text.
pub fn flatten(prefix: &str, value: &JsonValue, convert_strings_to_numbers: bool) -> FieldSet {
    let mut fields = FieldSet::new();
    flatten_into(&mut fields, prefix, value, convert_strings_to_numbers);
    fields
}

fn flatten_into(fields: &mut FieldSet, prefix: &str, value: &JsonValue, convert: bool) {
    match value {
        JsonValue::Object(map) => {
            for (name, member) in map {
                flatten_into(fields, &join_key(prefix, name), member, convert);
            }
        }
        JsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(fields, &join_key(prefix, &index.to_string()), item, convert);
            }
        }
        JsonValue::Null => {}
        scalar => {
            if let Some(field) = scalar_to_field_value(scalar, convert) {
                fields.insert(prefix, field);
            }
        }
    }
}

fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Convert a JSON scalar into a field value. Returns `None` for null and
/// for containers.
pub fn scalar_to_field_value(value: &JsonValue, convert_strings: bool) -> Option<FieldValue> {
    match value {
        JsonValue::Number(n) => Some(number_to_field_value(n)),
        JsonValue::String(s) if convert_strings => Some(parse_string(s)),
        JsonValue::String(s) => Some(FieldValue::Text(s.clone())),
        JsonValue::Bool(b) => Some(FieldValue::Bool(*b)),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn number_to_field_value(n: &serde_json::Number) -> FieldValue {
    if let Some(i) = n.as_i64() {
        return FieldValue::SignedInt64(i);
    }
    match n.as_f64() {
        // An integral float literal (`3.0`) that fits i64 is kept exact
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            FieldValue::SignedInt64(f as i64)
        }
        Some(f) => FieldValue::Float64(f),
        None => FieldValue::Unresolved,
    }
}

fn parse_string(s: &str) -> FieldValue {
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::SignedInt64(i);
    }
    if let Ok(u) = s.parse::<u64>() {
        return FieldValue::UnsignedInt64(u);
    }
    match s.parse::<f64>() {
        // "nan"/"inf" parse as f64 but cannot be written as line protocol floats
        Ok(f) if f.is_finite() => FieldValue::Float64(f),
        _ => FieldValue::Text(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_integer() {
        let fields = flatten("root", &json!({"a": 1}), false);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("root.a"), Some(&FieldValue::SignedInt64(1)));
    }

    #[test]
    fn test_string_converted_to_integer() {
        let fields = flatten("root", &json!({"a": "2"}), true);
        assert_eq!(fields.get("root.a"), Some(&FieldValue::SignedInt64(2)));
    }

    #[test]
    fn test_string_kept_as_text_without_conversion() {
        let fields = flatten("root", &json!({"a": "2"}), false);
        assert_eq!(fields.get("root.a"), Some(&FieldValue::Text("2".into())));
    }

    #[test]
    fn test_string_conversion_order() {
        let fields = flatten(
            "",
            &json!({
                "neg": "-7",
                "big": "18446744073709551615",
                "float": "2.5",
                "word": "eth0",
                "nan": "NaN"
            }),
            true,
        );
        assert_eq!(fields.get("neg"), Some(&FieldValue::SignedInt64(-7)));
        assert_eq!(
            fields.get("big"),
            Some(&FieldValue::UnsignedInt64(u64::MAX))
        );
        assert_eq!(fields.get("float"), Some(&FieldValue::Float64(2.5)));
        assert_eq!(fields.get("word"), Some(&FieldValue::Text("eth0".into())));
        assert_eq!(fields.get("nan"), Some(&FieldValue::Text("NaN".into())));
    }

    #[test]
    fn test_number_types() {
        let fields = flatten(
            "",
            &json!({"i": -3, "f": 1.25, "whole": 4.0, "huge": 18446744073709551615u64}),
            false,
        );
        assert_eq!(fields.get("i"), Some(&FieldValue::SignedInt64(-3)));
        assert_eq!(fields.get("f"), Some(&FieldValue::Float64(1.25)));
        assert_eq!(fields.get("whole"), Some(&FieldValue::SignedInt64(4)));
        assert!(matches!(fields.get("huge"), Some(FieldValue::Float64(_))));
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let fields = flatten(
            "IFM",
            &json!({"if": {"stats": [10, {"drops": 2}], "up": true}}),
            false,
        );
        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, vec!["IFM.if.stats.0", "IFM.if.stats.1.drops", "IFM.if.up"]);
        assert_eq!(fields.get("IFM.if.stats.0"), Some(&FieldValue::SignedInt64(10)));
        assert_eq!(fields.get("IFM.if.up"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_member_order_follows_document() {
        let value: JsonValue = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let fields = flatten("", &value, false);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_null_is_omitted() {
        let fields = flatten("p", &json!({"a": null, "b": [null, 1]}), false);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["p.b.1"]);
        assert!(flatten("p", &JsonValue::Null, false).is_empty());
    }

    #[test]
    fn test_scalar_root_keyed_by_prefix() {
        let fields = flatten("value", &json!(42), false);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("value"), Some(&FieldValue::SignedInt64(42)));
    }

    #[test]
    fn test_empty_prefix_top_level_array() {
        let fields = flatten("", &json!(["a", "b"]), false);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["0", "1"]);
    }

    #[test]
    fn test_empty_containers_yield_nothing() {
        assert!(flatten("p", &json!({}), false).is_empty());
        assert!(flatten("p", &json!([]), false).is_empty());
    }

    #[test]
    fn test_large_array_flattens_in_linear_time() {
        let value = JsonValue::Array(vec![json!(1); 100_000]);
        let start = std::time::Instant::now();
        let fields = flatten("p", &value, false);

        assert_eq!(fields.len(), 100_000);
        assert_eq!(fields.get("p.99999"), Some(&FieldValue::SignedInt64(1)));
        assert!(
            start.elapsed() < std::time::Duration::from_secs(5),
            "flatten took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_scalar_to_field_value_containers() {
        assert_eq!(scalar_to_field_value(&json!([1]), false), None);
        assert_eq!(scalar_to_field_value(&json!({}), false), None);
        assert_eq!(scalar_to_field_value(&JsonValue::Null, true), None);
    }
}
