//! # Key casing between the REST backend and the frontend
//!
//! The backend speaks snake_case (`first_name`, `updated_at`); everything handed
//! to the frontend is camelCase (`firstName`, `updatedAt`). The conversions are
//! purely lexical: values are never inspected or coerced.
//!
//! - [`snake_to_camel`] / [`camel_to_snake`] rename a single key.
//! - [`camel_keys`] / [`snake_keys`] rename every object key of a JSON value,
//!   descending into nested objects and arrays.

use serde_json::{Map, Value};

/// `updated_at` -> `updatedAt`.
///
/// The first segment is lowercased; every later segment gets its first
/// character uppercased and is appended as-is. Empty segments (from `__` or a
/// trailing `_`) contribute nothing.
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, segment) in key.split('_').enumerate() {
        if i == 0 {
            out.push_str(&segment.to_lowercase());
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// `updatedAt` -> `updated_at`.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Deep-rename every object key to camelCase.
pub fn camel_keys(value: &Value) -> Value {
    rename_keys(value, snake_to_camel)
}

/// Deep-rename every object key to snake_case.
pub fn snake_keys(value: &Value) -> Value {
    rename_keys(value, camel_to_snake)
}

fn rename_keys(value: &Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (rename(k), rename_keys(v, rename)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| rename_keys(v, rename)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("updated_at"), "updatedAt");
        assert_eq!(snake_to_camel("first_name"), "firstName");
        assert_eq!(snake_to_camel("age"), "age");
        assert_eq!(snake_to_camel("pledge_amount_total"), "pledgeAmountTotal");
    }

    #[test]
    fn test_snake_to_camel_odd_segments() {
        assert_eq!(snake_to_camel("Account_list"), "accountList");
        assert_eq!(snake_to_camel("double__under"), "doubleUnder");
        assert_eq!(snake_to_camel("trailing_"), "trailing");
        assert_eq!(snake_to_camel(""), "");
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("updatedAt"), "updated_at");
        assert_eq!(camel_to_snake("pledgeAmountTotal"), "pledge_amount_total");
        assert_eq!(camel_to_snake("name"), "name");
    }

    #[test]
    fn test_snake_camel_roundtrip() {
        for key in ["updated_at", "first_name", "id", "tnt_data_sync_enabled"] {
            assert_eq!(camel_to_snake(&snake_to_camel(key)), key);
        }
    }

    #[test]
    fn test_deep_key_conversion() {
        let value = json!({
            "send_newsletter": "email",
            "people": [{ "first_name": "Jo", "email_addresses": [{ "primary": true }] }],
            "meta_data": null
        });
        let camel = camel_keys(&value);
        assert_eq!(
            camel,
            json!({
                "sendNewsletter": "email",
                "people": [{ "firstName": "Jo", "emailAddresses": [{ "primary": true }] }],
                "metaData": null
            })
        );
        assert_eq!(snake_keys(&camel), value);
    }
}
