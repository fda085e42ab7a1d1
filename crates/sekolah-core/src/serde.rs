use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer};

/// Parses an optional query-string value with [`FromStr`].
///
/// Works for numbers, booleans, UUIDs and typed ids alike. Empty strings are
/// treated as `None`. Needed for query structs that use `#[serde(flatten)]`,
/// where every value reaches the deserializer as a string.
pub fn deserialize_optional_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Optional search text; blank input counts as no search.
pub fn deserialize_optional_search<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Distinguishes an absent field from an explicit `null` in partial updates.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>`: absent → `None`, `null` → `Some(None)`,
/// value → `Some(Some(v))`.
pub fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_from_str")]
        grade: Option<i16>,
        #[serde(default, deserialize_with = "deserialize_optional_from_str")]
        is_active: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_optional_from_str")]
        major_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_search")]
        search: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_query_values_parse_from_strings() {
        let q: Query = serde_json::from_str(
            r#"{"grade":"11","is_active":"true","major_id":"12345678-1234-1234-1234-123456789abc","search":" tkj "}"#,
        )
        .unwrap();
        assert_eq!(q.grade, Some(11));
        assert_eq!(q.is_active, Some(true));
        assert!(q.major_id.is_some());
        assert_eq!(q.search.as_deref(), Some("tkj"));
    }

    #[test]
    fn test_empty_query_values_are_none() {
        let q: Query =
            serde_json::from_str(r#"{"grade":"","is_active":"","search":"   "}"#).unwrap();
        assert_eq!(q.grade, None);
        assert_eq!(q.is_active, None);
        assert_eq!(q.search, None);
    }

    #[test]
    fn test_invalid_query_value_is_rejected() {
        let result: Result<Query, _> = serde_json::from_str(r#"{"grade":"ten"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_some_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"description":"x"}"#).unwrap();

        assert_eq!(absent.description, None);
        assert_eq!(null.description, Some(None));
        assert_eq!(value.description, Some(Some("x".to_string())));
    }
}
