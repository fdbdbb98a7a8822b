//! Partial-update helpers.
//!
//! PATCH payloads need to tell "field absent" apart from "field set to null".
//! Nullable fields use `Option<Option<T>>` with [`nullable`]: absent is `None`,
//! `null` is `Some(None)` and a value is `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field, keeping an explicit `null` as `Some(None)`.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a partial update to a nullable field.
pub fn apply<T>(target: &mut Option<T>, change: Option<Option<T>>) {
    if let Some(value) = change {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "nullable")]
        breed: Option<Option<String>>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let absent: Payload = serde_json::from_str("{}").unwrap();
        let null: Payload = serde_json::from_str(r#"{"breed": null}"#).unwrap();
        let value: Payload = serde_json::from_str(r#"{"breed": "Beagle"}"#).unwrap();

        assert_eq!(absent.breed, None);
        assert_eq!(null.breed, Some(None));
        assert_eq!(value.breed, Some(Some("Beagle".to_string())));
    }

    #[test]
    fn test_apply() {
        let mut breed = Some("Beagle".to_string());
        apply(&mut breed, None);
        assert_eq!(breed.as_deref(), Some("Beagle"));

        apply(&mut breed, Some(None));
        assert_eq!(breed, None);

        apply(&mut breed, Some(Some("Collie".to_string())));
        assert_eq!(breed.as_deref(), Some("Collie"));
    }
}
