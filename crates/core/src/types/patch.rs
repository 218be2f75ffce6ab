//! Helpers for partial-update payloads.
//!
//! A nullable field in a partial update has three states: absent (leave it
//! alone), `null` (clear it), or a value (set it). Modelled as
//! `Option<Option<T>>` together with `#[serde(default, deserialize_with = ...)]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some(inner)`, so that an explicit `null`
/// becomes `Some(None)` while an absent field stays `None` via `#[serde(default)]`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default, deserialize_with = "kubra_market_core::patch::nullable")]
///     image: Option<Option<String>>,
/// }
///
/// let absent: Patch = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.image, None);
///
/// let cleared: Patch = serde_json::from_str(r#"{"image": null}"#).unwrap();
/// assert_eq!(cleared.image, Some(None));
/// ```
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::nullable")]
        category_id: Option<Option<i32>>,
    }

    #[test]
    fn test_three_states() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.category_id, None);

        let cleared: Patch = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let set: Patch = serde_json::from_str(r#"{"category_id": 3}"#).unwrap();
        assert_eq!(set.category_id, Some(Some(3)));
    }
}
