/// Tri-state field for partial updates
///
/// JSON bodies for PATCH requests distinguish three cases per field:
///
/// - the key is missing → [`Patch::Absent`] (leave the stored value alone)
/// - the key is present with `null` → [`Patch::Null`]
/// - the key is present with a value → [`Patch::Value`]
///
/// Merges only read [`Patch::as_value`], so `null` leaves the stored value
/// alone just like a missing key.
///
/// Fields must be annotated with `#[serde(default)]` so that a missing key
/// deserializes to `Absent`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use tasklist_shared::models::patch::Patch;
///
/// #[derive(Deserialize)]
/// struct Body {
///     #[serde(default)]
///     title: Patch<String>,
/// }
///
/// let body: Body = serde_json::from_str("{}").unwrap();
/// assert_eq!(body.title, Patch::Absent);
///
/// let body: Body = serde_json::from_str(r#"{"title": null}"#).unwrap();
/// assert_eq!(body.title, Patch::Null);
/// assert_eq!(body.title.as_value(), None);
/// ```

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field not supplied
    Absent,

    /// Field supplied as an explicit `null`
    Null,

    /// Field supplied with a value
    Value(T),
}

impl<T> Patch<T> {
    /// The supplied value; `None` for both missing keys and `null`
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only called when the key is present; missing keys go through Default
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        count: Patch<u32>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let body: Body = serde_json::from_str(r#"{"count": 3}"#).unwrap();
        assert_eq!(body.name, Patch::Absent);
        assert_eq!(body.count, Patch::Value(3));
    }

    #[test]
    fn test_explicit_null_is_null() {
        let body: Body = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(body.name, Patch::Null);
        assert_eq!(body.name.as_value(), None);
        assert_eq!(body.count, Patch::Absent);
    }

    #[test]
    fn test_value_is_kept() {
        let body: Body = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert_eq!(body.name.as_value().map(String::as_str), Some("  "));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result: Result<Body, _> = serde_json::from_str(r#"{"count": "three"}"#);
        assert!(result.is_err());
    }
}
