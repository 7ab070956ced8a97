//! Key/value custom fields attached to provider records.

use serde::Deserialize;
use serde_json::Value;

/// One custom field. Values are untyped in the provider's schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct CustomField {
    pub(crate) key: String,
    #[serde(default)]
    pub(crate) value: Value,
}

/// Custom fields in provider order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub(crate) struct CustomFields(Option<Vec<CustomField>>);

impl CustomFields {
    /// String value of the first field named `key`.
    ///
    /// Later duplicates are ignored. Missing keys and non-string values
    /// yield an empty string.
    pub(crate) fn value_of(&self, key: &str) -> &str {
        self.0
            .iter()
            .flatten()
            .find(|field| field.key == key)
            .and_then(|field| field.value.as_str())
            .unwrap_or_default()
    }
}
