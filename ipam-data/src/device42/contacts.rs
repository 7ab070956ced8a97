//! Resource-owner selection from a customer's contact list.

use serde::Deserialize;

/// Contact types searched by default, highest priority first.
pub const DEFAULT_CONTACT_TYPES: [&str; 4] = ["Team Lead", "Administrative", "SRE", "Technical"];

/// Ordered contact types consulted when choosing a resource owner.
///
/// Earlier entries win. An empty order always falls back to the customer's
/// `contact_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSearchOrder {
    types: Vec<String>,
}

impl Default for ContactSearchOrder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTACT_TYPES)
    }
}

impl ContactSearchOrder {
    /// Build an order from contact types, highest priority first.
    #[must_use]
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `"Team Lead,SRE"`.
    ///
    /// Entries are trimmed and empty entries are dropped.
    ///
    /// ```
    /// use ipam_data::device42::ContactSearchOrder;
    ///
    /// let order = ContactSearchOrder::from_csv("SRE, Technical,");
    /// assert_eq!(order.types(), ["SRE", "Technical"]);
    /// ```
    #[must_use]
    pub fn from_csv(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty()),
        )
    }

    /// Contact types, highest priority first.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Priority of `contact_type`; lower is better.
    fn rank(&self, contact_type: &str) -> Option<usize> {
        self.types.iter().position(|t| t == contact_type)
    }
}

/// A contact attached to a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct Contact {
    #[serde(rename = "type", default)]
    pub(crate) contact_type: String,
    #[serde(default)]
    pub(crate) email: String,
}

/// Email of the highest-priority contact with a non-empty address.
///
/// The first contact found at a given priority is kept. Falls back to
/// `contact_info` when no contact type is in the search order.
pub(crate) fn resolve_resource_owner(
    contacts: &[Contact],
    contact_info: &str,
    order: &ContactSearchOrder,
) -> String {
    contacts
        .iter()
        .filter(|contact| !contact.email.is_empty())
        .filter_map(|contact| order.rank(&contact.contact_type).map(|rank| (rank, contact)))
        .min_by_key(|(rank, _)| *rank)
        .map_or(contact_info, |(_, contact)| contact.email.as_str())
        .to_owned()
}
