//! Customers from `api/1.0/customers`.
//!
//! The resource is not paginated; one request returns every customer.

use async_trait::async_trait;
use ipam_core::{Customer, CustomerFetcher, FetchError};
use log::debug;
use serde::Deserialize;

use super::contacts::{Contact, ContactSearchOrder, resolve_resource_owner};
use super::custom_fields::CustomFields;
use super::page::{DocumentFetcher, decode_error};

const RESOURCE: &str = "customers";
const BUSINESS_UNIT_FIELD: &str = "Description";

#[derive(Debug, Deserialize)]
struct CustomersDocument {
    #[serde(rename = "Customers", default)]
    customers: Vec<CustomerRecord>,
}

#[derive(Debug, Deserialize)]
struct CustomerRecord {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    contact_info: Option<String>,
    #[serde(rename = "Contacts", default)]
    contacts: Option<Vec<Contact>>,
    #[serde(default)]
    custom_fields: CustomFields,
}

impl CustomerRecord {
    fn into_customer(self, order: &ContactSearchOrder) -> Customer {
        let resource_owner = resolve_resource_owner(
            self.contacts.as_deref().unwrap_or_default(),
            self.contact_info.as_deref().unwrap_or_default(),
            order,
        );
        let business_unit = match self.custom_fields.value_of(BUSINESS_UNIT_FIELD) {
            "" => self.name,
            description => description.to_owned(),
        };
        Customer {
            id: self.id,
            resource_owner,
            business_unit,
        }
    }
}

/// Maps Device42 customers into [`Customer`] records.
#[derive(Debug, Clone)]
pub struct Device42CustomerFetcher<D> {
    source: D,
    order: ContactSearchOrder,
}

impl<D> Device42CustomerFetcher<D> {
    /// Read customers from `source`, choosing owners by `order`.
    pub const fn new(source: D, order: ContactSearchOrder) -> Self {
        Self { source, order }
    }

    /// Underlying document source.
    pub const fn source(&self) -> &D {
        &self.source
    }
}

#[async_trait(?Send)]
impl<D: DocumentFetcher> CustomerFetcher for Device42CustomerFetcher<D> {
    async fn fetch_customers(&self) -> Result<Vec<Customer>, FetchError> {
        let body = self.source.fetch_document().await?;
        let document: CustomersDocument =
            serde_json::from_slice(&body).map_err(|err| decode_error(RESOURCE, &err))?;
        debug!("decoded {} customers", document.customers.len());
        Ok(document
            .customers
            .into_iter()
            .map(|record| record.into_customer(&self.order))
            .collect())
    }
}
