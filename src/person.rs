//! Builds a person query out of one input record.

use tracing::debug;

use crate::geocode::{Geocoder, LocationResolver};
use crate::mapping::{FieldCategory, FieldMapping, Record};
use crate::name::clean_name;
use crate::pipl::{Address, Name, PersonQuery, Url};
use crate::TARGET_MAPPING;

/// Address fields joined, in this order, into the text that gets geocoded.
const LOCATION_FIELDS: [&str; 3] = ["city", "state", "country"];

pub struct PersonBuilder<G> {
    mapping: FieldMapping,
    locations: LocationResolver<G>,
}

impl<G: Geocoder> PersonBuilder<G> {
    pub fn new(mapping: FieldMapping, geocoder: G) -> Self {
        Self {
            mapping,
            locations: LocationResolver::new(geocoder),
        }
    }

    /// Cleaned name components; `None` when every component is empty.
    pub fn name(&self, record: &Record) -> Option<Name> {
        let component = |field: &str| {
            let content = self.mapping.field_content(record, FieldCategory::Name, field);
            clean_name(content.as_deref()).filter(|n| !n.is_empty())
        };

        let name = Name {
            first: component("first"),
            middle: component("middle"),
            last: component("last"),
            raw: component("raw"),
        };
        (!name.is_empty()).then_some(name)
    }

    /// Location text from the mapped address fields, absent ones skipped.
    pub fn location_text(&self, record: &Record) -> Option<String> {
        let parts: Vec<String> = LOCATION_FIELDS
            .iter()
            .filter_map(|field| {
                self.mapping
                    .field_content(record, FieldCategory::Address, field)
            })
            .filter(|part| !part.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    pub async fn location(&self, record: &Record) -> Option<Address> {
        let text = self.location_text(record);
        self.locations.resolve(text.as_deref()).await
    }

    /// Profile URL plus its domain. The domain comes from the mapping when
    /// configured, otherwise from the URL's host.
    pub fn url(&self, record: &Record) -> Option<Url> {
        let url = self
            .mapping
            .field_content(record, FieldCategory::Url, "url")?
            .trim()
            .to_string();
        if url.is_empty() {
            return None;
        }

        let domain = self
            .mapping
            .static_value(FieldCategory::Url, "domain")
            .map(str::to_string)
            .or_else(|| host_domain(&url));

        Some(Url { url, domain })
    }

    /// Assemble the query. Optional parts are left out rather than sent
    /// empty.
    pub async fn build(&self, record: &Record) -> PersonQuery {
        let mut person = PersonQuery::new();

        match self.name(record) {
            Some(name) => person.add_name(name),
            None => debug!(target: TARGET_MAPPING, "Record has no usable name"),
        }
        if let Some(address) = self.location(record).await {
            person.add_address(address);
        }
        if let Some(url) = self.url(record) {
            person.add_url(url);
        }

        person
    }
}

fn host_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.trim_start_matches("www.").to_string())
}
