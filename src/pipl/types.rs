//! Person query and search response types for the Pipl search API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A person's name. Every component is optional; empty ones are omitted from
/// the serialized query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Name {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.middle.is_none() && self.last.is_none() && self.raw.is_none()
    }

    /// The API only searches on a full name or a raw name.
    pub fn is_searchable(&self) -> bool {
        self.raw.is_some() || (self.first.is_some() && self.last.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
    pub url: String,
    #[serde(rename = "@domain", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// The query object submitted to the search API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<Name>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<Url>,
}

impl PersonQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_name(&mut self, name: Name) {
        self.names.push(name);
    }

    pub fn add_address(&mut self, address: Address) {
        self.addresses.push(address);
    }

    pub fn add_url(&mut self, url: Url) {
        self.urls.push(url);
    }

    /// Strict validation: the query needs a searchable name or a URL.
    pub fn validate(&self) -> Result<(), String> {
        let has_name = self.names.iter().any(Name::is_searchable);
        let has_url = self.urls.iter().any(|u| !u.url.trim().is_empty());
        if has_name || has_url {
            Ok(())
        } else {
            Err("person query needs a full name, a raw name or a URL".to_string())
        }
    }
}

/// Body of a search API response. Matches are kept as raw JSON objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "@http_status_code")]
    pub http_status_code: Option<u16>,
    #[serde(rename = "@persons_count")]
    pub persons_count: Option<u32>,
    #[serde(rename = "@search_id")]
    pub search_id: Option<String>,
    pub person: Option<Value>,
    pub possible_persons: Option<Vec<Value>>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub error: Option<String>,
}
