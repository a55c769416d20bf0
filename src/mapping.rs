//! Field-mapping configuration: which source-record keys feed which person
//! query fields.
//!
//! A mapping file is a JSON object keyed by category, for example:
//!
//! ```json
//! {
//!   "name": { "first": "first_name", "last": "last_name" },
//!   "address": { "city": ["city", "state", "country"] },
//!   "url": { "url": "profile_url", "domain": "linkedin.com" }
//! }
//! ```
//!
//! A list value means "join these record fields with `", "`".

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::TARGET_MAPPING;

/// An input record as handed to the resolver. Never mutated.
pub type Record = Map<String, Value>;

const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    Name,
    Address,
    Url,
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCategory::Name => write!(f, "name"),
            FieldCategory::Address => write!(f, "address"),
            FieldCategory::Url => write!(f, "url"),
        }
    }
}

/// Where a field's content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldSource {
    Key(String),
    Keys(Vec<String>),
}

impl From<&str> for FieldSource {
    fn from(key: &str) -> Self {
        FieldSource::Key(key.to_string())
    }
}

impl From<&[&str]> for FieldSource {
    fn from(keys: &[&str]) -> Self {
        FieldSource::Keys(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Result of looking a (category, field) pair up in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingLookup<'a> {
    CategoryAbsent,
    FieldAbsent,
    Mapped(&'a FieldSource),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    categories: BTreeMap<FieldCategory, BTreeMap<String, FieldSource>>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(
        mut self,
        category: FieldCategory,
        field: &str,
        source: impl Into<FieldSource>,
    ) -> Self {
        self.categories
            .entry(category)
            .or_default()
            .insert(field.to_string(), source.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse field mapping")
    }

    /// Load a mapping from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read field mapping {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid field mapping {}", path.display()))
    }

    pub fn lookup(&self, category: FieldCategory, field: &str) -> MappingLookup<'_> {
        match self.categories.get(&category) {
            None => MappingLookup::CategoryAbsent,
            Some(fields) => match fields.get(field) {
                None => MappingLookup::FieldAbsent,
                Some(source) => MappingLookup::Mapped(source),
            },
        }
    }

    /// The mapped value itself, for fields that hold a constant (the URL
    /// domain) rather than a record key.
    pub fn static_value(&self, category: FieldCategory, field: &str) -> Option<&str> {
        match self.lookup(category, field) {
            MappingLookup::Mapped(FieldSource::Key(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Resolve the content of a (category, field) pair from a record.
    ///
    /// Single keys index the record directly. Key lists join the present,
    /// non-blank values; a list where nothing is present yields `None`.
    pub fn field_content(
        &self,
        record: &Record,
        category: FieldCategory,
        field: &str,
    ) -> Option<String> {
        match self.lookup(category, field) {
            MappingLookup::CategoryAbsent => {
                debug!(target: TARGET_MAPPING, "No '{}' category in mapping", category);
                None
            }
            MappingLookup::FieldAbsent => {
                debug!(target: TARGET_MAPPING, "No '{}.{}' field in mapping", category, field);
                None
            }
            MappingLookup::Mapped(FieldSource::Key(key)) => record_value(record, key),
            MappingLookup::Mapped(FieldSource::Keys(keys)) => {
                let parts: Vec<String> = keys
                    .iter()
                    .filter_map(|key| record_value(record, key))
                    .filter(|value| !value.trim().is_empty())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(LIST_SEPARATOR))
                }
            }
        }
    }
}

/// Text form of a record value. Nulls, arrays and objects count as absent.
fn record_value(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
