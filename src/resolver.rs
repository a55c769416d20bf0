//! The per-record pipeline: record -> person query -> search -> output.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::LookupError;
use crate::geocode::{Geocoder, GeocoderConfig, GoogleGeocoder};
use crate::mapping::{FieldMapping, Record};
use crate::person::PersonBuilder;
use crate::pipl::{PersonSearch, PiplClient, PiplConfig, SearchResponse};
use crate::TARGET_WEB_REQUEST;

/// What a successful search came back with.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A single confirmed match.
    Match(Value),
    /// Candidate matches, in the order the API ranked them.
    Candidates(Vec<Value>),
    NoMatch,
}

impl LookupOutcome {
    pub fn from_response(response: SearchResponse) -> Self {
        if let Some(person) = response.person {
            LookupOutcome::Match(person)
        } else if let Some(candidates) = response.possible_persons {
            LookupOutcome::Candidates(candidates)
        } else {
            LookupOutcome::NoMatch
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LookupOutcome::Match(_) => 1,
            LookupOutcome::Candidates(candidates) => candidates.len(),
            LookupOutcome::NoMatch => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened matches; a single match becomes a one-element list.
    pub fn into_matches(self) -> Vec<Value> {
        match self {
            LookupOutcome::Match(person) => vec![person],
            LookupOutcome::Candidates(candidates) => candidates,
            LookupOutcome::NoMatch => Vec::new(),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String, LookupError> {
        let matches = self.clone().into_matches();
        Ok(serde_json::to_string_pretty(&matches)?)
    }
}

pub struct PersonResolver<G = GoogleGeocoder, S = PiplClient> {
    builder: PersonBuilder<G>,
    search: S,
}

impl PersonResolver<GoogleGeocoder, PiplClient> {
    /// Resolver with the default search options against the live services.
    pub fn new(
        api_key: &str,
        mapping: FieldMapping,
        geocoding_api_key: &str,
    ) -> Result<Self, LookupError> {
        Self::from_configs(
            PiplConfig::new(api_key),
            GeocoderConfig::new(geocoding_api_key),
            mapping,
        )
    }

    pub fn from_configs(
        pipl: PiplConfig,
        geocoder: GeocoderConfig,
        mapping: FieldMapping,
    ) -> Result<Self, LookupError> {
        let geocoder = GoogleGeocoder::new(geocoder)?;
        let search = PiplClient::new(pipl)?;
        Ok(Self::with_clients(mapping, geocoder, search))
    }
}

impl<G: Geocoder, S: PersonSearch> PersonResolver<G, S> {
    pub fn with_clients(mapping: FieldMapping, geocoder: G, search: S) -> Self {
        Self {
            builder: PersonBuilder::new(mapping, geocoder),
            search,
        }
    }

    /// Run one record through the pipeline. Request failures are returned,
    /// not swallowed.
    pub async fn lookup(&self, record: &Record) -> Result<LookupOutcome, LookupError> {
        let person = self.builder.build(record).await;
        let response = self.search.search(&person).await?;
        let outcome = LookupOutcome::from_response(response);
        info!(target: TARGET_WEB_REQUEST, "Lookup finished with {} match(es)", outcome.len());
        Ok(outcome)
    }

    /// Pretty-printed JSON list of matches for one record, or `None` when the
    /// lookup failed. Failures are logged so batch callers can skip the record.
    pub async fn get_data(&self, record: &Record) -> Option<String> {
        match self.lookup(record).await {
            Ok(outcome) => match outcome.to_pretty_json() {
                Ok(json) => Some(json),
                Err(err) => {
                    error!(target: TARGET_WEB_REQUEST, "Failed to serialize lookup output: {}", err);
                    None
                }
            },
            Err(err) if err.is_local() => {
                warn!(target: TARGET_WEB_REQUEST, "Skipping record: {}", err);
                None
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, "Lookup failed: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::types::{AddressComponent, GeocodeResult};
    use crate::mapping::FieldCategory;
    use crate::pipl::PersonQuery;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StaticGeocoder(Vec<GeocodeResult>);

    #[async_trait]
    impl Geocoder for StaticGeocoder {
        async fn search(&self, _text: &str) -> Result<Vec<GeocodeResult>> {
            if self.0.is_empty() {
                Err(anyhow!("no geocoder"))
            } else {
                Ok(self.0.clone())
            }
        }
    }

    /// Replays a canned response body and keeps the queries it saw.
    struct FakeSearch {
        body: Option<Value>,
        seen: Mutex<Vec<PersonQuery>>,
    }

    impl FakeSearch {
        fn replying(body: Value) -> Self {
            Self {
                body: Some(body),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PersonSearch for FakeSearch {
        async fn search(&self, query: &PersonQuery) -> Result<SearchResponse, LookupError> {
            self.seen.lock().unwrap().push(query.clone());
            match &self.body {
                Some(body) => serde_json::from_value(body.clone())
                    .map_err(|e| LookupError::Decode(e.to_string())),
                None => Err(LookupError::Api {
                    status: 500,
                    message: "internal error".to_string(),
                }),
            }
        }
    }

    fn mapping() -> FieldMapping {
        FieldMapping::new()
            .with_field(FieldCategory::Name, "first", "first")
            .with_field(FieldCategory::Name, "last", "last")
            .with_field(FieldCategory::Address, "city", &["location", "region"][..])
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    fn john() -> Record {
        record(json!({"first": "John", "last": "Smith", "location": "Greater Seattle Area"}))
    }

    #[tokio::test]
    async fn test_single_match_is_a_list() {
        let search = FakeSearch::replying(json!({
            "@http_status_code": 200,
            "person": {"@id": "p1", "names": [{"display": "John Smith"}]}
        }));
        let resolver = PersonResolver::with_clients(mapping(), StaticGeocoder(Vec::new()), search);

        let output = resolver.get_data(&john()).await.unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"@id": "p1", "names": [{"display": "John Smith"}]}]));
        assert!(output.contains('\n'), "output should be pretty-printed");
    }

    #[tokio::test]
    async fn test_possible_persons_keep_order() {
        let search = FakeSearch::replying(json!({
            "possible_persons": [{"@id": "a"}, {"@id": "b"}, {"@id": "c"}]
        }));
        let resolver = PersonResolver::with_clients(mapping(), StaticGeocoder(Vec::new()), search);

        let outcome = resolver.lookup(&john()).await.unwrap();
        assert_eq!(outcome.len(), 3);
        let ids: Vec<Value> = outcome
            .into_matches()
            .into_iter()
            .map(|m| m["@id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_list() {
        let search = FakeSearch::replying(json!({"@http_status_code": 200, "@persons_count": 0}));
        let resolver = PersonResolver::with_clients(mapping(), StaticGeocoder(Vec::new()), search);

        assert_eq!(resolver.lookup(&john()).await.unwrap(), LookupOutcome::NoMatch);
        assert_eq!(resolver.get_data(&john()).await.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_failed_request() {
        let resolver =
            PersonResolver::with_clients(mapping(), StaticGeocoder(Vec::new()), FakeSearch::failing());

        assert_eq!(resolver.get_data(&john()).await, None);
        let err = resolver.lookup(&john()).await.unwrap_err();
        assert!(matches!(err, LookupError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_query_sent_to_search() {
        let geocoded = GeocodeResult {
            address_components: vec![
                AddressComponent {
                    long_name: "Seattle".to_string(),
                    short_name: "Seattle".to_string(),
                    types: vec!["locality".to_string()],
                },
                AddressComponent {
                    long_name: "Washington".to_string(),
                    short_name: "WA".to_string(),
                    types: vec!["administrative_area_level_1".to_string()],
                },
                AddressComponent {
                    long_name: "United States".to_string(),
                    short_name: "US".to_string(),
                    types: vec!["country".to_string()],
                },
            ],
            formatted_address: None,
        };
        let search = FakeSearch::replying(json!({}));
        let resolver = PersonResolver::with_clients(mapping(), StaticGeocoder(vec![geocoded]), search);

        resolver.lookup(&john()).await.unwrap();

        let seen = resolver.search.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let sent = serde_json::to_value(&seen[0]).unwrap();
        assert_eq!(
            sent,
            json!({
                "names": [{"first": "John", "last": "Smith"}],
                "addresses": [{"country": "US", "state": "WA", "city": "Seattle"}]
            })
        );
    }

    #[tokio::test]
    async fn test_unsearchable_record_is_skipped() {
        // Strict validation fails before any request, so the endpoint is never contacted.
        let config = PiplConfig::new("secret").with_endpoint("http://127.0.0.1:9/search/");
        let search = PiplClient::new(config).unwrap();
        let resolver = PersonResolver::with_clients(mapping(), StaticGeocoder(Vec::new()), search);
        let nameless = record(json!({"location": "Portland", "profile_url": "https://example.com/x"}));

        assert_eq!(resolver.get_data(&nameless).await, None);
        let err = resolver.lookup(&nameless).await.unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert!(err.is_local());
    }

    #[test]
    fn test_outcome_from_response() {
        let both: SearchResponse = serde_json::from_value(json!({
            "person": {"@id": "p"},
            "possible_persons": [{"@id": "q"}]
        }))
        .unwrap();
        assert_eq!(
            LookupOutcome::from_response(both),
            LookupOutcome::Match(json!({"@id": "p"}))
        );
    }
}
