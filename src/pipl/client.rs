//! HTTP client for the Pipl search API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{PersonQuery, SearchResponse};
use crate::error::LookupError;
use crate::{REQUEST_TIMEOUT, TARGET_WEB_REQUEST};

pub const DEFAULT_ENDPOINT: &str = "https://api.pipl.com/search/";

/// Search options sent with every request. Built once and handed to the
/// client; nothing here changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PiplConfig {
    pub api_key: String,
    pub endpoint: String,
    pub minimum_probability: f64,
    pub minimum_match: f64,
    pub strict_validation: bool,
    pub show_sources: String,
    pub hide_sponsored: bool,
    pub pretty: bool,
}

impl PiplConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            minimum_probability: 0.7,
            minimum_match: 0.5,
            strict_validation: true,
            show_sources: "all".to_string(),
            hide_sponsored: true,
            pretty: true,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Form parameters for a search, including the serialized person.
    fn form_params(&self, person: String) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.clone()),
            ("person", person),
            ("minimum_probability", self.minimum_probability.to_string()),
            ("minimum_match", self.minimum_match.to_string()),
            ("show_sources", self.show_sources.clone()),
            ("hide_sponsored", self.hide_sponsored.to_string()),
            ("pretty", self.pretty.to_string()),
        ]
    }
}

/// Anything that can run a person search.
#[async_trait]
pub trait PersonSearch: Send + Sync {
    async fn search(&self, query: &PersonQuery) -> Result<SearchResponse, LookupError>;
}

pub struct PiplClient {
    config: PiplConfig,
    http: reqwest::Client,
}

impl PiplClient {
    pub fn new(config: PiplConfig) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl PersonSearch for PiplClient {
    async fn search(&self, query: &PersonQuery) -> Result<SearchResponse, LookupError> {
        if self.config.strict_validation {
            query.validate().map_err(LookupError::Validation)?;
        }

        let person = serde_json::to_string(query)?;
        debug!(target: TARGET_WEB_REQUEST, "Sending person search to {}: {}", self.config.endpoint, person);

        let response = self
            .http
            .post(&self.config.endpoint)
            .form(&self.config.form_params(person))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(target: TARGET_WEB_REQUEST, "Search response status {}: {}", status, body.chars().take(500).collect::<String>());

        if !status.is_success() {
            return Err(LookupError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        let parsed = check_body_status(parsed, status.as_u16())?;

        for warning in &parsed.warnings {
            warn!(target: TARGET_WEB_REQUEST, "Search API warning: {}", warning);
        }
        info!(
            target: TARGET_WEB_REQUEST,
            "Search {} returned {} person(s)",
            parsed.search_id.as_deref().unwrap_or("-"),
            parsed.persons_count.unwrap_or(0)
        );

        Ok(parsed)
    }
}

/// The API can report failures inside a 200 body through `@http_status_code`
/// and `error`; those must not pass as an empty result.
fn check_body_status(
    parsed: SearchResponse,
    transport_status: u16,
) -> Result<SearchResponse, LookupError> {
    let status = parsed.http_status_code.unwrap_or(transport_status);
    if parsed.error.is_none() && (200..300).contains(&status) {
        return Ok(parsed);
    }
    Err(LookupError::Api {
        status,
        message: parsed
            .error
            .unwrap_or_else(|| format!("search failed with status {}", status)),
    })
}

/// Pull the `error` field out of an error body, or fall back to the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
