use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::geocode::GeocoderConfig;
use crate::pipl::PiplConfig;

pub const PIPL_API_KEY: &str = "PIPL_API_KEY";
pub const GEOCODING_API_KEY: &str = "GEOCODING_API_KEY";
pub const FIELD_MAPPING_PATH: &str = "FIELD_MAPPING_PATH";
pub const PIPL_API_URL: &str = "PIPL_API_URL";
pub const GEOCODING_API_URL: &str = "GEOCODING_API_URL";

/// Credentials and endpoints read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pipl_api_key: String,
    pub geocoding_api_key: String,
    pub field_mapping_path: Option<PathBuf>,
    pub pipl_api_url: Option<String>,
    pub geocoding_api_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            pipl_api_key: required_env_var(PIPL_API_KEY)?,
            geocoding_api_key: required_env_var(GEOCODING_API_KEY)?,
            field_mapping_path: optional_env_var(FIELD_MAPPING_PATH).map(PathBuf::from),
            pipl_api_url: optional_env_var(PIPL_API_URL),
            geocoding_api_url: optional_env_var(GEOCODING_API_URL),
        })
    }

    pub fn pipl_config(&self) -> PiplConfig {
        let config = PiplConfig::new(&self.pipl_api_key);
        match &self.pipl_api_url {
            Some(url) => config.with_endpoint(url),
            None => config,
        }
    }

    pub fn geocoder_config(&self) -> GeocoderConfig {
        let config = GeocoderConfig::new(&self.geocoding_api_key);
        match &self.geocoding_api_url {
            Some(url) => config.with_endpoint(url),
            None => config,
        }
    }
}

/// Retrieves an environment variable, failing when it is unset or blank.
pub fn required_env_var(var: &str) -> Result<String> {
    optional_env_var(var).with_context(|| format!("{} environment variable required", var))
}

/// Retrieves an environment variable, treating blank values as unset.
pub fn optional_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_overrides() {
        let settings = Settings {
            pipl_api_key: "pipl-key".to_string(),
            geocoding_api_key: "geo-key".to_string(),
            field_mapping_path: None,
            pipl_api_url: Some("http://localhost:8080/search/".to_string()),
            geocoding_api_url: None,
        };

        let pipl = settings.pipl_config();
        assert_eq!(pipl.api_key, "pipl-key");
        assert_eq!(pipl.endpoint, "http://localhost:8080/search/");

        let geocoder = settings.geocoder_config();
        assert_eq!(geocoder.api_key, "geo-key");
        assert_eq!(geocoder.endpoint, crate::geocode::client::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_missing_variable() {
        let err = required_env_var("PERSON_LOOKUP_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("PERSON_LOOKUP_TEST_UNSET_VARIABLE"));
    }
}
