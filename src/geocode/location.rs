//! Free-text location to (country, state, city).

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::client::Geocoder;
use super::types::AddressComponent;
use crate::pipl::Address;
use crate::TARGET_GEOCODE;

const WASHINGTON_DC: &str = "Washington D.C.";
const FALLBACK_COUNTRY: &str = "US";

lazy_static! {
    static ref METRO_WORDS: Regex = Regex::new(r"\b(?:Area|Greater)\b").unwrap();
}

/// Clean up metro-area labels before geocoding.
///
/// "Washington D.C. Metro Area" becomes "Washington D.C.", and the words
/// "Area" and "Greater" are dropped ("Greater Seattle Area" -> "Seattle").
pub fn prepare_location_text(text: &str) -> String {
    if text.contains(WASHINGTON_DC) {
        return WASHINGTON_DC.to_string();
    }

    METRO_WORDS
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ,", ",")
}

/// Pick country, state and city out of a geocoder component list.
/// Returns `None` when any of the three is missing.
pub fn extract_address(components: &[AddressComponent]) -> Option<Address> {
    let find = |types: &[&str]| {
        components
            .iter()
            .find(|c| types.iter().any(|t| c.has_type(t)))
    };

    let country = find(&["country"])?.short_name.clone();
    let state = find(&["administrative_area_level_1"])?.short_name.clone();
    let city = find(&["colloquial_area", "locality"])?.long_name.clone();

    Some(Address {
        country: Some(country),
        state: Some(state),
        city: Some(city),
    })
}

/// Lossy fallback when geocoding gives nothing usable.
fn fallback_address(original: &str) -> Option<Address> {
    let text = original.trim();
    if text.is_empty() || text == "," {
        return None;
    }
    Some(Address {
        country: Some(FALLBACK_COUNTRY.to_string()),
        state: None,
        city: Some(text.to_string()),
    })
}

pub struct LocationResolver<G> {
    geocoder: G,
}

impl<G: Geocoder> LocationResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Best-effort normalization of a location string. Geocoding errors are
    /// logged and end in the US fallback; they never reach the caller.
    pub async fn resolve(&self, location: Option<&str>) -> Option<Address> {
        let original = location?;
        let cleaned = prepare_location_text(original);

        if cleaned.trim_matches(|c: char| c == ',' || c.is_whitespace()).is_empty() {
            debug!(target: TARGET_GEOCODE, "Nothing to geocode in '{}'", original);
            return fallback_address(original);
        }

        match self.geocoder.search(&cleaned).await {
            Ok(results) => match results.first() {
                Some(first) => match extract_address(&first.address_components) {
                    Some(address) => {
                        debug!(target: TARGET_GEOCODE, "Geocoded '{}' to {:?}", cleaned, address);
                        return Some(address);
                    }
                    None => {
                        debug!(target: TARGET_GEOCODE, "Incomplete address components for '{}'", cleaned);
                    }
                },
                None => {
                    debug!(target: TARGET_GEOCODE, "No geocoding results for '{}'", cleaned);
                }
            },
            Err(err) => {
                warn!(target: TARGET_GEOCODE, "Geocoding '{}' failed: {}", cleaned, err);
            }
        }

        fallback_address(original)
    }
}
