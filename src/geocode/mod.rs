pub mod client;
pub mod location;
pub mod types;

pub use client::{Geocoder, GeocoderConfig, GoogleGeocoder};
pub use location::LocationResolver;
