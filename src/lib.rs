pub mod environment;
pub mod error;
pub mod geocode;
pub mod logging;
pub mod mapping;
pub mod name;
pub mod person;
pub mod pipl;
pub mod resolver;

pub use error::LookupError;
pub use mapping::{FieldCategory, FieldMapping, Record};
pub use resolver::{LookupOutcome, PersonResolver};

use std::time::Duration;

/// Timeout applied by every outbound HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_GEOCODE: &str = "geocode";
pub const TARGET_MAPPING: &str = "mapping";
