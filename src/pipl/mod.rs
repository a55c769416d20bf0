pub mod client;
pub mod types;

pub use client::{PersonSearch, PiplClient, PiplConfig};
pub use types::{Address, Name, PersonQuery, SearchResponse, Url};
