//! Weather lookups over a best-effort cache.
//!
//! The lookup service resolves a city name or coordinate pair cache-aside:
//! probe the cache, fall back to the weatherstack-style origin API, write
//! the result back with a TTL, and keep serving when the cache is down.

pub mod client;
pub mod error;
pub mod recent;
pub mod service;
pub mod suggest;
pub mod types;

pub use client::WeatherstackClient;
pub use error::LookupError;
pub use recent::recent_unique;
pub use service::{Source, WeatherLookup, WeatherService};
pub use suggest::{CitySuggestion, SuggestClient};
pub use types::{CurrentConditions, LocationQuery, ReportLocation, WeatherReport};
