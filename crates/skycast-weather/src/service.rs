//! Cache-aside orchestration for weather lookups.

use std::time::Duration;

use tracing::instrument;

use skycast_cache::CacheAccessor;

use crate::client::WeatherstackClient;
use crate::error::LookupError;
use crate::types::{LocationQuery, WeatherReport};

/// Where a served result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Origin,
}

/// A served weather lookup.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    pub report: WeatherReport,
    pub source: Source,
}

/// The weather lookup service.
///
/// Constructed once at startup with its collaborators and shared across
/// calls; it holds no mutable state. Two concurrent misses for the same
/// location may each reach the origin and write back; the entries are
/// identical and the last write wins, so no locking is done.
pub struct WeatherService {
    cache: CacheAccessor,
    client: WeatherstackClient,
    ttl: Duration,
}

impl WeatherService {
    pub fn new(cache: CacheAccessor, client: WeatherstackClient, ttl: Duration) -> Self {
        Self { cache, client, ttl }
    }

    /// Current weather for a city name.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_city(&self, city: &str) -> Result<WeatherLookup, LookupError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(LookupError::EmptyCity);
        }

        self.lookup(&LocationQuery::City(city.to_string())).await
    }

    /// Current weather for a WGS84 coordinate pair.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_coords(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<WeatherLookup, LookupError> {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(LookupError::InvalidCoordinates { lat, lng });
        }

        self.lookup(&LocationQuery::Coordinates { lat, lng }).await
    }

    /// One cache-aside pass: probe, fall through to the origin, write back.
    async fn lookup(&self, query: &LocationQuery) -> Result<WeatherLookup, LookupError> {
        let key = query.cache_key();

        if let Some(bytes) = self.cache.get(&key).await {
            match serde_json::from_slice::<WeatherReport>(&bytes) {
                Ok(report) => {
                    tracing::debug!("Served {} from cache", query);
                    return Ok(WeatherLookup {
                        report,
                        source: Source::Cache,
                    });
                }
                Err(e) => {
                    // Unreadable entries are evicted, never served
                    tracing::warn!("Evicting corrupt cache entry {}: {}", key, e);
                    self.cache.delete(&key).await;
                }
            }
        }

        let report = self.client.current(query).await?;

        match serde_json::to_vec(&report) {
            Ok(bytes) => self.cache.set(&key, &bytes, self.ttl).await,
            Err(e) => tracing::warn!("Skipping cache write for {}: {}", key, e),
        }

        tracing::debug!("Served {} from origin", query);
        Ok(WeatherLookup {
            report,
            source: Source::Origin,
        })
    }
}
