//! City-name autocomplete backed by the GeoNames search API.
//!
//! Suggestions are a convenience feature, so every failure mode here
//! degrades to an empty list rather than an error.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

/// Public GeoNames endpoint.
pub const GEONAMES_API_BASE: &str = "http://api.geonames.org";

/// Queries shorter than this never reach the network.
const MIN_QUERY_LEN: usize = 2;

const MAX_ROWS: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    geonames: Vec<GeoNamesEntry>,
}

#[derive(Debug, Deserialize)]
struct GeoNamesEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "countryName", default)]
    country_name: String,
    lat: Option<String>,
    lng: Option<String>,
}

/// A populated place matching a partial query.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    /// Ready-to-print form, "Name, Country".
    pub display: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Client for the GeoNames place search.
pub struct SuggestClient {
    client: Client,
    username: String,
    base_url: String,
}

impl SuggestClient {
    pub fn new(base_url: &str, username: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            username: username.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            username: "demo".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Suggest populated places matching a partial city name.
    #[instrument(skip(self), level = "info")]
    pub async fn suggest(&self, query: &str) -> Vec<CitySuggestion> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let url = format!("{}/searchJSON", self.base_url);
        let max_rows = MAX_ROWS.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("maxRows", max_rows.as_str()),
                ("featureClass", "P"),
                ("type", "json"),
                ("username", self.username.as_str()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("City suggestion request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::debug!("City suggestion lookup returned {}", response.status());
            return Vec::new();
        }

        let body: SearchResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("City suggestion response unreadable: {}", e);
                return Vec::new();
            }
        };

        body.geonames
            .into_iter()
            .filter(|entry| !entry.name.is_empty())
            .map(|entry| {
                let display = if entry.country_name.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}, {}", entry.name, entry.country_name)
                };
                CitySuggestion {
                    name: entry.name,
                    country: entry.country_name,
                    display,
                    lat: entry.lat.and_then(|s| s.trim().parse().ok()),
                    lng: entry.lng.and_then(|s| s.trim().parse().ok()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "totalResultsCount": 2,
            "geonames": [
                {
                    "name": "London",
                    "countryName": "United Kingdom",
                    "lat": "51.50853",
                    "lng": "-0.12574"
                },
                {
                    "name": "Londonderry",
                    "countryName": "United Kingdom",
                    "lat": "54.99721",
                    "lng": "-7.30917"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_short_query_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = SuggestClient::new_with_base_url(&mock_server.uri());
        assert!(client.suggest("l").await.is_empty());
        assert!(client.suggest("   ").await.is_empty());
    }

    #[tokio::test]
    async fn test_maps_matches_to_suggestions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/searchJSON"))
            .and(query_param("q", "lond"))
            .and(query_param("featureClass", "P"))
            .and(query_param("username", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .mount(&mock_server)
            .await;

        let client = SuggestClient::new_with_base_url(&mock_server.uri());
        let suggestions = client.suggest("lond").await;

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].display, "London, United Kingdom");
        assert_eq!(suggestions[0].lat, Some(51.50853));
        assert_eq!(suggestions[1].name, "Londonderry");
    }

    #[tokio::test]
    async fn test_server_error_yields_no_suggestions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/searchJSON"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = SuggestClient::new_with_base_url(&mock_server.uri());
        assert!(client.suggest("london").await.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_body_yields_no_suggestions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/searchJSON"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = SuggestClient::new_with_base_url(&mock_server.uri());
        assert!(client.suggest("london").await.is_empty());
    }
}
