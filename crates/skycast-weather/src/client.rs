//! Weatherstack-compatible origin API client.

use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::LookupError;
use crate::types::{CurrentConditions, LocationQuery, ReportLocation, WeatherReport};

pub const WEATHERSTACK_API_BASE: &str = "https://api.weatherstack.com";

/// Top-level origin response.
///
/// The origin signals rejections with an `error` object inside a 200
/// response, so the envelope is checked before the payload is trusted.
#[derive(Debug, Deserialize)]
struct OriginResponse {
    error: Option<OriginErrorBody>,
    location: Option<ReportLocation>,
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct OriginErrorBody {
    info: Option<String>,
}

pub struct WeatherstackClient {
    client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl WeatherstackClient {
    /// Build a client for the origin at `base_url`.
    ///
    /// `timeout` bounds the whole request; lookups are single attempts with
    /// no retry.
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            access_key: access_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn new_with_base_url(access_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_key: access_key.to_string(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch current weather for `query` from the origin.
    #[instrument(skip(self), level = "info")]
    pub async fn current(&self, query: &LocationQuery) -> Result<WeatherReport, LookupError> {
        let url = format!("{}/current", self.base_url);
        let origin_query = query.origin_query();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("query", origin_query.as_str()),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Helper to classify origin responses.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<WeatherReport, LookupError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Origin returned {}: {}", status, body);
            return Err(LookupError::Status(status));
        }

        let body: OriginResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_decode() => {
                return Err(LookupError::InvalidResponse(format!(
                    "JSON parse error: {}",
                    e
                )))
            }
            Err(e) => return Err(LookupError::Request(e)),
        };

        if let Some(error) = body.error {
            let info = error
                .info
                .unwrap_or_else(|| "origin rejected the request".to_string());
            return Err(LookupError::Rejected(info));
        }

        match (body.location, body.current) {
            (Some(location), Some(current)) => Ok(WeatherReport { location, current }),
            _ => Err(LookupError::InvalidResponse(
                "response missing location/current payload".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london_body() -> serde_json::Value {
        serde_json::json!({
            "request": {"type": "City", "query": "London, United Kingdom", "language": "en", "unit": "m"},
            "location": {
                "name": "London",
                "country": "United Kingdom",
                "region": "City of London, Greater London",
                "lat": "51.517",
                "lon": "-0.106",
                "timezone_id": "Europe/London",
                "localtime": "2024-03-01 12:14"
            },
            "current": {
                "observation_time": "12:14 PM",
                "temperature": 15,
                "weather_code": 113,
                "weather_icons": ["https://cdn.example.com/sunny.png"],
                "weather_descriptions": ["Sunny"],
                "wind_speed": 13,
                "wind_degree": 230,
                "wind_dir": "SW",
                "pressure": 1012,
                "precip": 0,
                "humidity": 71,
                "cloudcover": 0,
                "feelslike": 14,
                "uv_index": 4,
                "visibility": 10
            }
        })
    }

    #[tokio::test]
    async fn test_current_by_city() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current"))
            .and(query_param("access_key", "test_key"))
            .and(query_param("query", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .mount(&mock_server)
            .await;

        let client = WeatherstackClient::new_with_base_url("test_key", &mock_server.uri());
        let report = client
            .current(&LocationQuery::City("London".to_string()))
            .await
            .unwrap();

        assert_eq!(report.location.name, "London");
        assert_eq!(report.location.country, "United Kingdom");
        assert!((report.location.lat - 51.517).abs() < 1e-9);
        assert!((report.current.temperature - 15.0).abs() < 1e-9);
        assert_eq!(report.current.weather_descriptions, vec!["Sunny"]);
        assert_eq!(report.current.humidity, 71);
    }

    #[tokio::test]
    async fn test_current_by_coordinates_query_format() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current"))
            .and(query_param("query", "51.5074,-0.1278"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .mount(&mock_server)
            .await;

        let client = WeatherstackClient::new_with_base_url("test_key", &mock_server.uri());
        let report = client
            .current(&LocationQuery::Coordinates {
                lat: 51.5074,
                lng: -0.1278,
            })
            .await
            .unwrap();

        assert_eq!(report.location.name, "London");
    }

    #[tokio::test]
    async fn test_error_envelope_is_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": {
                    "code": 101,
                    "type": "invalid_access_key",
                    "info": "invalid API key"
                }
            })))
            .mount(&mock_server)
            .await;

        let client = WeatherstackClient::new_with_base_url("bad_key", &mock_server.uri());
        let result = client
            .current(&LocationQuery::City("London".to_string()))
            .await;

        match result {
            Err(LookupError::Rejected(info)) => assert_eq!(info, "invalid API key"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = WeatherstackClient::new_with_base_url("test_key", &mock_server.uri());
        let result = client
            .current(&LocationQuery::City("London".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(LookupError::Status(status)) if status.as_u16() == 502
        ));
    }

    #[tokio::test]
    async fn test_missing_payload_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request": {"type": "City"}
            })))
            .mount(&mock_server)
            .await;

        let client = WeatherstackClient::new_with_base_url("test_key", &mock_server.uri());
        let result = client
            .current(&LocationQuery::City("London".to_string()))
            .await;

        assert!(matches!(result, Err(LookupError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = WeatherstackClient::new_with_base_url("test_key", &mock_server.uri());
        let result = client
            .current(&LocationQuery::City("London".to_string()))
            .await;

        assert!(matches!(result, Err(LookupError::InvalidResponse(_))));
    }
}
