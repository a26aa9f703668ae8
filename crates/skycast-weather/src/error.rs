//! Lookup-specific error types.

use thiserror::Error;

/// Failure outcomes of one weather lookup.
///
/// Cache faults never appear here: the lookup path absorbs them and falls
/// through to the origin instead.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Coordinates out of range: {lat},{lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Origin request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Origin returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("{0}")]
    Rejected(String),

    #[error("Unusable origin response: {0}")]
    InvalidResponse(String),
}

impl LookupError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCity => "Please enter a city name.".to_string(),
            Self::InvalidCoordinates { .. } => {
                "Latitude must be between -90 and 90, longitude between -180 and 180.".to_string()
            }
            Self::Request(e) if e.is_timeout() => {
                "The weather service took too long to answer. Please try again.".to_string()
            }
            Self::Request(_) => "Could not reach the weather service. Check your connection.".to_string(),
            Self::Status(status) => {
                format!("The weather service returned an error ({}). Please try again.", status)
            }
            // Origin rejections carry human-readable text already
            Self::Rejected(info) => info.clone(),
            Self::InvalidResponse(_) => {
                "The weather service sent an unreadable answer. Please try again.".to_string()
            }
        }
    }

    /// True when the input was rejected before any network I/O.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyCity | Self::InvalidCoordinates { .. })
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status(_))
    }
}
