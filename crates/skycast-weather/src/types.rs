use serde::{Deserialize, Serialize};

/// A single lookup target: a free-text city name or a WGS84 coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lng: f64 },
}

impl LocationQuery {
    /// Deterministic cache key for this query.
    ///
    /// City keys are case-insensitive; the two key forms carry distinct
    /// prefixes and cannot collide.
    pub fn cache_key(&self) -> String {
        match self {
            Self::City(name) => format!("weather:city:{}", name.trim().to_lowercase()),
            Self::Coordinates { lat, lng } => format!("weather:coords:{}:{}", lat, lng),
        }
    }

    /// Value for the origin API's `query` parameter.
    pub fn origin_query(&self) -> String {
        match self {
            Self::City(name) => name.trim().to_string(),
            Self::Coordinates { lat, lng } => format!("{},{}", lat, lng),
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::City(name) => write!(f, "city '{}'", name),
            Self::Coordinates { lat, lng } => write!(f, "coordinates {},{}", lat, lng),
        }
    }
}

/// Normalized weather result, cached verbatim as JSON bytes.
///
/// The lookup path interprets none of this beyond `location.name` (used by
/// callers for history); the rest is carried through for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: ReportLocation,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    // The origin serializes coordinates as strings; cached entries hold
    // numbers. Both forms must parse.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(rename = "lon", default, deserialize_with = "lenient_f64")]
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub observation_time: String,
    pub temperature: f64,
    #[serde(default)]
    pub weather_descriptions: Vec<String>,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_degree: u16,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub feelslike: f64,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}
