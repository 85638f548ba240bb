use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A city lookup request.
///
/// Doubles as the cache key: every parameter that affects the result is a
/// field here, so two logically identical requests hash identically and key
/// construction cannot drift between call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupRequest {
    /// Free-text city name; the service supports fuzzy matching.
    pub query: String,
    /// Parent administrative region, to narrow duplicated city names.
    pub adm: Option<String>,
    /// Country scope, e.g. "cn".
    pub range: Option<String>,
    /// Requested result count; the service clamps to 1-20.
    pub number: u8,
    pub lang: String,
}

impl LookupRequest {
    pub fn new(query: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            adm: None,
            range: None,
            number: 10,
            lang: lang.into(),
        }
    }

    #[must_use]
    pub fn adm(mut self, adm: impl Into<String>) -> Self {
        self.adm = Some(adm.into());
        self
    }

    #[must_use]
    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    #[must_use]
    pub fn number(mut self, number: u8) -> Self {
        self.number = number;
        self
    }
}

/// Cache key for a current-conditions fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservationKey {
    pub location: String,
    pub lang: String,
}

/// One resolved candidate for a lookup query.
///
/// Candidates keep the order the service returned them in (rank order).
/// Numeric-looking fields stay strings because that is how the service
/// serializes them and the core never computes with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    /// Stable location id, e.g. "101010100" for Beijing.
    pub id: String,
    pub name: String,
    /// Parent administrative region, e.g. the province.
    pub adm1: String,
    pub country: String,
    pub lat: String,
    pub lon: String,
    pub rank: String,
}

/// Current conditions for one location, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// The location id the observation was fetched for.
    pub location_id: String,
    pub obs_time: DateTime<FixedOffset>,
    /// Air temperature in °C.
    pub temp: String,
    pub feels_like: String,
    /// Textual condition, e.g. "晴" / "Sunny".
    pub text: String,
    pub wind_dir: String,
    pub wind_scale: String,
    /// Relative humidity in percent.
    pub humidity: String,
    /// Pressure in hPa.
    pub pressure: String,
}

/// Resolver and fetcher output merged for one named place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityWeather {
    pub location: LocationCandidate,
    pub now: WeatherObservation,
}
