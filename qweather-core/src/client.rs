//! The query orchestrator: name → candidate → current conditions, with both
//! halves served through the result caches.

use std::sync::Arc;
use std::time::Duration;

use crate::api::geo::GeoApi;
use crate::api::now::NowApi;
use crate::api::{self, CityLookup, CurrentWeather};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::Error;
use crate::model::{
    CityWeather, LocationCandidate, LookupRequest, ObservationKey, WeatherObservation,
};
use crate::token::{CredentialProvider, TokenCache};

/// Resolved lookups change rarely; cache them for an hour.
pub const LOOKUP_TTL: Duration = Duration::from_secs(60 * 60);
/// Observations go stale quickly; cache them for five minutes.
pub const WEATHER_TTL: Duration = Duration::from_secs(5 * 60);

/// Client for the weather service, composing the resolver and the fetcher
/// behind the result caches.
///
/// This is the only place where a lookup result feeds a weather fetch;
/// neither endpoint client knows about the other.
pub struct QWeather {
    geo: Box<dyn CityLookup>,
    weather: Box<dyn CurrentWeather>,
    lang: String,
    lookup_ttl: Duration,
    weather_ttl: Duration,
    lookups: TtlCache<LookupRequest, Vec<LocationCandidate>>,
    observations: TtlCache<ObservationKey, WeatherObservation>,
}

impl QWeather {
    /// Wires the real endpoint clients from config and key material.
    pub fn new(config: &Config, private_key_pem: &[u8]) -> Result<Self, Error> {
        let provider =
            CredentialProvider::new(private_key_pem, &config.project_id, &config.key_id)?;
        let tokens = Arc::new(TokenCache::new(
            Box::new(provider),
            chrono::Duration::minutes(config.token_ttl_minutes),
        ));

        let http = api::http_client()?;
        let base_url = format!("https://{}", config.api_host);
        let geo = GeoApi::new(http.clone(), base_url.clone(), Arc::clone(&tokens));
        let weather = NowApi::new(http, base_url, tokens);

        Ok(Self::with_parts(
            Box::new(geo),
            Box::new(weather),
            config.lang.clone(),
        ))
    }

    /// Assembles a client from explicit parts. Lets tests (or alternative
    /// transports) inject doubles for the two endpoint seams.
    pub fn with_parts(
        geo: Box<dyn CityLookup>,
        weather: Box<dyn CurrentWeather>,
        lang: String,
    ) -> Self {
        Self {
            geo,
            weather,
            lang,
            lookup_ttl: LOOKUP_TTL,
            weather_ttl: WEATHER_TTL,
            lookups: TtlCache::new(),
            observations: TtlCache::new(),
        }
    }

    /// Overrides the cache lifetimes.
    #[must_use]
    pub fn with_ttls(mut self, lookup_ttl: Duration, weather_ttl: Duration) -> Self {
        self.lookup_ttl = lookup_ttl;
        self.weather_ttl = weather_ttl;
        self
    }

    /// The language sent with requests that do not specify one.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// City lookup, served from cache when a fresh result exists.
    pub async fn search(&self, request: LookupRequest) -> Result<Vec<LocationCandidate>, Error> {
        self.lookups
            .get_or_fetch(request.clone(), self.lookup_ttl, || async {
                self.geo.lookup(&request).await
            })
            .await
    }

    /// Current conditions for a location id, served from cache when fresh.
    pub async fn current(
        &self,
        location_id: &str,
        lang: &str,
    ) -> Result<WeatherObservation, Error> {
        let key = ObservationKey {
            location: location_id.to_string(),
            lang: lang.to_string(),
        };
        self.observations
            .get_or_fetch(key, self.weather_ttl, || async {
                self.weather.current(location_id, lang).await
            })
            .await
    }

    /// Resolves `name` to its best candidate and fetches that candidate's
    /// current conditions.
    ///
    /// Zero candidates is [`Error::NotFound`]; any other failure from either
    /// half propagates as-is.
    pub async fn weather_for_name(
        &self,
        name: &str,
        adm: Option<&str>,
    ) -> Result<CityWeather, Error> {
        let mut request = LookupRequest::new(name, self.lang.clone()).number(1);
        if let Some(adm) = adm {
            request = request.adm(adm);
        }

        let candidates = self.search(request).await?;
        let location = candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let now = self.current(&location.id, &self.lang).await?;
        Ok(CityWeather { location, now })
    }
}
