use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{CurrentWeather, get_json};
use crate::error::Error;
use crate::model::WeatherObservation;
use crate::token::TokenCache;

/// Observation timestamps look like `2024-05-01T10:00+08:00`.
const OBS_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M%z";

/// Client for the current-conditions endpoint (`/v7/weather/now`).
pub struct NowApi {
    http: Client,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl NowApi {
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<TokenCache>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NowEnvelope {
    code: String,
    message: Option<String>,
    now: Option<WireNow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNow {
    obs_time: String,
    temp: String,
    feels_like: String,
    text: String,
    wind_dir: String,
    wind_scale: String,
    humidity: String,
    pressure: String,
}

#[async_trait]
impl CurrentWeather for NowApi {
    async fn current(&self, location_id: &str, lang: &str) -> Result<WeatherObservation, Error> {
        let url = format!("{}/v7/weather/now", self.base_url);
        let query = [("location", location_id), ("lang", lang)];

        let envelope: NowEnvelope =
            get_json(&self.http, &self.tokens, &url, &query).await?;

        if envelope.code != "200" {
            return Err(Error::Service {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "observation rejected".to_string()),
            });
        }

        let now = envelope
            .now
            .ok_or_else(|| Error::Parse("observation body missing 'now' object".to_string()))?;

        let obs_time = DateTime::parse_from_str(&now.obs_time, OBS_TIME_FORMAT)
            .map_err(|err| Error::Parse(format!("bad obsTime '{}': {err}", now.obs_time)))?;

        Ok(WeatherObservation {
            location_id: location_id.to_string(),
            obs_time,
            temp: now.temp,
            feels_like: now.feels_like,
            text: now.text,
            wind_dir: now.wind_dir,
            wind_scale: now.wind_scale,
            humidity: now.humidity,
            pressure: now.pressure,
        })
    }
}
