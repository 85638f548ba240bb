//! Endpoint clients for the remote geolocation/weather service.
//!
//! Both endpoints share the same pattern: a credential-bearing GET whose JSON
//! body carries a status code, an optional message, and a payload. The
//! wrappers here attach the bearer token, apply the request timeout, and
//! parse strictly, failing loudly on anything unexpected.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::Error;
use crate::model::{LocationCandidate, LookupRequest, WeatherObservation};
use crate::token::TokenCache;

pub mod geo;
pub mod now;

/// Bound applied to every remote call so a stalled connection cannot hang
/// the pipeline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP client shared by the endpoint wrappers.
pub fn http_client() -> Result<Client, Error> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Resolves free-text queries to ranked location candidates.
#[async_trait]
pub trait CityLookup: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> Result<Vec<LocationCandidate>, Error>;
}

/// Fetches current conditions for a canonical location id.
#[async_trait]
pub trait CurrentWeather: Send + Sync {
    async fn current(&self, location_id: &str, lang: &str) -> Result<WeatherObservation, Error>;
}

/// Issues an authenticated GET and parses the JSON body.
///
/// HTTP-level non-success statuses are mapped to [`Error::Service`] here;
/// the in-body status code is the endpoint wrapper's to check.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    tokens: &TokenCache,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, Error> {
    let token = tokens.bearer()?;

    let res = http.get(url).query(query).bearer_auth(token).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(Error::Service {
            code: status.as_str().to_string(),
            message: truncate_body(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|err| Error::Parse(format!("invalid JSON from {url}: {err}")))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // The service answers in the requested language; the cut must land on a
    // char boundary or slicing a multibyte body panics.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
