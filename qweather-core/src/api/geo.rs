use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{CityLookup, get_json};
use crate::error::Error;
use crate::model::{LocationCandidate, LookupRequest};
use crate::token::TokenCache;

/// Client for the city lookup endpoint (`/geo/v2/city/lookup`).
pub struct GeoApi {
    http: Client,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl GeoApi {
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<TokenCache>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    code: String,
    message: Option<String>,
    #[serde(default)]
    location: Vec<LocationCandidate>,
}

#[async_trait]
impl CityLookup for GeoApi {
    async fn lookup(&self, request: &LookupRequest) -> Result<Vec<LocationCandidate>, Error> {
        let url = format!("{}/geo/v2/city/lookup", self.base_url);
        let number = request.number.to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("location", request.query.as_str()),
            ("number", number.as_str()),
            ("lang", request.lang.as_str()),
        ];
        if let Some(adm) = request.adm.as_deref() {
            query.push(("adm", adm));
        }
        if let Some(range) = request.range.as_deref() {
            query.push(("range", range));
        }

        let envelope: LookupEnvelope =
            get_json(&self.http, &self.tokens, &url, &query).await?;

        if envelope.code != "200" {
            return Err(Error::Service {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "lookup rejected".to_string()),
            });
        }

        // Candidates arrive rank-ordered; an empty list on success is a
        // valid "no match" outcome, not an error.
        Ok(envelope.location)
    }
}
