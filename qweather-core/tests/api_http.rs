//! HTTP-level tests for the endpoint clients against a mock server.

use std::sync::Arc;

use chrono::{Duration, Utc};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qweather_core::api::geo::GeoApi;
use qweather_core::api::now::NowApi;
use qweather_core::api::{self, CityLookup, CurrentWeather};
use qweather_core::model::LookupRequest;
use qweather_core::token::{Credential, IssueCredential, TokenCache};
use qweather_core::Error;

struct StaticIssuer;

impl IssueCredential for StaticIssuer {
    fn issue(&self, validity: Duration) -> Result<Credential, Error> {
        let now = Utc::now();
        Ok(Credential {
            token: "test-token".to_string(),
            issued_at: now,
            expires_at: now + validity,
        })
    }
}

fn tokens() -> Arc<TokenCache> {
    Arc::new(TokenCache::new(Box::new(StaticIssuer), Duration::minutes(15)))
}

fn geo(server: &MockServer) -> GeoApi {
    GeoApi::new(api::http_client().expect("client"), server.uri(), tokens())
}

fn now(server: &MockServer) -> NowApi {
    NowApi::new(api::http_client().expect("client"), server.uri(), tokens())
}

#[tokio::test]
async fn lookup_sends_auth_and_parses_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .and(query_param("location", "Beijing"))
        .and(query_param("number", "1"))
        .and(query_param("lang", "zh"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "location": [{
                "name": "Beijing",
                "id": "101010100",
                "lat": "39.90498",
                "lon": "116.40528",
                "adm1": "Beijing",
                "country": "China",
                "rank": "10"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = LookupRequest::new("Beijing", "zh").number(1);
    let candidates = geo(&server).lookup(&request).await.expect("lookup");

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "101010100");
    assert_eq!(candidates[0].adm1, "Beijing");
    assert_eq!(candidates[0].country, "China");
}

#[tokio::test]
async fn lookup_passes_optional_filters_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .and(query_param("adm", "Shaanxi"))
        .and(query_param("range", "cn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "location": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = LookupRequest::new("Xi'an", "zh").adm("Shaanxi").range("cn");
    let candidates = geo(&server).lookup(&request).await.expect("lookup");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn lookup_success_without_location_field_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "200"})),
        )
        .mount(&server)
        .await;

    let request = LookupRequest::new("Nowhere", "zh");
    let candidates = geo(&server).lookup(&request).await.expect("lookup");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn lookup_non_success_code_carries_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "400",
            "message": "parameter error"
        })))
        .mount(&server)
        .await;

    let request = LookupRequest::new("Beijing", "zh");
    let err = geo(&server).lookup(&request).await.unwrap_err();
    assert!(
        matches!(err, Error::Service { code, message } if code == "400" && message == "parameter error")
    );
}

#[tokio::test]
async fn http_level_failure_is_a_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let request = LookupRequest::new("Beijing", "zh");
    let err = geo(&server).lookup(&request).await.unwrap_err();
    assert!(matches!(err, Error::Service { code, .. } if code == "500"));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let request = LookupRequest::new("Beijing", "zh");
    let err = geo(&server).lookup(&request).await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Nothing listens on port 1.
    let geo = GeoApi::new(
        api::http_client().expect("client"),
        "http://127.0.0.1:1",
        tokens(),
    );

    let request = LookupRequest::new("Beijing", "zh");
    let err = geo.lookup(&request).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn observation_parses_current_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/weather/now"))
        .and(query_param("location", "101010100"))
        .and(query_param("lang", "zh"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "updateTime": "2024-05-01T10:05+08:00",
            "now": {
                "obsTime": "2024-05-01T10:00+08:00",
                "temp": "20",
                "feelsLike": "19",
                "text": "Sunny",
                "windDir": "NE",
                "windScale": "3",
                "humidity": "40",
                "pressure": "1012"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let observation = now(&server).current("101010100", "zh").await.expect("fetch");

    assert_eq!(observation.location_id, "101010100");
    assert_eq!(observation.temp, "20");
    assert_eq!(observation.text, "Sunny");
    assert_eq!(observation.pressure, "1012");
    assert_eq!(observation.obs_time.to_rfc3339(), "2024-05-01T10:00:00+08:00");
}

#[tokio::test]
async fn observation_rejects_non_success_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/weather/now"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "404",
            "message": "unknown location"
        })))
        .mount(&server)
        .await;

    let err = now(&server).current("000000000", "zh").await.unwrap_err();
    assert!(
        matches!(err, Error::Service { code, message } if code == "404" && message == "unknown location")
    );
}

#[tokio::test]
async fn observation_missing_now_object_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/weather/now"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "200"})),
        )
        .mount(&server)
        .await;

    let err = now(&server).current("101010100", "zh").await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}
