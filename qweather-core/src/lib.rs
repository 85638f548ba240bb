//! Core library for the `qweather` CLI.
//!
//! This crate defines:
//! - Configuration & credential handling (Ed25519-signed bearer tokens)
//! - Clients for the city lookup and current-conditions endpoints
//! - TTL result caching and the name-to-weather query flow
//!
//! It is used by `qweather-cli`, but can also be reused by other binaries or services.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod token;

pub use api::{CityLookup, CurrentWeather};
pub use client::QWeather;
pub use config::Config;
pub use error::Error;
pub use model::{CityWeather, LocationCandidate, LookupRequest, WeatherObservation};
pub use token::{Credential, CredentialProvider, IssueCredential, TokenCache};
