use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::Text;

use qweather_core::model::{CityWeather, LocationCandidate, WeatherObservation};
use qweather_core::token::{CredentialProvider, IssueCredential};
use qweather_core::{Config, LookupRequest, QWeather};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "qweather", version, about = "QWeather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API host and signing credentials.
    Configure,

    /// Search for a city by name.
    Search {
        /// City name; fuzzy matching is supported.
        query: String,

        /// Parent administrative region, to narrow duplicated names.
        #[arg(long)]
        adm: Option<String>,

        /// Country scope, e.g. "cn".
        #[arg(long)]
        range: Option<String>,

        /// Number of results (the service clamps to 1-20).
        #[arg(long, default_value_t = 10)]
        number: u8,

        /// Response language override.
        #[arg(long)]
        lang: Option<String>,

        /// Also write the candidates to this file as JSON.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Show current weather for a location id.
    Now {
        /// Location id, e.g. "101010100" for Beijing.
        location_id: String,

        /// Response language override.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Search a city by name and show its current weather.
    Show {
        /// City name.
        name: String,

        /// Parent administrative region, to narrow duplicated names.
        #[arg(long)]
        adm: Option<String>,

        /// Response language override.
        #[arg(long)]
        lang: Option<String>,

        /// Also write the merged result to this file as JSON.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Mint a bearer token and print it.
    Token {
        /// Also write the token string to this file.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),

            Command::Search {
                query,
                adm,
                range,
                number,
                lang,
                save,
            } => {
                let config = Config::load()?;
                let client = client(&config)?;

                let mut request =
                    LookupRequest::new(query, lang.unwrap_or_else(|| config.lang.clone()))
                        .number(number);
                if let Some(adm) = adm {
                    request = request.adm(adm);
                }
                if let Some(range) = range {
                    request = request.range(range);
                }

                let candidates = client.search(request).await?;
                print_candidates(&candidates);
                if let Some(path) = save {
                    save_json(&path, &candidates)?;
                }
                Ok(())
            }

            Command::Now { location_id, lang } => {
                let config = Config::load()?;
                let client = client(&config)?;

                let lang = lang.unwrap_or_else(|| config.lang.clone());
                let observation = client.current(&location_id, &lang).await?;
                println!("Current weather for {location_id}:");
                print_observation(&observation);
                Ok(())
            }

            Command::Show {
                name,
                adm,
                lang,
                save,
            } => {
                let mut config = Config::load()?;
                if let Some(lang) = lang {
                    config.lang = lang;
                }
                let client = client(&config)?;

                let result = client.weather_for_name(&name, adm.as_deref()).await?;
                print_city_weather(&result);
                if let Some(path) = save {
                    save_json(&path, &result)?;
                }
                Ok(())
            }

            Command::Token { save } => {
                let config = Config::load()?;
                let pem = config.load_private_key()?;
                let provider =
                    CredentialProvider::new(&pem, &config.project_id, &config.key_id)?;

                let credential =
                    provider.issue(chrono::Duration::minutes(config.token_ttl_minutes))?;
                println!("{}", credential.token);
                eprintln!("Valid until {}", credential.expires_at);

                if let Some(path) = save {
                    fs::write(&path, &credential.token).with_context(|| {
                        format!("Failed to write token file: {}", path.display())
                    })?;
                    eprintln!("Token written to {}", path.display());
                }
                Ok(())
            }
        }
    }
}

fn save_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(value).context("Failed to serialize results to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write results file: {}", path.display()))?;
    eprintln!("Results written to {}", path.display());
    Ok(())
}

fn client(config: &Config) -> Result<QWeather> {
    let pem = config.load_private_key()?;
    QWeather::new(config, &pem).context("Failed to initialize the qweather client")
}

fn configure() -> Result<()> {
    let api_host = Text::new("API host (e.g. abc123.re.qweatherapi.com):").prompt()?;
    let project_id = Text::new("Project id:").prompt()?;
    let key_id = Text::new("Credential id:").prompt()?;
    let private_key_path = Text::new("Path to the Ed25519 private key (PEM):").prompt()?;

    let config = Config {
        api_host,
        project_id,
        key_id,
        private_key_path: PathBuf::from(private_key_path),
        lang: "zh".to_string(),
        token_ttl_minutes: 15,
    };

    // Fail now if the key is unusable, not on the first query.
    let pem = config.load_private_key()?;
    CredentialProvider::new(&pem, &config.project_id, &config.key_id)
        .context("The private key could not be parsed as an Ed25519 PKCS#8 PEM")?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_candidates(candidates: &[LocationCandidate]) {
    if candidates.is_empty() {
        println!("No matching locations.");
        return;
    }

    println!("Found {} location(s):", candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        println!("{}. {} (id {})", i + 1, candidate.name, candidate.id);
        println!(
            "   {}, {}  [{}, {}]  rank {}",
            candidate.adm1, candidate.country, candidate.lat, candidate.lon, candidate.rank
        );
    }
}

fn print_observation(observation: &WeatherObservation) {
    println!("  Observed at: {}", observation.obs_time);
    println!(
        "  Temperature: {}°C (feels like {}°C)",
        observation.temp, observation.feels_like
    );
    println!("  Condition:   {}", observation.text);
    println!(
        "  Wind:        {} force {}",
        observation.wind_dir, observation.wind_scale
    );
    println!("  Humidity:    {}%", observation.humidity);
    println!("  Pressure:    {} hPa", observation.pressure);
}

fn print_city_weather(result: &CityWeather) {
    println!(
        "{} ({}, {}) [id {}]",
        result.location.name, result.location.adm1, result.location.country, result.location.id
    );
    print_observation(&result.now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_lang_override() {
        let cli = Cli::try_parse_from(["qweather", "show", "Beijing", "--lang", "en"])
            .expect("args should parse");

        match cli.command {
            Command::Show { lang, .. } => assert_eq!(lang.as_deref(), Some("en")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_accepts_save_path() {
        let cli = Cli::try_parse_from(["qweather", "search", "Beijing", "--save", "cities.json"])
            .expect("args should parse");

        match cli.command {
            Command::Search { save, .. } => {
                assert_eq!(save, Some(PathBuf::from("cities.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_accepts_save_path() {
        let cli = Cli::try_parse_from(["qweather", "show", "Beijing", "--save", "weather.json"])
            .expect("args should parse");

        match cli.command {
            Command::Show { save, .. } => {
                assert_eq!(save, Some(PathBuf::from("weather.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
