use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_host = "abc123.re.qweatherapi.com"
/// project_id = "2EKT9Y452B"
/// key_id = "CGWFM7H6FM"
/// private_key_path = "/home/me/.config/qweather/ed25519-private.pem"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API gateway host assigned to the account.
    pub api_host: String,

    /// Project id; becomes the `sub` claim of minted tokens.
    pub project_id: String,

    /// Credential id; becomes the `kid` header of minted tokens.
    pub key_id: String,

    /// Path to the Ed25519 private key (PKCS#8 PEM).
    pub private_key_path: PathBuf,

    /// Language sent with every request.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Lifetime of minted tokens, in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

fn default_lang() -> String {
    "zh".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    15
}

impl Config {
    /// Load config from disk.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Err(anyhow!(
                "No configuration found at {}.\n\
                 Hint: run `qweather configure` first.",
                path.display()
            ));
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "qweather", "qweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Read the private key material this config points at. The key stays
    /// outside the config file itself.
    pub fn load_private_key(&self) -> Result<Vec<u8>> {
        fs::read(&self.private_key_path).with_context(|| {
            format!(
                "Failed to read private key: {}",
                self.private_key_path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_applies_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            api_host = "abc123.re.qweatherapi.com"
            project_id = "PROJ1"
            key_id = "KEY1"
            private_key_path = "/tmp/key.pem"
            "#,
        )
        .expect("minimal config should parse");

        assert_eq!(cfg.lang, "zh");
        assert_eq!(cfg.token_ttl_minutes, 15);
    }

    #[test]
    fn missing_required_field_fails() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            api_host = "abc123.re.qweatherapi.com"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config {
            api_host: "abc123.re.qweatherapi.com".to_string(),
            project_id: "PROJ1".to_string(),
            key_id: "KEY1".to_string(),
            private_key_path: PathBuf::from("/tmp/key.pem"),
            lang: "en".to_string(),
            token_ttl_minutes: 30,
        };

        let toml = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml).expect("parse back");

        assert_eq!(parsed.api_host, cfg.api_host);
        assert_eq!(parsed.lang, "en");
        assert_eq!(parsed.token_ttl_minutes, 30);
    }
}
