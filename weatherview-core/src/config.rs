use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::FetchRequest;

pub const DEFAULT_CITY_ID: &str = "recife";
pub const DEFAULT_ENDPOINT: &str = "https://api.hgbrasil.com/weather";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// city_id = "recife"
/// api_key = "..."
/// timeout_ms = 5000
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// City identifier as understood by the provider.
    pub city_id: String,
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Upper bound for a single fetch attempt.
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            city_id: DEFAULT_CITY_ID.to_string(),
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if cfg.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than zero"));
        }
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
        let dirs = ProjectDirs::from("dev", "weatherview", "weatherview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, if a non-empty one is present.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the request for the configured city.
    pub fn fetch_request(&self) -> Result<FetchRequest> {
        let api_key = self.api_key().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weatherview configure` and enter your API key."
            )
        })?;

        Ok(FetchRequest {
            city_id: self.city_id.clone(),
            api_key: api_key.to_owned(),
            timeout: self.timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = Config::default();

        assert_eq!(cfg.city_id, "recife");
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        assert!(!cfg.is_configured());
    }

    #[test]
    fn fetch_request_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = cfg.fetch_request().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `weatherview configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());

        assert!(!cfg.is_configured());
        assert!(cfg.fetch_request().is_err());
    }

    #[test]
    fn fetch_request_uses_city_key_and_timeout() {
        let mut cfg = Config { city_id: "olinda".into(), timeout_ms: 1500, ..Config::default() };
        cfg.set_api_key("KEY".into());

        let req = cfg.fetch_request().expect("key is configured");
        assert_eq!(req.city_id, "olinda");
        assert_eq!(req.api_key, "KEY");
        assert_eq!(req.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml("api_key = \"KEY\"\n").expect("partial config parses");

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.city_id, DEFAULT_CITY_ID);
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Config::from_toml("timeout_ms = 0").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
