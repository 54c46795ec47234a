//! Client configuration loaded from `parcel.toml`.
//!
//! Keys missing from the file fall back to defaults. `PARCEL_API_URL` and
//! `PARCEL_ACCESS_TOKEN` take precedence over the file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ParcelError;
use crate::http::ApiClient;

const CONFIG_FILE: &str = "parcel.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ParcelConfig {
    /// API root that resource paths are joined onto.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token sent with every request. Empty means unauthenticated.
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.oasislabs.com/parcel/v1".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ParcelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            access_token: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ParcelConfig {
    /// Loads `parcel.toml` from the current directory.
    pub fn load() -> Result<Self, ParcelError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads the given file, or defaults if it does not exist, then applies
    /// environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ParcelError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ParcelConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("PARCEL_API_URL")
            && !url.is_empty()
        {
            config.api_url = url;
        }
        if let Ok(token) = std::env::var("PARCEL_ACCESS_TOKEN")
            && !token.is_empty()
        {
            config.access_token = token;
        }

        if config.api_url.trim().is_empty() {
            return Err(ParcelError::Config("api_url must not be empty".into()));
        }
        Ok(config)
    }

    /// Builds an [`ApiClient`] from this configuration.
    pub fn client(&self) -> Result<ApiClient, ParcelError> {
        let token = Some(self.access_token.clone()).filter(|t| !t.is_empty());
        Ok(ApiClient::with_timeouts(
            self.api_url.clone(),
            token,
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.timeout_secs),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = ParcelConfig::default();
        assert_eq!(config.api_url, "https://api.oasislabs.com/parcel/v1");
        assert!(config.access_token.is_empty());
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_url = "http://localhost:4242/v1"
            timeout_secs = 5
        "#;
        let config: ParcelConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url, "http://localhost:4242/v1");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.access_token.is_empty());
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "connect_timeout_secs = 3").unwrap();
        let config = ParcelConfig::load_from(file.path()).unwrap();
        assert_eq!(config.connect_timeout_secs, 3);
    }

    #[test]
    fn load_from_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            ParcelConfig::load_from(file.path()),
            Err(ParcelError::Toml(_))
        ));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParcelConfig::load_from(&dir.path().join("parcel.toml")).unwrap();
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn client_uses_configured_url() {
        let config = ParcelConfig {
            api_url: "http://localhost:1/v1".into(),
            ..Default::default()
        };
        assert_eq!(config.client().unwrap().base_url(), "http://localhost:1/v1");
    }
}
