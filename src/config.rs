use crate::constants::{
    DEFAULT_REQUEST_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAMPLE_SIZE, GOOGLE_API_KEY_VAR,
    GOOGLE_PROVIDER, KAKAO_API_KEY_VAR, KAKAO_PROVIDER,
};
use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Tunables read from an optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderSettings,
    pub transform: TransformSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    /// Pause after every provider call
    pub delay_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_REQUEST_DELAY_MS,
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GeocoderSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Number of leading records copied into the sample batch file
    pub sample_size: usize,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl Config {
    /// Load tunables from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

/// Which geocoding service to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Kakao,
    Google,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Kakao => KAKAO_PROVIDER,
            Provider::Google => GOOGLE_PROVIDER,
        }
    }

    /// Environment variable holding this provider's credential
    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::Kakao => KAKAO_API_KEY_VAR,
            Provider::Google => GOOGLE_API_KEY_VAR,
        }
    }
}

/// Everything needed to construct a provider client
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub provider: Provider,
    pub api_key: String,
    pub settings: GeocoderSettings,
}

impl GeocoderConfig {
    /// Read the credential for `provider` from the process environment.
    pub fn from_env(provider: Provider, settings: GeocoderSettings) -> Result<Self> {
        Self::from_lookup(provider, settings, |name| std::env::var(name).ok())
    }

    /// Same as [`GeocoderConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(provider: Provider, settings: GeocoderSettings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = provider.credential_var();
        let api_key = lookup(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| IngestError::Config(format!("{var} environment variable not set")))?;
        Ok(Self {
            provider,
            api_key,
            settings,
        })
    }
}

/// Operator instructions printed when a credential is missing
pub fn credential_help() -> String {
    format!(
        "To use the geocoder, you need to set an API key:\n\
         \n\
         For Kakao Maps API (recommended for Korean addresses):\n  \
         1. Get an API key from: https://developers.kakao.com/\n  \
         2. Set environment variable: export {KAKAO_API_KEY_VAR}='your_key_here'\n\
         \n\
         For Google Maps API:\n  \
         1. Get an API key from: https://console.cloud.google.com/\n  \
         2. Set environment variable: export {GOOGLE_API_KEY_VAR}='your_key_here'\n  \
         3. Run with: shop_ingest geocode --google\n\
         \n\
         Keys may also be placed in a .env file in the working directory."
    )
}
