//! Settings loaded from an optional TOML file plus `TFSYNC__*` environment
//! overrides, e.g. `TFSYNC__TFE__PAGE_SIZE=50`.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tfsync_client::{DEFAULT_ADDRESS, TfeClientConfig};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tfe: TfeSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfeSettings {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Page size for the rename recovery scan. Service default when unset.
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.into()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
impl Default for TfeSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            token: None,
            request_timeout_ms: default_request_timeout_ms(),
            page_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if let Err(e) = Url::parse(&self.tfe.address) {
            return Err(format!("tfe.address {:?} is not a valid URL: {e}", self.tfe.address));
        }
        if self.tfe.request_timeout_ms == 0 {
            return Err("tfe.request_timeout_ms must be > 0".into());
        }
        if let Some(size) = self.tfe.page_size
            && !(1..=100).contains(&size)
        {
            return Err("tfe.page_size must be between 1 and 100".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    /// Builds the HTTP client settings. Command-line values win over the file.
    pub fn client_config(&self, address: Option<&str>, token: Option<&str>) -> TfeClientConfig {
        let mut config = TfeClientConfig::new(address.unwrap_or(&self.tfe.address))
            .with_timeout(Duration::from_millis(self.tfe.request_timeout_ms));
        if let Some(token) = token.or(self.tfe.token.as_deref()) {
            config = config.with_token(token);
        }
        config
    }
}

/// Loads settings from `path` when it exists, then applies environment
/// overrides and validates the result.
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    let mut builder = Config::builder();
    if path.exists() {
        builder = builder.add_source(File::from(path));
    }
    builder = builder.add_source(
        Environment::with_prefix("TFSYNC")
            .try_parsing(true)
            .separator("__"),
    );
    let cfg = builder
        .build()
        .map_err(|e| format!("config build error: {e}"))?;
    let merged: Settings = cfg
        .try_deserialize()
        .map_err(|e| format!("config deserialize error: {e}"))?;
    merged.validate()?;
    Ok(merged)
}
