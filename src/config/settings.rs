//! Client settings
//!
//! Settings are read from TOML. Everything is optional; an empty file yields
//! the defaults. Per-API tables under `[apis.<name>]` become instance-level
//! metadata overrides for clients of the API declared under that name.
//!
//! ```toml
//! base_url = "https://api.example.com"
//! default_timeout_secs = 30
//!
//! [environment_urls]
//! staging = "https://staging.example.com"
//!
//! [apis.users]
//! base_path = "/api/v2"
//! timeout_ms = 2000
//! headers = { "X-Client" = "tether" }
//! ```

use super::models::ApiMetadataConfig;
use crate::constants;
use crate::error::Error;
use crate::metadata::ApiMetadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Maximum allowed timeout value (1 year in seconds).
/// This prevents overflow when converting to a deadline and catches obviously wrong values.
pub const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientSettings {
    /// Origin prefixed to every request URL by the HTTP transport
    pub base_url: Option<String>,
    /// Environment-specific origins (e.g., "dev", "staging", "prod"), selected by `TETHER_ENV`
    #[serde(default)]
    pub environment_urls: HashMap<String, String>,
    #[serde(default = "default_timeout_secs_value")]
    pub default_timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Per-API metadata overrides keyed by declaration name
    #[serde(default)]
    pub apis: HashMap<String, ApiMetadataConfig>,
}

const fn default_timeout_secs_value() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            environment_urls: HashMap::new(),
            default_timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            apis: HashMap::new(),
        }
    }
}

impl ClientSettings {
    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(e).with_context(&format!("Failed to read settings '{}'", path.display()))
        })?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(target: "tether::config", path = %path.display(), apis = settings.apis.len(), "loaded settings");
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending value.
    pub fn validate(&self) -> Result<(), Error> {
        if self.default_timeout_secs == 0 {
            return Err(Error::Config(
                "default_timeout_secs: timeout must be greater than 0".to_string(),
            ));
        }
        if self.default_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(Error::Config(format!(
                "default_timeout_secs: timeout cannot exceed {MAX_TIMEOUT_SECS} seconds (1 year)"
            )));
        }
        for (name, api) in &self.apis {
            api.to_api_metadata()
                .map_err(|e| Error::Config(format!("apis.{name}: {e}")))?;
        }
        Ok(())
    }

    /// The metadata override configured for the API declared as `api_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured table is invalid.
    pub fn api_override(&self, api_name: &str) -> Result<Option<ApiMetadata>, Error> {
        self.apis
            .get(api_name)
            .map(ApiMetadataConfig::to_api_metadata)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = ClientSettings::from_toml_str("").expect("empty settings");
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.default_timeout_secs, 30);
    }

    #[test]
    fn test_parse_full_settings() {
        let settings = ClientSettings::from_toml_str(
            r#"
base_url = "https://api.example.com"
default_timeout_secs = 10
user_agent = "custom/1.0"

[environment_urls]
staging = "https://staging.example.com"

[apis.users]
base_path = "/api/v2"
timeout_ms = 2000
return_shape = "exchange"
headers = { "X-Client" = "tether" }

[apis.users.attributes]
tenant = "acme"
retries = 2

[apis.users.url_params.query]
version = "2"
"#,
        )
        .expect("valid settings");

        assert_eq!(settings.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(settings.environment_urls["staging"], "https://staging.example.com");

        let api = settings
            .api_override("users")
            .expect("valid override")
            .expect("users override");
        assert_eq!(api.base_path.as_deref(), Some("/api/v2"));
        assert_eq!(api.timeout, Some(Duration::from_millis(2000)));
        assert_eq!(api.headers["X-Client"], "tether");
        assert_eq!(api.attributes["retries"], serde_json::json!(2));
        assert_eq!(api.url_params.query["version"], serde_json::json!("2"));
        assert!(settings.api_override("orders").expect("no error").is_none());
    }

    #[test]
    fn test_timeout_zero_rejected() {
        let result = ClientSettings::from_toml_str("default_timeout_secs = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_timeout_over_max_rejected() {
        let over_max = MAX_TIMEOUT_SECS + 1;
        let result = ClientSettings::from_toml_str(&format!("default_timeout_secs = {over_max}"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_timeout_max_boundary_accepted() {
        let result =
            ClientSettings::from_toml_str(&format!("default_timeout_secs = {MAX_TIMEOUT_SECS}"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_api_table_rejected() {
        let result = ClientSettings::from_toml_str("[apis.users]\nresult = \"stream\"\n");
        assert!(matches!(result, Err(Error::Config(ref msg)) if msg.starts_with("apis.users")));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ClientSettings::from_toml_str("base_url = "),
            Err(Error::Toml(_))
        ));
    }
}
