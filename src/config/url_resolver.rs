use super::settings::ClientSettings;
use crate::constants;

/// Resolves the origin the HTTP transport prefixes to request URLs
pub struct BaseUrlResolver<'a> {
    settings: &'a ClientSettings,
    /// Current environment (from `TETHER_ENV`)
    environment: Option<String>,
}

impl<'a> BaseUrlResolver<'a> {
    /// Creates a new URL resolver for the given settings
    #[must_use]
    pub fn new(settings: &'a ClientSettings) -> Self {
        Self {
            settings,
            environment: std::env::var(constants::ENV_ENVIRONMENT).ok(),
        }
    }

    /// Sets the environment explicitly (overrides `TETHER_ENV`)
    #[must_use]
    pub fn with_environment(mut self, env: Option<String>) -> Self {
        self.environment = env;
        self
    }

    /// Resolves the base URL according to the priority hierarchy:
    /// 1. Explicit parameter
    /// 2. Environment variable: `TETHER_BASE_URL`
    /// 3. Environment-specific URL from settings
    /// 4. Settings `base_url`
    ///
    /// Returns `None` when nothing is configured.
    #[must_use]
    pub fn resolve(&self, explicit_url: Option<&str>) -> Option<String> {
        // Priority 1: Explicit parameter
        if let Some(url) = explicit_url {
            return Some(url.to_string());
        }

        // Priority 2: Environment variable
        if let Ok(url) = std::env::var(constants::ENV_BASE_URL) {
            return Some(url);
        }

        // Priority 3: Environment-specific URL
        if let Some(env_url) = self
            .environment
            .as_ref()
            .and_then(|env| self.settings.environment_urls.get(env))
        {
            return Some(env_url.clone());
        }

        // Priority 4: Settings default
        self.settings.base_url.clone()
    }
}
