use std::path::Path;

use crate::{Config, MAX_DIMENSION, MIN_DIMENSION};

/// Attempt name reserved for the fallback image
const RESERVED_ATTEMPT_NAME: &str = "placeholder";

/// Routes owned by the sticker endpoints, unavailable to the health check
pub const RESERVED_ROUTE_PATHS: [&str; 2] = ["/api/generate-sticker", "/api/styles"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are
    /// rejected by [`Config::from_toml`]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable expansion, TOML parsing,
    /// or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns the first attempt, limit or route that is out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_attempts()?;
        self.validate_limits()?;
        self.validate_server()?;
        Ok(())
    }

    /// Health path must be routable next to the sticker endpoints
    fn validate_server(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if !health.enabled {
            return Ok(());
        }

        if !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': `{}`", health.path);
        }

        let normalized = health.path.trim_end_matches('/');
        if RESERVED_ROUTE_PATHS.contains(&normalized) {
            anyhow::bail!("server.health.path `{}` is reserved for the sticker endpoints", health.path);
        }

        Ok(())
    }

    /// Ensure every configured attempt can be built
    fn validate_attempts(&self) -> anyhow::Result<()> {
        if self.generator.attempts.is_empty() {
            anyhow::bail!("at least one generator attempt must be configured");
        }

        for (name, attempt) in &self.generator.attempts {
            if name.trim().is_empty() {
                anyhow::bail!("generator attempt names must not be empty");
            }

            if name == RESERVED_ATTEMPT_NAME {
                anyhow::bail!("generator attempt name '{RESERVED_ATTEMPT_NAME}' is reserved");
            }

            if attempt.attempt_type.requires_api_key() && attempt.api_key.is_none() {
                anyhow::bail!("generator attempt '{name}' requires an api_key");
            }

            if let Some(ref base_url) = attempt.base_url
                && !matches!(base_url.scheme(), "http" | "https")
            {
                anyhow::bail!("generator attempt '{name}' base_url must use http or https");
            }
        }

        Ok(())
    }

    /// Validate prompt, dimension, and timeout limits
    fn validate_limits(&self) -> anyhow::Result<()> {
        let generator = &self.generator;

        if generator.max_prompt_length == 0 {
            anyhow::bail!("generator.max_prompt_length must be greater than 0");
        }

        if generator.timeout.is_zero() {
            anyhow::bail!("generator.timeout must be greater than 0");
        }

        for (field, value) in [
            ("default_width", generator.default_width),
            ("default_height", generator.default_height),
        ] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                anyhow::bail!("generator.{field} must be between {MIN_DIMENSION} and {MAX_DIMENSION}");
            }
        }

        Ok(())
    }
}
