//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use sticker_config::{AttemptConfig, AttemptType, Config, CorsConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with test-friendly timings and no attempts
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.generator.timeout = Duration::from_secs(5);
        config.generator.max_retry_delay = Duration::from_secs(2);
        config.generator.retry_jitter = Duration::ZERO;

        Self { config }
    }

    fn with_attempt(mut self, name: &str, attempt_type: AttemptType, base_url: &str) -> Self {
        let api_key = attempt_type
            .requires_api_key()
            .then(|| SecretString::from("test-key"));

        self.config.generator.attempts.insert(
            name.to_owned(),
            AttemptConfig {
                base_url: Some(base_url.parse().expect("valid URL")),
                api_key,
                ..AttemptConfig::new(attempt_type)
            },
        );
        self
    }

    /// Add a Pollinations attempt pointed at a mock upstream
    pub fn with_pollinations(self, name: &str, base_url: &str) -> Self {
        self.with_attempt(name, AttemptType::Pollinations, base_url)
    }

    /// Add an OpenAI images attempt pointed at a mock upstream
    pub fn with_openai(self, name: &str, base_url: &str) -> Self {
        self.with_attempt(name, AttemptType::Openai, base_url)
    }

    /// Add a Gemini attempt pointed at a mock upstream
    pub fn with_gemini(self, name: &str, base_url: &str) -> Self {
        self.with_attempt(name, AttemptType::Gemini, base_url)
    }

    /// Disable prompt enhancement on an attempt added earlier
    pub fn without_enhancement(mut self, name: &str) -> Self {
        if let Some(attempt) = self.config.generator.attempts.get_mut(name) {
            attempt.enhance_prompt = false;
        }
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.generator.timeout = timeout;
        self
    }

    /// Set the rate-limit wait cap and jitter
    pub fn with_retry(mut self, max_delay: Duration, jitter: Duration) -> Self {
        self.config.generator.max_retry_delay = max_delay;
        self.config.generator.retry_jitter = jitter;
        self
    }

    /// Set the longest accepted prompt
    pub fn with_max_prompt_length(mut self, max: usize) -> Self {
        self.config.generator.max_prompt_length = max;
        self
    }

    /// Set the allowed CORS origin
    pub fn with_cors_origin(mut self, origin: &str) -> Self {
        self.config.server.cors = CorsConfig {
            allow_origin: origin.to_owned(),
        };
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
