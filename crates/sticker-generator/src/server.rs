use std::time::Duration;

use http::{HeaderValue, header};
use rand::Rng as _;
use reqwest::Client;
use secrecy::ExposeSecret;
use sticker_config::GeneratorConfig;

use crate::{
    attempt::{Attempt, ImagePayload, UpstreamAuth, UpstreamRequest, UpstreamResponse},
    error::{AttemptFailure, StickerError},
    http_client::http_client,
    outcome::{AttemptReport, GenerationOutcome},
    placeholder,
    types::GenerationRequest,
    validate::Limits,
};

/// Wait used when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Sticker generation server that walks the configured attempts in order
pub struct Server {
    client: Client,
    attempts: Vec<Attempt>,
    limits: Limits,
    timeout: Duration,
    max_retry_delay: Duration,
    retry_jitter: Duration,
}

impl Server {
    /// Request limits applied during validation
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Generate a sticker for a validated request
    ///
    /// Attempts run strictly in order and the first image wins. When every
    /// attempt fails the placeholder is returned as a success.
    ///
    /// # Errors
    ///
    /// Returns an internal error only when no attempts are configured
    pub async fn generate(&self, request: &GenerationRequest) -> crate::error::Result<GenerationOutcome> {
        if self.attempts.is_empty() {
            return Err(StickerError::Internal("no generation attempts configured".to_string()));
        }

        let mut failures = Vec::with_capacity(self.attempts.len());

        for attempt in &self.attempts {
            tracing::debug!(attempt = attempt.name(), "trying upstream attempt");

            match self.run_attempt(attempt, request).await {
                Ok(image) => {
                    tracing::info!(
                        attempt = attempt.name(),
                        format = image.format.as_str(),
                        bytes = image.bytes.len(),
                        failed_before = failures.len(),
                        "sticker generated"
                    );

                    return Ok(GenerationOutcome::Generated {
                        image,
                        method: attempt.name().to_string(),
                        enhanced_prompt: attempt.enhances_prompt().then(|| attempt.prompt_for(request)),
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        attempt = attempt.name(),
                        kind = failure.kind(),
                        error = %failure,
                        "upstream attempt failed"
                    );

                    failures.push(AttemptReport {
                        attempt: attempt.name().to_string(),
                        failure,
                    });
                }
            }
        }

        tracing::warn!(attempts = failures.len(), "all upstream attempts failed, returning placeholder");

        Ok(GenerationOutcome::Placeholder {
            svg: placeholder::render(&request.prompt, request.dimensions),
            failures,
        })
    }

    /// Run one attempt, retrying once after a rate limit
    async fn run_attempt(&self, attempt: &Attempt, request: &GenerationRequest) -> Result<ImagePayload, AttemptFailure> {
        let upstream = attempt.build_request(request);

        match self.execute(attempt, &upstream).await {
            Err(AttemptFailure::RateLimited { retry_after }) => {
                let delay = self.retry_delay(retry_after);

                tracing::warn!(
                    attempt = attempt.name(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "upstream rate limited, retrying once"
                );

                tokio::time::sleep(delay).await;
                self.execute(attempt, &upstream).await
            }
            result => result,
        }
    }

    /// Send the request under the per-call timeout and parse the response
    async fn execute(&self, attempt: &Attempt, upstream: &UpstreamRequest) -> Result<ImagePayload, AttemptFailure> {
        let response = tokio::time::timeout(self.timeout, self.send(upstream))
            .await
            .map_err(|_| AttemptFailure::Timeout(self.timeout))??;

        tracing::debug!(
            attempt = attempt.name(),
            status = %response.status,
            content_type = response.content_type.as_deref().unwrap_or_default(),
            "upstream responded"
        );

        attempt.parse_response(&response)
    }

    async fn send(&self, upstream: &UpstreamRequest) -> Result<UpstreamResponse, AttemptFailure> {
        let mut builder = self.client.request(upstream.method.clone(), upstream.url.clone());

        builder = match upstream.auth {
            Some(UpstreamAuth::Bearer(ref key)) => builder.bearer_auth(key.expose_secret()),
            Some(UpstreamAuth::GoogApiKey(ref key)) => builder.header("x-goog-api-key", key.expose_secret()),
            None => builder,
        };

        if let Some(ref body) = upstream.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let retry_after = headers.get(header::RETRY_AFTER).and_then(parse_retry_after);

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptFailure::Transport(format!("failed to read response body: {e}")))?;

        Ok(UpstreamResponse {
            status,
            content_type,
            retry_after,
            body,
        })
    }

    /// Hinted wait, capped, plus random jitter
    fn retry_delay(&self, hint: Option<Duration>) -> Duration {
        let base = hint.unwrap_or(DEFAULT_RETRY_AFTER).min(self.max_retry_delay);
        let jitter_ms = u64::try_from(self.retry_jitter.as_millis()).unwrap_or(u64::MAX);

        if jitter_ms == 0 {
            return base;
        }

        base + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }
}

/// `Retry-After` in delta-seconds; HTTP dates are ignored
fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    value
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Builder for constructing the sticker generation server from configuration
pub struct GeneratorServerBuilder<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> GeneratorServerBuilder<'a> {
    pub const fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let mut attempts = Vec::with_capacity(self.config.attempts.len());

        for (name, attempt_config) in &self.config.attempts {
            tracing::debug!(attempt = %name, kind = ?attempt_config.attempt_type, "initializing generation attempt");
            attempts.push(Attempt::from_config(name, attempt_config)?);
        }

        if attempts.is_empty() {
            tracing::warn!("no generation attempts configured, requests will fail");
        } else {
            tracing::debug!("sticker generator initialized with {} attempt(s)", attempts.len());
        }

        let client = http_client().map_err(|e| StickerError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Server {
            client,
            attempts,
            limits: Limits::from_config(self.config),
            timeout: self.config.timeout,
            max_retry_delay: self.config.max_retry_delay,
            retry_jitter: self.config.retry_jitter,
        })
    }
}
