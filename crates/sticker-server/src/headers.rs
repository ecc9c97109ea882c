use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, EXPIRES,
    PRAGMA,
};
use http::{HeaderMap, HeaderValue};
use sticker_config::CorsConfig;

/// Headers stamped on every response of the sticker endpoint
///
/// Applied to success, error, pre-flight and panic responses alike, so
/// browsers can read failures and nothing is cached.
#[derive(Clone)]
pub struct EndpointHeaders {
    headers: HeaderMap,
}

impl EndpointHeaders {
    /// Build the header set from the CORS configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured origin is not a valid header value
    pub fn new(cors: &CorsConfig) -> anyhow::Result<Self> {
        let origin = HeaderValue::from_str(&cors.allow_origin)
            .map_err(|e| anyhow::anyhow!("invalid CORS allow_origin '{}': {e}", cors.allow_origin))?;

        let mut headers = HeaderMap::with_capacity(6);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store, must-revalidate"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));

        Ok(Self { headers })
    }

    fn apply(&self, response: &mut Response) {
        for (name, value) in &self.headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
}

/// Endpoint header middleware
pub async fn endpoint_headers_middleware(headers: EndpointHeaders, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    headers.apply(&mut response);
    response
}
