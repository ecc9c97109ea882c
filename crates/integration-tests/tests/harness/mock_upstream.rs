//! Mock image-generation upstream for integration tests
//!
//! Answers every path with a canned behaviour and records each request it sees

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use tokio_util::sync::CancellationToken;

/// Smallest byte string recognised as a PNG
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRmock";

/// How the mock answers
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Raw PNG bytes with `image/png`
    Png,
    /// `OpenAI` images envelope carrying the PNG as `b64_json`
    OpenAiEnvelope,
    /// Gemini `generateContent` reply with a text part then inline PNG data
    GeminiEnvelope,
    /// Fixed status with a text body
    Status(u16, &'static str),
    /// An HTML page with status 200
    Html,
    /// 429 for the first `times` requests, then raw PNG bytes
    RateLimited { times: u32, retry_after: Option<&'static str> },
    /// Raw PNG bytes after a delay
    Slow(Duration),
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub authorization: Option<String>,
    pub goog_api_key: Option<String>,
    pub body: Vec<u8>,
    pub received_at: Instant,
}

impl RecordedRequest {
    /// Body parsed as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON request body")
    }
}

/// Mock upstream server
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: Behavior,
    rate_limited: AtomicU32,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockUpstream {
    /// Start the mock with the given behaviour, returning immediately
    pub async fn start(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            rate_limited: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL with no path, as Pollinations expects
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL with a version prefix, as the `OpenAI` and Gemini attempts expect
    pub fn versioned_url(&self, version: &str) -> String {
        format!("http://{}/{version}", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("requests lock").len()
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let received_at = Instant::now();
    let (parts, body) = request.into_parts();
    let header_string = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path_and_query: parts
            .uri
            .path_and_query()
            .map(ToString::to_string)
            .unwrap_or_default(),
        authorization: header_string("authorization"),
        goog_api_key: header_string("x-goog-api-key"),
        body: axum::body::to_bytes(body, usize::MAX)
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default(),
        received_at,
    };
    state.requests.lock().expect("requests lock").push(recorded);

    match state.behavior {
        Behavior::Png => png_response(),
        Behavior::OpenAiEnvelope => {
            let body = serde_json::json!({
                "created": 1,
                "data": [{ "b64_json": encoded_png() }],
            });
            axum::Json(body).into_response()
        }
        Behavior::GeminiEnvelope => {
            let body = serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "text": "Here is your sticker" },
                            { "inlineData": { "mimeType": "image/png", "data": encoded_png() } },
                        ]
                    }
                }]
            });
            axum::Json(body).into_response()
        }
        Behavior::Status(code, body) => {
            let status = StatusCode::from_u16(code).expect("valid status code");
            (status, body).into_response()
        }
        Behavior::Html => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            "<html><body>Service temporarily unavailable</body></html>",
        )
            .into_response(),
        Behavior::RateLimited { times, retry_after } => {
            if state.rate_limited.fetch_add(1, Ordering::SeqCst) < times {
                let mut response = (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
                if let Some(value) = retry_after {
                    response
                        .headers_mut()
                        .insert(header::RETRY_AFTER, HeaderValue::from_static(value));
                }
                response
            } else {
                png_response()
            }
        }
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            png_response()
        }
    }
}

fn png_response() -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(PNG))
        .expect("valid response")
}

fn encoded_png() -> String {
    base64::engine::general_purpose::STANDARD.encode(PNG)
}
