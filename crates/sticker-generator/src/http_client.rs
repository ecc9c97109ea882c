use std::time::Duration;

use axum::http;
use reqwest::Client;

/// HTTP client shared by every attempt of one server
///
/// Per-call deadlines are enforced by the attempt loop, not here.
pub fn http_client() -> reqwest::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .user_agent(concat!("sticker-gateway/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
}
