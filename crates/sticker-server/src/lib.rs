mod headers;

use std::any::Any;
use std::net::SocketAddr;

use axum::Router;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use sticker_config::Config;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::headers::EndpointHeaders;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the generator cannot be initialized or the
    /// configured CORS origin is not a valid header value
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let generator_state = sticker_generator::build_server(config)?;
        let endpoint_headers = EndpointHeaders::new(&config.server.cors)?;

        // Sticker endpoint (panics become the 500 envelope, headers wrap everything)
        let generator = sticker_generator::endpoint_router()
            .with_state(generator_state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(axum::middleware::from_fn(move |req, next| {
                let headers = endpoint_headers.clone();
                async move { headers::endpoint_headers_middleware(headers, req, next).await }
            }));

        let mut app = Router::new().merge(generator).merge(sticker_generator::styles_router());

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health));
        }

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[allow(clippy::needless_pass_by_value)]
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let details = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("handler panicked");

    tracing::error!(details, "sticker handler panicked");

    let body = serde_json::json!({
        "error": "Sticker generation failed",
        "details": details,
    });

    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
