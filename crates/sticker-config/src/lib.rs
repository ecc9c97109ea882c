#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod generator;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use generator::*;
pub use health::*;
pub use loader::RESERVED_ROUTE_PATHS;
pub use server::*;
pub use telemetry::*;

/// Top-level sticker gateway configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Sticker generation and upstream attempt configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
