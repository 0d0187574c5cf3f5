//! Chat relay HTTP presentation layer
//!
//! This crate provides the HTTP API that the chat frontend talks to.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError, ServerConfig};
pub use error::ApiError;
pub use extract::AppJson;
pub use routes::{BodyLimits, create_router};
pub use state::AppState;
