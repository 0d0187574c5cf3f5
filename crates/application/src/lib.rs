//! Application layer - Use cases and orchestration
//!
//! Validates caller input, runs every outbound call through the retry policy
//! executor, and folds classified failures into [`ApplicationError`].

pub mod error;
pub mod services;

pub use error::ApplicationError;
pub use services::*;
