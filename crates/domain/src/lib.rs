//! Domain layer for the chat relay
//!
//! Contains the conversation history shape exchanged with the frontend,
//! the validated prompt value object, and domain errors.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
