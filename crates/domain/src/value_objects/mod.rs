//! Value Objects - Immutable, identity-less domain primitives

mod prompt;

pub use prompt::Prompt;
