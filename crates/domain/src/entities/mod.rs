//! Domain entities

mod chat_turn;

pub use chat_turn::{ChatTurn, TurnPart, TurnRole};
