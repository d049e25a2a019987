//! Prompts module - composes the text sent to the model for a chat turn.

mod turn_composer;

pub use turn_composer::{Exchange, TurnComposer};
