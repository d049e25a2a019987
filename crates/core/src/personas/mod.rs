//! Personas module - persona models and the immutable registry.

mod personas_model;
mod personas_registry;

pub use personas_model::*;
pub use personas_registry::PersonaRegistry;
