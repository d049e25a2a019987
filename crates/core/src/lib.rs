//! Persona Chat Core - personas, request classification, session naming and
//! the session/message domain.
//!
//! This crate is database-agnostic. Repository traits defined here are
//! implemented by the `storage-sqlite` crate, and the model invocation
//! collaborator lives in the `ai` crate.

pub mod classification;
pub mod constants;
pub mod errors;
pub mod naming;
pub mod personas;
pub mod prompts;
pub mod sessions;
pub mod utils;

pub use classification::{ClassificationService, ClassificationServiceTrait, RequestAnalysis};
pub use naming::SessionNamer;
pub use personas::{Persona, PersonaRegistry, PersonaSummary};
pub use prompts::{Exchange, TurnComposer};
pub use sessions::{SessionService, SessionServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
