//! Classification module - maps free-text requests to a persona.

mod classification_model;
mod classification_service;
mod scoring;

pub use classification_model::RequestAnalysis;
pub use classification_service::{ClassificationService, ClassificationServiceTrait};
pub use scoring::{KeywordScorer, ScoringStrategy};
