use serde::{Deserialize, Serialize};

use crate::personas::PersonaSummary;

/// Outcome of analyzing a request description: the persona it fits and a
/// title for a session created from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestAnalysis {
    pub persona_id: String,
    pub suggested_title: String,
    pub persona: PersonaSummary,
}
