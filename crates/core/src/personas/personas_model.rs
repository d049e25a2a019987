//! Persona domain models and the catalog format they are loaded from.

use serde::{Deserialize, Serialize};

/// Current schema version for persona catalogs.
pub const PERSONA_CATALOG_SCHEMA_VERSION: u32 = 1;

/// A selectable assistant personality: system prompt, decoding hints and
/// the text the classifier, namer and composer need for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    /// Response length hint handed to the model runtime.
    pub max_length: u32,
    /// Sampling temperature hint handed to the model runtime.
    pub temperature: f32,
    /// Header placed above prior exchanges in a composed prompt.
    #[serde(default = "default_history_header")]
    pub history_header: String,
    /// Text that opens the model's continuation after the final "AI:".
    #[serde(default)]
    pub reply_lead_in: String,
    /// Keywords scored by the request classifier. Personas without
    /// keywords are never picked by scoring.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub naming: PersonaNaming,
}

fn default_history_header() -> String {
    "Previous conversation".to_string()
}

impl Persona {
    pub fn summary(&self) -> PersonaSummary {
        PersonaSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Title rules for sessions created under a persona.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonaNaming {
    /// Title used by word extraction when no salient words remain.
    #[serde(default)]
    pub fallback_title: Option<String>,
    /// Literal markers scanned in order by the marker namer.
    #[serde(default)]
    pub markers: Vec<TitleMarker>,
    /// Title used by the marker namer when no marker matches. When absent,
    /// the marker namer title-cases the leading words of the text instead.
    #[serde(default)]
    pub marker_fallback: Option<String>,
}

/// A set of literal substrings that map to one title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleMarker {
    #[serde(rename = "match")]
    pub patterns: Vec<String>,
    pub title: String,
}

/// Public view of a persona as listed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Declarative winner selection for the request classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationPolicy {
    /// Scored personas, highest priority first. On equal scores the
    /// earlier persona wins.
    pub priority: Vec<String>,
    /// Scores below this floor fall back to the default persona.
    pub min_score: u32,
}

/// On-disk/embedded persona catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaCatalog {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub default_persona: String,
    pub classification: ClassificationPolicy,
    pub personas: Vec<Persona>,
}

fn default_schema_version() -> u32 {
    PERSONA_CATALOG_SCHEMA_VERSION
}
