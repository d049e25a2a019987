use std::sync::Arc;

use log::debug;

use super::classification_model::RequestAnalysis;
use super::scoring::{KeywordScorer, ScoringStrategy};
use crate::errors::{Error, Result};
use crate::naming::SessionNamer;
use crate::personas::PersonaRegistry;

/// Trait for request classification operations
pub trait ClassificationServiceTrait: Send + Sync {
    /// Persona id that best fits `text`. Total and deterministic.
    fn classify(&self, text: &str) -> String;

    /// Classifies a request description and names a session for it.
    fn analyze_request(&self, description: &str) -> Result<RequestAnalysis>;
}

/// Rule-based classifier driven by the registry's classification policy.
pub struct ClassificationService {
    registry: Arc<PersonaRegistry>,
    scorer: Box<dyn ScoringStrategy>,
    namer: SessionNamer,
}

impl ClassificationService {
    pub fn new(registry: Arc<PersonaRegistry>) -> Self {
        Self::with_scorer(registry, Box::new(KeywordScorer))
    }

    pub fn with_scorer(registry: Arc<PersonaRegistry>, scorer: Box<dyn ScoringStrategy>) -> Self {
        let namer = SessionNamer::new(registry.clone());
        Self {
            registry,
            scorer,
            namer,
        }
    }
}

impl ClassificationServiceTrait for ClassificationService {
    fn classify(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let policy = self.registry.classification_policy();

        // Walking in priority order and replacing only on a strictly higher
        // score lets the earlier persona keep ties.
        let mut best: Option<(&str, u32)> = None;
        for id in &policy.priority {
            let score = self.scorer.score(&lowered, self.registry.get(id));
            if score > best.map_or(0, |(_, top)| top) {
                best = Some((id.as_str(), score));
            }
        }

        match best {
            Some((id, score)) if score >= policy.min_score => {
                debug!("Classified request as '{}' with score {}", id, score);
                id.to_string()
            }
            _ => self.registry.default_persona().id.clone(),
        }
    }

    fn analyze_request(&self, description: &str) -> Result<RequestAnalysis> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::missing_field("Description"));
        }

        let persona_id = self.classify(description);
        let suggested_title = self.namer.extract_title(description, &persona_id);
        let persona = self.registry.get(&persona_id).summary();

        Ok(RequestAnalysis {
            persona_id,
            suggested_title,
            persona,
        })
    }
}
