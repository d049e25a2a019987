use crate::personas::Persona;

/// Scores how well a lower-cased request matches a persona.
pub trait ScoringStrategy: Send + Sync {
    fn score(&self, lowered_text: &str, persona: &Persona) -> u32;
}

/// Counts the distinct persona keywords occurring as substrings of the text.
///
/// Matching is plain substring search, so "api" also hits "rapid". Each
/// keyword contributes at most once no matter how often it occurs.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl ScoringStrategy for KeywordScorer {
    fn score(&self, lowered_text: &str, persona: &Persona) -> u32 {
        persona
            .keywords
            .iter()
            .filter(|keyword| lowered_text.contains(keyword.as_str()))
            .count() as u32
    }
}
