use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::personas::{Persona, PersonaRegistry};

/// Titles longer than this are cut down.
pub const MAX_TITLE_CHARS: usize = 30;
/// Characters kept from an over-long title before the ellipsis.
const TRUNCATED_TITLE_CHARS: usize = 27;
/// Salient words kept by extraction and leading words kept by marker scan.
const TITLE_WORD_LIMIT: usize = 3;
/// Tokens this short or shorter carry too little meaning for a title.
const MAX_IGNORED_TOKEN_CHARS: usize = 2;
/// Title for personas the registry does not know.
const UNKNOWN_PERSONA_TITLE: &str = "Special Chat";
const GENERIC_TITLE: &str = "General Chat";

lazy_static! {
    /// Runs of word characters, matched against lower-cased text.
    static ref WORD_PATTERN: Regex = Regex::new(r"\w+").expect("Invalid regex pattern");

    static ref STOP_WORDS: HashSet<&'static str> = [
        "i", "need", "help", "with", "want", "to", "can", "you", "please", "how", "what", "where",
        "when", "why", "the", "a", "an", "and", "or", "but", "in", "on", "at", "by", "for", "of",
        "as", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
        "will", "would", "could", "should", "may", "might", "must", "shall",
    ]
    .into_iter()
    .collect();
}

/// Builds session titles. Both strategies are pure and deterministic.
#[derive(Debug, Clone)]
pub struct SessionNamer {
    registry: Arc<PersonaRegistry>,
}

impl SessionNamer {
    pub fn new(registry: Arc<PersonaRegistry>) -> Self {
        Self { registry }
    }

    /// Title from the first salient words of `text`.
    ///
    /// Falls back to the persona's title when nothing salient remains, and
    /// to "Special Chat" when `persona_id` is not registered.
    pub fn extract_title(&self, text: &str, persona_id: &str) -> String {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = WORD_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| {
                token.chars().count() > MAX_IGNORED_TOKEN_CHARS && !STOP_WORDS.contains(*token)
            })
            .take(TITLE_WORD_LIMIT)
            .collect();

        if words.is_empty() {
            return match self.registry.lookup(persona_id) {
                Some(persona) => truncate_title(&fallback_title(persona)),
                None => UNKNOWN_PERSONA_TITLE.to_string(),
            };
        }

        truncate_title(&title_case(&words.join(" ")))
    }

    /// Title from the persona's marker table.
    ///
    /// Markers are scanned in order and the first literal hit wins. Without
    /// a hit the persona's marker fallback is used; personas that have none
    /// title-case the leading words of the text instead.
    pub fn marker_title(&self, text: &str, persona_id: &str) -> String {
        let persona = self.registry.get(persona_id);
        let lowered = text.to_lowercase();

        let hit = persona.naming.markers.iter().find(|marker| {
            marker
                .patterns
                .iter()
                .any(|pattern| lowered.contains(&pattern.to_lowercase()))
        });
        if let Some(marker) = hit {
            return marker.title.clone();
        }
        if let Some(title) = &persona.naming.marker_fallback {
            return title.clone();
        }

        let leading: Vec<&str> = text.split_whitespace().take(TITLE_WORD_LIMIT).collect();
        if leading.len() >= 2 {
            truncate_title(&title_case(&leading.join(" ")))
        } else {
            fallback_title(persona)
        }
    }
}

fn fallback_title(persona: &Persona) -> String {
    persona
        .naming
        .fallback_title
        .clone()
        .unwrap_or_else(|| GENERIC_TITLE.to_string())
}

/// Upper-cases the first character of each word and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Cuts titles over 30 characters to 27 characters plus "...".
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let kept: String = title.chars().take(TRUNCATED_TITLE_CHARS).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}
