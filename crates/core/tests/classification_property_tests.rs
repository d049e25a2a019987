//! Property-based tests for request classification and session naming.

use std::sync::Arc;

use persona_chat_core::classification::{KeywordScorer, ScoringStrategy};
use persona_chat_core::naming::MAX_TITLE_CHARS;
use persona_chat_core::{ClassificationService, ClassificationServiceTrait, PersonaRegistry, SessionNamer};
use proptest::prelude::*;

fn registry() -> Arc<PersonaRegistry> {
    Arc::new(PersonaRegistry::builtin().expect("builtin catalog"))
}

// =============================================================================
// Generators
// =============================================================================

/// A scored persona id together with at least two of its distinct keywords.
fn arb_category_keywords() -> impl Strategy<Value = (String, Vec<String>)> {
    let registry = registry();
    let scored: Vec<(String, Vec<String>)> = registry
        .classification_policy()
        .priority
        .iter()
        .map(|id| (id.clone(), registry.get(id).keywords.clone()))
        .collect();

    proptest::sample::select(scored).prop_flat_map(|(id, keywords)| {
        let max = keywords.len();
        (
            Just(id),
            proptest::sample::subsequence(keywords, 2..=max.min(5)).prop_shuffle(),
        )
    })
}

fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,12}"
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Two or more keywords from a single category, none from the others,
    /// always select that category.
    #[test]
    fn prop_single_category_keywords_select_that_category(
        (expected, keywords) in arb_category_keywords()
    ) {
        let registry = registry();
        let text = keywords.join(" ");
        let lowered = text.to_lowercase();
        for other in &registry.classification_policy().priority {
            if other != &expected {
                prop_assume!(KeywordScorer.score(&lowered, registry.get(other)) == 0);
            }
        }

        let service = ClassificationService::new(registry);
        prop_assert_eq!(service.classify(&text), expected);
    }

    #[test]
    fn prop_blank_descriptions_are_rejected(blank in arb_whitespace()) {
        let service = ClassificationService::new(registry());
        prop_assert!(service.analyze_request(&blank).is_err());
    }

    #[test]
    fn prop_classification_is_idempotent(text in "[a-zA-Z ?!.,']{1,80}") {
        let service = ClassificationService::new(registry());
        prop_assert_eq!(service.classify(&text), service.classify(&text));
    }

    #[test]
    fn prop_classification_always_yields_registered_persona(text in ".{0,120}") {
        let registry = registry();
        let service = ClassificationService::new(registry.clone());
        prop_assert!(registry.contains(&service.classify(&text)));
    }

    #[test]
    fn prop_prompt_lookup_is_total(id in ".{0,24}") {
        let registry = registry();
        prop_assert!(!registry.prompt_for(&id).is_empty());
    }

    #[test]
    fn prop_titles_never_exceed_limit(text in ".{0,200}", id in "(general|coding|business|creative|other)") {
        let namer = SessionNamer::new(registry());
        let extracted = namer.extract_title(&text, &id);
        let marked = namer.marker_title(&text, &id);
        prop_assert!(!extracted.is_empty());
        prop_assert!(extracted.chars().count() <= MAX_TITLE_CHARS);
        prop_assert!(marked.chars().count() <= MAX_TITLE_CHARS);
        prop_assert_eq!(extracted, namer.extract_title(&text, &id));
    }
}

#[test]
fn lists_personas_in_registration_order() {
    let names: Vec<String> = registry().list().into_iter().map(|p| p.name).collect();
    assert_eq!(
        names,
        vec![
            "General Assistant",
            "Coding Assistant",
            "Business Consultant",
            "Creative Writing"
        ]
    );
}
