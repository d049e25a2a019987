use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info};

use super::personas_model::{
    ClassificationPolicy, Persona, PersonaCatalog, PersonaSummary, PERSONA_CATALOG_SCHEMA_VERSION,
};
use crate::errors::{Error, Result};

/// Catalog compiled into the binary.
const BUILTIN_CATALOG_JSON: &str = include_str!("personas.json");

/// Immutable, insertion-ordered table of personas.
///
/// Built once at startup and shared by `Arc` with every component that
/// needs persona data. Lookups by id are total: unknown ids resolve to the
/// default persona.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
    index: HashMap<String, usize>,
    default_index: usize,
    policy: ClassificationPolicy,
}

impl PersonaRegistry {
    /// Registry backed by the catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG_JSON)
    }

    /// Loads a catalog from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading persona catalog from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: PersonaCatalog = serde_json::from_str(json)?;
        Self::from_catalog(catalog)
    }

    /// Validates a catalog and builds the lookup index.
    pub fn from_catalog(catalog: PersonaCatalog) -> Result<Self> {
        if catalog.schema_version > PERSONA_CATALOG_SCHEMA_VERSION {
            return Err(Error::InvalidConfigValue(format!(
                "Unsupported persona catalog schema version {}",
                catalog.schema_version
            )));
        }
        if catalog.personas.is_empty() {
            return Err(Error::InvalidConfigValue(
                "Persona catalog must define at least one persona".to_string(),
            ));
        }

        let mut personas = catalog.personas;
        let mut index = HashMap::with_capacity(personas.len());
        for (position, persona) in personas.iter_mut().enumerate() {
            validate_persona(persona)?;
            // Scoring compares against lower-cased text.
            for keyword in persona.keywords.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            persona.keywords.retain(|k| !k.is_empty());
            if index.insert(persona.id.clone(), position).is_some() {
                return Err(Error::InvalidConfigValue(format!(
                    "Duplicate persona id '{}'",
                    persona.id
                )));
            }
        }

        let default_index = *index.get(&catalog.default_persona).ok_or_else(|| {
            Error::InvalidConfigValue(format!(
                "Default persona '{}' is not defined",
                catalog.default_persona
            ))
        })?;

        let policy = catalog.classification;
        if policy.min_score == 0 {
            return Err(Error::InvalidConfigValue(
                "Classification minScore must be at least 1".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for id in &policy.priority {
            if !index.contains_key(id) {
                return Err(Error::InvalidConfigValue(format!(
                    "Classification priority references unknown persona '{}'",
                    id
                )));
            }
            if !seen.insert(id.as_str()) {
                return Err(Error::InvalidConfigValue(format!(
                    "Classification priority lists '{}' twice",
                    id
                )));
            }
        }

        debug!(
            "Persona registry loaded: {} personas, default '{}'",
            personas.len(),
            personas[default_index].id
        );

        Ok(Self {
            personas,
            index,
            default_index,
            policy,
        })
    }

    /// Persona for `id`, or the default persona when `id` is unknown.
    pub fn get(&self, id: &str) -> &Persona {
        self.lookup(id).unwrap_or_else(|| self.default_persona())
    }

    /// Persona for `id` without the default substitution.
    pub fn lookup(&self, id: &str) -> Option<&Persona> {
        self.index.get(id).map(|&position| &self.personas[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn default_persona(&self) -> &Persona {
        &self.personas[self.default_index]
    }

    /// System prompt for `id`; the default persona's prompt for unknown ids.
    pub fn prompt_for(&self, id: &str) -> &str {
        &self.get(id).system_prompt
    }

    /// All personas in registration order.
    pub fn list(&self) -> Vec<PersonaSummary> {
        self.personas.iter().map(Persona::summary).collect()
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn classification_policy(&self) -> &ClassificationPolicy {
        &self.policy
    }
}

fn validate_persona(persona: &Persona) -> Result<()> {
    let required = [
        ("id", &persona.id),
        ("name", &persona.name),
        ("description", &persona.description),
        ("systemPrompt", &persona.system_prompt),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::InvalidConfigValue(format!(
                "Persona '{}' has an empty {}",
                persona.id, field
            )));
        }
    }
    if !(0.0..=2.0).contains(&persona.temperature) {
        return Err(Error::InvalidConfigValue(format!(
            "Persona '{}' temperature {} is outside 0.0..=2.0",
            persona.id, persona.temperature
        )));
    }
    Ok(())
}
