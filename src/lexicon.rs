mod tone;

use std::collections::HashMap;
use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use tone::{bare, clean, in_tone, tone_of, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Predicate,
    Predicatizer,
    Determiner,
    Pronoun,
    Aspect,
    Tense,
    Polarity,
    Illocution,
    Complementizer,
    Conjunction,
    #[serde(rename = "focus particle")]
    FocusParticle,
    Modality,
    #[serde(rename = "adjective marker")]
    AdjectiveMarker,
}

/// What kind of thing fills a predicate's first slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Agent,
    Individual,
    Event,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PronominalClass {
    Ho,
    Maq,
    Hoq,
    Ta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub toaq: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub gloss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronominal_class: Option<PronominalClass>,
}

impl Entry {
    /// Entry synthesized for a word the lexicon doesn't know: a one-place
    /// predicate glossed by its own spelling.
    pub fn default_predicate(word: &str) -> Self {
        Entry {
            toaq: bare(word),
            category: Category::Predicate,
            gloss: bare(word),
            frame: Some("c".to_string()),
            subject: Some(SubjectType::Free),
            pronominal_class: None,
        }
    }

    pub fn frame(&self) -> &str {
        self.frame.as_deref().unwrap_or("c")
    }

    pub fn subject(&self) -> SubjectType {
        self.subject.unwrap_or(SubjectType::Free)
    }

    pub fn is_agentive(&self) -> bool {
        self.category == Category::Predicate && self.subject() == SubjectType::Agent
    }

    pub fn is_verbal(&self) -> bool {
        matches!(self.category, Category::Predicate | Category::Predicatizer)
    }
}

#[derive(Debug, Clone, Diagnostic, Error)]
pub enum LexiconError {
    #[error("Could not read lexicon {path}: {message}")]
    #[diagnostic(code(toaq::lexicon_io))]
    Io { path: String, message: String },

    #[error("Invalid lexicon JSON: {message}")]
    #[diagnostic(
        code(toaq::lexicon_json),
        help("A lexicon is a JSON array of entries with at least \"toaq\" and \"type\" fields")
    )]
    Json { message: String },
}

/// Read-only word lookup shared by every pipeline call.
pub trait Lexicon {
    /// Look up an entry by its exact (cleaned) dictionary key.
    fn get(&self, key: &str) -> Option<&Entry>;

    /// Look up an entry by tone-less form, for inflected surface words.
    fn get_bare(&self, key: &str) -> Option<&Entry>;

    /// Resolve a surface word, synthesizing a default predicate when unknown.
    fn resolve(&self, word: &str) -> Entry {
        self.get(&clean(word))
            .or_else(|| self.get_bare(&bare(word)))
            .cloned()
            .unwrap_or_else(|| Entry::default_predicate(word))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLexicon {
    entries: HashMap<String, Entry>,
    by_bare: HashMap<String, String>,
}

impl MemoryLexicon {
    pub fn new(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut lexicon = MemoryLexicon::default();
        for entry in entries {
            let key = clean(&entry.toaq);
            lexicon
                .by_bare
                .entry(bare(&entry.toaq))
                .or_insert_with(|| key.clone());
            // homographs: the first entry wins
            lexicon.entries.entry(key).or_insert(entry);
        }
        lexicon
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let entries: Vec<Entry> = serde_json::from_str(json).map_err(|e| LexiconError::Json {
            message: e.to_string(),
        })?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path).map_err(|e| LexiconError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// The small lexicon bundled with the crate.
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::from_json(include_str!("lexicon/builtin.json"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lexicon for MemoryLexicon {
    fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    fn get_bare(&self, key: &str) -> Option<&Entry> {
        self.by_bare.get(key).and_then(|k| self.entries.get(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lexicon_loads() {
        let lexicon = MemoryLexicon::builtin().unwrap();
        assert!(!lexicon.is_empty());

        let chuq = lexicon.resolve("chuq");
        assert_eq!(chuq.category, Category::Predicate);
        assert_eq!(chuq.frame(), "c c");
        assert!(chuq.is_agentive());
    }

    #[test]
    fn test_inflected_word_resolves_by_bare_form() {
        let lexicon = MemoryLexicon::builtin().unwrap();
        let poq = lexicon.resolve("Pöq");
        assert_eq!(poq.toaq, "poq");
        assert_eq!(poq.pronominal_class, Some(PronominalClass::Ho));
    }

    #[test]
    fn test_unknown_word_gets_default_entry() {
        let lexicon = MemoryLexicon::default();
        let entry = lexicon.resolve("Blorq");
        assert_eq!(entry.category, Category::Predicate);
        assert_eq!(entry.toaq, "blorq");
        assert_eq!(entry.frame(), "c");
        assert!(!entry.is_agentive());
    }

    #[test]
    fn test_bad_json() {
        let err = MemoryLexicon::from_json("{\"toaq\": 1}").unwrap_err();
        assert!(matches!(err, LexiconError::Json { .. }));
    }
}
