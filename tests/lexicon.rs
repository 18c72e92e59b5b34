use std::fs;

use tempdir::TempDir;
use toaq_semantics::lexicon::{Category, Lexicon, LexiconError, MemoryLexicon, SubjectType};

const SMALL: &str = r#"[
  {"toaq": "fıeq", "type": "predicate", "gloss": "be happy", "frame": "c", "subject": "individual", "pronominal_class": "hoq"},
  {"toaq": "pu", "type": "tense", "gloss": "PST"}
]"#;

#[test]
fn test_load_from_file() {
    let tmp_dir = TempDir::new("toaq-lexicon").unwrap();
    let path = tmp_dir.path().join("small.json");
    fs::write(&path, SMALL).unwrap();

    let lexicon = MemoryLexicon::load(&path).unwrap();
    let entry = lexicon.get("fıeq").unwrap();
    assert_eq!(entry.category, Category::Predicate);
    assert_eq!(entry.subject(), SubjectType::Individual);
    assert_eq!(lexicon.get("pu").unwrap().category, Category::Tense);
}

#[test]
fn test_inflected_words_resolve_by_bare_form() {
    let tmp_dir = TempDir::new("toaq-lexicon").unwrap();
    let path = tmp_dir.path().join("small.json");
    fs::write(&path, SMALL).unwrap();

    let lexicon = MemoryLexicon::load(&path).unwrap();
    assert_eq!(lexicon.resolve("fíeq").gloss, "be happy");
    // unknown words become one-place predicates
    let unknown = lexicon.resolve("gıaq");
    assert_eq!(unknown.category, Category::Predicate);
    assert_eq!(unknown.frame(), "c");
}

#[test]
fn test_missing_file() {
    let tmp_dir = TempDir::new("toaq-lexicon").unwrap();
    let err = MemoryLexicon::load(&tmp_dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, LexiconError::Io { .. }));
}

#[test]
fn test_malformed_json() {
    let tmp_dir = TempDir::new("toaq-lexicon").unwrap();
    let path = tmp_dir.path().join("broken.json");
    fs::write(&path, r#"[{"toaq": "fıeq"}]"#).unwrap();
    let err = MemoryLexicon::load(&path).unwrap_err();
    assert!(matches!(err, LexiconError::Json { .. }));
}
