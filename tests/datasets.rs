// Dataset invariants for the bundled offline catalog.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use joke_adventure::{OFFLINE_JOKES, OfflineCatalog};

#[test]
fn offline_catalog_is_nonempty() {
    assert!(!OfflineCatalog::default().is_empty());
    assert_eq!(OfflineCatalog::default().len(), OFFLINE_JOKES.len());
}

#[test]
fn offline_jokes_are_unique_and_printable() {
    let mut seen = HashSet::new();
    for joke in OFFLINE_JOKES {
        assert!(seen.insert(joke), "duplicate joke '{}'", joke);
        assert!(!joke.trim().is_empty(), "blank joke in catalog");
        assert_eq!(joke.trim(), joke, "joke '{}' has stray whitespace", joke);
        // CSV logs only record the length, but keep the text single-line anyway
        assert!(!joke.contains('\n'), "joke '{}' spans lines", joke);
    }
}

#[test]
fn offline_jokes_are_question_and_punchline() {
    for joke in OFFLINE_JOKES {
        assert!(joke.contains('?'), "joke '{}' has no question", joke);
        let last = joke.chars().last().unwrap();
        assert!(matches!(last, '!' | '.'), "joke '{}' has no punchline ending", joke);
    }
}
