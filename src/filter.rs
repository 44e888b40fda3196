use std::collections::BTreeSet;

const MASK: char = '★';

/// Masks forbidden substrings in API jokes before the web shell shows them.
/// Each occurrence becomes a run of stars with the same character count.
#[derive(Clone, Debug, Default)]
pub struct DenylistFilter {
    words: BTreeSet<String>,
}

impl DenylistFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words
            .into_iter()
            .map(Into::into)
            .filter(|w: &String| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Adds one word; returns false for blanks and repeats.
    pub fn insert(&mut self, word: impl Into<String>) -> bool {
        let word = word.into();
        !word.is_empty() && self.words.insert(word)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        // longest first so "kills" is masked whole before "kill" sees it
        let mut ordered: Vec<&String> = self.words.iter().collect();
        ordered.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
        ordered.into_iter().fold(text.to_owned(), |acc, word| {
            let mask: String = std::iter::repeat_n(MASK, word.chars().count()).collect();
            acc.replace(word.as_str(), &mask)
        })
    }
}
