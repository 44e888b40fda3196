use serde::Serialize;

/// Where a joke came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Api,
    Offline,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Api => "api",
            Provenance::Offline => "offline",
        }
    }

    /// Label shown in the shells' status line ("API" / "OFFLINE").
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Api => "API",
            Provenance::Offline => "OFFLINE",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A joke ready for display. Text is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Joke {
    text: String,
    source: Provenance,
}

impl Joke {
    /// Builds an API joke; `None` when the text is blank.
    pub(crate) fn from_api(text: String) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { text, source: Provenance::Api })
    }

    pub(crate) fn offline(text: &'static str) -> Self {
        Self { text: text.to_owned(), source: Provenance::Offline }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    /// Length in characters, as recorded in the session log.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_text_is_rejected() {
        assert!(Joke::from_api(String::new()).is_none());
        assert!(Joke::from_api("   \n".into()).is_none());
        let j = Joke::from_api("Knock knock".into()).unwrap();
        assert_eq!(j.source(), Provenance::Api);
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        let j = Joke::from_api("★★".into()).unwrap();
        assert_eq!(j.char_len(), 2);
    }
}
