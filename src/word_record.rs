//! The lexicon entry as seen by the crossing engine.
//!
//! A [`WordRecord`] is owned by the lexicon. The engine only ever holds shared
//! handles to it (`Arc<WordRecord>`) and never mutates one.

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::cross_char::CrossChar;

/// Normalized form of a word or pattern: uppercased, with all whitespace removed.
///
/// Every pattern and crossing comparison is done on this form.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.trim().to_uppercase().chars().filter(CrossChar::is_cell).collect()
}

/// One lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WordRecord {
    /// Form shown to the user, e.g. `"tête-à-tête"`.
    pub display: String,
    /// Matching form (see [`normalize`]); doubles as the record's unique key.
    pub normalized: String,
    /// Number of characters in `normalized`.
    pub length: usize,
    /// How many definitions the lexicon holds for this word (richness metric).
    pub definition_count: u32,
    /// Curated by the user; sorts first.
    pub favorite: bool,
    pub active: bool,
    /// Insertion order in the lexicon (final tie-break).
    pub rank: usize,
}

impl WordRecord {
    /// A fresh, active, non-favorite record with no definitions.
    #[must_use]
    pub fn new(display: &str) -> Self {
        let display = display.trim().to_string();
        let normalized = normalize(&display);
        let length = normalized.chars().count();
        WordRecord {
            display,
            normalized,
            length,
            definition_count: 0,
            favorite: false,
            active: true,
            rank: 0,
        }
    }

    #[must_use]
    pub fn with_definitions(mut self, definition_count: u32) -> Self {
        self.definition_count = definition_count;
        self
    }

    #[must_use]
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// The record's unique key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.normalized
    }

    /// Character of the normalized form at a 1-based position.
    ///
    /// `None` when the word is too short (or `position` is 0), i.e. when the
    /// word cannot take part in a crossing at that position.
    #[must_use]
    pub fn char_at(&self, position: usize) -> Option<char> {
        position.checked_sub(1).and_then(|i| self.normalized.chars().nth(i))
    }
}

impl Display for WordRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}
