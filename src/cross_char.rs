//! Character classes of the pattern syntax and of the placement preview.

// Pattern syntax
pub(crate) const WILDCARD: char = '_';
pub(crate) const CONTAINS_MARKER: char = '-';
pub(crate) const END_ANCHOR_MARKER: char = '*';

// Preview rendering
pub(crate) const EMPTY_CELL: char = '·';
pub(crate) const CONFLICT_CELL: char = '!';

pub(crate) trait CrossChar {
    fn is_wildcard(&self) -> bool;
    fn is_cell(&self) -> bool;
}

impl CrossChar for char {
    fn is_wildcard(&self) -> bool {
        *self == WILDCARD
    }
    /// Anything that can occupy a cell once whitespace is gone: a letter, a digit,
    /// punctuation kept by the lexicon, or the wildcard.
    fn is_cell(&self) -> bool {
        !self.is_whitespace()
    }
}
