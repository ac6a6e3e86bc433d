//! Compilation of the crossing pattern syntax into a [`PatternSpec`].
//!
//! # Syntax
//!
//! - letters are literal cells, `_` is a single-character wildcard
//! - a leading `-` lets the pattern start anywhere in the word (containment)
//! - a trailing `*` anchors the pattern to the end of the word
//! - whitespace is ignored and letters are uppercased
//!
//! | raw      | mode                  | LIKE form |
//! |----------|-----------------------|-----------|
//! | `TE__*`  | [`MatchMode::Exact`]    | `TE__`    |
//! | `TE__`   | [`MatchMode::Prefix`]   | `TE__%`   |
//! | `-TE*`   | [`MatchMode::Suffix`]   | `%TE`     |
//! | `-TE`    | [`MatchMode::Contains`] | `%TE%`    |
//!
//! # Examples
//!
//! ```
//! use croisement::pattern::{compile, MatchMode};
//!
//! let spec = compile(" te _ _ ").unwrap();
//! assert_eq!(spec.cell_count(), 4);
//! assert_eq!(spec.mode(), MatchMode::Prefix);
//! assert_eq!(spec.to_like(), "TE__%");
//!
//! // markers alone leave nothing to match
//! assert!(compile("-*").is_none());
//! ```

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::cross_char::{CrossChar, CONTAINS_MARKER, END_ANCHOR_MARKER, WILDCARD};
use crate::word_record::normalize;

/// One position of a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Letter(char), // literal, already uppercased
    Wildcard,     // '_': exactly one character
}

impl Cell {
    /// The character used to draw this cell (`_` for a wildcard).
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Cell::Letter(c) => c,
            Cell::Wildcard => WILDCARD,
        }
    }

    /// Whether `c` can sit in this cell.
    #[must_use]
    pub fn accepts(self, c: char) -> bool {
        match self {
            Cell::Letter(expected) => expected == c,
            Cell::Wildcard => true,
        }
    }
}

impl From<char> for Cell {
    fn from(c: char) -> Self {
        if c.is_wildcard() {
            Cell::Wildcard
        } else {
            Cell::Letter(c)
        }
    }
}

/// Where a pattern may sit inside a word.
///
/// One variant per `(contains, end_anchored)` combination; the lexicon contract
/// matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Anchored at both ends: the word is exactly the pattern.
    Exact,
    /// Anchored at the start only.
    Prefix,
    /// Anchored at the end only.
    Suffix,
    /// Anywhere in the word.
    Contains,
}

impl MatchMode {
    #[must_use]
    pub fn from_markers(contains: bool, end_anchored: bool) -> Self {
        match (contains, end_anchored) {
            (false, true) => MatchMode::Exact,
            (false, false) => MatchMode::Prefix,
            (true, true) => MatchMode::Suffix,
            (true, false) => MatchMode::Contains,
        }
    }

    #[must_use]
    pub fn contains(self) -> bool {
        matches!(self, MatchMode::Suffix | MatchMode::Contains)
    }

    #[must_use]
    pub fn end_anchored(self) -> bool {
        matches!(self, MatchMode::Exact | MatchMode::Suffix)
    }
}

/// A compiled pattern: a non-empty cell sequence plus its [`MatchMode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSpec {
    cells: Vec<Cell>,
    mode: MatchMode,
}

impl PatternSpec {
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    #[must_use]
    pub fn contains(&self) -> bool {
        self.mode.contains()
    }

    #[must_use]
    pub fn end_anchored(&self) -> bool {
        self.mode.end_anchored()
    }

    /// The cell at a 1-based position, if there is one.
    #[must_use]
    pub fn cell_at(&self, position: usize) -> Option<Cell> {
        position.checked_sub(1).and_then(|i| self.cells.get(i).copied())
    }

    /// The cells drawn as characters, wildcards included (e.g. `"TE__"`).
    #[must_use]
    pub fn cell_string(&self) -> String {
        self.cells.iter().map(|c| c.as_char()).collect()
    }

    /// SQL `LIKE` rendering of the pattern (`%` for unanchored sides).
    #[must_use]
    pub fn to_like(&self) -> String {
        let core = self.cell_string();
        match self.mode {
            MatchMode::Exact => core,
            MatchMode::Prefix => format!("{core}%"),
            MatchMode::Suffix => format!("%{core}"),
            MatchMode::Contains => format!("%{core}%"),
        }
    }

    /// Regex rendering of the pattern, for matching against normalized forms.
    #[must_use]
    pub fn to_regex_str(&self) -> String {
        let mut regex_str = String::with_capacity(self.cells.len() + 2);
        if !self.contains() {
            regex_str.push('^');
        }
        for cell in &self.cells {
            match cell {
                Cell::Letter(c) => regex_str.push_str(&fancy_regex::escape(&c.to_string())),
                Cell::Wildcard => regex_str.push('.'),
            }
        }
        if self.end_anchored() {
            regex_str.push('$');
        }
        regex_str
    }

    /// Direct (regex-free) test of a normalized form against this pattern.
    #[must_use]
    pub fn matches(&self, normalized: &str) -> bool {
        let chars: Vec<char> = normalized.chars().collect();
        let n = self.cells.len();
        if chars.len() < n {
            return false;
        }
        let fits_at = |start: usize| {
            self.cells.iter().zip(&chars[start..start + n]).all(|(cell, &c)| cell.accepts(c))
        };
        let last_start = chars.len() - n;
        match self.mode {
            MatchMode::Exact => chars.len() == n && fits_at(0),
            MatchMode::Prefix => fits_at(0),
            MatchMode::Suffix => fits_at(last_start),
            MatchMode::Contains => (0..=last_start).any(fits_at),
        }
    }
}

impl Display for PatternSpec {
    /// Canonical raw syntax (`-TE*`), which compiles back to the same spec.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.contains() {
            write!(f, "{CONTAINS_MARKER}")?;
        }
        write!(f, "{}", self.cell_string())?;
        if self.end_anchored() {
            write!(f, "{END_ANCHOR_MARKER}")?;
        }
        Ok(())
    }
}

/// Compile raw user input into a [`PatternSpec`].
///
/// Returns `None` when nothing is left to match: empty input, markers only,
/// or cells that are all wildcards. Callers treat `None` as "no results".
#[must_use]
pub fn compile(raw: &str) -> Option<PatternSpec> {
    let normalized = normalize(raw);
    let mut rest = normalized.as_str();

    let contains = rest.starts_with(CONTAINS_MARKER);
    if contains {
        rest = &rest[CONTAINS_MARKER.len_utf8()..];
    }

    let end_anchored = rest.ends_with(END_ANCHOR_MARKER);
    if end_anchored {
        rest = &rest[..rest.len() - END_ANCHOR_MARKER.len_utf8()];
    }

    let cells: Vec<Cell> = rest.chars().map(Cell::from).collect();
    if cells.iter().all(|c| *c == Cell::Wildcard) {
        return None;
    }

    Some(PatternSpec { cells, mode: MatchMode::from_markers(contains, end_anchored) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_modes() {
        assert_eq!(compile("-TE*").unwrap().mode(), MatchMode::Suffix);
        assert_eq!(compile("-TE").unwrap().mode(), MatchMode::Contains);
        assert_eq!(compile("TE*").unwrap().mode(), MatchMode::Exact);
        assert_eq!(compile("TE").unwrap().mode(), MatchMode::Prefix);
    }

    #[test]
    fn test_compile_flags_follow_markers() {
        let spec = compile("-TE*").unwrap();
        assert!(spec.contains());
        assert!(spec.end_anchored());

        let spec = compile("TE").unwrap();
        assert!(!spec.contains());
        assert!(!spec.end_anchored());
    }

    #[test]
    fn test_mode_round_trips_through_flags() {
        for contains in [false, true] {
            for end_anchored in [false, true] {
                let mode = MatchMode::from_markers(contains, end_anchored);
                assert_eq!(mode.contains(), contains);
                assert_eq!(mode.end_anchored(), end_anchored);
            }
        }
    }

    #[test]
    fn test_compile_normalizes_input() {
        let spec = compile("  t e_ s ").unwrap();
        assert_eq!(spec.cell_string(), "TE_S");
        assert_eq!(
            spec.cells(),
            &[Cell::Letter('T'), Cell::Letter('E'), Cell::Wildcard, Cell::Letter('S')]
        );
    }

    #[test]
    fn test_compile_degenerate_inputs() {
        for raw in ["", "   ", "-", "*", "-*", " - * ", "_", "___", "-__*"] {
            assert!(compile(raw).is_none(), "{raw:?} should compile to nothing");
        }
    }

    #[test]
    fn test_compile_keeps_inner_markers() {
        // only the first '-' and the last '*' are markers
        let spec = compile("--A**").unwrap();
        assert_eq!(spec.cell_string(), "-A*");
        assert_eq!(spec.mode(), MatchMode::Suffix);
    }

    #[test]
    fn test_to_like() {
        assert_eq!(compile("TE__*").unwrap().to_like(), "TE__");
        assert_eq!(compile("TE__").unwrap().to_like(), "TE__%");
        assert_eq!(compile("-AU*").unwrap().to_like(), "%AU");
        assert_eq!(compile("-AU").unwrap().to_like(), "%AU%");
    }

    #[test]
    fn test_to_regex_str() {
        assert_eq!(compile("TE__*").unwrap().to_regex_str(), "^TE..$");
        assert_eq!(compile("TE_").unwrap().to_regex_str(), "^TE.");
        assert_eq!(compile("-AU*").unwrap().to_regex_str(), "AU$");
        assert_eq!(compile("-A_U").unwrap().to_regex_str(), "A.U");
    }

    #[test]
    fn test_display_is_canonical() {
        for raw in ["-te*", "TE", " te__ *", "-A_U"] {
            let spec = compile(raw).unwrap();
            assert_eq!(compile(&spec.to_string()), Some(spec));
        }
    }

    #[test]
    fn test_cell_at_is_one_based() {
        let spec = compile("TE_").unwrap();
        assert_eq!(spec.cell_at(0), None);
        assert_eq!(spec.cell_at(1), Some(Cell::Letter('T')));
        assert_eq!(spec.cell_at(3), Some(Cell::Wildcard));
        assert_eq!(spec.cell_at(4), None);
    }

    mod matching {
        use super::*;

        #[test]
        fn test_exact() {
            let spec = compile("TE__*").unwrap();
            assert!(spec.matches("TEMP"));
            assert!(!spec.matches("TEMPS"));
            assert!(!spec.matches("TEM"));
        }

        #[test]
        fn test_prefix() {
            let spec = compile("TE__").unwrap();
            assert!(spec.matches("TEMP"));
            assert!(spec.matches("TEMPS"));
            assert!(!spec.matches("ATEMP"));
        }

        #[test]
        fn test_suffix() {
            let spec = compile("-AU*").unwrap();
            assert!(spec.matches("SEAU"));
            assert!(spec.matches("AU"));
            assert!(!spec.matches("AUX"));
        }

        #[test]
        fn test_contains() {
            let spec = compile("-A_U").unwrap();
            assert!(!spec.matches("BATEAU"));
            assert!(spec.matches("TAXUS"));
            assert!(spec.matches("AZUR"));
            assert!(!spec.matches("AU"));
        }
    }
}
