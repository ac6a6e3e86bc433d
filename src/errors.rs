//! Error types for lexicon access, with error codes and helpful messages.
//!
//! # Error Codes
//!
//! - L001: `Unavailable` (No lexicon is loaded or reachable)
//! - L002: `Io` (Reading a lexicon file failed)
//! - L003: `MalformedRecord` (A stored record could not be decoded)
//! - L004: `Matcher` (A pattern could not be turned into a matcher)
//! - L005: `DuplicateKey` (Two records share a normalized form)
//! - P001: `SlotSpecError::Invalid` (Slot spec does not follow `PATTERN/H|V[/POS[,POS]]`)
//! - P002: `SlotSpecError::TooManyPositions` (More than two crossing positions)
//! - P003: `SlotSpecError::ZeroPosition` (Crossing positions are 1-based)
//!
//! Pattern problems are never errors: a pattern that leaves nothing to match
//! compiles to `None` (see [`crate::pattern::compile`]).
//!
//! # Examples
//!
//! ```
//! use croisement::errors::LexiconError;
//!
//! let err = LexiconError::Unavailable;
//! assert_eq!(err.code(), "L001");
//! println!("{}", err.display_detailed());
//! ```

use std::io;

/// Failure of a lexicon query or of loading a lexicon.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("lexicon unavailable")]
    Unavailable,

    #[error("failed to read lexicon from '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed lexicon record at line {line}: \"{text}\"")]
    MalformedRecord { line: usize, text: String },

    #[error("invalid matcher for pattern \"{pattern}\": {source}")]
    Matcher {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("duplicate lexicon key \"{key}\" at line {line}")]
    DuplicateKey { key: String, line: usize },
}

/// Failure to parse a textual slot spec such as `"TE__/H/3"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotSpecError {
    #[error("invalid slot spec \"{spec}\"")]
    Invalid { spec: String },

    #[error("slot spec \"{spec}\" has {count} crossing positions (at most 2)")]
    TooManyPositions { spec: String, count: usize },

    #[error("slot spec \"{spec}\" has a crossing position of 0")]
    ZeroPosition { spec: String },
}

impl SlotSpecError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SlotSpecError::Invalid { .. } => "P001",
            SlotSpecError::TooManyPositions { .. } => "P002",
            SlotSpecError::ZeroPosition { .. } => "P003",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SlotSpecError::Invalid { .. } => "Slot spec does not follow PATTERN/H|V[/POS[,POS]]",
            SlotSpecError::TooManyPositions { .. } => "More than two crossing positions",
            SlotSpecError::ZeroPosition { .. } => "Crossing positions are 1-based",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SlotSpecError::Invalid { .. } => "A slot is written as its pattern, an orientation (H or V) and optionally its crossing position(s), separated by '/'.",
            SlotSpecError::TooManyPositions { .. } => "The first two slots cross one other slot each; only the third slot takes two positions (crossing slot 1, then slot 2).",
            SlotSpecError::ZeroPosition { .. } => "Positions count cells from 1, so 0 never names a cell.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SlotSpecError::Invalid { .. } => Some("Examples: 'TE__/H/3', '__AU/V/1', 'T___/V/1,4'"),
            SlotSpecError::TooManyPositions { .. } => Some("Give one position (e.g. 'TE__/H/3') or two for the third slot (e.g. 'T___/V/1,4')"),
            SlotSpecError::ZeroPosition { .. } => Some("The first cell of a pattern is position 1"),
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

impl LexiconError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            LexiconError::Unavailable => "L001",
            LexiconError::Io { .. } => "L002",
            LexiconError::MalformedRecord { .. } => "L003",
            LexiconError::Matcher { .. } => "L004",
            LexiconError::DuplicateKey { .. } => "L005",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            LexiconError::Unavailable => "No lexicon is loaded or reachable",
            LexiconError::Io { .. } => "Reading a lexicon file failed",
            LexiconError::MalformedRecord { .. } => "A stored record could not be decoded",
            LexiconError::Matcher { .. } => "A pattern could not be turned into a matcher",
            LexiconError::DuplicateKey { .. } => "Two records share a normalized form",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            LexiconError::Unavailable => "The query was sent to a lexicon that has nothing loaded (or whose backing store cannot be reached). The current request fails; previously displayed results are kept.",
            LexiconError::Io { .. } => "The lexicon file could not be opened or is not valid UTF-8.",
            LexiconError::MalformedRecord { .. } => "In strict loading mode every non-blank, non-comment line must be `word;definitions;favorite;active` with numeric optional fields.",
            LexiconError::Matcher { .. } => "The compiled pattern produced a regular expression that could not be built. This is usually a bug.",
            LexiconError::DuplicateKey { .. } => "In strict loading mode two lines normalized to the same uppercase, whitespace-free form.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            LexiconError::Unavailable => Some("Load a lexicon first (e.g. `--lexicon path/to/lexicon.txt`)"),
            LexiconError::Io { .. } => Some("Check that the file exists and is readable UTF-8 text"),
            LexiconError::MalformedRecord { .. } => Some("Expected format: word;definitions;favorite;active (e.g. 'seau;2;1;1' or just 'seau')"),
            LexiconError::DuplicateKey { .. } => Some("Remove one of the lines, or load in lenient mode to keep the first"),
            LexiconError::Matcher { .. } => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<LexiconError> {
        vec![
            LexiconError::Unavailable,
            LexiconError::Io { path: "x.txt".to_string(), source: io::Error::new(io::ErrorKind::NotFound, "gone") },
            LexiconError::MalformedRecord { line: 3, text: "seau;x".to_string() },
            LexiconError::Matcher {
                pattern: "(".to_string(),
                source: Box::new(fancy_regex::Regex::new("(").unwrap_err()),
            },
            LexiconError::DuplicateKey { key: "SEAU".to_string(), line: 9 },
        ]
    }

    #[test]
    fn test_error_codes_and_help() {
        let err = LexiconError::Unavailable;
        assert_eq!(err.code(), "L001");
        assert!(err.help().is_some());
        let detailed = err.display_detailed();
        assert!(detailed.contains("L001"));
        assert!(detailed.contains("Load a lexicon"));
    }

    /// Test that all `LexiconError` variants have unique error codes
    #[test]
    fn test_all_error_codes_are_unique() {
        let mut codes = std::collections::HashSet::new();
        for err in all_variants() {
            let code = err.code();
            assert!(codes.insert(code), "Duplicate error code found: {}", code);
        }
        assert_eq!(codes.len(), 5);
    }

    /// Test that all error codes follow the format L0XX
    #[test]
    fn test_error_code_format() {
        for err in all_variants() {
            let code = err.code();
            assert_eq!(code.len(), 4, "Error code '{}' should be 4 characters (L0XX)", code);
            assert!(code.starts_with("L0"), "Error code '{}' should start with 'L0'", code);
            assert!(code[1..].parse::<u16>().is_ok(), "Error code '{}' should end with a number", code);
        }
    }

    #[test]
    fn test_display_detailed_without_help() {
        let err = all_variants().remove(3);
        assert!(err.help().is_none());
        let detailed = err.display_detailed();
        assert!(detailed.ends_with("(L004)"));
        assert!(!detailed.contains('\n'));
    }

    #[test]
    fn test_error_messages_include_context() {
        let err = LexiconError::MalformedRecord { line: 12, text: "seau;deux".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("seau;deux"));

        let err = LexiconError::DuplicateKey { key: "SEAU".to_string(), line: 4 };
        assert!(err.display_detailed().contains("SEAU"));
    }

    #[test]
    fn test_slot_spec_error_codes() {
        let errors = [
            SlotSpecError::Invalid { spec: "x".to_string() },
            SlotSpecError::TooManyPositions { spec: "x".to_string(), count: 3 },
            SlotSpecError::ZeroPosition { spec: "x".to_string() },
        ];
        let codes: std::collections::HashSet<&str> = errors.iter().map(SlotSpecError::code).collect();
        assert_eq!(codes.len(), 3);
        for err in &errors {
            assert!(err.code().starts_with('P'));
            assert!(err.display_detailed().contains(err.code()));
            assert!(err.help().is_some());
        }
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;
        let err = LexiconError::Io { path: "missing.txt".to_string(), source: io::Error::new(io::ErrorKind::NotFound, "gone") };
        assert!(err.to_string().contains("missing.txt"));
        assert!(err.source().is_some());
    }
}
