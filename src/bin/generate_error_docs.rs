//! Generate the error code reference from the error enums themselves.
//!
//! Codes, descriptions, details and help text come from each type's
//! `code()`, `description()`, `details()` and `help()` methods.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use std::fmt::Write;
use std::io;

use croisement::errors::{LexiconError, SlotSpecError};
use croisement::solver::{Advisory, SolverError};

/// Append one section per value; works for any type with `code()`,
/// `description()`, `details()`, `help()` and `display_detailed()`.
macro_rules! write_error_docs {
    ($out:expr, $errors:expr) => {
        for error in $errors {
            let _ = writeln!($out, "### {}: {}\n", error.code(), error.description());
            let _ = writeln!($out, "**Details:** {}\n", error.details());

            if let Some(help_text) = error.help() {
                let _ = writeln!($out, "**How to fix:**\n```\n{help_text}\n```\n");
            }

            let _ = writeln!($out, "**Example message:**\n```\n{error}\n```\n");
            let _ = writeln!($out, "**Detailed format:**\n```\n{}\n```\n", error.display_detailed());
            let _ = writeln!($out, "---\n");
        }
    };
}

fn all_lexicon_error_variants() -> Vec<LexiconError> {
    vec![
        LexiconError::Unavailable,
        LexiconError::Io {
            path: "data/lexicon.txt".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        },
        LexiconError::MalformedRecord { line: 12, text: "seau;deux".to_string() },
        LexiconError::Matcher {
            pattern: "TE(_".to_string(),
            source: Box::new(fancy_regex::Regex::new("(").unwrap_err()),
        },
        LexiconError::DuplicateKey { key: "SEAU".to_string(), line: 40 },
    ]
}

fn all_slot_spec_error_variants() -> Vec<SlotSpecError> {
    vec![
        SlotSpecError::Invalid { spec: "TE__/D/3".to_string() },
        SlotSpecError::TooManyPositions { spec: "TE__/H/1,2,3".to_string(), count: 3 },
        SlotSpecError::ZeroPosition { spec: "TE__/H/0".to_string() },
    ]
}

fn all_solver_error_variants() -> Vec<SolverError> {
    vec![SolverError::RetrievalFailed { slot: 1, source: LexiconError::Unavailable }]
}

fn all_advisories() -> Vec<Advisory> {
    vec![
        Advisory::WrongSlotCount { count: 4 },
        Advisory::EmptyPattern { slot: 2 },
        Advisory::MissingCrossing { slot: 3 },
        Advisory::CrossingOutOfRange { slot: 1, position: 5, cell_count: 4 },
        Advisory::OrientationConflict { first: 1, second: 2 },
    ]
}

fn render() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Error Code Reference\n");
    let _ = writeln!(out, "**⚠️ This document is auto-generated from the source code. Do not edit manually.**\n");

    let _ = writeln!(out, "## Table of Contents\n");
    let _ = writeln!(out, "- [Solver Errors (S001)](#solver-errors)");
    let _ = writeln!(out, "- [Lexicon Errors (L001–L005)](#lexicon-errors)");
    let _ = writeln!(out, "- [Slot Spec Errors (P001–P003)](#slot-spec-errors)");
    let _ = writeln!(out, "- [Advisories (A001–A005)](#advisories)\n");

    let _ = writeln!(out, "## Solver Errors\n");
    let _ = writeln!(out, "A crossing search failed because the lexicon could not answer.\n");
    write_error_docs!(out, all_solver_error_variants());

    let _ = writeln!(out, "## Lexicon Errors\n");
    let _ = writeln!(out, "Loading or querying the lexicon failed.\n");
    write_error_docs!(out, all_lexicon_error_variants());

    let _ = writeln!(out, "## Slot Spec Errors\n");
    let _ = writeln!(out, "A `--slot` argument could not be parsed.\n");
    write_error_docs!(out, all_slot_spec_error_variants());

    let _ = writeln!(out, "## Advisories\n");
    let _ = writeln!(out, "Not errors: the search was not attempted and nothing was retrieved. Fix the request and try again.\n");
    write_error_docs!(out, all_advisories());

    let _ = writeln!(out, "## Error Display Formats\n");
    let _ = writeln!(out, "### Simple Format\n```\nError: <message>\n```\n");
    let _ = writeln!(out, "### Detailed Format (via `display_detailed()`)\n```\n<message> (<code>)\n<help text if available>\n```");
    out
}

fn main() {
    print!("{}", render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_is_documented() {
        let docs = render();
        let codes = all_solver_error_variants()
            .iter()
            .map(SolverError::code)
            .chain(all_lexicon_error_variants().iter().map(LexiconError::code))
            .chain(all_slot_spec_error_variants().iter().map(SlotSpecError::code))
            .chain(all_advisories().iter().map(Advisory::code))
            .collect::<Vec<_>>();
        assert_eq!(codes.len(), 14);
        for code in codes {
            assert!(docs.contains(&format!("### {code}: ")), "{code} missing");
        }
    }

    #[test]
    fn test_nested_error_is_shown() {
        let docs = render();
        assert!(docs.contains("caused by: lexicon unavailable (L001)"));
    }
}
