//! The lexicon contract consumed by the crossing engine, and an
//! in-memory implementation of it.
//!
//! The engine only needs [`LexiconQuery`]: given a compiled [`PatternSpec`] and a
//! result bound, return matching records in the lexicon's own relevance order.
//! [`Lexicon`] implements that contract over a list loaded from text (or built
//! from records), so the engine can run end-to-end without an external store.
//!
//! Ordering policy (applied to every query):
//! 1. favorites first
//! 2. more definitions first
//! 3. display form, case-insensitive ascending
//! 4. insertion order
//!
//! The text format is one record per line, `word;definitions;favorite;active`,
//! with every field after `word` optional:
//!
//! ```text
//! # comment
//! seau;2;1;1
//! tesor;1
//! temps
//! ```
//!
//! [`Lexicon::parse_from_str`] touches no filesystem and so works in WASM
//! builds; [`Lexicon::load_from_path`] is native-only.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock};

use fancy_regex::Regex;
use log::{debug, info, warn};

use crate::errors::LexiconError;
use crate::pattern::PatternSpec;
use crate::word_record::WordRecord;

/// Pattern lookups against a lexicon.
///
/// Implementations must honour all four [`crate::pattern::MatchMode`]s with `_`
/// matching exactly one character, return at most `limit` records, and order
/// them by a fixed policy so that repeated queries give identical results.
pub trait LexiconQuery {
    /// Records whose normalized form matches `spec`, best first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns a [`LexiconError`] when the store cannot answer.
    fn find_by_pattern(&self, spec: &PatternSpec, limit: usize) -> Result<Vec<Arc<WordRecord>>, LexiconError>;
}

impl<T: LexiconQuery + ?Sized> LexiconQuery for &T {
    fn find_by_pattern(&self, spec: &PatternSpec, limit: usize) -> Result<Vec<Arc<WordRecord>>, LexiconError> {
        (**self).find_by_pattern(spec, limit)
    }
}

/// Extra restrictions for a standalone pattern search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub favorites_only: bool,
    pub active_only: bool,
}

impl SearchFilter {
    fn admits(self, record: &WordRecord) -> bool {
        (!self.favorites_only || record.favorite) && (!self.active_only || record.active)
    }
}

/// How to treat bad lines when loading from text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Skip malformed lines and later duplicates (with a warning).
    #[default]
    Lenient,
    /// Fail on the first malformed line or duplicate key.
    Strict,
}

/// In-memory lexicon, kept sorted by the ordering policy.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    records: Vec<Arc<WordRecord>>,
    by_key: HashMap<String, usize>,
    unavailable: bool,
}

/// Global, lazily initialized cache of compiled pattern regexes.
///
/// Lock is held only for lookups/inserts; compilation happens outside it.
static REGEX_CACHE: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();

/// Return a compiled `Regex` for `pattern`, caching the result.
fn get_regex(pattern: &str) -> Result<Regex, Box<fancy_regex::Error>> {
    let cache = REGEX_CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Ok(guard) = cache.lock() {
        if let Some(re) = guard.get(pattern).cloned() {
            return Ok(re);
        }
    }

    let compiled = Regex::new(pattern)?;

    // a poisoned lock just means we don't cache
    if let Ok(mut guard) = cache.lock() {
        if let Some(existing) = guard.get(pattern).cloned() {
            return Ok(existing);
        }
        guard.insert(pattern.to_string(), compiled.clone());
    }
    Ok(compiled)
}

/// Ordering policy shared by every query.
fn relevance_order(a: &WordRecord, b: &WordRecord) -> Ordering {
    b.favorite
        .cmp(&a.favorite)
        .then_with(|| b.definition_count.cmp(&a.definition_count))
        .then_with(|| a.display.to_lowercase().cmp(&b.display.to_lowercase()))
        .then_with(|| a.rank.cmp(&b.rank))
}

/// Parse a 0/1 flag field.
fn parse_flag(field: &str) -> Option<bool> {
    match field.trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// Parse one non-blank, non-comment line. `None` means malformed.
fn parse_line(line: &str) -> Option<WordRecord> {
    let mut fields = line.split(';');
    let word = fields.next()?.trim();
    if word.is_empty() {
        return None;
    }

    let mut record = WordRecord::new(word);
    if record.normalized.is_empty() {
        return None;
    }
    if let Some(defs) = fields.next().map(str::trim).filter(|f| !f.is_empty()) {
        record = record.with_definitions(defs.parse().ok()?);
    }
    if let Some(fav) = fields.next().map(str::trim).filter(|f| !f.is_empty()) {
        record = record.with_favorite(parse_flag(fav)?);
    }
    if let Some(active) = fields.next().map(str::trim).filter(|f| !f.is_empty()) {
        record = record.with_active(parse_flag(active)?);
    }
    if fields.next().is_some() {
        return None;
    }
    Some(record)
}

impl Lexicon {
    /// A lexicon with nothing loaded: every query fails with
    /// [`LexiconError::Unavailable`].
    #[must_use]
    pub fn unavailable() -> Self {
        Lexicon { unavailable: true, ..Lexicon::default() }
    }

    /// Build a lexicon from records. Ranks are reassigned from iteration order;
    /// a record whose key was already seen is dropped.
    pub fn from_records<I: IntoIterator<Item = WordRecord>>(records: I) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept: Vec<WordRecord> = Vec::new();
        for record in records {
            if record.normalized.is_empty() || !seen.insert(record.normalized.clone()) {
                continue;
            }
            let rank = kept.len();
            kept.push(record.with_rank(rank));
        }
        Self::from_ranked(kept)
    }

    fn from_ranked(mut records: Vec<WordRecord>) -> Self {
        records.sort_by(relevance_order);
        let records: Vec<Arc<WordRecord>> = records.into_iter().map(Arc::new).collect();
        let by_key = records.iter().enumerate().map(|(i, r)| (r.normalized.clone(), i)).collect();
        Lexicon { records, by_key, unavailable: false }
    }

    /// Parse a lexicon from an in-memory string (WASM-safe).
    ///
    /// # Errors
    ///
    /// In [`LoadMode::Strict`], returns [`LexiconError::MalformedRecord`] or
    /// [`LexiconError::DuplicateKey`] for the first bad line. Lenient loading never fails.
    pub fn parse_from_str(contents: &str, mode: LoadMode) -> Result<Lexicon, LexiconError> {
        let mut records: Vec<WordRecord> = Vec::new();
        let mut first_line_of: HashMap<String, usize> = HashMap::new();

        for (i, raw_line) in contents.lines().enumerate() {
            let line_no = i + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(record) = parse_line(line) else {
                if mode == LoadMode::Strict {
                    return Err(LexiconError::MalformedRecord { line: line_no, text: line.to_string() });
                }
                warn!("skipping malformed lexicon line {line_no}: {line:?}");
                continue;
            };

            if let Some(first) = first_line_of.get(&record.normalized) {
                if mode == LoadMode::Strict {
                    return Err(LexiconError::DuplicateKey { key: record.normalized, line: line_no });
                }
                warn!("skipping duplicate {} at line {line_no} (first seen at line {first})", record.normalized);
                continue;
            }

            first_line_of.insert(record.normalized.clone(), line_no);
            let rank = records.len();
            records.push(record.with_rank(rank));
        }

        Ok(Self::from_ranked(records))
    }

    /// Native-only convenience method: read from a file path and parse.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Io`] if the file cannot be read, or any error of
    /// [`Lexicon::parse_from_str`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P, mode: LoadMode) -> Result<Lexicon, LexiconError> {
        let path_ref = path.as_ref();
        let data = std::fs::read_to_string(path_ref).map_err(|source| LexiconError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let lexicon = Self::parse_from_str(&data, mode)?;
        info!("loaded {} lexicon records from {}", lexicon.len(), path_ref.display());
        Ok(lexicon)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look a record up by its normalized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<WordRecord>> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    /// All records in policy order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<WordRecord>> {
        self.records.iter()
    }

    /// Pattern search with additional filters.
    ///
    /// # Errors
    ///
    /// [`LexiconError::Unavailable`] when nothing is loaded, or
    /// [`LexiconError::Matcher`] if the pattern's regex cannot be built.
    pub fn search(&self, spec: &PatternSpec, limit: usize, filter: SearchFilter) -> Result<Vec<Arc<WordRecord>>, LexiconError> {
        if self.unavailable {
            return Err(LexiconError::Unavailable);
        }

        let regex_str = spec.to_regex_str();
        let matcher = get_regex(&regex_str).map_err(|source| LexiconError::Matcher { pattern: spec.to_string(), source })?;

        let mut found = Vec::with_capacity(limit.min(self.records.len()));
        for record in &self.records {
            if found.len() >= limit {
                break;
            }
            if !filter.admits(record) {
                continue;
            }
            let is_match = matcher
                .is_match(&record.normalized)
                .map_err(|source| LexiconError::Matcher { pattern: spec.to_string(), source: Box::new(source) })?;
            debug_assert_eq!(
                is_match,
                spec.matches(&record.normalized),
                "regex and direct matching disagree on {} for {}",
                record.normalized,
                spec.to_like()
            );
            if is_match {
                found.push(Arc::clone(record));
            }
        }

        debug!("{} LIKE {:?} -> {} record(s) (limit {limit})", spec, spec.to_like(), found.len());
        Ok(found)
    }
}

impl LexiconQuery for Lexicon {
    fn find_by_pattern(&self, spec: &PatternSpec, limit: usize) -> Result<Vec<Arc<WordRecord>>, LexiconError> {
        self.search(spec, limit, SearchFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    fn displays(records: &[Arc<WordRecord>]) -> Vec<&str> {
        records.iter().map(|r| r.display.as_str()).collect()
    }

    fn sample() -> Lexicon {
        Lexicon::parse_from_str(
            "temps;1\ntesor;0\nseau;2;1\nveau;2\ntenu;0;0;0\nbeau;5\nau;0\n",
            LoadMode::Lenient,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let lexicon = sample();
        assert_eq!(lexicon.len(), 7);
        let seau = lexicon.get("SEAU").unwrap();
        assert_eq!(seau.definition_count, 2);
        assert!(seau.favorite);
        assert!(seau.active);
        assert!(!lexicon.get("TENU").unwrap().active);
    }

    #[test]
    fn test_policy_order() {
        let lexicon = sample();
        let order: Vec<&str> = lexicon.iter().map(|r| r.display.as_str()).collect();
        // favorite, then definitions desc, then case-insensitive alphabetical
        assert_eq!(order, vec!["seau", "beau", "veau", "temps", "au", "tenu", "tesor"]);
    }

    #[test]
    fn test_order_is_case_insensitive() {
        let lexicon = Lexicon::from_records(vec![WordRecord::new("bar"), WordRecord::new("Abc"), WordRecord::new("aaa")]);
        let order: Vec<&str> = lexicon.iter().map(|r| r.display.as_str()).collect();
        assert_eq!(order, vec!["aaa", "Abc", "bar"]);
    }

    #[test]
    fn test_find_by_pattern_modes() {
        let lexicon = sample();
        let find = |raw: &str| displays(&lexicon.find_by_pattern(&compile(raw).unwrap(), 100).unwrap()).join(",");

        assert_eq!(find("TE__*"), "tenu");
        assert_eq!(find("TE__"), "temps,tenu,tesor");
        assert_eq!(find("-EAU*"), "seau,beau,veau");
        assert_eq!(find("-AU"), "seau,beau,veau,au");
        assert_eq!(find("_EAU*"), "seau,beau,veau");
    }

    #[test]
    fn test_find_by_pattern_respects_limit() {
        let lexicon = sample();
        let found = lexicon.find_by_pattern(&compile("-AU").unwrap(), 2).unwrap();
        assert_eq!(displays(&found), vec!["seau", "beau"]);

        let none = lexicon.find_by_pattern(&compile("-AU").unwrap(), 0).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_filters() {
        let lexicon = sample();
        let spec = compile("-E").unwrap();
        let favorites = lexicon.search(&spec, 100, SearchFilter { favorites_only: true, active_only: false }).unwrap();
        assert_eq!(displays(&favorites), vec!["seau"]);

        let te = compile("TE").unwrap();
        let active = lexicon.search(&te, 100, SearchFilter { favorites_only: false, active_only: true }).unwrap();
        assert_eq!(displays(&active), vec!["temps", "tesor"]);
    }

    #[test]
    fn test_unavailable_lexicon_fails() {
        let lexicon = Lexicon::unavailable();
        let result = lexicon.find_by_pattern(&compile("TE").unwrap(), 10);
        assert!(matches!(result, Err(LexiconError::Unavailable)));
    }

    #[test]
    fn test_query_through_reference() {
        fn count<L: LexiconQuery>(l: L) -> usize {
            l.find_by_pattern(&compile("TE").unwrap(), 10).unwrap().len()
        }
        let lexicon = sample();
        assert_eq!(count(&lexicon), 3);
    }

    #[test]
    fn test_from_records_drops_duplicate_keys() {
        let lexicon = Lexicon::from_records(vec![
            WordRecord::new("Seau").with_definitions(1),
            WordRecord::new("se au").with_definitions(9),
        ]);
        assert_eq!(lexicon.len(), 1);
        assert_eq!(lexicon.get("SEAU").unwrap().definition_count, 1);
    }

    mod loading {
        use super::*;

        #[test]
        fn test_skips_blank_and_comment_lines() {
            let lexicon = Lexicon::parse_from_str("# header\n\n  seau \n\n# tail", LoadMode::Strict).unwrap();
            assert_eq!(lexicon.len(), 1);
        }

        #[test]
        fn test_lenient_skips_malformed_lines() {
            let lexicon = Lexicon::parse_from_str("seau;deux\nveau;1;2\nbeau;1;1;1;extra\n;3\ntemps", LoadMode::Lenient).unwrap();
            assert_eq!(displays(&lexicon.iter().cloned().collect::<Vec<_>>()), vec!["temps"]);
        }

        #[test]
        fn test_strict_rejects_malformed_line() {
            let err = Lexicon::parse_from_str("seau\nveau;x", LoadMode::Strict).unwrap_err();
            assert!(matches!(err, LexiconError::MalformedRecord { line: 2, ref text } if text == "veau;x"));
        }

        #[test]
        fn test_lenient_keeps_first_duplicate() {
            let lexicon = Lexicon::parse_from_str("seau;1\nSEAU;4", LoadMode::Lenient).unwrap();
            assert_eq!(lexicon.len(), 1);
            assert_eq!(lexicon.get("SEAU").unwrap().definition_count, 1);
        }

        #[test]
        fn test_strict_rejects_duplicate() {
            let err = Lexicon::parse_from_str("seau\n\nSe au", LoadMode::Strict).unwrap_err();
            assert!(matches!(err, LexiconError::DuplicateKey { line: 3, ref key } if key == "SEAU"));
        }

        #[test]
        fn test_load_missing_file() {
            let err = Lexicon::load_from_path("definitely/not/here.txt", LoadMode::Lenient).unwrap_err();
            assert_eq!(err.code(), "L002");
        }

        #[test]
        fn test_ranks_follow_input_order() {
            let lexicon = Lexicon::parse_from_str("b\na\n", LoadMode::Strict).unwrap();
            assert_eq!(lexicon.get("B").unwrap().rank, 0);
            assert_eq!(lexicon.get("A").unwrap().rank, 1);
        }
    }
}
