//! The crossing solver: fill two or three mutually crossing slots from a lexicon.
//!
//! # Error Handling
//!
//! Problems with the request itself (unset crossing, position past the end of
//! a pattern, slots on the same axis, ...) are not errors: the solve is simply
//! not attempted and [`SolveStatus::NotAttempted`] carries an [`Advisory`]
//! explaining why. Only a lexicon that cannot answer is an error:
//!
//! - S001: `RetrievalFailed` (The lexicon failed while retrieving a slot's candidates)
//!
//! # Examples
//!
//! ```
//! use croisement::lexicon::Lexicon;
//! use croisement::slot::{Orientation, SlotConstraint};
//! use croisement::solver::{self, SearchBounds};
//! use croisement::word_record::WordRecord;
//!
//! let lexicon = Lexicon::from_records(["tesor", "temps", "seau", "veau"].map(WordRecord::new));
//! let slots = [
//!     SlotConstraint::new("TE__", Orientation::Horizontal).crossing_at(3),
//!     SlotConstraint::new("-AU*", Orientation::Vertical).crossing_at(1),
//! ];
//!
//! let result = solver::solve(&slots, &lexicon, SearchBounds::default())?;
//! for solution in &result.solutions {
//!     println!("{solution}"); // tesor • seau
//! }
//! assert_eq!(result.solutions.len(), 1);
//! # Ok::<(), solver::SolverError>(())
//! ```
//!
//! # Enumeration order
//!
//! Solutions come out in slot-1 retrieval order, then (three slots) in the
//! order slot 2's crossing characters first appear in its retrieval order, then
//! slot-2 and slot-3 retrieval order. `max_solutions` cuts this sequence, so
//! which solutions survive the cut is deterministic for a fixed lexicon.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use instant::Instant;
use log::debug;

use crate::errors::{format_error_with_code_and_help, LexiconError};
use crate::index::{index_by_pair, index_by_position};
use crate::lexicon::LexiconQuery;
use crate::pattern::PatternSpec;
use crate::slot::SlotConstraint;
use crate::word_record::WordRecord;

/// Default cap on candidates retrieved per slot.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 1200;
/// Default cap on solutions returned.
pub const DEFAULT_MAX_SOLUTIONS: usize = 500;

/// Hard caps keeping a search tractable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// At most this many candidates are retrieved for each slot.
    pub candidate_limit: usize,
    /// Enumeration stops once this many solutions are found.
    pub max_solutions: usize,
}

impl Default for SearchBounds {
    fn default() -> Self {
        SearchBounds { candidate_limit: DEFAULT_CANDIDATE_LIMIT, max_solutions: DEFAULT_MAX_SOLUTIONS }
    }
}

/// One word per slot, in slot order, satisfying every crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionTuple {
    pub words: Vec<Arc<WordRecord>>,
}

impl SolutionTuple {
    /// Display forms, in slot order.
    #[must_use]
    pub fn displays(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.display.as_str()).collect()
    }
}

impl Display for SolutionTuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.displays().join(" • "))
    }
}

/// Why a solve was not attempted. Slots are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    WrongSlotCount { count: usize },
    EmptyPattern { slot: usize },
    MissingCrossing { slot: usize },
    CrossingOutOfRange { slot: usize, position: usize, cell_count: usize },
    OrientationConflict { first: usize, second: usize },
}

impl Advisory {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Advisory::WrongSlotCount { .. } => "A001",
            Advisory::EmptyPattern { .. } => "A002",
            Advisory::MissingCrossing { .. } => "A003",
            Advisory::CrossingOutOfRange { .. } => "A004",
            Advisory::OrientationConflict { .. } => "A005",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Advisory::WrongSlotCount { .. } => "A crossing search needs two or three slots",
            Advisory::EmptyPattern { .. } => "A slot's pattern leaves nothing to match",
            Advisory::MissingCrossing { .. } => "A slot has no crossing position yet",
            Advisory::CrossingOutOfRange { .. } => "A crossing position is past the end of its pattern",
            Advisory::OrientationConflict { .. } => "Two crossing slots run along the same axis",
        }
    }

    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            Advisory::WrongSlotCount { .. } => "Slot 1 crosses slot 2 (two slots), or slot 3 crosses both slot 1 and slot 2 (three slots).",
            Advisory::EmptyPattern { .. } => "Empty patterns, patterns made only of the '-' and '*' markers, and patterns made only of '_' wildcards compile to nothing.",
            Advisory::MissingCrossing { .. } => "Slots 1 and 2 need one crossing position each; slot 3 needs two (where it meets slot 1, then slot 2).",
            Advisory::CrossingOutOfRange { .. } => "Positions count the pattern's cells from 1, markers excluded. Shortening a pattern can leave a position dangling.",
            Advisory::OrientationConflict { .. } => "Two slots can only cross when one is horizontal and the other vertical.",
        }
    }

    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Advisory::WrongSlotCount { .. } => Some("Give two slots, or three with the third crossing the first two"),
            Advisory::EmptyPattern { .. } => Some("Type at least one letter, e.g. 'TE__'"),
            Advisory::MissingCrossing { .. } => Some("Pick the cell where the slots meet, e.g. 'TE__/H/3'"),
            Advisory::CrossingOutOfRange { .. } => Some("Pick a position between 1 and the number of cells"),
            Advisory::OrientationConflict { .. } => Some("Make one slot horizontal (H) and the other vertical (V)"),
        }
    }

    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::WrongSlotCount { count } => write!(f, "expected 2 or 3 slots, got {count}"),
            Advisory::EmptyPattern { slot } => write!(f, "slot {slot}: pattern is empty"),
            Advisory::MissingCrossing { slot } => write!(f, "slot {slot}: crossing position not set"),
            Advisory::CrossingOutOfRange { slot, position, cell_count } => {
                write!(f, "slot {slot}: crossing position {position} outside 1..={cell_count}")
            }
            Advisory::OrientationConflict { first, second } => {
                write!(f, "slots {first} and {second} have the same orientation")
            }
        }
    }
}

/// How a solve ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// Preconditions failed; nothing was retrieved.
    NotAttempted(Advisory),
    /// Stopped because `max_solutions` was reached.
    FoundEnough,
    /// Every combination of the retrieved candidates was examined.
    CandidatesExhausted,
}

/// Outcome of a solve that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub solutions: Vec<SolutionTuple>,
    /// Candidates retrieved per slot (not limited by `max_solutions`).
    pub candidate_counts: Vec<usize>,
    pub status: SolveStatus,
}

impl SolveResult {
    pub(crate) fn not_attempted(slot_count: usize, advisory: Advisory) -> Self {
        SolveResult { solutions: Vec::new(), candidate_counts: vec![0; slot_count], status: SolveStatus::NotAttempted(advisory) }
    }

    #[must_use]
    pub fn attempted(&self) -> bool {
        !matches!(self.status, SolveStatus::NotAttempted(_))
    }

    #[must_use]
    pub fn advisory(&self) -> Option<&Advisory> {
        match &self.status {
            SolveStatus::NotAttempted(advisory) => Some(advisory),
            _ => None,
        }
    }
}

/// Error type for the solver.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The lexicon could not answer for one slot (numbered from 1). No
    /// solutions are produced for the request.
    #[error("retrieval failed for slot {slot}: {source}")]
    RetrievalFailed {
        slot: usize,
        #[source]
        source: LexiconError,
    },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::RetrievalFailed { .. } => "S001",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SolverError::RetrievalFailed { .. } => "The lexicon failed while retrieving a slot's candidates",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SolverError::RetrievalFailed { .. } => "Retrieval failures are fatal to the current request only. This wraps a LexiconError (see Lexicon Errors for specific codes).",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::RetrievalFailed { .. } => None, // LexiconError has its own help
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::RetrievalFailed { slot, source } => {
                format!("{} (slot {slot})\n  caused by: {}", self.code(), source.display_detailed())
            }
        }
    }
}

/// A compiled slot together with the position(s) where it crosses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    pub spec: PatternSpec,
    pub slot: SlotConstraint,
}

/// A request whose preconditions all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossingPlan {
    /// Slot 1 crosses slot 2.
    Pair { first: PlannedSlot, first_at: usize, second: PlannedSlot, second_at: usize },
    /// Slot 3 crosses slot 1 (at `third_at_first`) and slot 2 (at `third_at_second`).
    Triple {
        first: PlannedSlot,
        first_at: usize,
        second: PlannedSlot,
        second_at: usize,
        third: PlannedSlot,
        third_at_first: usize,
        third_at_second: usize,
    },
}

impl CrossingPlan {
    /// Planned slots, in slot order.
    #[must_use]
    pub fn slots(&self) -> Vec<&PlannedSlot> {
        match self {
            CrossingPlan::Pair { first, second, .. } => vec![first, second],
            CrossingPlan::Triple { first, second, third, .. } => vec![first, second, third],
        }
    }

    /// Compiled patterns, in slot order.
    #[must_use]
    pub fn specs(&self) -> Vec<&PatternSpec> {
        self.slots().into_iter().map(|p| &p.spec).collect()
    }
}

/// Check a request's preconditions.
///
/// Checks run in this order and the first failure is reported: slot count,
/// patterns, crossing positions set, positions within their pattern,
/// orientations.
///
/// # Errors
///
/// The [`Advisory`] describing the first failed precondition.
pub fn plan(slots: &[SlotConstraint]) -> Result<CrossingPlan, Advisory> {
    if !(2..=3).contains(&slots.len()) {
        return Err(Advisory::WrongSlotCount { count: slots.len() });
    }

    let mut planned = Vec::with_capacity(slots.len());
    for (i, slot) in slots.iter().enumerate() {
        let spec = slot.compile().ok_or(Advisory::EmptyPattern { slot: i + 1 })?;
        planned.push(PlannedSlot { spec, slot: slot.clone() });
    }

    let third = slots.len() == 3;
    let mut positions = Vec::with_capacity(4);
    for (i, p) in planned.iter().enumerate() {
        let missing = Advisory::MissingCrossing { slot: i + 1 };
        positions.push((i, p.slot.crossing.ok_or(missing.clone())?));
        if i == 2 {
            positions.push((i, p.slot.second_crossing.ok_or(missing)?));
        }
    }

    for &(i, position) in &positions {
        let cell_count = planned[i].spec.cell_count();
        if !(1..=cell_count).contains(&position) {
            return Err(Advisory::CrossingOutOfRange { slot: i + 1, position, cell_count });
        }
    }

    let orientation = |i: usize| planned[i].slot.orientation;
    if third {
        for other in [0, 1] {
            if orientation(other) == orientation(2) {
                return Err(Advisory::OrientationConflict { first: other + 1, second: 3 });
            }
        }
    } else if orientation(0) == orientation(1) {
        return Err(Advisory::OrientationConflict { first: 1, second: 2 });
    }

    let at = |k: usize| positions[k].1;
    let mut planned = planned.into_iter();
    // three or two items, checked above
    let (Some(first), Some(second)) = (planned.next(), planned.next()) else {
        return Err(Advisory::WrongSlotCount { count: slots.len() });
    };
    Ok(match planned.next() {
        Some(third) => CrossingPlan::Triple {
            first,
            first_at: at(0),
            second,
            second_at: at(1),
            third,
            third_at_first: at(2),
            third_at_second: at(3),
        },
        None => CrossingPlan::Pair { first, first_at: at(0), second, second_at: at(1) },
    })
}

/// Retrieve candidates for every planned slot, in slot order.
///
/// # Errors
///
/// [`SolverError::RetrievalFailed`] for the first slot whose query fails; no
/// partial results are returned.
pub fn retrieve<L: LexiconQuery + ?Sized>(
    plan: &CrossingPlan,
    lexicon: &L,
    candidate_limit: usize,
) -> Result<Vec<Vec<Arc<WordRecord>>>, SolverError> {
    plan.specs()
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            lexicon
                .find_by_pattern(spec, candidate_limit)
                .map_err(|source| SolverError::RetrievalFailed { slot: i + 1, source })
        })
        .collect()
}

/// Collects tuples until the bound is reached.
struct Collector {
    solutions: Vec<SolutionTuple>,
    max_solutions: usize,
}

impl Collector {
    fn new(max_solutions: usize) -> Self {
        Collector { solutions: Vec::with_capacity(max_solutions.min(1000)), max_solutions }
    }

    fn is_full(&self) -> bool {
        self.solutions.len() >= self.max_solutions
    }

    fn push(&mut self, words: &[&Arc<WordRecord>]) {
        debug_assert!(!self.is_full(), "pushed past max_solutions");
        self.solutions.push(SolutionTuple { words: words.iter().map(|w| Arc::clone(w)).collect() });
    }
}

/// Enumerate all crossing-consistent tuples of already retrieved candidates.
///
/// `candidates` holds one list per planned slot, in slot order.
#[must_use]
pub fn enumerate(plan: &CrossingPlan, candidates: &[Vec<Arc<WordRecord>>], max_solutions: usize) -> SolveResult {
    debug_assert_eq!(candidates.len(), plan.slots().len(), "one candidate list per slot");

    let t_enumerate = Instant::now();
    let mut out = Collector::new(max_solutions);

    match plan {
        CrossingPlan::Pair { first_at, second_at, .. } => {
            let index_second = index_by_position(&candidates[1], *second_at);
            debug!("slot 2 indexed at {second_at}: {} bucket(s)", index_second.len());

            'first: for a in &candidates[0] {
                let Some(letter) = a.char_at(*first_at) else {
                    continue;
                };
                for b in index_second.get(letter) {
                    if out.is_full() {
                        break 'first;
                    }
                    out.push(&[a, *b]);
                }
            }
        }
        CrossingPlan::Triple { first_at, second_at, third_at_first, third_at_second, .. } => {
            let index_third = index_by_pair(&candidates[2], *third_at_first, *third_at_second);
            let index_second = index_by_position(&candidates[1], *second_at);
            debug!(
                "slot 3 indexed at ({third_at_first}, {third_at_second}): {} bucket(s); slot 2 indexed at {second_at}: {} bucket(s)",
                index_third.len(),
                index_second.len()
            );

            'first: for a in &candidates[0] {
                let Some(first_letter) = a.char_at(*first_at) else {
                    continue;
                };
                for (second_letter, group_second) in index_second.iter() {
                    let group_third = index_third.get((first_letter, second_letter));
                    if group_third.is_empty() {
                        continue;
                    }
                    for b in group_second {
                        for c in group_third {
                            if out.is_full() {
                                break 'first;
                            }
                            out.push(&[a, *b, *c]);
                        }
                    }
                }
            }
        }
    }

    let status = if out.is_full() { SolveStatus::FoundEnough } else { SolveStatus::CandidatesExhausted };
    let candidate_counts: Vec<usize> = candidates.iter().map(Vec::len).collect();
    debug!(
        "enumerated {} solution(s) from {:?} candidate(s) in {:.3}ms ({:?})",
        out.solutions.len(),
        candidate_counts,
        t_enumerate.elapsed().as_secs_f64() * 1000.0,
        status
    );

    debug_assert!(out.solutions.len() <= max_solutions, "bound must hold");
    SolveResult { solutions: out.solutions, candidate_counts, status }
}

/// Solve a crossing request against a lexicon.
///
/// Preconditions are checked before anything is retrieved; when one fails
/// the result is empty, every candidate count is 0 and the status is
/// [`SolveStatus::NotAttempted`].
///
/// # Errors
///
/// [`SolverError::RetrievalFailed`] if the lexicon cannot answer for a slot.
pub fn solve<L: LexiconQuery + ?Sized>(
    slots: &[SlotConstraint],
    lexicon: &L,
    bounds: SearchBounds,
) -> Result<SolveResult, SolverError> {
    let plan = match plan(slots) {
        Ok(plan) => plan,
        Err(advisory) => {
            debug!("solve not attempted: {advisory}");
            return Ok(SolveResult::not_attempted(slots.len(), advisory));
        }
    };

    let candidates = retrieve(&plan, lexicon, bounds.candidate_limit)?;
    Ok(enumerate(&plan, &candidates, bounds.max_solutions))
}
