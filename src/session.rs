//! Request sequencing for interactive solving.
//!
//! Every change to a request dispatches a new [`Ticket`]. A solve run under a
//! ticket only applies its result if no newer ticket was dispatched in the
//! meantime, so a slow answer to an old request can never overwrite the
//! answer to a newer one. Cancellation is cooperative: an in-flight retrieval
//! is not interrupted, its result is just dropped.
//!
//! ```
//! use croisement::lexicon::Lexicon;
//! use croisement::session::{SessionOutcome, SolveSession};
//! use croisement::slot::SlotConstraint;
//! use croisement::solver::SearchBounds;
//! use croisement::word_record::WordRecord;
//!
//! let session = SolveSession::new(Lexicon::from_records(["tesor", "seau"].map(WordRecord::new)));
//! let slots: Vec<SlotConstraint> = ["TE__/H/3", "__AU/V/1"].iter().map(|s| s.parse().unwrap()).collect();
//!
//! let old = session.dispatch();
//! let new = session.dispatch();
//! assert!(matches!(session.run(old, &slots, SearchBounds::default())?, SessionOutcome::Stale { .. }));
//! assert!(matches!(session.run(new, &slots, SearchBounds::default())?, SessionOutcome::Applied(_)));
//! # Ok::<(), croisement::solver::SolverError>(())
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::lexicon::LexiconQuery;
use crate::solver::{self, CrossingPlan, SearchBounds, SolveResult, SolverError};
use crate::slot::SlotConstraint;
use crate::word_record::WordRecord;

/// Sequence number of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Rebuild a ticket handed across an FFI boundary as a plain number.
    #[cfg(target_arch = "wasm32")]
    pub(crate) fn from_sequence(sequence: u64) -> Self {
        Ticket(sequence)
    }

    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new request. Every earlier ticket becomes stale.
    pub fn dispatch(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently dispatched ticket (`#0` before any dispatch).
    #[must_use]
    pub fn latest(&self) -> Ticket {
        Ticket(self.latest.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest() == ticket
    }
}

/// What happened to a request run under some ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The ticket was still current; the result is now the session's last result.
    Applied(SolveResult),
    /// A newer ticket was dispatched; the result was discarded.
    Stale { ticket: Ticket, latest: Ticket },
}

/// A lexicon plus the sequencing state of one interactive user.
#[derive(Debug)]
pub struct SolveSession<L> {
    lexicon: L,
    sequencer: RequestSequencer,
    last_applied: Mutex<Option<(Ticket, SolveResult)>>,
}

impl<L: LexiconQuery + Sync> SolveSession<L> {
    pub fn new(lexicon: L) -> Self {
        SolveSession { lexicon, sequencer: RequestSequencer::new(), last_applied: Mutex::new(None) }
    }

    pub fn lexicon(&self) -> &L {
        &self.lexicon
    }

    /// Tag a new request; see [`RequestSequencer::dispatch`].
    pub fn dispatch(&self) -> Ticket {
        self.sequencer.dispatch()
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.sequencer.is_current(ticket)
    }

    fn last_applied(&self) -> MutexGuard<'_, Option<(Ticket, SolveResult)>> {
        // a panic while holding the lock cannot leave a half-written result
        self.last_applied.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The most recently applied result, if any.
    #[must_use]
    pub fn last_result(&self) -> Option<SolveResult> {
        self.last_applied().as_ref().map(|(_, result)| result.clone())
    }

    /// Ticket of the most recently applied result.
    #[must_use]
    pub fn last_ticket(&self) -> Option<Ticket> {
        self.last_applied().as_ref().map(|(ticket, _)| *ticket)
    }

    /// Dispatch a ticket and run the request under it straight away.
    ///
    /// # Errors
    ///
    /// See [`SolveSession::run`].
    pub fn submit(&self, slots: &[SlotConstraint], bounds: SearchBounds) -> Result<SessionOutcome, SolverError> {
        let ticket = self.dispatch();
        self.run(ticket, slots, bounds)
    }

    /// Solve `slots` under `ticket`.
    ///
    /// Every slot's candidates are retrieved concurrently and all retrievals
    /// are awaited before enumeration starts. Staleness is checked after
    /// retrieval and again before the result is applied.
    ///
    /// # Errors
    ///
    /// [`SolverError::RetrievalFailed`] if the ticket is still current and a
    /// slot's retrieval failed. The last applied result is left untouched.
    pub fn run(&self, ticket: Ticket, slots: &[SlotConstraint], bounds: SearchBounds) -> Result<SessionOutcome, SolverError> {
        let result = match solver::plan(slots) {
            Err(advisory) => {
                debug!("request {ticket} not attempted: {advisory}");
                SolveResult::not_attempted(slots.len(), advisory)
            }
            Ok(plan) => {
                let retrieved = self.retrieve(&plan, bounds.candidate_limit);
                if !self.is_current(ticket) {
                    return Ok(self.stale(ticket));
                }
                solver::enumerate(&plan, &retrieved?, bounds.max_solutions)
            }
        };
        Ok(self.apply(ticket, result))
    }

    fn stale(&self, ticket: Ticket) -> SessionOutcome {
        let latest = self.sequencer.latest();
        info!("discarding result of request {ticket} (latest is {latest})");
        SessionOutcome::Stale { ticket, latest }
    }

    fn apply(&self, ticket: Ticket, result: SolveResult) -> SessionOutcome {
        let mut last = self.last_applied();
        if !self.is_current(ticket) {
            drop(last);
            return self.stale(ticket);
        }
        *last = Some((ticket, result.clone()));
        debug!("applied request {ticket}: {} solution(s)", result.solutions.len());
        SessionOutcome::Applied(result)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn retrieve(&self, plan: &CrossingPlan, limit: usize) -> Result<Vec<Vec<Arc<WordRecord>>>, SolverError> {
        let lexicon = &self.lexicon;
        std::thread::scope(|scope| {
            let handles: Vec<_> = plan
                .specs()
                .into_iter()
                .map(|spec| scope.spawn(move || lexicon.find_by_pattern(spec, limit)))
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(i, handle)| {
                    let found = handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                    found.map_err(|source| SolverError::RetrievalFailed { slot: i + 1, source })
                })
                .collect()
        })
    }

    // no threads in the browser
    #[cfg(target_arch = "wasm32")]
    fn retrieve(&self, plan: &CrossingPlan, limit: usize) -> Result<Vec<Vec<Arc<WordRecord>>>, SolverError> {
        solver::retrieve(plan, &self.lexicon, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LexiconError;
    use crate::lexicon::Lexicon;
    use crate::pattern::PatternSpec;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn slots(specs: &[&str]) -> Vec<SlotConstraint> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn sample() -> Lexicon {
        Lexicon::from_records(["tesor", "temps", "seau", "veau"].map(WordRecord::new))
    }

    fn applied(outcome: SessionOutcome) -> SolveResult {
        match outcome {
            SessionOutcome::Applied(result) => result,
            SessionOutcome::Stale { ticket, latest } => panic!("request {ticket} unexpectedly stale (latest {latest})"),
        }
    }

    #[test]
    fn test_tickets_increase() {
        let sequencer = RequestSequencer::new();
        assert_eq!(sequencer.latest().sequence(), 0);
        let first = sequencer.dispatch();
        let second = sequencer.dispatch();
        assert!(second > first);
        assert!(sequencer.is_current(second));
        assert!(!sequencer.is_current(first));
    }

    #[test]
    fn test_current_request_is_applied() {
        let session = SolveSession::new(sample());
        let ticket = session.dispatch();
        let result = applied(session.run(ticket, &slots(&["TE__/H/3", "__AU/V/1"]), SearchBounds::default()).unwrap());
        assert_eq!(result.solutions.len(), 1);
        assert_eq!(session.last_result(), Some(result));
        assert_eq!(session.last_ticket(), Some(ticket));
    }

    #[test]
    fn test_stale_request_is_discarded() {
        let session = SolveSession::new(sample());
        let old = session.dispatch();
        let new = session.dispatch();
        let outcome = session.run(old, &slots(&["TE__/H/3", "__AU/V/1"]), SearchBounds::default()).unwrap();
        assert_eq!(outcome, SessionOutcome::Stale { ticket: old, latest: new });
        assert_eq!(session.last_result(), None);
    }

    #[test]
    fn test_late_answer_does_not_overwrite_newer_one() {
        let session = SolveSession::new(sample());
        let old = session.dispatch();
        let new = session.dispatch();
        let newer = applied(session.run(new, &slots(&["TE__/H/3", "-AU*/V/1"]), SearchBounds::default()).unwrap());

        let late = session.run(old, &slots(&["TEM__/H/3", "__AU/V/1"]), SearchBounds::default()).unwrap();
        assert!(matches!(late, SessionOutcome::Stale { .. }));
        assert_eq!(session.last_result(), Some(newer));
        assert_eq!(session.last_ticket(), Some(new));
    }

    #[test]
    fn test_not_attempted_is_applied() {
        let session = SolveSession::new(sample());
        let result = applied(session.submit(&slots(&["TE__/H/3", "__AU/H/1"]), SearchBounds::default()).unwrap());
        assert!(!result.attempted());
        assert_eq!(result.candidate_counts, vec![0, 0]);
    }

    #[test]
    fn test_failure_keeps_last_result() {
        struct PickyLexicon(Lexicon);
        impl LexiconQuery for PickyLexicon {
            fn find_by_pattern(&self, spec: &PatternSpec, limit: usize) -> Result<Vec<Arc<WordRecord>>, LexiconError> {
                if spec.contains() {
                    return Err(LexiconError::Unavailable);
                }
                self.0.find_by_pattern(spec, limit)
            }
        }

        let session = SolveSession::new(PickyLexicon(sample()));
        let good = applied(session.submit(&slots(&["TE__/H/3", "__AU/V/1"]), SearchBounds::default()).unwrap());

        let err = session.submit(&slots(&["TE__/H/3", "-AU*/V/1"]), SearchBounds::default()).unwrap_err();
        assert!(matches!(err, SolverError::RetrievalFailed { slot: 2, .. }));
        assert_eq!(session.last_result(), Some(good));

        // the next request is unaffected
        assert!(session.submit(&slots(&["TE__/H/3", "__AU/V/1"]), SearchBounds::default()).is_ok());
    }

    /// Sleeps in every query and remembers how many ran at once.
    struct SlowLexicon {
        inner: Lexicon,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowLexicon {
        fn new(delay: Duration) -> Self {
            SlowLexicon { inner: sample(), delay, in_flight: AtomicUsize::new(0), max_in_flight: AtomicUsize::new(0) }
        }
    }

    impl LexiconQuery for SlowLexicon {
        fn find_by_pattern(&self, spec: &PatternSpec, limit: usize) -> Result<Vec<Arc<WordRecord>>, LexiconError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.inner.find_by_pattern(spec, limit)
        }
    }

    #[test]
    fn test_slots_are_retrieved_concurrently() {
        let session = SolveSession::new(SlowLexicon::new(Duration::from_millis(100)));
        let result = applied(session.submit(&slots(&["TE__/H/3", "__AU/V/1"]), SearchBounds::default()).unwrap());
        assert_eq!(result.candidate_counts, vec![2, 2]);
        assert_eq!(session.lexicon().max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_request_superseded_during_retrieval() {
        let session = SolveSession::new(SlowLexicon::new(Duration::from_millis(200)));
        let request = slots(&["TE__/H/3", "__AU/V/1"]);
        let ticket = session.dispatch();

        let outcome = std::thread::scope(|scope| {
            let running = scope.spawn(|| session.run(ticket, &request, SearchBounds::default()));
            std::thread::sleep(Duration::from_millis(20));
            session.dispatch();
            running.join().unwrap()
        });

        assert!(matches!(outcome, Ok(SessionOutcome::Stale { .. })));
        assert_eq!(session.last_result(), None);
    }
}
