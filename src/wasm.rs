//! Browser bindings.
//!
//! JavaScript loads a lexicon once into a [`CrossingEngine`], then calls
//! `dispatch()` whenever the user changes a slot and `solve(ticket, ...)`
//! when the request is ready. Answers to superseded tickets come back with
//! `outcome: "stale"` and must be ignored.
//!
//! Slots cross the boundary as strings in the CLI syntax (`"TE__/H/3"`).

use std::fmt::Write;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::errors::{LexiconError, SlotSpecError};
use crate::lexicon::{Lexicon, LoadMode, SearchFilter};
use crate::log::init_logger;
use crate::pattern::compile;
use crate::preview::build_preview;
use crate::session::{SessionOutcome, SolveSession, Ticket};
use crate::slot::SlotConstraint;
use crate::solver::{Advisory, SearchBounds, SolveResult, SolveStatus, SolverError};

/// Structured error information for JavaScript consumers
#[derive(Serialize)]
struct WasmError {
    /// Error code (e.g., "L001", "P002")
    code: String,
    message: String,
    /// Short description of error type
    description: String,
    /// Detailed explanation
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl WasmError {
    fn internal(code: &str, message: String, description: &str) -> Self {
        WasmError {
            code: code.to_string(),
            message,
            description: description.to_string(),
            details: "The value could not be converted between Rust and JavaScript.".to_string(),
            help: Some("This is an internal error. Please report this issue.".to_string()),
        }
    }
}

impl From<LexiconError> for WasmError {
    fn from(e: LexiconError) -> Self {
        WasmError {
            code: e.code().to_string(),
            message: e.to_string(),
            description: e.description().to_string(),
            details: e.details().to_string(),
            help: e.help().map(ToString::to_string),
        }
    }
}

impl From<SlotSpecError> for WasmError {
    fn from(e: SlotSpecError) -> Self {
        WasmError {
            code: e.code().to_string(),
            message: e.to_string(),
            description: e.description().to_string(),
            details: e.details().to_string(),
            help: e.help().map(ToString::to_string),
        }
    }
}

impl From<SolverError> for WasmError {
    fn from(e: SolverError) -> Self {
        // the lexicon's own code says more than S001
        match e {
            SolverError::RetrievalFailed { slot, source } => {
                let mut err = WasmError::from(source);
                err.message = format!("slot {slot}: {}", err.message);
                err
            }
        }
    }
}

impl From<WasmError> for JsValue {
    fn from(e: WasmError) -> Self {
        let mut msg = format!("Error {}: {}", e.code, e.message);
        if !e.details.is_empty() {
            let _ = write!(msg, "\n\n{}", e.details);
        }
        if let Some(help) = e.help {
            let _ = write!(msg, "\n\nSuggestion: {help}");
        }
        js_sys::Error::new(&msg).into()
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| WasmError::internal("WASM002", format!("serialization failed: {e}"), "Failed to serialize result").into())
}

fn parse_slots(slots: JsValue) -> Result<Vec<SlotConstraint>, JsValue> {
    let specs: Vec<String> = serde_wasm_bindgen::from_value(slots).map_err(|e| WasmError {
        code: "WASM001".to_string(),
        message: format!("slots must be string[]: {e}"),
        description: "Invalid slot list".to_string(),
        details: "Slots are passed as an array of strings such as 'TE__/H/3'.".to_string(),
        help: Some("e.g. ['TE__/H/3', '__AU/V/1']".to_string()),
    })?;
    specs
        .iter()
        .map(|spec| spec.parse::<SlotConstraint>().map_err(|e| WasmError::from(e).into()))
        .collect()
}

/// Initialize logging and the panic hook. Call once after the module loads.
#[wasm_bindgen]
pub fn initialize(debug_enabled: bool) {
    console_error_panic_hook::set_once();
    init_logger(debug_enabled);
    log::info!("croisement {} ready", version());
}

#[wasm_bindgen]
#[must_use]
pub fn version() -> String {
    format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"))
}

/// Render the placement preview, or `undefined` while the slots are incomplete.
///
/// # Errors
/// A slot string that does not parse.
#[wasm_bindgen]
pub fn preview(slots: JsValue) -> Result<Option<String>, JsValue> {
    let slots = parse_slots(slots)?;
    Ok(build_preview(&slots).map(|grid| grid.to_string()))
}

#[derive(Serialize)]
struct WasmWord {
    display: String,
    length: usize,
    definitions: u32,
    favorite: bool,
}

#[derive(Serialize)]
struct WasmAdvisory {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'static str>,
}

impl From<&Advisory> for WasmAdvisory {
    fn from(a: &Advisory) -> Self {
        WasmAdvisory { code: a.code(), message: a.to_string(), help: a.help() }
    }
}

#[derive(Serialize)]
struct WasmSolveResult {
    /// "applied" or "stale"
    outcome: &'static str,
    ticket: f64,
    solutions: Vec<Vec<WasmWord>>,
    candidate_counts: Vec<usize>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisory: Option<WasmAdvisory>,
}

impl WasmSolveResult {
    fn applied(ticket: Ticket, result: &SolveResult) -> Self {
        let status = match result.status {
            SolveStatus::NotAttempted(_) => "not_attempted",
            SolveStatus::FoundEnough => "found_enough",
            SolveStatus::CandidatesExhausted => "candidates_exhausted",
        };
        WasmSolveResult {
            outcome: "applied",
            ticket: ticket_to_js(ticket),
            solutions: result
                .solutions
                .iter()
                .map(|tuple| {
                    tuple
                        .words
                        .iter()
                        .map(|w| WasmWord {
                            display: w.display.clone(),
                            length: w.length,
                            definitions: w.definition_count,
                            favorite: w.favorite,
                        })
                        .collect()
                })
                .collect(),
            candidate_counts: result.candidate_counts.clone(),
            status,
            advisory: result.advisory().map(WasmAdvisory::from),
        }
    }

    fn stale(ticket: Ticket) -> Self {
        WasmSolveResult {
            outcome: "stale",
            ticket: ticket_to_js(ticket),
            solutions: Vec::new(),
            candidate_counts: Vec::new(),
            status: "stale",
            advisory: None,
        }
    }
}

// tickets stay far below 2^53
#[allow(clippy::cast_precision_loss)]
fn ticket_to_js(ticket: Ticket) -> f64 {
    ticket.sequence() as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ticket_from_js(ticket: f64) -> Ticket {
    Ticket::from_sequence(ticket.max(0.0) as u64)
}

/// A loaded lexicon plus request sequencing for one page.
#[wasm_bindgen]
pub struct CrossingEngine {
    session: SolveSession<Lexicon>,
}

#[wasm_bindgen]
impl CrossingEngine {
    /// Load a lexicon from its text form (`word;definitions;favorite;active` per line).
    ///
    /// # Errors
    /// In strict mode, the first malformed or duplicate line.
    #[wasm_bindgen(constructor)]
    pub fn new(lexicon_text: &str, strict: bool) -> Result<CrossingEngine, JsValue> {
        let mode = if strict { LoadMode::Strict } else { LoadMode::Lenient };
        let lexicon = Lexicon::parse_from_str(lexicon_text, mode).map_err(WasmError::from)?;
        log::info!("lexicon loaded: {} record(s)", lexicon.len());
        Ok(CrossingEngine { session: SolveSession::new(lexicon) })
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn size(&self) -> usize {
        self.session.lexicon().len()
    }

    /// Start a new request; earlier tickets become stale.
    pub fn dispatch(&self) -> f64 {
        ticket_to_js(self.session.dispatch())
    }

    /// Solve the slots under `ticket`.
    ///
    /// # Errors
    /// A slot that does not parse, or a lexicon failure (the previous result stays valid).
    pub fn solve(&self, ticket: f64, slots: JsValue, candidate_limit: usize, max_solutions: usize) -> Result<JsValue, JsValue> {
        let slots = parse_slots(slots)?;
        let ticket = ticket_from_js(ticket);
        let bounds = SearchBounds { candidate_limit, max_solutions };
        let outcome = self.session.run(ticket, &slots, bounds).map_err(WasmError::from)?;
        match outcome {
            SessionOutcome::Applied(result) => to_js(&WasmSolveResult::applied(ticket, &result)),
            SessionOutcome::Stale { ticket, .. } => to_js(&WasmSolveResult::stale(ticket)),
        }
    }

    /// Standalone pattern search, best first. Returns display forms.
    ///
    /// # Errors
    /// A lexicon failure.
    pub fn search(&self, pattern: &str, limit: usize, favorites_only: bool, active_only: bool) -> Result<JsValue, JsValue> {
        let Some(spec) = compile(pattern) else {
            return to_js(&Vec::<String>::new());
        };
        let filter = SearchFilter { favorites_only, active_only };
        let found = self.session.lexicon().search(&spec, limit, filter).map_err(WasmError::from)?;
        let displays: Vec<&str> = found.iter().map(|w| w.display.as_str()).collect();
        to_js(&displays)
    }
}

/// Generate a debug report users can paste into an issue.
#[wasm_bindgen]
#[must_use]
pub fn get_debug_info(slots: &str, error_message: &str, lexicon_size: usize, max_solutions: usize) -> String {
    let mut report = String::new();
    // writing to a String never fails
    let _ = writeln!(report, "=== CROISEMENT DEBUG REPORT ===");
    let _ = writeln!(report, "Version: {}", version());
    let _ = writeln!(
        report,
        "Generated: {}",
        js_sys::Date::new_0().to_iso_string().as_string().unwrap_or_else(|| "unknown".to_string())
    );
    let _ = writeln!(report);
    let _ = writeln!(report, "## Error");
    let _ = writeln!(report, "{error_message}");
    let _ = writeln!(report);
    let _ = writeln!(report, "## Request");
    let _ = writeln!(report, "Slots: {slots}");
    let _ = writeln!(report, "Lexicon Size: {lexicon_size}");
    let _ = writeln!(report, "Max Solutions: {max_solutions}");
    let _ = writeln!(report);
    let _ = writeln!(report, "## Environment");
    if let Some(window) = web_sys::window() {
        if let Ok(user_agent) = window.navigator().user_agent() {
            let _ = writeln!(report, "User Agent: {user_agent}");
        }
        let _ = writeln!(report, "Location: {}", window.location().href().unwrap_or_else(|_| "unknown".to_string()));
    }
    let _ = writeln!(report);
    let _ = writeln!(report, "=== END DEBUG REPORT ===");
    report
}
