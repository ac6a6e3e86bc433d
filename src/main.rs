use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};

use croisement::errors::LexiconError;
use croisement::lexicon::{Lexicon, LoadMode, SearchFilter};
use croisement::pattern::compile;
use croisement::preview::build_preview;
use croisement::session::{SessionOutcome, SolveSession};
use croisement::slot::SlotConstraint;
use croisement::solver::{SearchBounds, SolutionTuple, SolveStatus, SolverError, DEFAULT_CANDIDATE_LIMIT, DEFAULT_MAX_SOLUTIONS};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Crossword crossing finder
#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Cli {
    /// Path to the lexicon file (word;definitions;favorite;active per line)
    #[arg(
        short,
        long,
        global = true,
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/data/lexicon.txt")
    )]
    lexicon: String,

    /// Fail on malformed or duplicate lexicon lines instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the words matching one pattern (e.g. "TE__", "-EAU*")
    Search {
        pattern: String,

        /// Maximum number of words to print
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_SOLUTIONS)]
        limit: usize,

        #[arg(long)]
        favorites_only: bool,

        #[arg(long)]
        active_only: bool,
    },

    /// Find words for two or three crossing slots
    Cross {
        /// A slot as PATTERN/H|V/POS, e.g. "TE__/H/3"; the third slot takes two
        /// positions, e.g. "T___/V/1,4"
        #[arg(short, long = "slot", required = true)]
        slots: Vec<SlotConstraint>,

        /// Maximum candidates retrieved per slot
        #[arg(short = 'c', long, default_value_t = DEFAULT_CANDIDATE_LIMIT)]
        candidate_limit: usize,

        /// Maximum number of solutions to print
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_SOLUTIONS)]
        max_solutions: usize,

        /// Also draw the placement preview on stderr
        #[arg(long)]
        preview: bool,
    },

    /// Draw where the slots' cells land, without searching
    Preview {
        #[arg(short, long = "slot", required = true)]
        slots: Vec<SlotConstraint>,
    },
}

/// Entry point of the croisement CLI.
///
/// Delegates to [`try_main`] and prints any error with its code and help
/// text before exiting with code 1.
fn main() -> ExitCode {
    croisement::log::init_logger(croisement::log::debug_requested());

    if let Err(e) = try_main() {
        if let Some(solver_err) = e.downcast_ref::<SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else if let Some(lexicon_err) = e.downcast_ref::<LexiconError>() {
            eprintln!("Error: {}", lexicon_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Preview { slots } => {
            print_preview(&slots, false);
            Ok(())
        }
        Command::Search { pattern, limit, favorites_only, active_only } => {
            let lexicon = load(&cli.lexicon, cli.strict)?;
            let Some(spec) = compile(&pattern) else {
                eprintln!("Pattern {pattern:?} leaves nothing to match");
                return Ok(());
            };
            let found = lexicon.search(&spec, limit, SearchFilter { favorites_only, active_only })?;
            for word in &found {
                println!("{}\t{}\t{}", word.display, word.length, word.definition_count);
            }
            eprintln!("{} LIKE {}: {} word(s)", spec, spec.to_like(), found.len());
            Ok(())
        }
        Command::Cross { slots, candidate_limit, max_solutions, preview } => {
            if preview {
                print_preview(&slots, true);
            }
            let lexicon = load(&cli.lexicon, cli.strict)?;
            let session = SolveSession::new(lexicon);
            let bounds = SearchBounds { candidate_limit, max_solutions };

            let t_solve = Instant::now();
            let SessionOutcome::Applied(result) = session.submit(&slots, bounds)? else {
                // only one request is ever dispatched here
                return Ok(());
            };
            let solve_secs = t_solve.elapsed().as_secs_f64();

            for solution in &result.solutions {
                println!("{}", solution_row(solution));
            }

            match &result.status {
                SolveStatus::NotAttempted(advisory) => {
                    eprintln!("⚠️  Search not attempted: {}", advisory.display_detailed());
                }
                SolveStatus::FoundEnough => {
                    eprintln!("✓ Stopped after {}/{} solutions", result.solutions.len(), max_solutions);
                }
                SolveStatus::CandidatesExhausted => {
                    eprintln!("✓ All candidate combinations examined");
                }
            }
            eprintln!(
                "Candidates per slot: {:?}; solved in {:.3}s ({} solution(s)).",
                result.candidate_counts,
                solve_secs,
                result.solutions.len()
            );
            Ok(())
        }
    }
}

fn load(path: &str, strict: bool) -> Result<Lexicon, LexiconError> {
    let t_load = Instant::now();
    let mode = if strict { LoadMode::Strict } else { LoadMode::Lenient };
    let lexicon = Lexicon::load_from_path(path, mode)?;
    log::debug!("lexicon loaded in {:.3}s", t_load.elapsed().as_secs_f64());
    Ok(lexicon)
}

/// Words, then their lengths, then their definition counts, tab-separated.
fn solution_row(solution: &SolutionTuple) -> String {
    let mut fields: Vec<String> = solution.words.iter().map(|w| w.display.clone()).collect();
    fields.extend(solution.words.iter().map(|w| w.length.to_string()));
    fields.extend(solution.words.iter().map(|w| w.definition_count.to_string()));
    fields.join("\t")
}

fn print_preview(slots: &[SlotConstraint], to_stderr: bool) {
    let text = match build_preview(slots) {
        Some(grid) => grid.to_string(),
        None => "(no preview: every slot needs a pattern, its crossing position(s) and a crossing orientation)".to_string(),
    };
    if to_stderr {
        eprintln!("{text}\n");
    } else {
        println!("{text}");
    }
}
