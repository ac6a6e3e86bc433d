//! Quick local timing runner for crossing searches (no Criterion).
//!
//! Loads the lexicon once, then runs each case several times and reports the
//! median. Every case uses the default search bounds so numbers stay
//! comparable across cases.
//!
//! HOW TO RUN
//! ----------
//! - Optimized build:        `cargo run --bin bench_local --release`
//! - Multiple repeats:       `cargo run --bin bench_local --release -- -r 5`
//! - Print a few solutions:  `cargo run --bin bench_local --release -- -p 5`
//!
//! Printing happens outside the timed section, and one untimed warm-up run
//! is done per case.

use std::hint::black_box;
use std::time::Instant;

use clap::Parser;
use croisement::lexicon::{Lexicon, LoadMode};
use croisement::slot::SlotConstraint;
use croisement::solver::{self, SearchBounds, SolutionTuple};

/// Load the lexicon once, then time a fixed set of crossing searches.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the lexicon file (word;definitions;favorite;active per line)
    #[arg(
        short,
        long,
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/data/lexicon.txt")
    )]
    lexicon: String,

    /// Number of repeats per case (median is reported)
    #[arg(short = 'r', long = "repeats", default_value_t = 1)]
    num_repeats: usize,

    /// Print up to this many solutions per case (0 = print none)
    #[arg(short = 'p', long = "print", default_value_t = 0)]
    print_limit: usize,
}

/// Slot specs of one case, in slot order.
struct Case {
    slots: &'static [&'static str],
}

/// Edit/add cases here. The summary shows the slot specs as the name.
fn get_cases() -> Vec<Case> {
    vec![
        Case { slots: &["TE__/H/3", "__AU/V/1"] },
        Case { slots: &["-EAU*/H/1", "_____/V/2"] },
        Case { slots: &["-ION*/H/2", "-O/V/1"] },
        Case { slots: &["S____/H/1", "M____/H/1", "S___M/V/1,5"] },
        Case { slots: &["-A/H/1", "-E/H/1", "___/V/1,3"] },
    ]
}

/// Robust central tendency for small samples.
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        0.5 * (xs[n / 2 - 1] + xs[n / 2])
    }
}

const MAX_NAME_LEN: usize = 40;

fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    croisement::log::init_logger(croisement::log::debug_requested());

    eprintln!("Loading lexicon from: {}", cli.lexicon);
    let t_load = Instant::now();
    let lexicon = Lexicon::load_from_path(&cli.lexicon, LoadMode::Lenient)?;
    eprintln!("Loaded {} words in {:.3}s", lexicon.len(), t_load.elapsed().as_secs_f64());

    let bounds = SearchBounds::default();
    let mut summary: Vec<(String, f64, usize, Vec<usize>)> = Vec::new();

    for (idx, case) in get_cases().iter().enumerate() {
        let name = case.slots.join(" ");
        eprintln!("\n[{:02}] {}", idx + 1, name);

        let slots: Vec<SlotConstraint> = match case.slots.iter().map(|s| s.parse()).collect() {
            Ok(slots) => slots,
            Err(e) => {
                eprintln!("  ✗ bad case: {e}");
                continue;
            }
        };

        if let Err(e) = solver::solve(&slots, &lexicon, bounds) {
            eprintln!("  ✗ Warm-up failed: {}", e.display_detailed());
            continue;
        }

        let mut times = Vec::with_capacity(cli.num_repeats);
        let mut last_solutions: Vec<SolutionTuple> = Vec::new();
        let mut last_counts: Vec<usize> = Vec::new();

        for rep in 0..cli.num_repeats {
            let t_solve = Instant::now();
            let result = match solver::solve(black_box(&slots), &lexicon, bounds) {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("  ✗ Run {}/{} failed: {e}", rep + 1, cli.num_repeats);
                    continue;
                }
            };
            let solve_secs = t_solve.elapsed().as_secs_f64();
            let _keep = black_box(result.solutions.len());

            times.push(solve_secs);
            last_solutions = result.solutions;
            last_counts = result.candidate_counts;
            eprintln!(
                "  run {:>2}/{:>2}: {:.3}s ({} solutions)",
                rep + 1,
                cli.num_repeats,
                solve_secs,
                last_solutions.len()
            );
        }

        for solution in last_solutions.iter().take(cli.print_limit) {
            println!("{solution}");
        }

        let med = median(times);
        eprintln!(
            "  → median {:.3}s over {} run(s); {} {}, candidates {:?}",
            med,
            cli.num_repeats,
            last_solutions.len(),
            pluralize(last_solutions.len(), "solution"),
            last_counts
        );
        summary.push((name, med, last_solutions.len(), last_counts));
    }

    eprintln!("\n==== Summary ====");
    eprintln!("{:<MAX_NAME_LEN$} | {:>10} | {:>11} | candidates", "slots", "median (s)", "# solutions");
    eprintln!("{:-<MAX_NAME_LEN$}-+-{:-<10}-+-{:-<11}-+-{:-<10}", "", "", "", "");
    for (name, med, num_solutions, counts) in &summary {
        let display = if name.chars().count() > MAX_NAME_LEN {
            format!("{}…", name.chars().take(MAX_NAME_LEN - 1).collect::<String>())
        } else {
            name.clone()
        };
        eprintln!("{display:<MAX_NAME_LEN$} | {med:>10.3} | {num_solutions:>11} | {counts:?}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert!(median(vec![]).abs() < f64::EPSILON);
        assert!((median(vec![3.0, 1.0, 2.0]) - 2.0).abs() < f64::EPSILON);
        assert!((median(vec![4.0, 1.0, 2.0, 3.0]) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "solution"), "solutions");
        assert_eq!(pluralize(1, "solution"), "solution");
        assert_eq!(pluralize(2, "solution"), "solutions");
    }

    #[test]
    fn test_cases_parse() {
        for case in get_cases() {
            for spec in case.slots {
                assert!(spec.parse::<SlotConstraint>().is_ok(), "{spec}");
            }
        }
    }
}
