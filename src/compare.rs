use crate::dataset::Source;
use crate::report::{self, ComparisonRow, RowStatus};
use crate::solver::context::SolverContext;
use crate::solver::problem::Problem;
use crate::solver::{solve, Algorithm, Settings, Tuning};
use clap::Parser;
use log::{debug, info};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
pub struct Options {
    /// Skip exhaustive search and backtracking above this many pallets
    #[arg(long, default_value_t = 25)]
    exponential_limit: usize,

    /// Algorithms to leave out of the comparison
    #[arg(long, value_enum)]
    skip: Vec<Algorithm>,

    #[command(flatten)]
    input: Source,

    #[command(flatten)]
    tuning: Tuning,
}

/// Runs every algorithm not skipped on `problem`, one after another.
pub fn compare(
    problem: &Problem,
    settings: &Settings,
    algorithms: &[Algorithm],
    exponential_limit: usize,
    ctx: &mut SolverContext,
) -> Vec<ComparisonRow> {
    let mut rows = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        let mut row = ComparisonRow {
            name: algorithm.title(),
            exact: algorithm.is_exact(),
            status: RowStatus::Skipped("cancelled earlier".to_string()),
            elapsed: Duration::ZERO,
        };

        let exponential = matches!(algorithm, Algorithm::Exhaustive | Algorithm::Backtracking);
        if ctx.cancelled() {
            rows.push(row);
            continue;
        }
        if exponential && problem.items.len() > exponential_limit {
            row.status = RowStatus::Skipped(format!("more than {} pallets", exponential_limit));
            rows.push(row);
            continue;
        }

        debug!("compare: running {}", algorithm.title());
        let start = Instant::now();
        let result = solve(&algorithm.method(settings), problem, ctx);
        row.elapsed = start.elapsed();
        row.status = match result {
            Ok(outcome) => RowStatus::Done(outcome),
            Err(e) => RowStatus::Failed(e.to_string()),
        };
        rows.push(row);
    }
    rows
}

/// The best profit among the exact algorithms that completed.
pub fn optimum(rows: &[ComparisonRow]) -> Option<usize> {
    rows.iter()
        .filter(|row| row.exact)
        .filter_map(|row| match &row.status {
            RowStatus::Done(outcome) => outcome.solution().map(|s| s.solution.profit),
            _ => None,
        })
        .max()
}

pub fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = options.input.load()?;
    let problem = &dataset.problem;
    let settings = options.tuning.settings(&dataset);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_dataset(&mut out, problem, settings.max_count)?;

    let algorithms: Vec<Algorithm> = Algorithm::ALL
        .iter()
        .copied()
        .filter(|a| !options.skip.contains(a))
        .collect();

    let cancel = options.tuning.cancel_source();
    let mut progress = options.tuning.progress();
    let mut ctx = SolverContext::new(cancel.as_ref());
    if let Some(progress) = progress.as_mut() {
        ctx = ctx.with_progress(progress);
    }

    let rows = compare(
        problem,
        &settings,
        &algorithms,
        options.exponential_limit,
        &mut ctx,
    );
    let best = optimum(&rows);
    if best.is_none() {
        info!("compare: no exact algorithm completed, accuracy unavailable");
    }
    report::write_comparison(&mut out, &rows, best)?;
    Ok(())
}
