pub mod backtracking;
pub mod context;
pub mod dynamic;
pub mod exhaustive;
pub mod greedy;
pub mod ilp;
pub mod problem;

use crate::dataset::{Dataset, Source};
use crate::error::SolverError;
use crate::progress::ConsoleProgress;
use crate::report;
use crate::solver::context::*;
use crate::solver::dynamic::DynamicConfig;
use crate::solver::ilp::IlpCommand;
use crate::solver::problem::*;

use clap::{Args, Parser, ValueEnum};
use log::{info, warn};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

/// The different solver implementations that are available
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    Exhaustive,
    Dynamic,
    Backtracking,
    GreedyRatio,
    GreedyProfit,
    Greedy,
    Ilp,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Exhaustive,
        Algorithm::Dynamic,
        Algorithm::Backtracking,
        Algorithm::GreedyRatio,
        Algorithm::GreedyProfit,
        Algorithm::Greedy,
        Algorithm::Ilp,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Algorithm::Exhaustive => "Exhaustive Search",
            Algorithm::Dynamic => "Dynamic Programming",
            Algorithm::Backtracking => "Backtracking",
            Algorithm::GreedyRatio => "Greedy (Ratio)",
            Algorithm::GreedyProfit => "Greedy (Profit)",
            Algorithm::Greedy => "Greedy (Best of Both)",
            Algorithm::Ilp => "Integer Linear Programming",
        }
    }

    pub fn is_exact(&self) -> bool {
        !matches!(
            self,
            Algorithm::GreedyRatio | Algorithm::GreedyProfit | Algorithm::Greedy
        )
    }

    pub fn method(&self, settings: &Settings) -> Method {
        match self {
            Algorithm::Exhaustive => Method::Exhaustive {
                max_count: settings.max_count,
            },
            Algorithm::Dynamic => Method::Dynamic(settings.dynamic),
            Algorithm::Backtracking => Method::Backtracking {
                max_count: settings.max_count,
            },
            Algorithm::GreedyRatio => Method::GreedyRatio,
            Algorithm::GreedyProfit => Method::GreedyProfit,
            Algorithm::Greedy => Method::GreedyBest,
            Algorithm::Ilp => Method::Ilp(settings.ilp.clone()),
        }
    }
}

/// An algorithm together with the parameters it needs.
#[derive(Debug, Clone)]
pub enum Method {
    Exhaustive { max_count: usize },
    Dynamic(DynamicConfig),
    Backtracking { max_count: usize },
    GreedyRatio,
    GreedyProfit,
    GreedyBest,
    Ilp(IlpCommand),
}

/// A finished run. `strategy` names the heuristic for greedy methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solved {
    pub solution: Solution,
    pub strategy: Option<greedy::Strategy>,
}

impl From<Solution> for Solved {
    fn from(solution: Solution) -> Solved {
        Solved {
            solution,
            strategy: None,
        }
    }
}

impl From<greedy::GreedySolution> for Solved {
    fn from(greedy: greedy::GreedySolution) -> Solved {
        Solved {
            solution: greedy.solution,
            strategy: Some(greedy.strategy),
        }
    }
}

/// Runs one method on `problem`.
pub fn solve(
    method: &Method,
    problem: &Problem,
    ctx: &mut SolverContext,
) -> Result<Outcome<Solved>, SolverError> {
    let outcome = match method {
        Method::Exhaustive { max_count } => {
            exhaustive::solve(problem, *max_count, ctx).map(Solved::from)
        }
        Method::Dynamic(config) => dynamic::solve(problem, config, ctx)?.map(Solved::from),
        Method::Backtracking { max_count } => {
            backtracking::solve(problem, *max_count, ctx).map(Solved::from)
        }
        Method::GreedyRatio => greedy::solve_ratio(problem, ctx).map(Solved::from),
        Method::GreedyProfit => greedy::solve_profit(problem, ctx).map(Solved::from),
        Method::GreedyBest => greedy::solve_best(problem, ctx).map(Solved::from),
        Method::Ilp(command) => ilp::solve(problem, command, ctx)?.map(Solved::from),
    };
    Ok(outcome)
}

/// Resolved parameters shared by every method.
#[derive(Debug, Clone)]
pub struct Settings {
    pub max_count: usize,
    pub dynamic: DynamicConfig,
    pub ilp: IlpCommand,
}

#[derive(Args, Debug, Clone)]
pub struct Tuning {
    /// Maximum number of pallets to load, all of them if unset
    #[arg(short, long)]
    pub max_count: Option<usize>,

    /// Cancel a run after this many seconds.
    /// Without it, pressing Enter cancels the run
    #[arg(short, long)]
    pub time_limit: Option<f64>,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Largest dynamic programming table, in cells
    #[arg(long, default_value_t = dynamic::MAX_STATES)]
    pub max_states: usize,

    /// External ILP solver program
    #[arg(long, default_value = "python3")]
    pub ilp_program: PathBuf,

    /// Argument for the ILP program, placed before the input and output
    /// file paths. May be repeated
    #[arg(long = "ilp-arg", default_value = "ilp_solver.py")]
    pub ilp_args: Vec<String>,
}

impl Tuning {
    pub fn settings(&self, dataset: &Dataset) -> Settings {
        Settings {
            max_count: self
                .max_count
                .or(dataset.max_count)
                .unwrap_or(dataset.problem.items.len()),
            dynamic: DynamicConfig {
                max_states: self.max_states,
            },
            ilp: IlpCommand {
                program: self.ilp_program.clone(),
                args: self.ilp_args.clone(),
            },
        }
    }

    pub fn cancel_source(&self) -> Box<dyn CancelSource> {
        match self.time_limit {
            Some(seconds) => Box::new(TimeLimit::from_secs_f64(seconds)),
            None => Box::new(cancel_on_enter()),
        }
    }

    pub fn progress(&self) -> Option<ConsoleProgress> {
        if self.no_progress {
            None
        } else if self.time_limit.is_some() {
            Some(ConsoleProgress::new())
        } else {
            Some(ConsoleProgress::new().hint("Press Enter to cancel."))
        }
    }
}

/// A flag raised when a line is read from an interactive stdin.
fn cancel_on_enter() -> CancelFlag {
    let flag = CancelFlag::new();
    if std::io::stdin().is_terminal() {
        let raise = flag.clone();
        std::thread::spawn(move || {
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_ok() {
                raise.cancel();
            }
        });
    }
    flag
}

#[derive(Parser, Debug)]
pub struct Options {
    /// Which solver implementation to use
    #[arg(short, long, value_enum, default_value_t = Algorithm::Dynamic)]
    solver: Algorithm,

    /// Do not print the selected pallets
    #[arg(short, long)]
    no_print_solution: bool,

    #[command(flatten)]
    input: Source,

    #[command(flatten)]
    tuning: Tuning,
}

pub fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = options.input.load()?;
    let problem = &dataset.problem;
    let settings = options.tuning.settings(&dataset);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_dataset(&mut out, problem, settings.max_count)?;

    let cancel = options.tuning.cancel_source();
    let mut progress = options.tuning.progress();
    let mut ctx = SolverContext::new(cancel.as_ref());
    if let Some(progress) = progress.as_mut() {
        ctx = ctx.with_progress(progress);
    }

    let mut algorithm = options.solver;
    let start = Instant::now();
    let outcome = match solve(&algorithm.method(&settings), problem, &mut ctx) {
        Err(SolverError::SolverUnavailable(reason)) => {
            warn!("{}, falling back to dynamic programming", reason);
            algorithm = Algorithm::Dynamic;
            solve(&algorithm.method(&settings), problem, &mut ctx)?
        }
        other => other?,
    };
    let elapsed = start.elapsed();
    drop(ctx);
    drop(progress);

    if let Some(solved) = outcome.solution() {
        if !solved.solution.validate(problem) {
            panic!("ERROR: Solution is not valid!");
        }
    } else {
        info!("{} cancelled by user", algorithm.title());
    }

    report::write_outcome(
        &mut out,
        algorithm.title(),
        problem,
        &outcome,
        elapsed,
        !options.no_print_solution,
    )?;

    Ok(())
}
