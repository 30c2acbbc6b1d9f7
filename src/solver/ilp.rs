//! Boundary to an external integer programming solver.
//!
//! The solving itself happens in another process. This module only writes
//! the instance file, runs the program and reads back its answer:
//!
//! ```text
//! input                 output
//! <n>                   <total profit>
//! <capacity>            <total weight>
//! <w_0> <w_1> ...       <i> <j> ...   (0-based selected indices)
//! <p_0> <p_1> ...
//! ```

use crate::error::SolverError;
use crate::solver::context::SolverContext;
use crate::solver::problem::*;
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Fresh names tried before giving up on the temp directory.
const CREATE_ATTEMPTS: usize = 16;

static RUN_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// How to launch the external solver. The program receives the input and
/// output file paths as its last two arguments.
#[derive(Debug, Clone)]
pub struct IlpCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl IlpCommand {
    pub fn new<P: Into<PathBuf>>(program: P) -> IlpCommand {
        IlpCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> IlpCommand {
        self.args.push(arg.into());
        self
    }
}

pub fn write_input<W: Write>(problem: &Problem, output: &mut W) -> std::io::Result<()> {
    writeln!(output, "{}", problem.items.len())?;
    writeln!(output, "{}", problem.capacity)?;
    writeln!(output, "{}", join(problem.items.iter().map(|i| i.weight)))?;
    writeln!(output, "{}", join(problem.items.iter().map(|i| i.profit)))?;
    Ok(())
}

fn join<I: Iterator<Item = usize>>(values: I) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses the solver's answer and checks it against the problem.
pub fn parse_output(problem: &Problem, text: &str) -> Result<Solution, SolverError> {
    let mut lines = text.lines();
    let mut number = |field: &str| -> Result<usize, SolverError> {
        let line = lines
            .next()
            .ok_or_else(|| SolverError::SolverUnavailable(format!("missing {} line", field)))?;
        line.trim().parse::<usize>().map_err(|_| {
            SolverError::SolverUnavailable(format!("bad {} line {:?}", field, line))
        })
    };
    let profit = number("total profit")?;
    let weight = number("total weight")?;

    let mut decision = vec![false; problem.items.len()];
    let indices = lines.next().unwrap_or("");
    for token in indices.split_whitespace() {
        let index = token.parse::<usize>().map_err(|_| {
            SolverError::SolverUnavailable(format!("bad item index {:?}", token))
        })?;
        match decision.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(SolverError::SolverUnavailable(format!(
                    "item index {} listed twice",
                    index
                )))
            }
            None => {
                return Err(SolverError::SolverUnavailable(format!(
                    "item index {} out of range",
                    index
                )))
            }
        }
    }

    let solution = Solution::from_decision(problem, decision);
    if solution.profit != profit || solution.weight != weight {
        return Err(SolverError::SolverUnavailable(format!(
            "reported totals {}/{} disagree with selection {}/{}",
            profit, weight, solution.profit, solution.weight
        )));
    }
    if solution.weight > problem.capacity {
        return Err(SolverError::SolverUnavailable(format!(
            "selection weight {} exceeds capacity {}",
            solution.weight, problem.capacity
        )));
    }
    Ok(solution)
}

/// Removes the exchange files once the run is over.
struct ExchangeFiles {
    input: PathBuf,
    output: PathBuf,
}

impl ExchangeFiles {
    /// Creates the input file under a fresh name in `dir`. The file must not
    /// exist yet, so a planted file or symlink is never written through.
    fn create(dir: &Path) -> io::Result<(ExchangeFiles, fs::File)> {
        let mut attempts = 0;
        loop {
            let run = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
            let stem = format!("pallet-loader-{}-{}", std::process::id(), run);
            let input = dir.join(format!("{}.in", stem));
            match exclusive(&input) {
                Ok(file) => {
                    let files = ExchangeFiles {
                        output: dir.join(format!("{}.out", stem)),
                        input,
                    };
                    return Ok((files, file));
                }
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists && attempts < CREATE_ATTEMPTS =>
                {
                    debug!("ilp: {} already exists", input.display());
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn exclusive(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
}

impl Drop for ExchangeFiles {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.input);
        let _ = fs::remove_file(&self.output);
    }
}

fn unavailable<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> SolverError + '_ {
    move |e| SolverError::SolverUnavailable(format!("{}: {}", context, e))
}

/// Runs the external solver on `problem`.
///
/// The child is polled until it exits; if the cancel source fires in the
/// meantime it is killed and `Cancelled` is returned.
pub fn solve(
    problem: &Problem,
    command: &IlpCommand,
    ctx: &mut SolverContext,
) -> Result<Outcome<Solution>, SolverError> {
    let (files, mut input) =
        ExchangeFiles::create(&std::env::temp_dir()).map_err(unavailable("creating input"))?;
    write_input(problem, &mut input).map_err(unavailable("writing input"))?;
    drop(input);
    debug!(
        "ilp: running {} on {}",
        command.program.display(),
        files.input.display()
    );

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .arg(&files.input)
        .arg(&files.output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(unavailable("spawning solver"))?;
    let stderr = child.stderr.take().map(drain);

    let status = match wait(&mut child, ctx)? {
        Some(status) => status,
        None => {
            // a grandchild may still hold stderr open, so the drain is not joined
            info!("ilp: cancelled, solver process killed");
            return Ok(Outcome::Cancelled);
        }
    };
    let stderr = stderr
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    if !status.success() {
        warn!("ilp: solver failed: {}", stderr.trim());
        return Err(SolverError::SolverUnavailable(format!(
            "solver exited with {}",
            status
        )));
    }
    if !stderr.trim().is_empty() {
        debug!("ilp: solver stderr: {}", stderr.trim());
    }

    let text = fs::read_to_string(&files.output).map_err(unavailable("reading output"))?;
    let solution = parse_output(problem, &text)?;
    ctx.finish();
    Ok(Outcome::classify(solution))
}

/// Reads the child's stderr to the end on its own thread, so a chatty
/// solver never blocks on a full pipe.
fn drain(mut pipe: ChildStderr) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

// None when the run was cancelled
fn wait(
    child: &mut Child,
    ctx: &mut SolverContext,
) -> Result<Option<std::process::ExitStatus>, SolverError> {
    let mut polls: u64 = 0;
    loop {
        match child.try_wait().map_err(unavailable("waiting for solver"))? {
            Some(status) => return Ok(Some(status)),
            None => {
                if ctx.cancelled() {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }
                polls += 1;
                if polls % 50 == 0 {
                    debug!("ilp: still waiting after {} polls", polls);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}
