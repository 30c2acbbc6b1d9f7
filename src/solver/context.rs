use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Polled by the solvers at their checkpoints.
pub trait CancelSource {
    fn should_cancel(&self) -> bool;
}

/// Notified at solver checkpoints. Purely informational.
pub trait ProgressSink {
    fn report(&mut self, current: u64, total: u64);

    /// Called once when a run completes without being cancelled.
    fn finish(&mut self) {}
}

pub struct NeverCancel;

impl CancelSource for NeverCancel {
    fn should_cancel(&self) -> bool {
        false
    }
}

/// A shared flag another thread can raise to stop the run.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl CancelSource for CancelFlag {
    fn should_cancel(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl<F: Fn() -> bool> CancelSource for F {
    fn should_cancel(&self) -> bool {
        self()
    }
}

/// Fires once the given duration has elapsed since construction.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    start: Instant,
    limit: Duration,
}

impl TimeLimit {
    pub fn new(limit: Duration) -> TimeLimit {
        TimeLimit {
            start: Instant::now(),
            limit,
        }
    }

    pub fn from_secs_f64(seconds: f64) -> TimeLimit {
        TimeLimit::new(Duration::from_secs_f64(seconds))
    }
}

impl CancelSource for TimeLimit {
    fn should_cancel(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

/// Everything a solver may talk to while it runs.
///
/// A context is handed to exactly one solver call at a time; solvers keep no
/// state of their own between calls.
pub struct SolverContext<'a> {
    progress: Option<&'a mut dyn ProgressSink>,
    cancel: &'a dyn CancelSource,
    cancelled: bool,
}

impl<'a> SolverContext<'a> {
    pub fn new(cancel: &'a dyn CancelSource) -> SolverContext<'a> {
        SolverContext {
            progress: None,
            cancel,
            cancelled: false,
        }
    }

    pub fn with_progress(mut self, progress: &'a mut dyn ProgressSink) -> SolverContext<'a> {
        self.progress = Some(progress);
        self
    }

    /// Reports progress and polls the cancel source.
    /// Returns `true` when the run should stop.
    pub fn checkpoint(&mut self, current: u64, total: u64) -> bool {
        if let Some(progress) = self.progress.as_mut() {
            progress.report(current, total);
        }
        self.cancelled()
    }

    /// Polls the cancel source without touching the progress sink.
    /// Once cancellation has been observed it stays observed.
    pub fn cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.should_cancel() {
            self.cancelled = true;
        }
        self.cancelled
    }

    pub fn finish(&mut self) {
        if let Some(progress) = self.progress.as_mut() {
            progress.finish();
        }
    }
}

impl Default for SolverContext<'static> {
    fn default() -> Self {
        SolverContext::new(&NeverCancel)
    }
}
