use crate::solver::context::ProgressSink;
use std::io::Write;
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 70;

/// Text progress bar on stderr.
///
/// Nothing is drawn for runs shorter than the threshold, so quick solves
/// leave the terminal untouched.
pub struct ConsoleProgress {
    start: Instant,
    threshold: Duration,
    hint: Option<String>,
    visible: bool,
}

impl ConsoleProgress {
    pub fn new() -> ConsoleProgress {
        ConsoleProgress::with_threshold(Duration::from_millis(500))
    }

    pub fn with_threshold(threshold: Duration) -> ConsoleProgress {
        ConsoleProgress {
            start: Instant::now(),
            threshold,
            hint: None,
            visible: false,
        }
    }

    /// Line printed above the bar the first time it is drawn.
    pub fn hint<S: Into<String>>(mut self, hint: S) -> ConsoleProgress {
        self.hint = Some(hint.into());
        self
    }

    fn draw(&self, out: &mut impl Write, current: u64, total: u64) -> std::io::Result<()> {
        let fraction = if total == 0 {
            0.0
        } else {
            (current as f64 / total as f64).min(1.0)
        };
        let filled = (fraction * BAR_WIDTH as f64) as usize;
        write!(
            out,
            "\r[{}{}] {:>3}%",
            "=".repeat(filled),
            " ".repeat(BAR_WIDTH - filled),
            (fraction * 100.0) as u32
        )?;
        out.flush()
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        ConsoleProgress::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, current: u64, total: u64) {
        if !self.visible && self.start.elapsed() < self.threshold {
            return;
        }
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        if !self.visible {
            if let Some(hint) = &self.hint {
                let _ = writeln!(out, "{}", hint);
            }
            self.visible = true;
        }
        let _ = self.draw(&mut out, current, total);
    }

    fn finish(&mut self) {
        // the next run gets its own threshold
        self.start = Instant::now();
        if !self.visible {
            return;
        }
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        let _ = self.draw(&mut out, 1, 1);
        let _ = write!(out, "\r{}\r", " ".repeat(BAR_WIDTH + 10));
        let _ = out.flush();
        self.visible = false;
    }
}

impl Drop for ConsoleProgress {
    // a cancelled run leaves the bar mid-line
    fn drop(&mut self) {
        if self.visible {
            eprintln!();
        }
    }
}
