use std::path::PathBuf;
use thiserror::Error;

/// Recoverable failures of a solver call.
///
/// Cancellation is deliberately absent: it is reported through
/// [`Outcome::Cancelled`](crate::solver::Outcome::Cancelled).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Invalid solver input: {0}")]
    Configuration(String),
    #[error(
        "Dynamic programming table too large ({items} items x capacity {capacity}, limit {limit} cells)"
    )]
    CapacityTooLarge {
        items: usize,
        capacity: usize,
        limit: usize,
    },
    #[error("External ILP solver unavailable: {0}")]
    SolverUnavailable(String),
}

/// Failures while loading or writing a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Could not parse {field} in {}, line {line}: {value:?}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("{} declares {declared} pallets but {found} were listed", .path.display())]
    CountMismatch {
        path: PathBuf,
        declared: usize,
        found: usize,
    },
    #[error("{} has no data row", .0.display())]
    Empty(PathBuf),
    #[error("No dataset given: pass --dataset, --truck-file/--pallets-file or --interactive")]
    NoInput,
    #[error("Invalid dataset: {0}")]
    Invalid(#[from] SolverError),
    #[error("Console input ended before the dataset was complete")]
    UnexpectedEnd,
    #[error(transparent)]
    Console(#[from] std::io::Error),
}
