//! Pallet loading for a single truck: the 0/1 knapsack problem solved by
//! exhaustive search, dynamic programming, backtracking, greedy heuristics
//! or an external integer programming solver.

pub mod compare;
pub mod dataset;
pub mod error;
pub mod generate;
pub mod progress;
pub mod report;
pub mod solver;

pub use error::{DatasetError, SolverError};
pub use solver::problem::{Item, Outcome, Problem, Solution};
pub use solver::{solve, Algorithm, Method, Solved};
