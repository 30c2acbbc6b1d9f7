//! Console formatting of datasets and solver results.

use crate::solver::problem::{Outcome, Problem};
use crate::solver::Solved;
use std::io::Write;
use std::time::Duration;

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

pub fn write_dataset<W: Write>(
    out: &mut W,
    problem: &Problem,
    max_count: usize,
) -> std::io::Result<()> {
    writeln!(out, "-------------------------------------")?;
    writeln!(out, "- Truck capacity: {}", problem.capacity)?;
    writeln!(out, "- Number of pallets: {}", problem.items.len())?;
    writeln!(out, "- Maximum pallets loaded: {}", max_count)?;
    writeln!(out, "-------------------------------------")?;
    Ok(())
}

fn write_pallet_table<W: Write, I: Iterator<Item = usize>>(
    out: &mut W,
    problem: &Problem,
    indices: I,
) -> std::io::Result<()> {
    writeln!(out, "{:>10}{:>10}{:>10}", "Pallet ID", "Weight", "Profit")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for index in indices {
        let item = &problem.items[index];
        writeln!(out, "{:>10}{:>10}{:>10}", item.id, item.weight, item.profit)?;
    }
    Ok(())
}

/// Result block for one run.
pub fn write_outcome<W: Write>(
    out: &mut W,
    title: &str,
    problem: &Problem,
    outcome: &Outcome<Solved>,
    elapsed: Duration,
    print_selection: bool,
) -> std::io::Result<()> {
    let rule = "=".repeat(title.len() + 32);
    writeln!(out, "\n=========== {} RESULTS ===========", title.to_uppercase())?;

    let solved = match outcome {
        Outcome::Cancelled => {
            writeln!(out, "Operation cancelled by user, no result.")?;
            writeln!(out, "{}", rule)?;
            return Ok(());
        }
        Outcome::Infeasible(solved) => {
            writeln!(out, "No pallet can be loaded profitably.")?;
            solved
        }
        Outcome::Optimal(solved) => solved,
    };

    if let Some(strategy) = solved.strategy {
        writeln!(out, "Approach: {}", strategy)?;
    }
    let solution = &solved.solution;
    writeln!(out, "Total profit: {}", solution.profit)?;
    writeln!(out, "Total weight: {}", solution.weight)?;
    writeln!(
        out,
        "Pallets used: {} / {}",
        solution.count,
        problem.items.len()
    )?;
    writeln!(out, "Unused capacity: {}", problem.capacity - solution.weight)?;
    writeln!(out, "Execution time: {:.3} ms", millis(elapsed))?;

    if print_selection {
        writeln!(out, "\nSelected pallets:")?;
        write_pallet_table(out, problem, solution.selected())?;
    }
    writeln!(out, "{}", rule)?;
    Ok(())
}

/// How one algorithm fared in a comparison.
#[derive(Debug)]
pub enum RowStatus {
    Done(Outcome<Solved>),
    Skipped(String),
    Failed(String),
}

#[derive(Debug)]
pub struct ComparisonRow {
    pub name: &'static str,
    pub exact: bool,
    pub status: RowStatus,
    pub elapsed: Duration,
}

/// Greedy profit relative to the optimum; 1.0 when the optimum is 0.
pub fn accuracy(profit: usize, optimum: usize) -> f64 {
    if optimum == 0 {
        1.0
    } else {
        profit as f64 / optimum as f64
    }
}

pub fn write_comparison<W: Write>(
    out: &mut W,
    rows: &[ComparisonRow],
    optimum: Option<usize>,
) -> std::io::Result<()> {
    writeln!(
        out,
        "\n{:<28}{:>10}{:>10}{:>8}{:>14}{:>10}",
        "Algorithm", "Profit", "Weight", "Count", "Time (ms)", "Accuracy"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;

    for row in rows {
        match &row.status {
            RowStatus::Done(outcome) => match outcome.solution() {
                Some(solved) => {
                    let solution = &solved.solution;
                    let accuracy = match (row.exact, optimum) {
                        (false, Some(optimum)) => {
                            format!("{:.4}", accuracy(solution.profit, optimum))
                        }
                        _ => "-".to_string(),
                    };
                    writeln!(
                        out,
                        "{:<28}{:>10}{:>10}{:>8}{:>14.3}{:>10}",
                        row.name,
                        solution.profit,
                        solution.weight,
                        solution.count,
                        millis(row.elapsed),
                        accuracy
                    )?;
                }
                None => writeln!(out, "{:<28}{:>52}", row.name, "cancelled")?,
            },
            RowStatus::Skipped(reason) => {
                writeln!(out, "{:<28}{:>52}", row.name, format!("skipped: {}", reason))?
            }
            RowStatus::Failed(reason) => {
                writeln!(out, "{:<28}{:>52}", row.name, format!("failed: {}", reason))?
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::solver::greedy::Strategy;
    use crate::solver::problem::Solution;

    fn canonical() -> Problem {
        Problem::from_parts(&[1, 2, 3], &[10, 20, 30], &[60, 100, 120], 50).unwrap()
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>>(f: F) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn outcome_block_lists_selection() {
        let problem = canonical();
        let solved = Solved {
            solution: Solution::from_decision(&problem, vec![false, true, true]),
            strategy: Some(Strategy::BestOfProfit),
        };
        let text = render(|out| {
            write_outcome(
                out,
                "Greedy",
                &problem,
                &Outcome::Optimal(solved),
                Duration::from_micros(1500),
                true,
            )
        });
        assert!(text.contains("GREEDY RESULTS"));
        assert!(text.contains("Approach: Maximum (Biggest Profit Values Selected)"));
        assert!(text.contains("Total profit: 220"));
        assert!(text.contains("Pallets used: 2 / 3"));
        assert!(text.contains("Execution time: 1.500 ms"));
        assert!(text.contains(&format!("{:>10}{:>10}{:>10}", 3, 30, 120)));
        assert!(!text.contains(&format!("{:>10}{:>10}{:>10}", 1, 10, 60)));
    }

    #[test]
    fn cancelled_block_has_no_totals() {
        let text = render(|out| {
            write_outcome(
                out,
                "Dynamic Programming",
                &canonical(),
                &Outcome::Cancelled,
                Duration::ZERO,
                true,
            )
        });
        assert!(text.contains("cancelled"));
        assert!(!text.contains("Total profit"));
    }

    #[test]
    fn comparison_reports_greedy_accuracy() {
        let problem = canonical();
        let rows = vec![
            ComparisonRow {
                name: "Dynamic Programming",
                exact: true,
                status: RowStatus::Done(Outcome::Optimal(
                    Solution::from_decision(&problem, vec![false, true, true]).into(),
                )),
                elapsed: Duration::from_millis(2),
            },
            ComparisonRow {
                name: "Greedy (Ratio)",
                exact: false,
                status: RowStatus::Done(Outcome::Optimal(Solved {
                    solution: Solution::from_decision(&problem, vec![true, true, false]),
                    strategy: Some(Strategy::Ratio),
                })),
                elapsed: Duration::from_millis(1),
            },
            ComparisonRow {
                name: "Exhaustive Search",
                exact: true,
                status: RowStatus::Skipped("too many pallets".to_string()),
                elapsed: Duration::ZERO,
            },
        ];
        let text = render(|out| write_comparison(out, &rows, Some(220)));
        assert!(text.contains("0.7273"));
        assert!(text.contains("skipped: too many pallets"));
    }

    #[test]
    fn accuracy_of_zero_optimum() {
        assert_eq!(accuracy(0, 0), 1.0);
        assert_eq!(accuracy(50, 100), 0.5);
    }
}
