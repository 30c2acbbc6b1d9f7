//! Greedy heuristics.
//!
//! These run in O(n log n) but carry no optimality guarantee: the selection
//! they return can be strictly worse than the one found by the exact solvers,
//! e.g. the ratio heuristic on the 60/100/120 instance returns 160 where 220
//! is possible.

use crate::solver::context::SolverContext;
use crate::solver::problem::*;
use log::{debug, info};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    Ratio,
    Profit,
    BestOfRatio,
    BestOfProfit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Ratio => "Profit-to-Weight Ratio",
            Strategy::Profit => "Biggest Profit Values",
            Strategy::BestOfRatio => "Maximum (Profit-to-Weight Ratio Selected)",
            Strategy::BestOfProfit => "Maximum (Biggest Profit Values Selected)",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreedySolution {
    pub solution: Solution,
    pub strategy: Strategy,
}

struct RatioItem {
    index: usize,
    profit: usize,
    weight: usize,
}

impl RatioItem {
    // Compares profit/weight by cross multiplication.
    // Weightless items rank above everything else.
    fn cmp_ratio(&self, other: &RatioItem) -> Ordering {
        match (self.weight, other.weight) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            _ => {
                let lhs = self.profit as u128 * other.weight as u128;
                let rhs = other.profit as u128 * self.weight as u128;
                lhs.cmp(&rhs)
            }
        }
    }
}

/// Takes items by descending profit/weight ratio while they fit.
pub fn solve_ratio(problem: &Problem, ctx: &mut SolverContext) -> Outcome<GreedySolution> {
    let mut ratios: Vec<RatioItem> = problem
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| RatioItem {
            index,
            profit: item.profit,
            weight: item.weight,
        })
        .collect();

    // We want highest ratio to lowest, hence b cmp a.
    // Equal ratios keep the lower index first.
    ratios.sort_by(|a, b| b.cmp_ratio(a).then(a.index.cmp(&b.index)));

    let order: Vec<usize> = ratios.iter().map(|r| r.index).collect();
    fill(problem, &order, Strategy::Ratio, ctx)
}

/// Takes items by descending profit while they fit.
pub fn solve_profit(problem: &Problem, ctx: &mut SolverContext) -> Outcome<GreedySolution> {
    let mut order: Vec<usize> = (0..problem.items.len()).collect();
    order.sort_by(|&a, &b| {
        problem.items[b]
            .profit
            .cmp(&problem.items[a].profit)
            .then(a.cmp(&b))
    });
    fill(problem, &order, Strategy::Profit, ctx)
}

/// Runs both heuristics and keeps the better result: higher profit, then
/// fewer items, then lower weight. A full tie goes to the ratio heuristic.
pub fn solve_best(problem: &Problem, ctx: &mut SolverContext) -> Outcome<GreedySolution> {
    let ratio = match solve_ratio(problem, ctx).into_solution() {
        Some(ratio) => ratio,
        None => return Outcome::Cancelled,
    };
    let profit = match solve_profit(problem, ctx).into_solution() {
        Some(profit) => profit,
        None => return Outcome::Cancelled,
    };

    let ratio_key = (
        ratio.solution.profit,
        std::cmp::Reverse(ratio.solution.count),
        std::cmp::Reverse(ratio.solution.weight),
    );
    let profit_key = (
        profit.solution.profit,
        std::cmp::Reverse(profit.solution.count),
        std::cmp::Reverse(profit.solution.weight),
    );

    let winner = if profit_key > ratio_key {
        GreedySolution {
            solution: profit.solution,
            strategy: Strategy::BestOfProfit,
        }
    } else {
        GreedySolution {
            solution: ratio.solution,
            strategy: Strategy::BestOfRatio,
        }
    };
    debug!("greedy: {} won", winner.strategy);
    classify(winner)
}

fn fill(
    problem: &Problem,
    order: &[usize],
    strategy: Strategy,
    ctx: &mut SolverContext,
) -> Outcome<GreedySolution> {
    let total = order.len() as u64;
    let mut solution = Solution::empty(problem.items.len());

    for (step, &index) in order.iter().enumerate() {
        if ctx.checkpoint(step as u64, total) {
            info!("greedy: {} cancelled at step {}", strategy, step);
            return Outcome::Cancelled;
        }

        let item = &problem.items[index];
        if item.weight <= problem.capacity - solution.weight {
            solution.decision[index] = true;
            solution.weight += item.weight;
            solution.profit = solution.profit.saturating_add(item.profit);
            solution.count += 1;
        }
    }

    ctx.finish();
    classify(GreedySolution { solution, strategy })
}

fn classify(greedy: GreedySolution) -> Outcome<GreedySolution> {
    if greedy.solution.count == 0 {
        Outcome::Infeasible(greedy)
    } else {
        Outcome::Optimal(greedy)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::solver::context::CancelFlag;

    fn canonical() -> Problem {
        Problem::from_parts(&[1, 2, 3], &[10, 20, 30], &[60, 100, 120], 50).unwrap()
    }

    fn unwrap(outcome: Outcome<GreedySolution>) -> GreedySolution {
        outcome.into_solution().unwrap()
    }

    #[test]
    fn ratio_is_dominated_on_canonical_case() {
        let problem = canonical();
        let greedy = unwrap(solve_ratio(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.strategy, Strategy::Ratio);
        assert_eq!(greedy.solution.decision, vec![true, true, false]);
        assert_eq!(greedy.solution.profit, 160);
        assert!(greedy.solution.validate(&problem));
    }

    #[test]
    fn heavy_items_do_not_wrap_the_load() {
        let heavy = 1usize << (usize::BITS - 1);
        let problem =
            Problem::from_parts(&[1, 2, 3], &[heavy, heavy, 4], &[1, 1, 1], usize::MAX).unwrap();
        let greedy = unwrap(solve_ratio(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.solution.decision, vec![true, false, true]);
        assert!(greedy.solution.validate(&problem));
    }

    #[test]
    fn profit_finds_optimum_on_canonical_case() {
        let problem = canonical();
        let greedy = unwrap(solve_profit(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.solution.decision, vec![false, true, true]);
        assert_eq!(greedy.solution.profit, 220);
    }

    #[test]
    fn best_of_tags_the_winner() {
        let problem = canonical();
        let greedy = unwrap(solve_best(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.strategy, Strategy::BestOfProfit);
        assert_eq!(greedy.solution.profit, 220);

        // Both heuristics agree, ratio keeps the win
        let problem = Problem::from_parts(&[1, 2], &[1, 5], &[10, 1], 1).unwrap();
        let greedy = unwrap(solve_best(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.strategy, Strategy::BestOfRatio);
        assert_eq!(greedy.solution.decision, vec![true, false]);
    }

    #[test]
    fn best_of_prefers_fewer_items() {
        // Ratio order takes 0 and 1 for 10, profit order takes 2 alone for 10
        let problem = Problem::from_parts(&[1, 2, 3], &[2, 2, 5], &[5, 5, 10], 5).unwrap();
        let greedy = unwrap(solve_best(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.strategy, Strategy::BestOfProfit);
        assert_eq!(greedy.solution.decision, vec![false, false, true]);
    }

    #[test]
    fn ratio_ties_keep_lower_index_and_weightless_items_lead() {
        let problem = Problem::from_parts(&[1, 2, 3], &[2, 4, 0], &[2, 4, 1], 4).unwrap();
        let greedy = unwrap(solve_ratio(&problem, &mut SolverContext::default()));
        assert_eq!(greedy.solution.decision, vec![true, false, true]);
        assert_eq!(greedy.solution.profit, 3);
    }

    #[test]
    fn fills_exactly_to_capacity() {
        let problem = Problem::from_parts(&[1], &[5], &[1], 5).unwrap();
        let greedy = unwrap(solve_ratio(&problem, &mut SolverContext::default()));
        assert!(greedy.solution.decision[0]);
    }

    #[test]
    fn nothing_fits_is_infeasible() {
        let problem = Problem::from_parts(&[1], &[5], &[1], 4).unwrap();
        assert!(matches!(
            solve_best(&problem, &mut SolverContext::default()),
            Outcome::Infeasible(_)
        ));
    }

    #[test]
    fn cancellation_returns_cancelled() {
        let flag = CancelFlag::new();
        flag.cancel();
        let problem = canonical();
        assert_eq!(
            solve_best(&problem, &mut SolverContext::new(&flag)),
            Outcome::Cancelled
        );
    }
}
