use crate::error::SolverError;
use log::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: usize,
    pub weight: usize,
    pub profit: usize,
}

impl Item {
    pub fn new(id: usize, weight: usize, profit: usize) -> Item {
        Item { id, weight, profit }
    }
}

/// The pallets available for one truck, plus its weight capacity.
///
/// Items are addressed by their position in `items`; `Item::id` is only
/// carried along for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub items: Vec<Item>,
    pub capacity: usize,
}

impl Problem {
    pub fn new(items: Vec<Item>, capacity: usize) -> Problem {
        Problem { items, capacity }
    }

    /// Builds a problem from parallel id/weight/profit columns.
    pub fn from_parts(
        ids: &[usize],
        weights: &[usize],
        profits: &[usize],
        capacity: usize,
    ) -> Result<Problem, SolverError> {
        if ids.len() != weights.len() || weights.len() != profits.len() {
            return Err(SolverError::Configuration(format!(
                "column lengths differ: {} ids, {} weights, {} profits",
                ids.len(),
                weights.len(),
                profits.len()
            )));
        }

        let items = ids
            .iter()
            .zip(weights)
            .zip(profits)
            .map(|((&id, &weight), &profit)| Item::new(id, weight, profit))
            .collect();

        Problem::checked(items, capacity)
    }

    /// Like [`Problem::new`], but rejects catalogs whose combined profit
    /// does not fit in a `usize`, so every selection's profit is exact.
    pub fn checked(items: Vec<Item>, capacity: usize) -> Result<Problem, SolverError> {
        let problem = Problem { items, capacity };
        if problem.total_profit().is_none() {
            return Err(SolverError::Configuration(format!(
                "combined profit of {} pallets overflows",
                problem.items.len()
            )));
        }
        Ok(problem)
    }

    pub fn total_profit(&self) -> Option<usize> {
        self.items
            .iter()
            .try_fold(0usize, |sum, item| sum.checked_add(item.profit))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub decision: Vec<bool>,
    pub profit: usize,
    pub weight: usize,
    pub count: usize,
}

impl Solution {
    /// The empty selection over `item_count` items.
    pub fn empty(item_count: usize) -> Solution {
        Solution {
            decision: vec![false; item_count],
            profit: 0,
            weight: 0,
            count: 0,
        }
    }

    /// Builds a solution by summing the items flagged in `decision`.
    /// Sums saturate, so an overflowing weight never looks feasible.
    pub fn from_decision(problem: &Problem, decision: Vec<bool>) -> Solution {
        let mut solution = Solution {
            decision,
            profit: 0,
            weight: 0,
            count: 0,
        };
        for (d, item) in solution.decision.iter().zip(problem.items.iter()) {
            if *d {
                solution.profit = solution.profit.saturating_add(item.profit);
                solution.weight = solution.weight.saturating_add(item.weight);
                solution.count += 1;
            }
        }
        solution
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.decision
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(|(index, _)| index)
    }

    /// Checks that the aggregates match the decision vector and that the
    /// selection fits in the truck.
    pub fn validate(&self, problem: &Problem) -> bool {
        let mut profit_sum: Option<usize> = Some(0);
        let mut weight_sum: Option<usize> = Some(0);
        let mut count = 0;
        let mut valid = true;

        if self.decision.len() != problem.items.len() {
            warn!(
                "Solution::validate decision len differs from problem, {} vs {}",
                self.decision.len(),
                problem.items.len()
            );
            valid = false;
        }

        for (d, i) in self.decision.iter().zip(problem.items.iter()) {
            if *d {
                profit_sum = profit_sum.and_then(|p| p.checked_add(i.profit));
                weight_sum = weight_sum.and_then(|w| w.checked_add(i.weight));
                count += 1;
            }
        }

        if profit_sum != Some(self.profit) {
            warn!("Solution::validate, profit does not match!");
            valid = false;
        }
        if weight_sum != Some(self.weight) {
            warn!("Solution::validate, weight does not match!");
            valid = false;
        }
        if count != self.count {
            warn!("Solution::validate, count does not match!");
            valid = false;
        }
        if self.weight > problem.capacity {
            warn!("Solution::validate, capacity exceeded!");
            valid = false;
        }

        valid
    }
}

/// Whether a feasible candidate selection should replace `best`.
///
/// Higher profit wins, then fewer items, then the selection that contains
/// the first index at which the two differ.
pub fn improves_on(profit: usize, count: usize, decision: &[bool], best: &Solution) -> bool {
    if profit != best.profit {
        return profit > best.profit;
    }
    if count != best.count {
        return count < best.count;
    }
    decision
        .iter()
        .zip(best.decision.iter())
        .find(|(current, best)| current != best)
        .map_or(false, |(current, _)| *current)
}

/// How a solver call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S> {
    /// The run completed and selected at least one item.
    Optimal(S),
    /// The run completed but the best selection is empty.
    Infeasible(S),
    /// The cancel source fired before the run completed.
    Cancelled,
}

impl Outcome<Solution> {
    pub fn classify(solution: Solution) -> Outcome<Solution> {
        if solution.count == 0 {
            Outcome::Infeasible(solution)
        } else {
            Outcome::Optimal(solution)
        }
    }

    /// The completed solution, or the all-zero sentinel when cancelled.
    pub fn solution_or_sentinel(&self, item_count: usize) -> Solution {
        match self {
            Outcome::Optimal(s) | Outcome::Infeasible(s) => s.clone(),
            Outcome::Cancelled => Solution::empty(item_count),
        }
    }
}

impl<S> Outcome<S> {
    pub fn solution(&self) -> Option<&S> {
        match self {
            Outcome::Optimal(s) | Outcome::Infeasible(s) => Some(s),
            Outcome::Cancelled => None,
        }
    }

    pub fn into_solution(self) -> Option<S> {
        match self {
            Outcome::Optimal(s) | Outcome::Infeasible(s) => Some(s),
            Outcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn map<T, F: FnOnce(S) -> T>(self, f: F) -> Outcome<T> {
        match self {
            Outcome::Optimal(s) => Outcome::Optimal(f(s)),
            Outcome::Infeasible(s) => Outcome::Infeasible(f(s)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}
