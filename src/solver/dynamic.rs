use crate::error::SolverError;
use crate::solver::context::SolverContext;
use crate::solver::problem::*;
use log::{debug, info};

// Pre-emptively catch tables that would exhaust memory.
// Each cell holds three usize fields.
pub const MAX_STATES: usize = 20_000_000;

/// Inner-loop steps between two checkpoints.
pub const CHECK_INTERVAL: u64 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct DynamicConfig {
    pub max_states: usize,
}

impl Default for DynamicConfig {
    fn default() -> Self {
        DynamicConfig {
            max_states: MAX_STATES,
        }
    }
}

/// Best (profit, count, index sum) reachable in one table cell.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
struct Cell {
    profit: usize,
    count: usize,
    index_sum: usize,
}

impl Cell {
    fn with_item(self, item: &Item, index: usize) -> Cell {
        Cell {
            profit: self.profit.saturating_add(item.profit),
            count: self.count + 1,
            index_sum: self.index_sum + index,
        }
    }

    // Higher profit, then fewer items, then lower index sum
    fn beats(&self, other: &Cell) -> bool {
        (self.profit, std::cmp::Reverse(self.count), std::cmp::Reverse(self.index_sum))
            > (other.profit, std::cmp::Reverse(other.count), std::cmp::Reverse(other.index_sum))
    }
}

struct Array {
    data: Vec<Cell>,
    width: usize,
}

impl Array {
    fn new(width: usize, height: usize, max_states: usize) -> Result<Array, SolverError> {
        let size = match width.checked_mul(height) {
            Some(size) if size <= max_states => size,
            _ => {
                return Err(SolverError::CapacityTooLarge {
                    items: height - 1,
                    capacity: width - 1,
                    limit: max_states,
                })
            }
        };

        Ok(Array {
            data: vec![Cell::default(); size],
            width,
        })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        self.data[self.index(x, y)]
    }

    fn set(&mut self, x: usize, y: usize, v: Cell) {
        let index = self.index(x, y);
        self.data[index] = v
    }
}

/// Table based 0/1 solver, O(n * capacity) in time and memory.
///
/// Only the capacity constrains the selection. Among selections of equal
/// profit the table keeps the one with fewer items, then the one with the
/// smaller sum of indices.
pub fn solve(
    problem: &Problem,
    config: &DynamicConfig,
    ctx: &mut SolverContext,
) -> Result<Outcome<Solution>, SolverError> {
    let width = problem
        .capacity
        .checked_add(1)
        .ok_or(SolverError::CapacityTooLarge {
            items: problem.items.len(),
            capacity: problem.capacity,
            limit: config.max_states,
        })?;
    let height = problem.items.len() + 1;
    let mut table = Array::new(width, height, config.max_states)?;
    debug!(
        "dynamic: {} items, capacity {}, {} cells",
        problem.items.len(),
        problem.capacity,
        width * height
    );

    let total = ((height - 1) as u64).saturating_mul(width as u64);
    let mut steps: u64 = 0;

    // This outer loop is looping over items
    // BUT with 1 indexing so recursion works
    for y in 1..height {
        let item = &problem.items[y - 1];
        // This loop is iterating over weights
        for x in 0..width {
            if steps % CHECK_INTERVAL == 0 && ctx.checkpoint(steps, total) {
                info!("dynamic: cancelled at item {} of {}", y, height - 1);
                return Ok(Outcome::Cancelled);
            }
            steps += 1;

            // Not taking y would be same value as
            // decision for previous item at this weight
            let do_not_take = table.get(x, y - 1);

            let best = if item.weight <= x {
                let do_take = table.get(x - item.weight, y - 1).with_item(item, y - 1);
                if do_take.beats(&do_not_take) {
                    do_take
                } else {
                    do_not_take
                }
            } else {
                do_not_take
            };
            table.set(x, y, best);
        }
    }

    // Back track to make decision vector. An item is taken when taking it
    // reproduces the stored cell exactly, all three fields included.
    let mut decision = vec![false; problem.items.len()];
    let mut x = problem.capacity;
    for y in (1..height).rev() {
        let item = &problem.items[y - 1];
        if item.weight <= x
            && table.get(x - item.weight, y - 1).with_item(item, y - 1) == table.get(x, y)
        {
            decision[y - 1] = true;
            x -= item.weight;
        }
    }

    ctx.finish();
    let solution = Solution::from_decision(problem, decision);
    debug_assert_eq!(solution.profit, table.get(problem.capacity, height - 1).profit);
    Ok(Outcome::classify(solution))
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::solver::context::CancelFlag;

    fn canonical() -> Problem {
        Problem::from_parts(&[1, 2, 3], &[10, 20, 30], &[60, 100, 120], 50).unwrap()
    }

    fn run(problem: &Problem) -> Outcome<Solution> {
        solve(problem, &DynamicConfig::default(), &mut SolverContext::default()).unwrap()
    }

    #[test]
    fn canonical_case() {
        let problem = canonical();
        let solution = run(&problem).into_solution().unwrap();
        assert_eq!(solution.profit, 220);
        assert_eq!(solution.weight, 50);
        assert_eq!(solution.count, 2);
        assert_eq!(solution.decision, vec![false, true, true]);
        assert!(solution.validate(&problem));
    }

    // Profit-only reconstruction picks up item 2 here and loses the
    // consistency between profit and decision vector.
    #[test]
    fn reconstruction_with_equal_profit_items() {
        let problem =
            Problem::from_parts(&[1, 2, 3, 4], &[3, 3, 3, 6], &[4, 4, 4, 8], 6).unwrap();
        let solution = run(&problem).into_solution().unwrap();
        assert_eq!(solution.profit, 8);
        assert_eq!(solution.count, 1);
        assert_eq!(solution.decision, vec![false, false, false, true]);
        assert!(solution.validate(&problem));
    }

    #[test]
    fn lower_index_sum_wins_ties() {
        let problem =
            Problem::from_parts(&[1, 2, 3, 4], &[5, 5, 5, 5], &[7, 7, 7, 7], 10).unwrap();
        let solution = run(&problem).into_solution().unwrap();
        assert_eq!(solution.decision, vec![true, true, false, false]);
    }

    #[test]
    fn zero_weight_items_are_taken() {
        let problem = Problem::from_parts(&[1, 2], &[0, 4], &[3, 5], 3).unwrap();
        let solution = run(&problem).into_solution().unwrap();
        assert_eq!(solution.decision, vec![true, false]);
        assert_eq!(solution.profit, 3);
    }

    #[test]
    fn empty_cases_are_not_cancellation() {
        assert_eq!(
            run(&Problem::new(Vec::new(), 5)),
            Outcome::Infeasible(Solution::empty(0))
        );
        let zero_capacity = Problem::from_parts(&[1], &[2], &[9], 0).unwrap();
        assert_eq!(
            run(&zero_capacity),
            Outcome::Infeasible(Solution::empty(1))
        );
    }

    #[test]
    fn oversized_table_fails_fast() {
        let problem = Problem::from_parts(&[1, 2], &[1, 1], &[1, 1], 1_000_000).unwrap();
        let config = DynamicConfig { max_states: 1000 };
        let result = solve(&problem, &config, &mut SolverContext::default());
        assert!(matches!(
            result,
            Err(SolverError::CapacityTooLarge { items: 2, .. })
        ));

        let huge = Problem::from_parts(&[1], &[1], &[1], usize::MAX).unwrap();
        assert!(solve(&huge, &DynamicConfig::default(), &mut SolverContext::default()).is_err());
    }

    #[test]
    fn cancellation_returns_cancelled() {
        let flag = CancelFlag::new();
        flag.cancel();
        let outcome = solve(
            &canonical(),
            &DynamicConfig::default(),
            &mut SolverContext::new(&flag),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[test]
    fn cancellation_mid_table_discards_partial_work() {
        // 10 rows of 5000 cells, polled every CHECK_INTERVAL steps
        let ids: Vec<usize> = (1..=10).collect();
        let problem = Problem::from_parts(&ids, &[7; 10], &[3; 10], 4999).unwrap();
        let polls = std::cell::Cell::new(0u32);
        let cancel = || {
            polls.set(polls.get() + 1);
            polls.get() >= 3
        };
        let outcome = solve(
            &problem,
            &DynamicConfig::default(),
            &mut SolverContext::new(&cancel),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(outcome.solution(), None);
        assert_eq!(polls.get(), 3);
    }
}
