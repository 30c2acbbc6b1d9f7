use crate::solver::context::SolverContext;
use crate::solver::problem::*;
use log::{debug, info};

/// Search nodes visited between two checkpoints.
pub const CHECK_INTERVAL: u64 = 10_000;

/// Above this many items the node total is meaningless, so only the cancel
/// source is polled.
pub const LARGE_INSTANCE: usize = 1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Branch {
    Include,
    Exclude,
}

/// Depth first search over include/exclude decisions, item 0 first.
///
/// The include branch is explored before the exclude branch and is only
/// entered when the item still fits in the truck and the count limit allows
/// it, so infeasible subtrees are never visited. The recursion is kept on an
/// explicit stack of branches, one per decided item.
pub fn solve(problem: &Problem, max_count: usize, ctx: &mut SolverContext) -> Outcome<Solution> {
    let n = problem.items.len();
    let show_progress = n <= LARGE_INSTANCE;
    let total = node_bound(n);
    debug!(
        "backtracking: {} items, capacity {}, max count {}",
        n, problem.capacity, max_count
    );

    let mut best = Solution::empty(n);
    let mut decision = vec![false; n];
    let mut branches: Vec<Branch> = Vec::with_capacity(n);
    let mut weight = 0;
    let mut profit: usize = 0;
    let mut count = 0;
    let mut visited: u64 = 0;

    'search: loop {
        visited += 1;
        if visited % CHECK_INTERVAL == 0 {
            let stop = if show_progress {
                ctx.checkpoint(visited, total)
            } else {
                ctx.cancelled()
            };
            if stop {
                info!("backtracking: cancelled after {} nodes", visited);
                return Outcome::Cancelled;
            }
        }

        let depth = branches.len();
        if depth < n {
            let item = &problem.items[depth];
            if item.weight <= problem.capacity - weight && count < max_count {
                decision[depth] = true;
                weight += item.weight;
                profit = profit.saturating_add(item.profit);
                count += 1;
                branches.push(Branch::Include);
            } else {
                branches.push(Branch::Exclude);
            }
            continue;
        }

        // Every item decided
        if improves_on(profit, count, &decision, &best) {
            best.decision.copy_from_slice(&decision);
            best.profit = profit;
            best.weight = weight;
            best.count = count;
        }

        // Unwind to the deepest include and take its exclude branch instead
        loop {
            match branches.pop() {
                None => break 'search,
                Some(Branch::Exclude) => continue,
                Some(Branch::Include) => {
                    let index = branches.len();
                    let item = &problem.items[index];
                    decision[index] = false;
                    weight -= item.weight;
                    profit -= item.profit;
                    count -= 1;
                    branches.push(Branch::Exclude);
                    continue 'search;
                }
            }
        }
    }

    ctx.finish();
    debug!("backtracking: visited {} nodes", visited);
    Outcome::classify(best)
}

// Nodes of the full binary decision tree, 2^(n+1) - 1
fn node_bound(n: usize) -> u64 {
    if n >= 63 {
        u64::MAX
    } else {
        (1u64 << (n + 1)) - 1
    }
}
