use crate::solver::context::SolverContext;
use crate::solver::problem::*;
use log::{debug, info};

/// Subsets evaluated between two checkpoints.
pub const CHECK_INTERVAL: u64 = 1000;

/// Tries every subset of the items.
///
/// The subsets are walked as an n-bit counter over `decision`, so the running
/// time is O(2^n * n). Ties are settled by [`improves_on`], which makes the
/// result independent of the enumeration order.
pub fn solve(problem: &Problem, max_count: usize, ctx: &mut SolverContext) -> Outcome<Solution> {
    let n = problem.items.len();
    let total = subset_count(n);
    debug!(
        "exhaustive: {} items, capacity {}, max count {}",
        n, problem.capacity, max_count
    );

    let mut best = Solution::empty(n);
    let mut decision = vec![false; n];
    let mut iteration: u64 = 0;

    loop {
        if iteration % CHECK_INTERVAL == 0 && ctx.checkpoint(iteration, total) {
            info!("exhaustive: cancelled after {} subsets", iteration);
            return Outcome::Cancelled;
        }
        iteration += 1;

        // None once the weight overflows, which is over capacity anyway
        let mut weight_sum = Some(0usize);
        let mut profit_sum = 0usize;
        let mut count = 0;
        for (d, item) in decision.iter().zip(problem.items.iter()) {
            if *d {
                weight_sum = weight_sum.and_then(|w| w.checked_add(item.weight));
                profit_sum = profit_sum.saturating_add(item.profit);
                count += 1;
            }
        }

        match weight_sum {
            Some(weight_sum)
                if weight_sum <= problem.capacity
                    && count <= max_count
                    && improves_on(profit_sum, count, &decision, &best) =>
            {
                best.decision.copy_from_slice(&decision);
                best.profit = profit_sum;
                best.weight = weight_sum;
                best.count = count;
            }
            _ => {}
        }

        // Ripple carry into the next subset
        let mut i = 0;
        while i < n && decision[i] {
            decision[i] = false;
            i += 1;
        }
        if i == n {
            break;
        }
        decision[i] = true;
    }

    ctx.finish();
    Outcome::classify(best)
}

fn subset_count(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        1u64 << n
    }
}
