//! Splitting a ticket count across weighted strategies.
//!
//! Largest-remainder (Hamilton) apportionment: each strategy first gets the
//! floor of its proportional quota, then the leftover tickets go one at a
//! time to the largest fractional parts. Ties go to the strategy listed
//! first. The counts always sum to the requested total.

/// Apportion `total` tickets by `weights`.
///
/// Weights must be finite and non-negative (the orchestrator validates them).
/// When every weight is zero the strategies share equally.
pub fn allocate_tickets(total: usize, weights: &[f64]) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }

    // Scaled by the largest weight so the sum stays finite for any finite input.
    let max = weights.iter().copied().fold(0.0_f64, f64::max);
    let weights: Vec<f64> = if max > 0.0 {
        weights.iter().map(|w| w / max).collect()
    } else {
        vec![1.0; weights.len()]
    };
    let sum: f64 = weights.iter().sum();

    let quotas: Vec<f64> = weights
        .iter()
        .map(|w| (w / sum * total as f64).min(total as f64))
        .collect();
    let mut counts: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();

    // Float rounding can push the floors past the total; trim from the back.
    let mut excess = counts.iter().sum::<usize>().saturating_sub(total);
    for count in counts.iter_mut().rev() {
        if excess == 0 {
            break;
        }
        let cut = excess.min(*count);
        *count -= cut;
        excess -= cut;
    }

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = quotas[a] - quotas[a].floor();
        let fb = quotas[b] - quotas[b].floor();
        fb.total_cmp(&fa)
    });

    let mut remaining = total - counts.iter().sum::<usize>();
    for &idx in order.iter().cycle() {
        if remaining == 0 {
            break;
        }
        counts[idx] += 1;
        remaining -= 1;
    }
    counts
}
