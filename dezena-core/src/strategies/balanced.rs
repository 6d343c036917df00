//! Balanced strategy: spread the ticket across the six decades, keep the
//! even/odd split near half, and weight choices by historical frequency.
//!
//! 1. Quadrant targets: `k / 6` everywhere, the remainder goes to the decades
//!    with the highest historical totals (ties by decade order), capped at 10.
//!    For `k >= 6` every decade gets at least one slot.
//! 2. Each decade draws its target one number at a time, restricted to the
//!    parity still needed (`ceil(k/2)` evens, the rest odd), weighted by
//!    `frequency + 1`.
//! 3. The union is sorted.

use super::{mean, StrategyContext, StrategyError, StrategyKind};
use crate::domain::{
    quadrant_label, quadrant_numbers, Dezena, Selection, StrategyDetails, QUADRANT_COUNT,
    QUADRANT_SIZE,
};
use crate::rng::Mulberry32;
use crate::sampling::weighted_pick;
use crate::statistics::{FrequencySnapshot, QuadrantTotal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    Even,
    Odd,
}

impl Parity {
    fn matches(self, n: Dezena) -> bool {
        match self {
            Parity::Even => n % 2 == 0,
            Parity::Odd => n % 2 == 1,
        }
    }
}

/// Running even/odd tally against the ticket-wide targets.
struct ParityTracker {
    even_target: usize,
    odd_target: usize,
    even: usize,
    odd: usize,
}

impl ParityTracker {
    fn new(k: usize) -> Self {
        let even_target = k.div_ceil(2);
        Self {
            even_target,
            odd_target: k - even_target,
            even: 0,
            odd: 0,
        }
    }

    fn needed(&self, rng: &mut Mulberry32) -> Parity {
        if self.even < self.even_target {
            Parity::Even
        } else if self.odd < self.odd_target {
            Parity::Odd
        } else if rng.next_f64() < 0.5 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    fn record(&mut self, n: Dezena) {
        if n % 2 == 0 {
            self.even += 1;
        } else {
            self.odd += 1;
        }
    }
}

/// Decade indices ordered by historical total, highest first; ties keep decade order.
fn order_by_total(totals: &[u32; QUADRANT_COUNT]) -> [usize; QUADRANT_COUNT] {
    let mut order = [0, 1, 2, 3, 4, 5];
    order.sort_by(|&a, &b| totals[b].cmp(&totals[a]));
    order
}

/// How many of the `k` numbers each decade should supply.
pub fn quadrant_targets(k: usize, totals: &[QuadrantTotal]) -> [usize; QUADRANT_COUNT] {
    let mut by_index = [0u32; QUADRANT_COUNT];
    for (slot, total) in by_index.iter_mut().zip(totals) {
        *slot = total.total;
    }
    let order = order_by_total(&by_index);
    let k = k.min(QUADRANT_COUNT * QUADRANT_SIZE);

    let base = (k / QUADRANT_COUNT).min(QUADRANT_SIZE);
    let mut targets = [base; QUADRANT_COUNT];

    let mut remaining = k - base * QUADRANT_COUNT;
    while remaining > 0 {
        let before = remaining;
        for &q in &order {
            if remaining == 0 {
                break;
            }
            if targets[q] < QUADRANT_SIZE {
                targets[q] += 1;
                remaining -= 1;
            }
        }
        if remaining == before {
            break;
        }
    }

    if k >= QUADRANT_COUNT {
        for t in targets.iter_mut() {
            *t = (*t).max(1);
        }
        rebalance(&mut targets, &order, k);
    }
    targets
}

/// Nudge targets one slot at a time until they sum to `k`, keeping every
/// decade within `[1, 10]`. Shortfalls go to high-total decades first, excess
/// comes off low-total decades first.
fn rebalance(targets: &mut [usize; QUADRANT_COUNT], order: &[usize; QUADRANT_COUNT], k: usize) {
    loop {
        let sum: usize = targets.iter().sum();
        if sum == k {
            return;
        }
        let adjusted = if sum < k {
            order.iter().find(|&&q| targets[q] < QUADRANT_SIZE).map(|&q| targets[q] += 1)
        } else {
            order.iter().rev().find(|&&q| targets[q] > 1).map(|&q| targets[q] -= 1)
        };
        if adjusted.is_none() {
            return;
        }
    }
}

fn draw_quadrant(
    quadrant: usize,
    target: usize,
    frequencies: &FrequencySnapshot,
    parity: &mut ParityTracker,
    rng: &mut Mulberry32,
) -> Result<Vec<Dezena>, StrategyError> {
    let mut remaining = quadrant_numbers(quadrant);
    let mut chosen = Vec::with_capacity(target);

    for _ in 0..target {
        if remaining.is_empty() {
            return Err(StrategyError::QuadrantExhausted {
                quadrant: quadrant_label(quadrant),
            });
        }
        let wanted = parity.needed(rng);
        let mut candidates: Vec<Dezena> = remaining
            .iter()
            .copied()
            .filter(|&n| wanted.matches(n))
            .collect();
        if candidates.is_empty() {
            candidates = remaining.clone();
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&n| frequencies.frequency_of(n) + 1.0)
            .collect();
        let pick = *weighted_pick(&candidates, &weights, rng)?;

        remaining.retain(|&n| n != pick);
        parity.record(pick);
        chosen.push(pick);
    }
    Ok(chosen)
}

pub fn generate(ctx: &StrategyContext<'_>) -> Result<Selection, StrategyError> {
    let stats = ctx.require_statistics(StrategyKind::Balanced)?;
    let totals = stats.quadrants(ctx.window)?;
    let frequencies = stats.frequencies(ctx.window)?;

    let targets = quadrant_targets(ctx.k, &totals);
    let mut rng = Mulberry32::from_seed_str(ctx.seed);
    let mut parity = ParityTracker::new(ctx.k);

    let mut numbers = Vec::with_capacity(ctx.k);
    for (quadrant, &target) in targets.iter().enumerate() {
        numbers.extend(draw_quadrant(
            quadrant,
            target,
            &frequencies,
            &mut parity,
            &mut rng,
        )?);
    }
    if numbers.len() != ctx.k {
        return Err(StrategyError::Incomplete {
            expected: ctx.k,
            got: numbers.len(),
        });
    }

    let average_frequency = mean(numbers.iter().map(|&n| frequencies.frequency_of(n)));

    Ok(Selection::new(
        StrategyKind::Balanced,
        ctx.seed,
        numbers,
        Some(average_frequency),
        Some(StrategyDetails::Balanced {
            window: ctx.window,
            targets: targets.to_vec(),
            total_draws: frequencies.total_draws,
            average_frequency,
        }),
    ))
}
