//! Sampling primitives over any [`RngCore`]; the engine drives them with
//! [`Mulberry32`](crate::rng::Mulberry32).
//!
//! - `sample_unique_integers`: uniform sampling without replacement over a range
//! - `weighted_pick`: proportional-to-weight selection with a uniform fallback
//! - `shuffle`: Fisher–Yates over a copy
//! - `WeightedPool`: index arena for weighted sampling without replacement

use thiserror::Error;

use rand::RngCore;

use crate::rng::unit_f64;

/// Errors from the sampling primitives. These indicate a misconfigured caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("cannot pick from an empty candidate set")]
    EmptyInput,
    #[error("cannot sample {count} unique values from [{min}, {max}]")]
    OutOfRange { min: u32, max: u32, count: usize },
    #[error("{items} items but {weights} weights")]
    LengthMismatch { items: usize, weights: usize },
}

/// Index in `[0, len)` from one PRNG draw.
fn index_below<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> usize {
    let idx = (unit_f64(rng) * len as f64).floor() as usize;
    idx.min(len.saturating_sub(1))
}

fn fisher_yates<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = index_below(rng, i + 1);
        items.swap(i, j);
    }
}

/// Sample `count` unique integers from `[min, max]`, sorted ascending.
///
/// Fails instead of returning a short result when the range is too small.
pub fn sample_unique_integers<R: RngCore + ?Sized>(
    rng: &mut R,
    min: u32,
    max: u32,
    count: usize,
) -> Result<Vec<u32>, SamplingError> {
    if min > max || count > (max - min) as usize + 1 {
        return Err(SamplingError::OutOfRange { min, max, count });
    }
    let mut pool: Vec<u32> = (min..=max).collect();
    fisher_yates(&mut pool, rng);
    pool.truncate(count);
    pool.sort_unstable();
    Ok(pool)
}

/// Shuffled copy of `items`. The input is left untouched.
pub fn shuffle<T: Clone, R: RngCore + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    fisher_yates(&mut out, rng);
    out
}

/// Choose an index proportionally to `weights`.
///
/// Negative and non-finite weights count as zero. When every weight is zero the
/// pick degrades to a uniform choice by index. Otherwise the first index whose
/// cumulative weight reaches `unit_f64(rng) * total` wins.
pub fn weighted_index<R: RngCore + ?Sized>(weights: &[f64], rng: &mut R) -> Result<usize, SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::EmptyInput);
    }
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().copied().map(clean).sum();
    if total <= 0.0 {
        return Ok(index_below(rng, weights.len()));
    }

    let threshold = unit_f64(rng) * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        let w = clean(w);
        if w > 0.0 {
            last_positive = i;
        }
        cumulative += w;
        if w > 0.0 && cumulative >= threshold {
            return Ok(i);
        }
    }
    // Float drift can leave the threshold a hair above the final sum.
    Ok(last_positive)
}

/// Pick one item proportionally to its weight.
pub fn weighted_pick<'a, T, R: RngCore + ?Sized>(
    items: &'a [T],
    weights: &[f64],
    rng: &mut R,
) -> Result<&'a T, SamplingError> {
    if items.is_empty() {
        return Err(SamplingError::EmptyInput);
    }
    if items.len() != weights.len() {
        return Err(SamplingError::LengthMismatch {
            items: items.len(),
            weights: weights.len(),
        });
    }
    let idx = weighted_index(weights, rng)?;
    Ok(&items[idx])
}

/// Candidate arena for weighted sampling without replacement.
///
/// Candidates and weights live in parallel vectors; a pick swap-removes the
/// chosen slot from both, so each draw is O(n) with no shifting.
#[derive(Debug, Clone)]
pub struct WeightedPool<T> {
    items: Vec<T>,
    weights: Vec<f64>,
}

impl<T> WeightedPool<T> {
    pub fn new(items: Vec<T>, weights: Vec<f64>) -> Result<Self, SamplingError> {
        if items.len() != weights.len() {
            return Err(SamplingError::LengthMismatch {
                items: items.len(),
                weights: weights.len(),
            });
        }
        Ok(Self { items, weights })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (T, f64)>) -> Self {
        let (items, weights) = pairs.into_iter().unzip();
        Self { items, weights }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Weighted pick that removes the chosen candidate from the pool.
    pub fn pick<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<T, SamplingError> {
        let idx = weighted_index(&self.weights, rng)?;
        self.weights.swap_remove(idx);
        Ok(self.items.swap_remove(idx))
    }

    /// Up to `count` weighted picks; stops early once the pool is exhausted.
    pub fn draw_without_replacement<R: RngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Vec<T> {
        let mut out = Vec::with_capacity(count.min(self.len()));
        while out.len() < count {
            match self.pick(rng) {
                Ok(item) => out.push(item),
                Err(_) => break,
            }
        }
        out
    }
}
