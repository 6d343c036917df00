//! Uniform strategy: `k` distinct numbers drawn uniformly from `[1, 60]`.

use super::{StrategyContext, StrategyError, StrategyKind};
use crate::domain::{Dezena, Selection, MAX_NUMBER, MIN_NUMBER};
use crate::rng::Mulberry32;
use crate::sampling::sample_unique_integers;

pub fn generate(ctx: &StrategyContext<'_>) -> Result<Selection, StrategyError> {
    let mut rng = Mulberry32::from_seed_str(ctx.seed);
    let numbers = sample_unique_integers(
        &mut rng,
        u32::from(MIN_NUMBER),
        u32::from(MAX_NUMBER),
        ctx.k,
    )?
    .into_iter()
    .map(|n| n as Dezena)
    .collect();
    Ok(Selection::new(StrategyKind::Uniform, ctx.seed, numbers, None, None))
}
