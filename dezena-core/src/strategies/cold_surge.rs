//! Cold-surge strategy: favour numbers that have been absent the longest.

use std::collections::HashMap;

use super::{mean, StrategyContext, StrategyError, StrategyKind};
use crate::domain::{Dezena, RecencySample, Selection, StrategyDetails, MAX_NUMBER, MIN_NUMBER};
use crate::rng::Mulberry32;
use crate::sampling::WeightedPool;

/// Weight (and delay) credited to numbers never observed.
pub const NEVER_SEEN_REWARD: f64 = 50.0;

fn weight_for(contests_since_last: Option<u32>) -> f64 {
    match contests_since_last {
        Some(c) => f64::from(c.max(1)),
        None => NEVER_SEEN_REWARD,
    }
}

pub fn generate(ctx: &StrategyContext<'_>) -> Result<Selection, StrategyError> {
    let stats = ctx.require_statistics(StrategyKind::ColdSurge)?;
    let recency: HashMap<Dezena, Option<u32>> = stats
        .recency()?
        .into_iter()
        .map(|r| (r.dezena, r.contests_since_last))
        .collect();
    let since = |n: Dezena| recency.get(&n).copied().flatten();

    let mut pool = WeightedPool::from_pairs(
        (MIN_NUMBER..=MAX_NUMBER).map(|n| (n, weight_for(since(n)))),
    );
    let mut rng = Mulberry32::from_seed_str(ctx.seed);
    let numbers: Vec<Dezena> = pool.draw_without_replacement(&mut rng, ctx.k);
    if numbers.len() < ctx.k {
        return Err(StrategyError::Incomplete {
            expected: ctx.k,
            got: numbers.len(),
        });
    }

    let average_delay = mean(numbers.iter().map(|&n| match since(n) {
        Some(c) => f64::from(c),
        None => NEVER_SEEN_REWARD,
    }));

    let mut recency_sample: Vec<RecencySample> = numbers
        .iter()
        .map(|&dezena| RecencySample {
            dezena,
            contests_since_last: since(dezena),
            weight: weight_for(since(dezena)),
        })
        .collect();
    recency_sample.sort_by_key(|s| s.dezena);

    Ok(Selection::new(
        StrategyKind::ColdSurge,
        ctx.seed,
        numbers,
        Some(average_delay),
        Some(StrategyDetails::ColdSurge {
            average_delay,
            recency_sample,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{Draw, DrawHistory};

    #[test]
    fn weights_follow_delay() {
        assert_eq!(weight_for(None), 50.0);
        assert_eq!(weight_for(Some(0)), 1.0);
        assert_eq!(weight_for(Some(1)), 1.0);
        assert_eq!(weight_for(Some(17)), 17.0);
    }

    #[test]
    fn never_seen_numbers_dominate() {
        // 1..=54 all appeared in the latest contest (weight 1); 55..=60 never (weight 50).
        let history = DrawHistory::new(vec![Draw::new(1, (1..=54).collect())]).unwrap();
        let mut unseen = 0;
        for i in 0..200 {
            let seed = format!("cold-{i}");
            let ctx = StrategyContext::new(&seed, 6).with_statistics(&history);
            let sel = StrategyKind::ColdSurge.generate(&ctx).unwrap();
            unseen += sel.numbers.iter().filter(|&&n| n >= 55).count();
        }
        // Expected ~4.5 of 6 per ticket; uniform picking would give 0.6.
        assert!(unseen > 200 * 3, "only {unseen} unseen picks across 200 tickets");
    }

    #[test]
    fn sample_matches_selection() {
        let history = DrawHistory::new(vec![Draw::new(1, vec![1, 2, 3, 4, 5, 6])]).unwrap();
        let ctx = StrategyContext::new("cold-sample", 7).with_statistics(&history);
        let sel = StrategyKind::ColdSurge.generate(&ctx).unwrap();
        match &sel.metadata.details {
            Some(StrategyDetails::ColdSurge { recency_sample, .. }) => {
                let dezenas: Vec<u8> = recency_sample.iter().map(|s| s.dezena).collect();
                assert_eq!(dezenas, sel.numbers);
                for s in recency_sample {
                    assert_eq!(s.weight, weight_for(s.contests_since_last));
                }
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn empty_history_averages_reward() {
        let history = DrawHistory::default();
        let ctx = StrategyContext::new("cold-empty", 6).with_statistics(&history);
        let sel = StrategyKind::ColdSurge.generate(&ctx).unwrap();
        assert_eq!(sel.metadata.score, Some(NEVER_SEEN_REWARD));
    }
}
