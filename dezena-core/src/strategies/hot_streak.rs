//! Hot-streak strategy: favour numbers drawn most often in the recent window.

use super::{mean, StrategyContext, StrategyError, StrategyKind};
use crate::domain::{Dezena, NumberFrequency, Selection, StrategyDetails, MAX_NUMBER, MIN_NUMBER};
use crate::rng::Mulberry32;
use crate::sampling::WeightedPool;

/// Draws considered when no window is requested.
pub const DEFAULT_WINDOW: u32 = 120;
/// Keeps never-drawn numbers selectable.
pub const FREQUENCY_FLOOR: f64 = 0.0001;
const TOP_N: usize = 3;

pub fn generate(ctx: &StrategyContext<'_>) -> Result<Selection, StrategyError> {
    let stats = ctx.require_statistics(StrategyKind::HotStreak)?;
    let window = ctx.window.unwrap_or(DEFAULT_WINDOW);
    let snapshot = stats.frequencies(Some(window))?;

    let mut pool = WeightedPool::from_pairs((MIN_NUMBER..=MAX_NUMBER).map(|n| {
        let f = snapshot.frequency_of(n);
        (n, if f > 0.0 { f } else { FREQUENCY_FLOOR })
    }));
    let mut rng = Mulberry32::from_seed_str(ctx.seed);
    let numbers: Vec<Dezena> = pool.draw_without_replacement(&mut rng, ctx.k);
    if numbers.len() < ctx.k {
        return Err(StrategyError::Incomplete {
            expected: ctx.k,
            got: numbers.len(),
        });
    }

    let average_frequency = mean(numbers.iter().map(|&n| snapshot.frequency_of(n)));

    let mut ranked: Vec<NumberFrequency> = numbers
        .iter()
        .map(|&dezena| NumberFrequency {
            dezena,
            frequency: snapshot.frequency_of(dezena),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.frequency
            .total_cmp(&a.frequency)
            .then(a.dezena.cmp(&b.dezena))
    });
    ranked.truncate(TOP_N);

    Ok(Selection::new(
        StrategyKind::HotStreak,
        ctx.seed,
        numbers,
        Some(average_frequency),
        Some(StrategyDetails::HotStreak {
            window,
            average_frequency,
            top_numbers: ranked,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{Draw, DrawHistory};

    /// 1..=6 drawn in every contest, everything else never.
    fn skewed_history() -> DrawHistory {
        DrawHistory::new(
            (1..=40)
                .map(|c| Draw::new(c, vec![1, 2, 3, 4, 5, 6]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn picks_the_hot_numbers() {
        let history = skewed_history();
        let ctx = StrategyContext::new("hot", 6).with_statistics(&history);
        let sel = StrategyKind::HotStreak.generate(&ctx).unwrap();
        // Weight 1.0 vs 0.0001 for 54 others: the six hot numbers dominate.
        let hot = sel.numbers.iter().filter(|&&n| n <= 6).count();
        assert!(hot >= 5, "only {hot} hot numbers in {:?}", sel.numbers);
        assert!(sel.metadata.score.unwrap() > 0.8);
    }

    #[test]
    fn details_report_window_and_top_three() {
        let history = skewed_history();
        let ctx = StrategyContext::new("hot-details", 8)
            .with_statistics(&history)
            .with_window(Some(30));
        let sel = StrategyKind::HotStreak.generate(&ctx).unwrap();
        match sel.metadata.details {
            Some(StrategyDetails::HotStreak {
                window,
                top_numbers,
                average_frequency,
            }) => {
                assert_eq!(window, 30);
                assert_eq!(top_numbers.len(), 3);
                assert!(top_numbers
                    .windows(2)
                    .all(|w| w[0].frequency >= w[1].frequency));
                assert!(average_frequency > 0.0 && average_frequency <= 1.0);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn default_window_is_120() {
        let history = skewed_history();
        let ctx = StrategyContext::new("hot-default", 6).with_statistics(&history);
        let sel = StrategyKind::HotStreak.generate(&ctx).unwrap();
        assert!(matches!(
            sel.metadata.details,
            Some(StrategyDetails::HotStreak { window: 120, .. })
        ));
    }

    #[test]
    fn empty_history_still_fills_ticket() {
        let history = DrawHistory::default();
        let ctx = StrategyContext::new("hot-empty", 15).with_statistics(&history);
        let sel = StrategyKind::HotStreak.generate(&ctx).unwrap();
        assert_eq!(sel.numbers.len(), 15);
        assert_eq!(sel.metadata.score, Some(0.0));
    }

    #[test]
    fn deterministic() {
        let history = skewed_history();
        let ctx = StrategyContext::new("hot-repeat", 10).with_statistics(&history);
        assert_eq!(
            StrategyKind::HotStreak.generate(&ctx).unwrap(),
            StrategyKind::HotStreak.generate(&ctx).unwrap()
        );
    }
}
