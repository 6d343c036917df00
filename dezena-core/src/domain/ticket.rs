use serde::{Deserialize, Serialize};

use super::quadrant::{quadrant_histogram, quadrant_index, QuadrantCount};
use super::Dezena;
use crate::strategies::StrategyKind;

/// Even/odd split of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parity {
    pub even: usize,
    pub odd: usize,
}

impl Parity {
    pub fn of(numbers: &[Dezena]) -> Self {
        let even = numbers.iter().filter(|&&n| n % 2 == 0).count();
        Self {
            even,
            odd: numbers.len() - even,
        }
    }

    /// `|even - odd|`.
    pub fn imbalance(&self) -> usize {
        self.even.abs_diff(self.odd)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFrequency {
    pub dezena: Dezena,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecencySample {
    pub dezena: Dezena,
    pub contests_since_last: Option<u32>,
    pub weight: f64,
}

/// Strategy-specific diagnostics attached to a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StrategyDetails {
    #[serde(rename_all = "camelCase")]
    HotStreak {
        window: u32,
        average_frequency: f64,
        top_numbers: Vec<NumberFrequency>,
    },
    #[serde(rename_all = "camelCase")]
    ColdSurge {
        average_delay: f64,
        recency_sample: Vec<RecencySample>,
    },
    #[serde(rename_all = "camelCase")]
    Balanced {
        window: Option<u32>,
        targets: Vec<usize>,
        total_draws: u32,
        average_frequency: f64,
    },
}

/// Derived description of a ticket. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyMetadata {
    pub strategy: StrategyKind,
    pub seed: String,
    pub k: usize,
    pub sum: u32,
    pub parity: Parity,
    pub quadrants: Vec<QuadrantCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StrategyDetails>,
}

impl StrategyMetadata {
    pub fn describe(
        strategy: StrategyKind,
        seed: &str,
        numbers: &[Dezena],
        score: Option<f64>,
        details: Option<StrategyDetails>,
    ) -> Self {
        Self {
            strategy,
            seed: seed.to_string(),
            k: numbers.len(),
            sum: numbers.iter().map(|&n| u32::from(n)).sum(),
            parity: Parity::of(numbers),
            quadrants: quadrant_histogram(numbers),
            score,
            details,
        }
    }

    /// Number of decades with at least one selected number.
    pub fn distinct_quadrants(&self) -> usize {
        self.quadrants.iter().filter(|q| q.count > 0).count()
    }
}

/// Output of one strategy invocation, before pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub numbers: Vec<Dezena>,
    pub metadata: StrategyMetadata,
}

impl Selection {
    /// Sorts `numbers` and derives metadata from them.
    pub fn new(
        strategy: StrategyKind,
        seed: &str,
        mut numbers: Vec<Dezena>,
        score: Option<f64>,
        details: Option<StrategyDetails>,
    ) -> Self {
        numbers.sort_unstable();
        let metadata = StrategyMetadata::describe(strategy, seed, &numbers, score, details);
        Self { numbers, metadata }
    }
}

/// One purchasable combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "dezenas")]
    pub numbers: Vec<Dezena>,
    pub strategy: StrategyKind,
    pub seed: String,
    pub cost_cents: u64,
    pub metadata: StrategyMetadata,
}

impl Ticket {
    pub fn from_selection(selection: Selection, cost_cents: u64) -> Self {
        Self {
            strategy: selection.metadata.strategy,
            seed: selection.metadata.seed.clone(),
            numbers: selection.numbers,
            cost_cents,
            metadata: selection.metadata,
        }
    }

    pub fn k(&self) -> usize {
        self.numbers.len()
    }

    /// Strictly ascending, within `[1, 60]`, no duplicates.
    pub fn is_well_formed(&self) -> bool {
        self.numbers.windows(2).all(|w| w[0] < w[1])
            && self
                .numbers
                .iter()
                .all(|&n| (super::MIN_NUMBER..=super::MAX_NUMBER).contains(&n))
    }

    pub fn covers_quadrant(&self, index: usize) -> bool {
        self.numbers.iter().any(|&n| quadrant_index(n) == index)
    }
}
