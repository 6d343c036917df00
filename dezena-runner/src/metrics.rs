//! Batch-level aggregate metrics.
//!
//! All metrics are computed from the tickets actually emitted, so a batch
//! with fallbacks or dropped tickets reports what the caller really gets.

use serde::{Deserialize, Serialize};

use dezena_core::Ticket;

/// Min / max / mean of the number of distinct decades per ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadrantCoverage {
    pub min: usize,
    pub max: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetrics {
    /// Mean of the per-ticket number sums.
    pub average_sum: f64,
    /// Mean score over tickets whose strategy reports one; 0 when none do.
    pub average_score: f64,
    /// Max minus min of `|even - odd|` across tickets.
    pub parity_spread: usize,
    pub quadrant_coverage: QuadrantCoverage,
}

impl BatchMetrics {
    /// Compute metrics for a set of tickets. An empty batch yields all zeros.
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        if tickets.is_empty() {
            return Self::default();
        }
        let n = tickets.len() as f64;

        let average_sum = tickets
            .iter()
            .map(|t| f64::from(t.metadata.sum))
            .sum::<f64>()
            / n;

        let scores: Vec<f64> = tickets.iter().filter_map(|t| t.metadata.score).collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let imbalances = tickets.iter().map(|t| t.metadata.parity.imbalance());
        let (lo, hi) = imbalances.fold((usize::MAX, 0), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let coverage: Vec<usize> = tickets
            .iter()
            .map(|t| t.metadata.distinct_quadrants())
            .collect();
        let quadrant_coverage = QuadrantCoverage {
            min: coverage.iter().copied().min().unwrap_or(0),
            max: coverage.iter().copied().max().unwrap_or(0),
            average: coverage.iter().sum::<usize>() as f64 / n,
        };

        Self {
            average_sum,
            average_score,
            parity_spread: hi - lo,
            quadrant_coverage,
        }
    }
}
