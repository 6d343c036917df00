//! Number-selection strategies.
//!
//! Every strategy is a pure function of its [`StrategyContext`]: the same seed,
//! `k`, window and statistics snapshot always yield the same [`Selection`].
//! Dispatch goes through the closed [`StrategyKind`] enum so an unknown name is
//! rejected when the request is parsed, never at invocation time.

pub mod balanced;
pub mod cold_surge;
pub mod hot_streak;
pub mod uniform;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Selection, MAX_K, MIN_K};
use crate::sampling::SamplingError;
use crate::statistics::{StatisticsError, StatisticsSource};

/// Per-ticket strategy failure. The orchestrator recovers from all of these by
/// falling back to `uniform`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("seed must not be empty")]
    InvalidSeed,
    #[error("k={k} outside [6, 15]")]
    KOutOfRange { k: usize },
    #[error("strategy '{0}' needs statistics but none were supplied")]
    MissingStatistics(StrategyKind),
    #[error("statistics read failed: {0}")]
    Statistics(#[from] StatisticsError),
    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplingError),
    #[error("quadrant {quadrant} has no candidates left")]
    QuadrantExhausted { quadrant: String },
    #[error("selected {got} of {expected} numbers")]
    Incomplete { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (expected uniform, hot-streak, cold-surge or balanced)")]
pub struct UnknownStrategy(pub String);

/// The four selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Uniform,
    HotStreak,
    ColdSurge,
    Balanced,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Uniform,
        StrategyKind::HotStreak,
        StrategyKind::ColdSurge,
        StrategyKind::Balanced,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Uniform => "uniform",
            StrategyKind::HotStreak => "hot-streak",
            StrategyKind::ColdSurge => "cold-surge",
            StrategyKind::Balanced => "balanced",
        }
    }

    pub fn needs_statistics(self) -> bool {
        !matches!(self, StrategyKind::Uniform)
    }

    /// Window used when neither the request nor the batch supplies one.
    pub fn default_window(self) -> Option<u32> {
        match self {
            StrategyKind::HotStreak => Some(hot_streak::DEFAULT_WINDOW),
            StrategyKind::Uniform | StrategyKind::ColdSurge | StrategyKind::Balanced => None,
        }
    }

    /// Run the strategy.
    pub fn generate(self, ctx: &StrategyContext<'_>) -> Result<Selection, StrategyError> {
        ctx.validate()?;
        match self {
            StrategyKind::Uniform => uniform::generate(ctx),
            StrategyKind::HotStreak => hot_streak::generate(ctx),
            StrategyKind::ColdSurge => cold_surge::generate(ctx),
            StrategyKind::Balanced => balanced::generate(ctx),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Inputs for one strategy invocation.
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
    pub seed: &'a str,
    pub k: usize,
    pub window: Option<u32>,
    pub statistics: Option<&'a dyn StatisticsSource>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(seed: &'a str, k: usize) -> Self {
        Self {
            seed,
            k,
            window: None,
            statistics: None,
        }
    }

    pub fn with_window(mut self, window: Option<u32>) -> Self {
        self.window = window;
        self
    }

    pub fn with_statistics(mut self, statistics: &'a dyn StatisticsSource) -> Self {
        self.statistics = Some(statistics);
        self
    }

    fn validate(&self) -> Result<(), StrategyError> {
        if self.seed.trim().is_empty() {
            return Err(StrategyError::InvalidSeed);
        }
        if !(MIN_K..=MAX_K).contains(&self.k) {
            return Err(StrategyError::KOutOfRange { k: self.k });
        }
        Ok(())
    }

    fn require_statistics(&self, kind: StrategyKind) -> Result<&'a dyn StatisticsSource, StrategyError> {
        self.statistics.ok_or(StrategyError::MissingStatistics(kind))
    }
}

impl fmt::Debug for StrategyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyContext")
            .field("seed", &self.seed)
            .field("k", &self.k)
            .field("window", &self.window)
            .field("statistics", &self.statistics.is_some())
            .finish()
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
