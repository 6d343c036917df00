//! Statistics read interface consumed by the strategies.
//!
//! The engine never aggregates draw history itself; it reads already-computed
//! snapshots through [`StatisticsSource`]. `DrawHistory` is an in-memory
//! implementation and `StatisticsCache` memoizes any source explicitly.

pub mod cache;
pub mod history;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Dezena;

pub use cache::StatisticsCache;
pub use history::{Draw, DrawHistory};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticsError {
    #[error("window must be at least one draw")]
    InvalidWindow,
    #[error("invalid draw {contest}: {reason}")]
    InvalidDraw { contest: u32, reason: String },
    #[error("statistics unavailable: {0}")]
    Unavailable(String),
}

/// Hit count and rate for one number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyItem {
    pub dezena: Dezena,
    pub hits: u32,
    /// `hits / total_draws`, 0 when there are no draws.
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencySnapshot {
    pub total_draws: u32,
    pub items: Vec<FrequencyItem>,
}

impl FrequencySnapshot {
    /// Frequency of `dezena`, 0 if the snapshot has no entry for it.
    pub fn frequency_of(&self, dezena: Dezena) -> f64 {
        self.items
            .iter()
            .find(|item| item.dezena == dezena)
            .map_or(0.0, |item| item.frequency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecencyEntry {
    pub dezena: Dezena,
    /// Contests since the number last appeared; `None` if never observed.
    pub contests_since_last: Option<u32>,
}

/// Historical hit total for one decade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantTotal {
    pub range: String,
    pub total: u32,
}

/// Idempotent, side-effect-free reads over draw history.
///
/// `window` limits the query to the most recent `window` draws; `None` means
/// the whole history. Implementations must tolerate concurrent reads.
pub trait StatisticsSource: Send + Sync {
    fn frequencies(&self, window: Option<u32>) -> Result<FrequencySnapshot, StatisticsError>;

    fn recency(&self) -> Result<Vec<RecencyEntry>, StatisticsError>;

    fn quadrants(&self, window: Option<u32>) -> Result<Vec<QuadrantTotal>, StatisticsError>;
}

impl<S: StatisticsSource + ?Sized> StatisticsSource for &S {
    fn frequencies(&self, window: Option<u32>) -> Result<FrequencySnapshot, StatisticsError> {
        (**self).frequencies(window)
    }

    fn recency(&self) -> Result<Vec<RecencyEntry>, StatisticsError> {
        (**self).recency()
    }

    fn quadrants(&self, window: Option<u32>) -> Result<Vec<QuadrantTotal>, StatisticsError> {
        (**self).quadrants(window)
    }
}
