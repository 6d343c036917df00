//! In-memory draw history snapshot.

use serde::{Deserialize, Serialize};

use super::{
    FrequencyItem, FrequencySnapshot, QuadrantTotal, RecencyEntry, StatisticsError,
    StatisticsSource,
};
use crate::domain::{quadrant_index, quadrant_label, Dezena, MAX_NUMBER, MIN_NUMBER, QUADRANT_COUNT};

/// One official draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub contest: u32,
    pub numbers: Vec<Dezena>,
}

impl Draw {
    pub fn new(contest: u32, numbers: Vec<Dezena>) -> Self {
        Self { contest, numbers }
    }

    fn validate(&self) -> Result<(), StatisticsError> {
        let invalid = |reason: String| StatisticsError::InvalidDraw {
            contest: self.contest,
            reason,
        };
        if self.numbers.is_empty() {
            return Err(invalid("no numbers".into()));
        }
        if let Some(n) = self
            .numbers
            .iter()
            .find(|n| !(MIN_NUMBER..=MAX_NUMBER).contains(*n))
        {
            return Err(invalid(format!("number {n} outside [{MIN_NUMBER}, {MAX_NUMBER}]")));
        }
        let mut sorted = self.numbers.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("duplicate number".into()));
        }
        Ok(())
    }
}

/// Draws ordered oldest → newest by contest number.
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    draws: Vec<Draw>,
}

impl DrawHistory {
    /// Validate and order draws. Duplicate contest numbers keep the last one seen.
    pub fn new(mut draws: Vec<Draw>) -> Result<Self, StatisticsError> {
        for draw in &draws {
            draw.validate()?;
        }
        draws.sort_by_key(|d| d.contest);
        draws.dedup_by(|later, earlier| {
            if later.contest == earlier.contest {
                std::mem::swap(later, earlier);
                true
            } else {
                false
            }
        });
        Ok(Self { draws })
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn latest_contest(&self) -> Option<u32> {
        self.draws.last().map(|d| d.contest)
    }

    /// Most recent `window` draws (all of them when `None`).
    fn window(&self, window: Option<u32>) -> Result<&[Draw], StatisticsError> {
        match window {
            Some(0) => Err(StatisticsError::InvalidWindow),
            Some(w) => {
                let start = self.draws.len().saturating_sub(w as usize);
                Ok(&self.draws[start..])
            }
            None => Ok(&self.draws),
        }
    }

    fn hit_counts(draws: &[Draw]) -> [u32; MAX_NUMBER as usize + 1] {
        let mut hits = [0u32; MAX_NUMBER as usize + 1];
        for draw in draws {
            for &n in &draw.numbers {
                hits[usize::from(n)] += 1;
            }
        }
        hits
    }
}

impl StatisticsSource for DrawHistory {
    fn frequencies(&self, window: Option<u32>) -> Result<FrequencySnapshot, StatisticsError> {
        let draws = self.window(window)?;
        let hits = Self::hit_counts(draws);
        let total_draws = draws.len() as u32;
        let items = (MIN_NUMBER..=MAX_NUMBER)
            .map(|dezena| {
                let h = hits[usize::from(dezena)];
                FrequencyItem {
                    dezena,
                    hits: h,
                    frequency: if total_draws == 0 {
                        0.0
                    } else {
                        f64::from(h) / f64::from(total_draws)
                    },
                }
            })
            .collect();
        Ok(FrequencySnapshot { total_draws, items })
    }

    fn recency(&self) -> Result<Vec<RecencyEntry>, StatisticsError> {
        let mut since: [Option<u32>; MAX_NUMBER as usize + 1] = [None; MAX_NUMBER as usize + 1];
        for (age, draw) in self.draws.iter().rev().enumerate() {
            for &n in &draw.numbers {
                let slot = &mut since[usize::from(n)];
                if slot.is_none() {
                    *slot = Some(age as u32);
                }
            }
        }
        Ok((MIN_NUMBER..=MAX_NUMBER)
            .map(|dezena| RecencyEntry {
                dezena,
                contests_since_last: since[usize::from(dezena)],
            })
            .collect())
    }

    fn quadrants(&self, window: Option<u32>) -> Result<Vec<QuadrantTotal>, StatisticsError> {
        let draws = self.window(window)?;
        let mut totals = [0u32; QUADRANT_COUNT];
        for draw in draws {
            for &n in &draw.numbers {
                totals[quadrant_index(n)] += 1;
            }
        }
        Ok(totals
            .iter()
            .enumerate()
            .map(|(i, &total)| QuadrantTotal {
                range: quadrant_label(i),
                total,
            })
            .collect())
    }
}
