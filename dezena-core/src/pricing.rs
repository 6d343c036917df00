//! Ticket pricing and budget allocation.
//!
//! A `k`-number ticket is priced as `C(k, 6)` simple bets, unless the table
//! carries an explicit override for that `k`. Allocation turns an integer
//! budget into the largest affordable ticket count, capped by the per-batch
//! ceiling, and never spends more than the budget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{MAX_K, MIN_K};

/// Numbers in the cheapest ticket; every larger ticket is priced in multiples of it.
const SIMPLE_BET_SIZE: u64 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("k={k} outside the priced range [{min}, {max}]")]
    KOutOfRange { k: usize, min: usize, max: usize },
    #[error("budget of {budget_cents} cents is below the minimum of {required_cents} cents")]
    BudgetBelowMin { budget_cents: u64, required_cents: u64 },
    #[error("budget of {budget_cents} cents exceeds the maximum of {max_cents} cents")]
    BudgetAboveMax { budget_cents: u64, max_cents: u64 },
    #[error("no price configured for k={k}")]
    PriceNotFound { k: usize },
    #[error("price for k={k} at {base_price_cents} cents per bet does not fit in u64")]
    PriceOverflow { k: usize, base_price_cents: u64 },
}

/// Result of fitting a budget to a ticket cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    pub budget_cents: u64,
    pub ticket_cost_cents: u64,
    pub max_tickets: usize,
    pub leftover_cents: u64,
    /// The per-batch ceiling, not the budget, bounded `max_tickets`.
    pub constrained_by_ticket_limit: bool,
}

/// Pricing read interface consumed by the orchestrator.
pub trait PricingSource: Send + Sync {
    fn ticket_cost(&self, k: usize) -> Result<u64, PricingError>;

    fn allocate_budget(&self, budget_cents: u64, k: usize) -> Result<BudgetAllocation, PricingError>;
}

/// Pricing parameters. Every field has a default so partial TOML works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price of one simple 6-number bet.
    pub base_price_cents: u64,
    pub min_k: usize,
    pub max_k: usize,
    pub min_budget_cents: u64,
    pub max_budget_cents: u64,
    pub max_tickets_per_batch: usize,
    /// Explicit prices by `k`, replacing the combinatorial price.
    #[serde(with = "override_keys")]
    pub overrides: BTreeMap<usize, u64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price_cents: 600,
            min_k: MIN_K,
            max_k: MAX_K,
            min_budget_cents: 600,
            max_budget_cents: 5_000_000,
            max_tickets_per_batch: 100,
            overrides: BTreeMap::new(),
        }
    }
}

/// TOML table keys are always strings, so `k` round-trips as text.
mod override_keys {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(map: &BTreeMap<usize, u64>, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_map(map.iter().map(|(k, v)| (k.to_string(), v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<BTreeMap<usize, u64>, D::Error> {
        BTreeMap::<String, u64>::deserialize(de)?
            .into_iter()
            .map(|(k, v)| {
                k.trim()
                    .parse::<usize>()
                    .map(|k| (k, v))
                    .map_err(|_| D::Error::custom(format!("override key '{k}' is not a ticket size")))
            })
            .collect()
    }
}

/// `C(n, r)`, or `None` if an intermediate product overflows.
pub fn binomial(n: u64, r: u64) -> Option<u64> {
    if r > n {
        return Some(0);
    }
    let r = r.min(n - r);
    (0..r).try_fold(1u64, |acc, i| Some(acc.checked_mul(n - i)? / (i + 1)))
}

/// Default pricing implementation backed by a [`PricingConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    config: PricingConfig,
}

impl PriceTable {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// `(k, cost)` for every priced `k`, skipping those without a price.
    pub fn entries(&self) -> Vec<(usize, u64)> {
        (self.config.min_k..=self.config.max_k)
            .filter_map(|k| self.ticket_cost(k).ok().map(|c| (k, c)))
            .collect()
    }

    fn check_k(&self, k: usize) -> Result<(), PricingError> {
        if (self.config.min_k..=self.config.max_k).contains(&k) {
            Ok(())
        } else {
            Err(PricingError::KOutOfRange {
                k,
                min: self.config.min_k,
                max: self.config.max_k,
            })
        }
    }
}

impl PricingSource for PriceTable {
    fn ticket_cost(&self, k: usize) -> Result<u64, PricingError> {
        self.check_k(k)?;
        if let Some(&cost) = self.config.overrides.get(&k) {
            return if cost > 0 {
                Ok(cost)
            } else {
                Err(PricingError::PriceNotFound { k })
            };
        }
        match self.config.base_price_cents {
            0 => Err(PricingError::PriceNotFound { k }),
            base => binomial(k as u64, SIMPLE_BET_SIZE)
                .and_then(|bets| base.checked_mul(bets))
                .ok_or(PricingError::PriceOverflow {
                    k,
                    base_price_cents: base,
                }),
        }
    }

    fn allocate_budget(&self, budget_cents: u64, k: usize) -> Result<BudgetAllocation, PricingError> {
        self.check_k(k)?;
        if budget_cents < self.config.min_budget_cents {
            return Err(PricingError::BudgetBelowMin {
                budget_cents,
                required_cents: self.config.min_budget_cents,
            });
        }
        if budget_cents > self.config.max_budget_cents {
            return Err(PricingError::BudgetAboveMax {
                budget_cents,
                max_cents: self.config.max_budget_cents,
            });
        }

        let ticket_cost_cents = self.ticket_cost(k)?;
        let by_budget = (budget_cents / ticket_cost_cents) as usize;
        if by_budget == 0 {
            return Err(PricingError::BudgetBelowMin {
                budget_cents,
                required_cents: ticket_cost_cents,
            });
        }

        let max_tickets = by_budget.min(self.config.max_tickets_per_batch);
        Ok(BudgetAllocation {
            budget_cents,
            ticket_cost_cents,
            max_tickets,
            leftover_cents: budget_cents - max_tickets as u64 * ticket_cost_cents,
            constrained_by_ticket_limit: max_tickets < by_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(6, 6), Some(1));
        assert_eq!(binomial(7, 6), Some(7));
        assert_eq!(binomial(15, 6), Some(5005));
        assert_eq!(binomial(60, 6), Some(50_063_860));
        assert_eq!(binomial(5, 6), Some(0));
        assert_eq!(binomial(u64::MAX, 6), None);
    }

    #[test]
    fn oversized_base_price_is_an_error() {
        let table = PriceTable::new(PricingConfig {
            base_price_cents: 10_000_000_000_000_000,
            ..PricingConfig::default()
        });
        assert_eq!(
            table.ticket_cost(15).unwrap_err(),
            PricingError::PriceOverflow {
                k: 15,
                base_price_cents: 10_000_000_000_000_000
            }
        );
        // C(13, 6) = 1716 still fits; C(14, 6) = 3003 does not.
        assert_eq!(table.ticket_cost(13).unwrap(), 17_160_000_000_000_000_000);
        assert_eq!(table.entries().last(), Some(&(13, 17_160_000_000_000_000_000)));
        assert_eq!(table.entries().len(), 8);
        assert!(matches!(
            table.allocate_budget(600, 14),
            Err(PricingError::PriceOverflow { k: 14, .. })
        ));
    }

    #[test]
    fn default_costs() {
        let table = PriceTable::default();
        assert_eq!(table.ticket_cost(6).unwrap(), 600);
        assert_eq!(table.ticket_cost(7).unwrap(), 4200);
        assert_eq!(table.ticket_cost(15).unwrap(), 3_003_000);
        assert_eq!(table.entries().len(), 10);
    }

    #[test]
    fn k_outside_table() {
        let table = PriceTable::default();
        assert_eq!(
            table.ticket_cost(16).unwrap_err(),
            PricingError::KOutOfRange {
                k: 16,
                min: 6,
                max: 15
            }
        );
        assert!(matches!(
            table.allocate_budget(2400, 5),
            Err(PricingError::KOutOfRange { k: 5, .. })
        ));
    }

    #[test]
    fn override_replaces_combinatorial_price() {
        let mut config = PricingConfig::default();
        config.overrides.insert(7, 3500);
        let table = PriceTable::new(config);
        assert_eq!(table.ticket_cost(7).unwrap(), 3500);
        assert_eq!(table.ticket_cost(8).unwrap(), 600 * 28);
    }

    #[test]
    fn missing_price() {
        let table = PriceTable::new(PricingConfig {
            base_price_cents: 0,
            ..PricingConfig::default()
        });
        assert_eq!(
            table.ticket_cost(6).unwrap_err(),
            PricingError::PriceNotFound { k: 6 }
        );
    }

    #[test]
    fn exact_budget_has_no_leftover() {
        let alloc = PriceTable::default().allocate_budget(2400, 6).unwrap();
        assert_eq!(alloc.max_tickets, 4);
        assert_eq!(alloc.leftover_cents, 0);
        assert_eq!(alloc.ticket_cost_cents, 600);
        assert!(!alloc.constrained_by_ticket_limit);
    }

    #[test]
    fn leftover_is_remainder() {
        let alloc = PriceTable::default().allocate_budget(2500, 6).unwrap();
        assert_eq!(alloc.max_tickets, 4);
        assert_eq!(alloc.leftover_cents, 100);
    }

    #[test]
    fn budget_below_minimum() {
        assert_eq!(
            PriceTable::default().allocate_budget(500, 6).unwrap_err(),
            PricingError::BudgetBelowMin {
                budget_cents: 500,
                required_cents: 600
            }
        );
    }

    #[test]
    fn budget_cannot_buy_one_large_ticket() {
        // 1000 cents passes the minimum but a 7-number ticket costs 4200.
        assert_eq!(
            PriceTable::default().allocate_budget(1000, 7).unwrap_err(),
            PricingError::BudgetBelowMin {
                budget_cents: 1000,
                required_cents: 4200
            }
        );
    }

    #[test]
    fn budget_above_maximum() {
        assert!(matches!(
            PriceTable::default().allocate_budget(5_000_001, 6),
            Err(PricingError::BudgetAboveMax { .. })
        ));
    }

    #[test]
    fn ticket_ceiling_binds() {
        let alloc = PriceTable::default().allocate_budget(600 * 150 + 10, 6).unwrap();
        assert_eq!(alloc.max_tickets, 100);
        assert!(alloc.constrained_by_ticket_limit);
        assert_eq!(alloc.leftover_cents, 600 * 50 + 10);
    }

    #[test]
    fn overrides_serialize_with_string_keys() {
        let mut config = PricingConfig::default();
        config.overrides.insert(7, 3500);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""overrides":{"7":3500}"#));
        let back: PricingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let bad = r#"{"overrides":{"seven":3500}}"#;
        assert!(serde_json::from_str::<PricingConfig>(bad).is_err());
    }
}
