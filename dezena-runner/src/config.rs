//! TOML configuration for pricing and batch defaults.
//!
//! ```toml
//! [pricing]
//! base_price_cents = 600
//! max_tickets_per_batch = 100
//!
//! [pricing.overrides]
//! 7 = 3500
//!
//! [batch]
//! k = 6
//! window = 200
//! timeout_ms = 5000
//! strategies = [
//!     { name = "hot-streak", weight = 2.0, window = 100 },
//!     { name = "balanced", weight = 1.0 },
//! ]
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dezena_core::domain::{MAX_K, MIN_K};
use dezena_core::strategies::StrategyKind;
use dezena_core::pricing::{PricingError, PricingSource};
use dezena_core::{PriceTable, PricingConfig};

use crate::batch::{BatchRequest, StrategyRequest, DEFAULT_K, DEFAULT_TIMEOUT_MS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Defaults applied to every batch request built from this config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchDefaults {
    pub k: usize,
    pub window: Option<u32>,
    pub timeout_ms: u64,
    pub strategies: Vec<StrategyRequest>,
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            window: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            strategies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DezenaConfig {
    pub pricing: PricingConfig,
    pub batch: BatchDefaults,
}

impl DezenaConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pricing;
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if p.min_k < MIN_K || p.max_k > MAX_K {
            return invalid(format!(
                "pricing k range [{}, {}] must lie within [{MIN_K}, {MAX_K}]",
                p.min_k, p.max_k
            ));
        }
        if p.min_k > p.max_k {
            return invalid(format!("pricing.min_k {} exceeds max_k {}", p.min_k, p.max_k));
        }
        if p.min_budget_cents > p.max_budget_cents {
            return invalid(format!(
                "pricing.min_budget_cents {} exceeds max_budget_cents {}",
                p.min_budget_cents, p.max_budget_cents
            ));
        }
        if p.max_tickets_per_batch == 0 {
            return invalid("pricing.max_tickets_per_batch must be at least 1".into());
        }
        if let Some(k) = p.overrides.keys().find(|k| !(p.min_k..=p.max_k).contains(*k)) {
            return invalid(format!("pricing override for k={k} is outside the priced range"));
        }
        let table = self.price_table();
        for k in p.min_k..=p.max_k {
            if let Err(e @ PricingError::PriceOverflow { .. }) = table.ticket_cost(k) {
                return invalid(format!("pricing.base_price_cents: {e}"));
            }
        }

        let b = &self.batch;
        if !(p.min_k..=p.max_k).contains(&b.k) {
            return invalid(format!("batch.k {} is outside the priced range", b.k));
        }
        if b.window == Some(0) {
            return invalid("batch.window must be at least 1".into());
        }
        for s in &b.strategies {
            s.name
                .parse::<StrategyKind>()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            if !s.weight.is_finite() || s.weight < 0.0 {
                return invalid(format!("strategy '{}' has invalid weight {}", s.name, s.weight));
            }
            if s.window == Some(0) {
                return invalid(format!("strategy '{}' window must be at least 1", s.name));
            }
        }
        Ok(())
    }

    pub fn price_table(&self) -> PriceTable {
        PriceTable::new(self.pricing.clone())
    }

    /// A request carrying this config's batch defaults.
    pub fn request(&self, budget_cents: u64, seed: impl Into<String>) -> BatchRequest {
        BatchRequest {
            budget_cents,
            seed: seed.into(),
            strategies: self.batch.strategies.clone(),
            k: self.batch.k,
            window: self.batch.window,
            timeout_ms: self.batch.timeout_ms,
        }
    }
}
