//! Versioned batch summary handed to persistence.
//!
//! Field names (camelCase) and integer cents are a wire contract. The
//! `version` field lets readers reject artifacts written by a newer engine.

use serde::{Deserialize, Serialize};

use dezena_core::StrategyKind;

use crate::metrics::BatchMetrics;

/// Current schema version for persisted payloads.
pub const SCHEMA_VERSION: u32 = 1;

/// Default schema version for payloads written before the field existed.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Per-strategy bookkeeping for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub name: StrategyKind,
    /// Tickets assigned by the weight allocation.
    pub allocated: usize,
    /// Primary invocations made.
    pub attempts: usize,
    /// Tickets emitted for this entry, fallbacks included.
    pub generated: usize,
    /// Tickets that came from the uniform fallback.
    pub fallbacks: usize,
    /// Primary invocations that failed.
    pub failures: usize,
}

impl StrategySummary {
    pub fn new(name: StrategyKind, allocated: usize) -> Self {
        Self {
            name,
            allocated,
            attempts: 0,
            generated: 0,
            fallbacks: 0,
            failures: 0,
        }
    }

    /// Tickets lost because the fallback failed too.
    pub fn dropped(&self) -> usize {
        self.allocated.saturating_sub(self.generated)
    }
}

/// A strategy entry after name resolution and window defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStrategy {
    pub name: StrategyKind,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u32>,
}

/// The configuration the batch actually ran with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub strategies: Vec<ResolvedStrategy>,
    pub k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u32>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    #[serde(default = "default_schema_version")]
    pub version: u32,
    pub seed: String,
    pub budget_cents: u64,
    pub ticket_cost_cents: u64,
    pub total_cost_cents: u64,
    pub leftover_cents: u64,
    pub tickets_generated: usize,
    pub tickets_planned: usize,
    pub strategies: Vec<StrategySummary>,
    pub metrics: BatchMetrics,
    pub config: ResolvedConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchPayload {
        BatchPayload {
            version: SCHEMA_VERSION,
            seed: "s".into(),
            budget_cents: 2500,
            ticket_cost_cents: 600,
            total_cost_cents: 2400,
            leftover_cents: 100,
            tickets_generated: 4,
            tickets_planned: 4,
            strategies: vec![StrategySummary {
                generated: 4,
                attempts: 4,
                ..StrategySummary::new(StrategyKind::Uniform, 4)
            }],
            metrics: BatchMetrics::default(),
            config: ResolvedConfig {
                strategies: vec![ResolvedStrategy {
                    name: StrategyKind::Uniform,
                    weight: 1.0,
                    window: None,
                }],
                k: 6,
                window: None,
                timeout_ms: 5000,
            },
        }
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        for key in [
            "version",
            "seed",
            "budgetCents",
            "ticketCostCents",
            "totalCostCents",
            "leftoverCents",
            "ticketsGenerated",
            "ticketsPlanned",
            "strategies",
            "metrics",
            "config",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["config"]["timeoutMs"], 5000);
        assert_eq!(json["strategies"][0]["name"], "uniform");
        assert!(json["config"].get("window").is_none());
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json.as_object_mut().unwrap().remove("version");
        let payload: BatchPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.version, SCHEMA_VERSION);
    }

    #[test]
    fn dropped_counts_missing_tickets() {
        let summary = StrategySummary {
            generated: 3,
            ..StrategySummary::new(StrategyKind::Balanced, 5)
        };
        assert_eq!(summary.dropped(), 2);
    }
}
