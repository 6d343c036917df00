//! Dezena Runner: batch orchestration, configuration and persistence.
//!
//! This crate builds on `dezena-core` to provide:
//! - The batch orchestrator (allocation, per-ticket fallback, deadline)
//! - Largest-remainder allocation of tickets across weighted strategies
//! - Batch metrics and the versioned payload
//! - TOML configuration for pricing and batch defaults
//! - Draw-history CSV loading
//! - JSON / CSV export of generated batches

pub mod allocation;
pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod payload;

pub use allocation::allocate_tickets;
pub use batch::{
    generate_batch, generate_batch_with, BatchError, BatchGenerationResult, BatchPhase,
    BatchRequest, Clock, StrategyRequest, SystemClock,
};
pub use config::{BatchDefaults, ConfigError, DezenaConfig};
pub use data_loader::{load_draws, parse_draws, LoadError, LoadedDraws};
pub use export::{export_json, export_tickets_csv, import_json, load_batch, save_batch};
pub use metrics::{BatchMetrics, QuadrantCoverage};
pub use payload::{BatchPayload, ResolvedConfig, StrategySummary, SCHEMA_VERSION};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn batch_result_is_send_sync() {
        assert_send::<BatchGenerationResult>();
        assert_sync::<BatchGenerationResult>();
        assert_send::<BatchPayload>();
        assert_sync::<BatchPayload>();
    }

    #[test]
    fn request_and_error_are_send_sync() {
        assert_send::<BatchRequest>();
        assert_sync::<BatchRequest>();
        assert_send::<BatchError>();
        assert_sync::<BatchError>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<DezenaConfig>();
        assert_sync::<DezenaConfig>();
        assert_send::<LoadedDraws>();
        assert_sync::<LoadedDraws>();
    }
}
