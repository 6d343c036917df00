//! Dezena Core: the deterministic bet-generation engine.
//!
//! This crate contains everything that turns a seed string into tickets:
//! - Seed hashing and the Mulberry32 generator
//! - Sampling primitives (unique integers, weighted pick, weighted pool)
//! - Domain types (tickets, metadata, quadrants)
//! - The statistics read interface, an in-memory draw history and a cache
//! - The four selection strategies
//! - Ticket pricing and budget allocation

pub mod domain;
pub mod pricing;
pub mod rng;
pub mod sampling;
pub mod statistics;
pub mod strategies;

pub use domain::{Selection, StrategyMetadata, Ticket};
pub use pricing::{BudgetAllocation, PriceTable, PricingConfig, PricingError, PricingSource};
pub use rng::{hash_seed, Mulberry32, SeedHierarchy};
pub use statistics::{DrawHistory, StatisticsCache, StatisticsSource};
pub use strategies::{StrategyContext, StrategyError, StrategyKind};
