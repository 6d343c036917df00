//! Batch orchestrator: a budget and a weighted strategy list in, a costed
//! and auditable set of tickets out.
//!
//! Flow for one call:
//! 1. Planning: validate the seed, resolve strategy names, validate weights.
//! 2. Allocating: ask the pricing source how many tickets the budget buys,
//!    then split that count across strategies by weight.
//! 3. Generating: one invocation per planned ticket with sub-seed
//!    `"{seed}:{strategy}:{i}"`. A failed invocation is retried once with
//!    `uniform` on the same sub-seed; if that fails too the ticket is dropped.
//! 4. Aggregating: totals are recomputed from the tickets actually emitted.
//!
//! The wall-clock deadline is checked before every invocation. Running out of
//! time aborts the whole batch with [`BatchError::BatchGenerationTimeout`];
//! tickets produced so far are discarded.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use dezena_core::pricing::{PricingError, PricingSource};
use dezena_core::statistics::StatisticsSource;
use dezena_core::strategies::{StrategyContext, StrategyError, StrategyKind, UnknownStrategy};
use dezena_core::{SeedHierarchy, Selection, Ticket};

use crate::allocation::allocate_tickets;
use crate::metrics::BatchMetrics;
use crate::payload::{
    BatchPayload, ResolvedConfig, ResolvedStrategy, StrategySummary, SCHEMA_VERSION,
};

pub const DEFAULT_K: usize = 6;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn default_k() -> usize {
    DEFAULT_K
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_weight() -> f64 {
    1.0
}

/// Batch-fatal errors. Per-ticket strategy failures never surface here; they
/// are recovered by the fallback and reported as warnings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    #[error("seed must not be empty")]
    InvalidSeed,
    #[error(transparent)]
    UnknownStrategy(#[from] UnknownStrategy),
    #[error("strategy '{name}' has invalid weight {weight} (must be finite and >= 0)")]
    InvalidWeight { name: String, weight: f64 },
    #[error("pricing failed: {0}")]
    Pricing(#[from] PricingError),
    #[error(
        "batch timed out after {elapsed_ms} ms (limit {timeout_ms} ms) with {generated} of {planned} tickets"
    )]
    BatchGenerationTimeout {
        generated: usize,
        planned: usize,
        elapsed_ms: u64,
        timeout_ms: u64,
    },
}

// ─── Request ────────────────────────────────────────────────────────

/// One weighted strategy entry as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRequest {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Overrides the batch-wide window for this strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u32>,
}

impl StrategyRequest {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            window: None,
        }
    }

    pub fn with_window(mut self, window: u32) -> Self {
        self.window = Some(window);
        self
    }
}

/// Parses `name[:weight[:window]]`, e.g. `hot-streak:2:100`.
impl FromStr for StrategyRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(format!("empty strategy name in '{s}'"));
        }
        let weight = match parts.next() {
            Some(w) if !w.is_empty() => w
                .parse::<f64>()
                .map_err(|_| format!("invalid weight '{w}' in '{s}'"))?,
            _ => default_weight(),
        };
        let window = match parts.next() {
            Some(w) if !w.is_empty() => Some(
                w.parse::<u32>()
                    .map_err(|_| format!("invalid window '{w}' in '{s}'"))?,
            ),
            _ => None,
        };
        if parts.next().is_some() {
            return Err(format!("too many fields in '{s}' (expected name[:weight[:window]])"));
        }
        Ok(Self {
            name: name.to_string(),
            weight,
            window,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub budget_cents: u64,
    pub seed: String,
    /// Empty means a single `uniform` entry with weight 1.
    #[serde(default)]
    pub strategies: Vec<StrategyRequest>,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Batch-wide statistics window.
    #[serde(default)]
    pub window: Option<u32>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BatchRequest {
    pub fn new(budget_cents: u64, seed: impl Into<String>) -> Self {
        Self {
            budget_cents,
            seed: seed.into(),
            strategies: Vec::new(),
            k: DEFAULT_K,
            window: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyRequest) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_window(mut self, window: Option<u32>) -> Self {
        self.window = window;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

// ─── Phases and clock ───────────────────────────────────────────────

/// Orchestrator state, reported in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Planning,
    Allocating,
    Generating,
    Fallback,
    Aggregating,
    Done,
    TimedOut,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchPhase::Planning => "planning",
            BatchPhase::Allocating => "allocating",
            BatchPhase::Generating => "generating",
            BatchPhase::Fallback => "fallback",
            BatchPhase::Aggregating => "aggregating",
            BatchPhase::Done => "done",
            BatchPhase::TimedOut => "timed-out",
        })
    }
}

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

struct Deadline<'a> {
    clock: &'a dyn Clock,
    started_ms: u64,
    timeout_ms: u64,
}

impl<'a> Deadline<'a> {
    fn start(clock: &'a dyn Clock, timeout_ms: u64) -> Self {
        Self {
            clock,
            started_ms: clock.now_ms(),
            timeout_ms,
        }
    }

    /// Fails once the elapsed time reaches the limit; a zero limit always fails.
    fn check(&self, generated: usize, planned: usize) -> Result<(), BatchError> {
        let elapsed_ms = self.clock.now_ms().saturating_sub(self.started_ms);
        if elapsed_ms >= self.timeout_ms {
            warn!(
                phase = %BatchPhase::TimedOut,
                generated,
                planned,
                elapsed_ms,
                timeout_ms = self.timeout_ms,
                "batch deadline exceeded"
            );
            return Err(BatchError::BatchGenerationTimeout {
                generated,
                planned,
                elapsed_ms,
                timeout_ms: self.timeout_ms,
            });
        }
        Ok(())
    }
}

// ─── Result ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGenerationResult {
    pub tickets: Vec<Ticket>,
    pub ticket_cost_cents: u64,
    /// Sum of emitted ticket costs.
    pub total_cost_cents: u64,
    /// Budget minus what was actually spent.
    pub leftover_cents: u64,
    pub warnings: Vec<String>,
    pub payload: BatchPayload,
}

impl BatchGenerationResult {
    /// BLAKE3 digest over the payload and every ticket's seed and numbers.
    ///
    /// Two runs with the same request, pricing and statistics produce the
    /// same id.
    pub fn batch_id(&self) -> Result<String, serde_json::Error> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&serde_json::to_vec(&self.payload)?);
        for ticket in &self.tickets {
            hasher.update(ticket.seed.as_bytes());
            hasher.update(&ticket.numbers);
        }
        Ok(hasher.finalize().to_hex().to_string())
    }

    pub fn tickets_by(&self, kind: StrategyKind) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(move |t| t.strategy == kind)
    }
}

// ─── Orchestration ──────────────────────────────────────────────────

struct PlannedStrategy {
    kind: StrategyKind,
    weight: f64,
    window: Option<u32>,
}

fn resolve_strategies(request: &BatchRequest) -> Result<Vec<PlannedStrategy>, BatchError> {
    if request.strategies.is_empty() {
        return Ok(vec![PlannedStrategy {
            kind: StrategyKind::Uniform,
            weight: 1.0,
            window: None,
        }]);
    }

    request
        .strategies
        .iter()
        .map(|entry| {
            let kind: StrategyKind = entry.name.parse()?;
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(BatchError::InvalidWeight {
                    name: entry.name.clone(),
                    weight: entry.weight,
                });
            }
            let window = if kind.needs_statistics() {
                entry
                    .window
                    .or(request.window)
                    .or_else(|| kind.default_window())
            } else {
                None
            };
            Ok(PlannedStrategy {
                kind,
                weight: entry.weight,
                window,
            })
        })
        .collect()
}

/// Generate a batch with the system clock and the built-in strategies.
pub fn generate_batch(
    request: &BatchRequest,
    pricing: &dyn PricingSource,
    statistics: Option<&dyn StatisticsSource>,
) -> Result<BatchGenerationResult, BatchError> {
    generate_batch_with(request, pricing, statistics, &SystemClock::new(), |kind, ctx| {
        kind.generate(ctx)
    })
}

/// Generate a batch with an explicit clock and strategy invoker.
///
/// `invoke` receives the strategy to run and its context; [`generate_batch`]
/// passes `StrategyKind::generate`.
pub fn generate_batch_with<F>(
    request: &BatchRequest,
    pricing: &dyn PricingSource,
    statistics: Option<&dyn StatisticsSource>,
    clock: &dyn Clock,
    mut invoke: F,
) -> Result<BatchGenerationResult, BatchError>
where
    F: FnMut(StrategyKind, &StrategyContext<'_>) -> Result<Selection, StrategyError>,
{
    if request.seed.trim().is_empty() {
        return Err(BatchError::InvalidSeed);
    }
    let plan = resolve_strategies(request)?;
    debug!(
        phase = %BatchPhase::Planning,
        seed = %request.seed,
        strategies = plan.len(),
        k = request.k,
        "batch planned"
    );

    let allocation = pricing.allocate_budget(request.budget_cents, request.k)?;
    let planned = allocation.max_tickets;
    let weights: Vec<f64> = plan.iter().map(|p| p.weight).collect();
    let counts = allocate_tickets(planned, &weights);
    debug!(
        phase = %BatchPhase::Allocating,
        planned,
        ticket_cost_cents = allocation.ticket_cost_cents,
        constrained_by_ticket_limit = allocation.constrained_by_ticket_limit,
        ?counts,
        "budget allocated"
    );

    let seeds = SeedHierarchy::new(request.seed.clone());
    let deadline = Deadline::start(clock, request.timeout_ms);
    let mut tickets: Vec<Ticket> = Vec::with_capacity(planned);
    let mut summaries = Vec::with_capacity(plan.len());
    let mut warnings = Vec::new();
    // Sub-seed indices run per strategy kind so repeated entries never collide.
    let mut next_index: BTreeMap<StrategyKind, usize> = BTreeMap::new();

    for (entry, &count) in plan.iter().zip(&counts) {
        let mut summary = StrategySummary::new(entry.kind, count);

        for _ in 0..count {
            let index = next_index.entry(entry.kind).or_insert(0);
            let sub_seed = seeds.sub_seed(entry.kind.name(), *index);
            *index += 1;

            deadline.check(tickets.len(), planned)?;
            let mut ctx = StrategyContext::new(&sub_seed, request.k).with_window(entry.window);
            if let Some(stats) = statistics {
                ctx = ctx.with_statistics(stats);
            }
            summary.attempts += 1;
            debug!(
                phase = %BatchPhase::Generating,
                strategy = %entry.kind,
                seed = %sub_seed,
                "invoking strategy"
            );

            let selection = match invoke(entry.kind, &ctx) {
                Ok(selection) => Some(selection),
                Err(err) => {
                    summary.failures += 1;
                    deadline.check(tickets.len(), planned)?;
                    let fallback_ctx = StrategyContext::new(&sub_seed, request.k);
                    match invoke(StrategyKind::Uniform, &fallback_ctx) {
                        Ok(selection) => {
                            summary.fallbacks += 1;
                            warn!(
                                phase = %BatchPhase::Fallback,
                                strategy = %entry.kind,
                                seed = %sub_seed,
                                error = %err,
                                "strategy failed, used uniform fallback"
                            );
                            warnings.push(format!(
                                "Estratégia {} falhou em {sub_seed} ({err}); aposta gerada com fallback uniform",
                                entry.kind
                            ));
                            Some(selection)
                        }
                        Err(fallback_err) => {
                            warn!(
                                phase = %BatchPhase::Fallback,
                                strategy = %entry.kind,
                                seed = %sub_seed,
                                error = %err,
                                fallback_error = %fallback_err,
                                "strategy and fallback failed, ticket dropped"
                            );
                            warnings.push(format!(
                                "Aposta {sub_seed} descartada: {} falhou ({err}) e o fallback uniform também ({fallback_err})",
                                entry.kind
                            ));
                            None
                        }
                    }
                }
            };

            if let Some(selection) = selection {
                summary.generated += 1;
                tickets.push(Ticket::from_selection(selection, allocation.ticket_cost_cents));
            }
        }
        summaries.push(summary);
    }

    debug!(phase = %BatchPhase::Aggregating, generated = tickets.len(), "aggregating batch");
    let total_cost_cents: u64 = tickets.iter().map(|t| t.cost_cents).sum();
    let leftover_cents = request.budget_cents.saturating_sub(total_cost_cents);
    if tickets.len() < planned {
        let shortfall = format!("Lote gerou {} de {} apostas esperadas", tickets.len(), planned);
        warn!(generated = tickets.len(), planned, "{shortfall}");
        warnings.push(shortfall);
    }

    let payload = BatchPayload {
        version: SCHEMA_VERSION,
        seed: request.seed.clone(),
        budget_cents: request.budget_cents,
        ticket_cost_cents: allocation.ticket_cost_cents,
        total_cost_cents,
        leftover_cents,
        tickets_generated: tickets.len(),
        tickets_planned: planned,
        strategies: summaries,
        metrics: BatchMetrics::from_tickets(&tickets),
        config: ResolvedConfig {
            strategies: plan
                .iter()
                .map(|p| ResolvedStrategy {
                    name: p.kind,
                    weight: p.weight,
                    window: p.window,
                })
                .collect(),
            k: request.k,
            window: request.window,
            timeout_ms: request.timeout_ms,
        },
    };

    info!(
        phase = %BatchPhase::Done,
        seed = %request.seed,
        planned,
        generated = tickets.len(),
        total_cost_cents,
        leftover_cents,
        warnings = warnings.len(),
        "batch complete"
    );

    Ok(BatchGenerationResult {
        tickets,
        ticket_cost_cents: allocation.ticket_cost_cents,
        total_cost_cents,
        leftover_cents,
        warnings,
        payload,
    })
}
