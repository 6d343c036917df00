//! Dezena CLI: bet generation, pricing and draw statistics.
//!
//! Commands:
//! - `generate`: build a costed batch of tickets from a budget and seed
//! - `price`: show ticket prices and how a budget would be allocated
//! - `stats`: frequency, recency and decade totals for a draws CSV
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); results go to stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dezena_core::statistics::StatisticsSource;
use dezena_core::strategies::StrategyKind;
use dezena_core::{PricingSource, StatisticsCache};
use dezena_runner::{
    generate_batch, load_draws, save_batch, BatchGenerationResult, DezenaConfig, StrategyRequest,
};

#[derive(Parser)]
#[command(
    name = "dezena",
    version,
    about = "Dezena: deterministic lottery bet generation"
)]
struct Cli {
    /// TOML config with [pricing] and [batch] sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of tickets.
    Generate {
        /// Budget in cents.
        #[arg(long)]
        budget: u64,

        /// Master seed; the same seed reproduces the same batch.
        #[arg(long)]
        seed: String,

        /// Strategy as name[:weight[:window]]. Repeatable. Overrides the config list.
        #[arg(long = "strategy")]
        strategies: Vec<StrategyRequest>,

        /// Numbers per ticket (6-15).
        #[arg(long)]
        k: Option<usize>,

        /// Statistics window in draws, for strategies without their own.
        #[arg(long)]
        window: Option<u32>,

        /// Wall-clock limit for the whole batch.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Historical draws CSV (contest,date,d1..d6).
        #[arg(long)]
        draws: Option<PathBuf>,

        /// Write batch.json and tickets.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full result as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show ticket prices and the allocation for a budget.
    Price {
        /// Budget in cents.
        #[arg(long)]
        budget: u64,

        /// Numbers per ticket.
        #[arg(long, default_value_t = 6)]
        k: usize,
    },
    /// Summarize a draws CSV.
    Stats {
        /// Historical draws CSV (contest,date,d1..d6).
        #[arg(long)]
        draws: PathBuf,

        /// Only the most recent N draws.
        #[arg(long)]
        window: Option<u32>,

        /// Print JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => DezenaConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DezenaConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            budget,
            seed,
            strategies,
            k,
            window,
            timeout_ms,
            draws,
            output_dir,
            json,
        } => run_generate(
            &config,
            GenerateArgs {
                budget,
                seed,
                strategies,
                k,
                window,
                timeout_ms,
                draws,
                output_dir,
                json,
            },
        ),
        Commands::Price { budget, k } => run_price(&config, budget, k),
        Commands::Stats {
            draws,
            window,
            json,
        } => run_stats(&draws, window, json),
    }
}

struct GenerateArgs {
    budget: u64,
    seed: String,
    strategies: Vec<StrategyRequest>,
    k: Option<usize>,
    window: Option<u32>,
    timeout_ms: Option<u64>,
    draws: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: bool,
}

fn run_generate(config: &DezenaConfig, args: GenerateArgs) -> Result<()> {
    let mut request = config.request(args.budget, args.seed);
    if !args.strategies.is_empty() {
        request.strategies = args.strategies;
    }
    if let Some(k) = args.k {
        request.k = k;
    }
    if args.window.is_some() {
        request.window = args.window;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        request.timeout_ms = timeout_ms;
    }

    let history = match &args.draws {
        Some(path) => {
            let loaded = load_draws(path)
                .with_context(|| format!("loading draws {}", path.display()))?;
            info!(
                draws = loaded.history.len(),
                first = %loaded.first_date,
                last = %loaded.last_date,
                dataset = %loaded.dataset_hash,
                "draw history loaded"
            );
            Some(StatisticsCache::new(loaded.history))
        }
        None => None,
    };

    if history.is_none() {
        for entry in &request.strategies {
            let kind: StrategyKind = entry.name.parse()?;
            if kind.needs_statistics() {
                bail!("strategy '{kind}' needs historical draws; pass --draws <csv>");
            }
        }
    }

    let pricing = config.price_table();
    let statistics = history.as_ref().map(|h| h as &dyn StatisticsSource);
    let result = generate_batch(&request, &pricing, statistics)?;

    if args.json {
        println!("{}", dezena_runner::export_json(&result)?);
    } else {
        print_summary(&result)?;
    }

    if let Some(dir) = &args.output_dir {
        let batch_dir = save_batch(&result, dir)?;
        println!("Batch saved to: {}", batch_dir.display());
    }
    Ok(())
}

fn print_summary(result: &BatchGenerationResult) -> Result<()> {
    let p = &result.payload;
    println!();
    println!("=== Batch {} ===", &result.batch_id()?[..12]);
    println!("Seed:           {}", p.seed);
    println!("Tickets:        {} of {} planned (k={})", p.tickets_generated, p.tickets_planned, p.config.k);
    println!("Ticket cost:    {}", format_cents(p.ticket_cost_cents));
    println!("Total cost:     {}", format_cents(p.total_cost_cents));
    println!("Leftover:       {}", format_cents(p.leftover_cents));
    println!();
    println!("--- Strategies ---");
    for s in &p.strategies {
        println!(
            "{:<12} allocated {:>3}  generated {:>3}  fallbacks {:>3}  failures {:>3}",
            s.name.name(),
            s.allocated,
            s.generated,
            s.fallbacks,
            s.failures
        );
    }
    println!();
    println!("--- Metrics ---");
    println!("Average sum:    {:.1}", p.metrics.average_sum);
    println!("Average score:  {:.4}", p.metrics.average_score);
    println!("Parity spread:  {}", p.metrics.parity_spread);
    println!(
        "Decades/ticket: min {} max {} avg {:.2}",
        p.metrics.quadrant_coverage.min,
        p.metrics.quadrant_coverage.max,
        p.metrics.quadrant_coverage.average
    );
    println!();
    println!("--- Tickets ---");
    for (i, t) in result.tickets.iter().enumerate() {
        let numbers: Vec<String> = t.numbers.iter().map(|n| format!("{n:02}")).collect();
        println!("{:>3}  {:<11} {}", i + 1, t.strategy.name(), numbers.join(" "));
    }
    for warning in &result.warnings {
        println!("WARNING: {warning}");
    }
    println!();
    Ok(())
}

fn run_price(config: &DezenaConfig, budget: u64, k: usize) -> Result<()> {
    let table = config.price_table();
    println!("=== Ticket prices ===");
    for (size, cost) in table.entries() {
        let marker = if size == k { " <" } else { "" };
        println!("k={size:<3} {}{marker}", format_cents(cost));
    }
    println!();

    let alloc = table.allocate_budget(budget, k)?;
    println!("Budget:         {}", format_cents(alloc.budget_cents));
    println!("Tickets:        {}", alloc.max_tickets);
    println!("Leftover:       {}", format_cents(alloc.leftover_cents));
    if alloc.constrained_by_ticket_limit {
        println!(
            "NOTE: capped at {} tickets per batch",
            table.config().max_tickets_per_batch
        );
    }
    Ok(())
}

fn run_stats(path: &Path, window: Option<u32>, json: bool) -> Result<()> {
    let loaded = load_draws(path).with_context(|| format!("loading draws {}", path.display()))?;
    let history = &loaded.history;
    let frequencies = history.frequencies(window)?;
    let recency = history.recency()?;
    let quadrants = history.quadrants(window)?;

    if json {
        let value = serde_json::json!({
            "draws": history.len(),
            "firstDate": loaded.first_date,
            "lastDate": loaded.last_date,
            "datasetHash": loaded.dataset_hash,
            "frequencies": frequencies,
            "recency": recency,
            "quadrants": quadrants,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("=== {} draws ({} to {}) ===", history.len(), loaded.first_date, loaded.last_date);
    println!("Window:         {}", window.map_or("all".to_string(), |w| w.to_string()));
    println!();

    let mut by_hits = frequencies.items.clone();
    by_hits.sort_by(|a, b| b.hits.cmp(&a.hits).then(a.dezena.cmp(&b.dezena)));
    println!("--- Most frequent ---");
    for item in by_hits.iter().take(10) {
        println!("{:02}  {:>4} hits  {:.3}", item.dezena, item.hits, item.frequency);
    }
    println!();

    let mut overdue = recency.clone();
    overdue.sort_by(|a, b| {
        let age = |e: &dezena_core::statistics::RecencyEntry| e.contests_since_last.unwrap_or(u32::MAX);
        age(b).cmp(&age(a)).then(a.dezena.cmp(&b.dezena))
    });
    println!("--- Longest absent ---");
    for entry in overdue.iter().take(10) {
        match entry.contests_since_last {
            Some(age) => println!("{:02}  {age} contests", entry.dezena),
            None => println!("{:02}  never drawn", entry.dezena),
        }
    }
    println!();

    println!("--- Decades ---");
    for q in &quadrants {
        println!("{}  {:>5}", q.range, q.total);
    }
    Ok(())
}

fn format_cents(cents: u64) -> String {
    format!("R$ {}.{:02}", cents / 100, cents % 100)
}
