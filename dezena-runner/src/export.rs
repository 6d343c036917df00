//! Batch export: JSON with schema versioning and a flat ticket CSV.
//!
//! Persisted JSON carries `payload.version`. Artifacts written by a newer
//! engine are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::batch::BatchGenerationResult;
use crate::payload::SCHEMA_VERSION;

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a batch result to pretty JSON.
pub fn export_json(result: &BatchGenerationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize batch to JSON")
}

/// Deserialize a batch result, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BatchGenerationResult> {
    let result: BatchGenerationResult =
        serde_json::from_str(json).context("failed to deserialize batch from JSON")?;
    if result.payload.version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.payload.version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// One row per ticket.
///
/// Columns: index, strategy, seed, cost_cents, sum, even, odd, quadrants,
/// score, dezenas (space separated).
pub fn export_tickets_csv(result: &BatchGenerationResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "index",
        "strategy",
        "seed",
        "cost_cents",
        "sum",
        "even",
        "odd",
        "quadrants",
        "score",
        "dezenas",
    ])?;

    for (i, t) in result.tickets.iter().enumerate() {
        let numbers: Vec<String> = t.numbers.iter().map(|n| format!("{n:02}")).collect();
        wtr.write_record([
            i.to_string(),
            t.strategy.name().to_string(),
            t.seed.clone(),
            t.cost_cents.to_string(),
            t.metadata.sum.to_string(),
            t.metadata.parity.even.to_string(),
            t.metadata.parity.odd.to_string(),
            t.metadata.distinct_quadrants().to_string(),
            t.metadata.score.map(|s| format!("{s:.6}")).unwrap_or_default(),
            numbers.join(" "),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save `batch.json` and `tickets.csv` under `output_dir/batch_{id}/`, where
/// `id` is the first 12 hex digits of the batch id. Returns the directory.
pub fn save_batch(result: &BatchGenerationResult, output_dir: &Path) -> Result<PathBuf> {
    let id = result.batch_id().context("failed to hash batch payload")?;
    let batch_dir = output_dir.join(format!("batch_{}", &id[..12]));
    std::fs::create_dir_all(&batch_dir)
        .with_context(|| format!("failed to create batch dir: {}", batch_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(batch_dir.join("batch.json"), json)
        .with_context(|| format!("failed to write batch.json in {}", batch_dir.display()))?;

    let csv = export_tickets_csv(result)?;
    std::fs::write(batch_dir.join("tickets.csv"), csv)
        .with_context(|| format!("failed to write tickets.csv in {}", batch_dir.display()))?;

    Ok(batch_dir)
}

/// Read a batch back from a directory written by [`save_batch`].
pub fn load_batch(batch_dir: &Path) -> Result<BatchGenerationResult> {
    let path = batch_dir.join("batch.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
