//! Draw-history loading from CSV.
//!
//! Expected columns: `contest,date,d1,d2,d3,d4,d5,d6` with ISO dates
//! (`YYYY-MM-DD`). Rows may appear in any order; the history is sorted by
//! contest and a repeated contest keeps the last row.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use dezena_core::statistics::{Draw, DrawHistory, StatisticsError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open draws file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed draws CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid draw data: {0}")]
    Statistics(#[from] StatisticsError),
    #[error("draws file contains no rows")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct DrawRow {
    contest: u32,
    date: NaiveDate,
    d1: u8,
    d2: u8,
    d3: u8,
    d4: u8,
    d5: u8,
    d6: u8,
}

/// A loaded history plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedDraws {
    pub history: DrawHistory,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// BLAKE3 over the raw file bytes.
    pub dataset_hash: String,
}

/// Parse draws from any CSV reader.
pub fn parse_draws<R: Read>(reader: R) -> Result<LoadedDraws, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut draws = Vec::new();
    let mut dates: Option<(NaiveDate, NaiveDate)> = None;
    for row in rdr.deserialize::<DrawRow>() {
        let row = row?;
        dates = Some(match dates {
            None => (row.date, row.date),
            Some((lo, hi)) => (lo.min(row.date), hi.max(row.date)),
        });
        draws.push(Draw::new(
            row.contest,
            vec![row.d1, row.d2, row.d3, row.d4, row.d5, row.d6],
        ));
    }

    let (first_date, last_date) = dates.ok_or(LoadError::Empty)?;
    Ok(LoadedDraws {
        history: DrawHistory::new(draws)?,
        first_date,
        last_date,
        dataset_hash: String::new(),
    })
}

/// Load a draws CSV from disk.
pub fn load_draws(path: &Path) -> Result<LoadedDraws, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut loaded = parse_draws(bytes.as_slice())?;
    loaded.dataset_hash = blake3::hash(&bytes).to_hex().to_string();
    tracing::debug!(
        path = %path.display(),
        draws = loaded.history.len(),
        first = %loaded.first_date,
        last = %loaded.last_date,
        "loaded draw history"
    );
    Ok(loaded)
}
