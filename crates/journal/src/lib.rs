use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use serde::Serialize;
use tracing::{debug, info};

use common::{Error, EvaluationResult, Result, RunLog};

/// Column order of the run log. Written once when the file is created.
pub const HEADER: [&str; 8] = [
    "ticker",
    "price",
    "moving_average",
    "volume",
    "average_volume",
    "score",
    "reasons",
    "timestamp",
];

/// Separator used when flattening the reason list into one CSV field.
pub const REASON_SEPARATOR: &str = "; ";

/// Append-only CSV journal of evaluation results.
///
/// One row per call to [`RunLog::append`]. The file and its parent directory
/// are created on first write; existing rows are never rewritten.
pub struct CsvJournal {
    path: PathBuf,
}

impl CsvJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Row shape on disk. Field order must match [`HEADER`].
#[derive(Debug, Serialize)]
struct JournalRow<'a> {
    ticker: &'a str,
    price: f64,
    moving_average: Option<f64>,
    volume: u64,
    average_volume: u64,
    score: u32,
    reasons: String,
    timestamp: String,
}

impl<'a> From<&'a EvaluationResult> for JournalRow<'a> {
    fn from(r: &'a EvaluationResult) -> Self {
        Self {
            ticker: &r.ticker,
            price: r.price,
            moving_average: r.moving_average,
            volume: r.volume,
            average_volume: r.average_volume,
            score: r.score(),
            reasons: r.reasons.join(REASON_SEPARATOR),
            timestamp: r.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

impl RunLog for CsvJournal {
    fn append(&self, result: &EvaluationResult) -> Result<()> {
        let is_new = !self.path.exists();
        if is_new {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(HEADER).map_err(journal_err)?;
            info!(path = %self.path.display(), "Created run log");
        }
        writer.serialize(JournalRow::from(result)).map_err(journal_err)?;
        writer.flush()?;

        debug!(ticker = %result.ticker, score = result.score(), "Journaled evaluation");
        Ok(())
    }
}

fn journal_err(e: csv::Error) -> Error {
    Error::Journal(e.to_string())
}
