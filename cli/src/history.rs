//! JSON-lines files for finished-session history and event logs.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quizmines_core::{DifficultyProfile, HistorySink, LoggedEvent, SessionSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One line of the history file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub recorded_at: String,
    pub seed: u64,
    #[serde(flatten)]
    pub summary: SessionSummary,
}

/// Collects archived sessions and appends them to a file in one go.
#[derive(Debug)]
pub struct HistoryFile {
    path: PathBuf,
    seed: u64,
    pending: Vec<HistoryRecord>,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: 0,
            pending: Vec::new(),
        }
    }

    /// Seed stamped on the summaries recorded from now on.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn pending(&self) -> &[HistoryRecord] {
        &self.pending
    }

    /// Writes everything recorded so far, returns how many lines were added.
    pub fn flush(&mut self) -> Result<usize> {
        let written = append_lines(&self.path, &self.pending)?;
        self.pending.clear();
        Ok(written)
    }
}

impl HistorySink for HistoryFile {
    fn record(&mut self, summary: &SessionSummary) {
        let recorded_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        self.pending.push(HistoryRecord {
            recorded_at,
            seed: self.seed,
            summary: summary.clone(),
        });
    }
}

/// Everything needed to recompute the standings of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub seed: u64,
    pub profile: DifficultyProfile,
    pub players: usize,
    pub events: Vec<LoggedEvent>,
}

pub fn append_lines<T: Serialize>(path: &Path, items: &[T]) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("Could not write {}", path.display()))?;
    Ok(items.len())
}

/// Reads a JSON-lines file, skipping blank lines.
pub fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = fs::File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let mut items = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Could not read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid entry", path.display(), number + 1))?;
        items.push(item);
    }
    Ok(items)
}
