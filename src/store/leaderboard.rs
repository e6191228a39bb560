use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;
use tracing::{info, warn};

use crate::error::Result;

const HEADER: [&str; 3] = ["model", "avg_score", "last_run"];

/// One model's standing.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub model: String,
    pub avg_score: f64,
    pub last_run: String,
}

/// A line of the CSV body.
#[derive(Debug, Clone)]
enum Line {
    Scored(LeaderboardRow),
    /// A row that could not be read, written back unchanged.
    Kept(StringRecord),
}

impl Line {
    fn model(&self) -> Option<&str> {
        match self {
            Line::Scored(row) => Some(&row.model),
            Line::Kept(record) => record.get(0),
        }
    }
}

/// Accumulates per-model average scores, one row per model.
///
/// Rows keep their first-seen order; rerunning a model replaces its row.
/// Rows that do not parse are carried through a save untouched.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    lines: Vec<Line>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a leaderboard CSV.
    ///
    /// A missing file, or one without the expected header, starts empty.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.len() < 2 || headers.get(0) != Some(HEADER[0]) || headers.get(1) != Some(HEADER[1])
        {
            warn!(path = %path.display(), "leaderboard header not recognized, starting fresh");
            return Ok(Self::new());
        }

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            let model = record.get(0).filter(|m| !m.is_empty());
            let avg_score = record.get(1).and_then(|s| s.trim().parse::<f64>().ok());
            match (model, avg_score) {
                (Some(model), Some(avg_score)) => lines.push(Line::Scored(LeaderboardRow {
                    model: model.to_string(),
                    avg_score,
                    last_run: record.get(2).unwrap_or_default().to_string(),
                })),
                _ => {
                    warn!(row = ?record, "keeping unreadable leaderboard row as is");
                    lines.push(Line::Kept(record));
                }
            }
        }

        Ok(Self { lines })
    }

    /// Record a run, replacing the model's previous row if present.
    pub fn record(&mut self, model: &str, avg_score: f64, at: DateTime<Utc>) {
        let row = LeaderboardRow {
            model: model.to_string(),
            avg_score,
            last_run: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        match self.lines.iter_mut().find(|l| l.model() == Some(model)) {
            Some(existing) => *existing = Line::Scored(row),
            None => self.lines.push(Line::Scored(row)),
        }
    }

    /// Write the leaderboard, scores to two decimals.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        wtr.write_record(HEADER)?;
        for line in &self.lines {
            match line {
                Line::Scored(row) => wtr.write_record([
                    row.model.clone(),
                    format!("{:.2}", row.avg_score),
                    row.last_run.clone(),
                ])?,
                Line::Kept(record) => wtr.write_record(record)?,
            }
        }
        wtr.flush()?;

        info!(path = %path.display(), models = self.len(), "leaderboard saved");
        Ok(())
    }

    pub fn get(&self, model: &str) -> Option<&LeaderboardRow> {
        self.rows().find(|r| r.model == model)
    }

    /// Readable rows, in file order.
    pub fn rows(&self) -> impl Iterator<Item = &LeaderboardRow> {
        self.lines.iter().filter_map(|line| match line {
            Line::Scored(row) => Some(row),
            Line::Kept(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.rows().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
