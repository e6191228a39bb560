use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{OpsError, Result};
use crate::models::{Case, PredictionRecord};

/// Read a JSON Lines file into one value per non-blank line.
pub fn load_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let mut values = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|source| OpsError::JsonLine {
            line: index + 1,
            source,
        })?;
        values.push(value);
    }

    debug!(path = %path.display(), records = values.len(), "loaded jsonl");
    Ok(values)
}

/// Load every case from a JSON Lines file.
///
/// Fails on the first record that does not parse; invariants are checked
/// later by the scorer.
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<Case>> {
    load_jsonl(path)?.into_iter().map(Case::from_value).collect()
}

/// Load every prediction record, keeping malformed ones as parse errors.
pub fn load_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<PredictionRecord>> {
    Ok(load_jsonl(path)?
        .into_iter()
        .map(PredictionRecord::from_value)
        .collect())
}

/// Write a value as pretty JSON, creating parent directories.
pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_jsonl_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "a"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id": "b"}}"#).unwrap();

        let values = load_jsonl(file.path()).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1]["id"], "b");
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "a"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        match load_jsonl(file.path()) {
            Err(OpsError::JsonLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected JsonLine error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_predictions_keeps_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id": "a", "menu": ["Wrap"], "purchases": {{}}, "route": []}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"id": "b", "menu": "Wrap"}}"#).unwrap();

        let records = load_predictions(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].plan.is_ok());
        assert_eq!(records[1].id.as_deref(), Some("b"));
        assert!(records[1].plan.is_err());
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard").join("report.json");
        write_json(&path, &serde_json::json!({"avg_score": 1.5})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["avg_score"], 1.5);
    }
}
