//! Reading segment records.
//!
//! Input is either a JSON array of records or JSON Lines, one record per line.
//! Each record names its owner, a start offset in seconds, and either an end
//! offset or a duration:
//!
//! ```json
//! {"owner": "Alice", "start": 12.5, "duration": 3.2, "payload": "alice_001.wav"}
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use vt_core::Interval;

/// One segment as supplied by the metadata extractor.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Owning character. Segments without one share the empty owner.
    #[serde(default)]
    pub owner: String,

    pub start: f64,

    #[serde(default)]
    pub end: Option<f64>,

    #[serde(default)]
    pub duration: Option<f64>,

    /// Carried through to the output untouched.
    #[serde(default)]
    pub payload: Value,
}

/// A record that could not be turned into an interval.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record {position}: not a valid record: {message}")]
    Malformed { position: usize, message: String },

    #[error("record {position}: needs either `end` or `duration`")]
    MissingEnd { position: usize },

    #[error("record {position}: has both `end` and `duration`")]
    Ambiguous { position: usize },
}

impl Record {
    /// Converts to an interval without validating its bounds.
    ///
    /// Bounds are checked later so that bad intervals are reported with
    /// their owner alongside the rest of the layout.
    pub fn into_interval(self, position: usize) -> Result<Interval<Value>, RecordError> {
        let end = match (self.end, self.duration) {
            (Some(end), None) => end,
            (None, Some(duration)) => self.start + duration,
            (None, None) => return Err(RecordError::MissingEnd { position }),
            (Some(_), Some(_)) => return Err(RecordError::Ambiguous { position }),
        };

        Ok(Interval {
            owner: self.owner,
            start: self.start,
            end,
            payload: self.payload,
        })
    }
}

/// Records read from one input, with their 1-based positions.
#[derive(Debug, Default)]
pub struct Loaded {
    pub intervals: Vec<(usize, Interval<Value>)>,
    pub problems: Vec<RecordError>,
}

impl Loaded {
    /// Total number of records seen, usable or not.
    pub fn record_count(&self) -> usize {
        self.intervals.len() + self.problems.len()
    }

    pub fn into_intervals(self) -> impl Iterator<Item = Interval<Value>> {
        self.intervals.into_iter().map(|(_, interval)| interval)
    }
}

/// Loads records from a file, or from stdin when `path` is `-`.
pub fn load(path: &Path) -> Result<Loaded> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read records from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read records: {}", path.display()))?
    };

    let loaded = parse(&content)?;
    tracing::debug!(
        path = %path.display(),
        records = loaded.record_count(),
        problems = loaded.problems.len(),
        "loaded records"
    );
    Ok(loaded)
}

/// Parses a JSON array or JSON Lines document.
///
/// A document that is not valid JSON at all is an error; individual bad
/// records are collected in [`Loaded::problems`].
pub fn parse(content: &str) -> Result<Loaded> {
    if content.trim_start().starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(content).context("failed to parse records as a JSON array")?;
        Ok(collect(
            values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (i + 1, serde_json::from_value::<Record>(value))),
        ))
    } else {
        Ok(collect(
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| (i + 1, serde_json::from_str::<Record>(line))),
        ))
    }
}

fn collect(records: impl Iterator<Item = (usize, serde_json::Result<Record>)>) -> Loaded {
    let mut loaded = Loaded::default();
    for (position, record) in records {
        let converted = record
            .map_err(|e| RecordError::Malformed {
                position,
                message: e.to_string(),
            })
            .and_then(|record| record.into_interval(position));

        match converted {
            Ok(interval) => loaded.intervals.push((position, interval)),
            Err(err) => {
                tracing::debug!(error = %err, "skipping record");
                loaded.problems.push(err);
            }
        }
    }
    loaded
}
