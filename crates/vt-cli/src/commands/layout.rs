//! Implementation of the `vt layout` command.
//!
//! Reads segment records, allocates tracks per owner, fills gaps, and prints
//! the flattened track list either as text or as a JSON document for a
//! timeline writer to consume.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use vt_core::{Entry, FilledTrack, Layout, layout};

use crate::Config;
use crate::cli::LayoutArgs;
use crate::records::{self, RecordError};

/// Track entry in the JSON output.
#[derive(Serialize)]
struct TrackView<'a> {
    name: String,
    #[serde(flatten)]
    track: &'a FilledTrack<Value>,
}

/// Failure entry in the JSON output.
#[derive(Serialize)]
struct FailureView<'a> {
    owner: &'a str,
    error: String,
}

/// JSON output document.
#[derive(Serialize)]
struct LayoutDocument<'a> {
    tracks: Vec<TrackView<'a>>,
    skipped: Vec<String>,
    rejected: Vec<String>,
    failures: Vec<FailureView<'a>>,
}

/// Run the layout command.
///
/// Returns the number of owners whose tracks could not be built.
pub fn run<W: Write>(writer: &mut W, args: &LayoutArgs, config: &Config) -> Result<usize> {
    let loaded = records::load(&args.input)?;
    let problems = loaded.problems.clone();
    let layout_config = config.layout(args);
    tracing::debug!(?layout_config, "laying out tracks");

    let layout = layout::build(loaded.into_intervals(), &layout_config);

    if args.json {
        write_json(writer, &layout, &problems)?;
    } else {
        write_text(writer, &layout, &problems)?;
    }
    Ok(layout.failures.len())
}

fn write_json<W: Write>(
    writer: &mut W,
    layout: &Layout<Value>,
    problems: &[RecordError],
) -> Result<()> {
    let document = LayoutDocument {
        tracks: layout
            .tracks
            .iter()
            .map(|track| TrackView {
                name: track.name(),
                track,
            })
            .collect(),
        skipped: problems.iter().map(ToString::to_string).collect(),
        rejected: layout.rejected.iter().map(ToString::to_string).collect(),
        failures: layout
            .failures
            .iter()
            .map(|failure| FailureView {
                owner: &failure.owner,
                error: failure.error.to_string(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *writer, &document).context("failed to serialize layout")?;
    writeln!(writer)?;
    Ok(())
}

fn write_text<W: Write>(
    writer: &mut W,
    layout: &Layout<Value>,
    problems: &[RecordError],
) -> Result<()> {
    for track in &layout.tracks {
        writeln!(
            writer,
            "{}: {} clip(s), length {:.3}",
            track.name(),
            track.clips().count(),
            track.duration()
        )?;
        for entry in &track.entries {
            match entry {
                Entry::Filler { duration } => writeln!(writer, "  filler {duration:.3}")?,
                Entry::Clip { interval } => writeln!(
                    writer,
                    "  clip   {:.3} - {:.3}  {}",
                    interval.start,
                    interval.end,
                    describe(&interval.payload)
                )?,
            }
        }
    }

    for problem in problems {
        writeln!(writer, "skipped: {problem}")?;
    }
    for rejected in &layout.rejected {
        writeln!(writer, "rejected: {rejected}")?;
    }
    for failure in &layout.failures {
        writeln!(writer, "failed: {failure}")?;
    }

    let clips: usize = layout.tracks.iter().map(|t| t.clips().count()).sum();
    writeln!(
        writer,
        "{} owner(s), {} track(s), {} clip(s)",
        layout.owners().len(),
        layout.tracks.len(),
        clips
    )?;
    Ok(())
}

/// Short label for a payload.
fn describe(payload: &Value) -> String {
    match payload {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
