//! Implementation of the `vt validate` command.

use std::io::Write;

use anyhow::Result;

use crate::cli::ValidateArgs;
use crate::records;

/// Run the validate command.
///
/// Prints one line per unusable record and returns how many there were.
pub fn run<W: Write>(writer: &mut W, args: &ValidateArgs) -> Result<usize> {
    let loaded = records::load(&args.input)?;
    let total = loaded.record_count();

    let mut lines: Vec<(usize, String)> = loaded
        .problems
        .iter()
        .map(|problem| (position_of(problem), problem.to_string()))
        .collect();
    lines.extend(loaded.intervals.iter().filter_map(|(position, interval)| {
        interval
            .validate()
            .err()
            .map(|err| (*position, format!("record {position}: {err}")))
    }));
    lines.sort_by_key(|(position, _)| *position);

    for (_, line) in &lines {
        writeln!(writer, "{line}")?;
    }
    writeln!(writer, "{total} record(s), {} invalid", lines.len())?;
    Ok(lines.len())
}

const fn position_of(problem: &records::RecordError) -> usize {
    match problem {
        records::RecordError::Malformed { position, .. }
        | records::RecordError::MissingEnd { position }
        | records::RecordError::Ambiguous { position } => *position,
    }
}
