//! Gap filling between placed intervals.
//!
//! Turns a track into an alternating sequence of fillers and clips so that
//! consecutive entries are back-to-back from the timeline origin.

use serde::{Deserialize, Serialize};

use crate::allocation::{InvariantViolation, Track};
use crate::interval::Interval;

/// A span on a gap-filled track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry<P> {
    /// Silence. Zero durations are kept so the sequence stays alternating.
    Filler { duration: f64 },
    /// A placed interval.
    Clip { interval: Interval<P> },
}

impl<P> Entry<P> {
    pub fn duration(&self) -> f64 {
        match self {
            Self::Filler { duration } => *duration,
            Self::Clip { interval } => interval.duration(),
        }
    }

    pub const fn is_filler(&self) -> bool {
        matches!(self, Self::Filler { .. })
    }
}

/// A track whose holes have been replaced by explicit fillers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledTrack<P> {
    pub owner: String,
    pub index: usize,
    pub entries: Vec<Entry<P>>,
}

impl<P> FilledTrack<P> {
    /// Display name, `"{owner}_{index}"`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.owner, self.index)
    }

    /// Total length from the origin to the end of the last clip.
    pub fn duration(&self) -> f64 {
        self.entries.iter().map(Entry::duration).sum()
    }

    /// The real intervals, in time order.
    pub fn clips(&self) -> impl Iterator<Item = &Interval<P>> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Clip { interval } => Some(interval),
            Entry::Filler { .. } => None,
        })
    }
}

/// Fills gaps from time 0. See [`fill_gaps_from`].
pub fn fill_gaps<P>(track: Track<P>) -> Result<FilledTrack<P>, InvariantViolation> {
    fill_gaps_from(track, 0.0)
}

/// Emits `[filler, clip, filler, clip, ...]` with fillers measured from
/// `origin` and from the end of each preceding clip.
///
/// No filler follows the last clip. A negative filler means the track was
/// not built by the allocator's rules and is reported, never clamped.
pub fn fill_gaps_from<P>(track: Track<P>, origin: f64) -> Result<FilledTrack<P>, InvariantViolation> {
    let Track {
        owner,
        index,
        items,
    } = track;

    let mut entries = Vec::with_capacity(items.len() * 2);
    let mut previous_end = origin;
    for interval in items {
        let duration = interval.start - previous_end;
        if duration < 0.0 {
            return Err(InvariantViolation::NegativeGap {
                owner,
                index,
                start: interval.start,
                duration,
            });
        }

        previous_end = interval.end;
        entries.push(Entry::Filler { duration });
        entries.push(Entry::Clip { interval });
    }

    Ok(FilledTrack {
        owner,
        index,
        entries,
    })
}
