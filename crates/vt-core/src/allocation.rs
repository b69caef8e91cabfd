//! Track allocation algorithm.
//!
//! Distributes one owner's intervals over parallel lanes ("tracks") so that no
//! two intervals on a track overlap.
//!
//! # Policies
//!
//! - [`AllocationPolicy::ContiguousBlock`] (default): intervals sharing an exact
//!   start time are stacked on a contiguous run of track indices. Track count
//!   may exceed the overlap depth.
//! - [`AllocationPolicy::EarliestFinish`]: each interval reuses the track that
//!   frees up earliest. Uses the minimum number of tracks but gives no
//!   adjacency guarantee for simultaneous starts.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::{Interval, IntervalError};

/// Broken allocator contract. Never repaired silently.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Two items on the same track overlap in time.
    #[error(
        "track {owner}_{index}: item [{start}, {end}) overlaps previous item ending at {previous_end}"
    )]
    Overlap {
        owner: String,
        index: usize,
        previous_end: f64,
        start: f64,
        end: f64,
    },

    /// Gap filling computed a negative filler duration.
    #[error("track {owner}_{index}: negative gap of {duration} before item starting at {start}")]
    NegativeGap {
        owner: String,
        index: usize,
        start: f64,
        duration: f64,
    },
}

/// Errors returned by [`allocate`] and [`allocate_with`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocationError {
    #[error(transparent)]
    Interval(#[from] IntervalError),

    /// An interval tagged with a different owner was passed in.
    #[error("interval {start}..{end} belongs to {found:?}, not {expected:?}")]
    ForeignOwner {
        expected: String,
        found: String,
        start: f64,
        end: f64,
    },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// How intervals are distributed over tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocationPolicy {
    /// Same-start intervals land on adjacent tracks.
    #[default]
    #[serde(rename = "contiguous")]
    ContiguousBlock,
    /// Minimum track count via earliest-finishing track reuse.
    #[serde(rename = "earliest-finish")]
    EarliestFinish,
}

impl AllocationPolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContiguousBlock => "contiguous",
            Self::EarliestFinish => "earliest-finish",
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for unrecognised policy names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown allocation policy: {0} (expected \"contiguous\" or \"earliest-finish\")")]
pub struct UnknownPolicy(String);

impl FromStr for AllocationPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contiguous" | "contiguous-block" => Ok(Self::ContiguousBlock),
            "earliest-finish" | "min-tracks" => Ok(Self::EarliestFinish),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Configuration for track allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationConfig {
    pub policy: AllocationPolicy,
}

/// One lane of non-overlapping intervals for a single owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track<P> {
    pub owner: String,

    /// 1-based position within the owner's tracks.
    pub index: usize,

    /// Intervals sorted by start, pairwise non-overlapping.
    pub items: Vec<Interval<P>>,
}

impl<P> Track<P> {
    /// Display name, `"{owner}_{index}"`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.owner, self.index)
    }

    /// Verifies items are in time order with no overlap.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        for pair in self.items.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start < prev.end {
                return Err(InvariantViolation::Overlap {
                    owner: self.owner.clone(),
                    index: self.index,
                    previous_end: prev.end,
                    start: next.start,
                    end: next.end,
                });
            }
        }
        Ok(())
    }
}

/// Allocates tracks for one owner using the default policy.
///
/// Returns an empty list for empty input. Every input interval appears on
/// exactly one returned track.
pub fn allocate<P>(owner: &str, intervals: Vec<Interval<P>>) -> Result<Vec<Track<P>>, AllocationError> {
    allocate_with(owner, intervals, &AllocationConfig::default())
}

/// Allocates tracks for one owner.
///
/// All intervals are validated before any placement happens.
pub fn allocate_with<P>(
    owner: &str,
    intervals: Vec<Interval<P>>,
    config: &AllocationConfig,
) -> Result<Vec<Track<P>>, AllocationError> {
    for interval in &intervals {
        interval.validate()?;
        if interval.owner != owner {
            return Err(AllocationError::ForeignOwner {
                expected: owner.to_string(),
                found: interval.owner.clone(),
                start: interval.start,
                end: interval.end,
            });
        }
    }

    let count = intervals.len();
    let mut sorted = intervals;
    // Stable: ties keep input order. Bounds are finite here, and `-0.0` must
    // tie with `0.0` the same way start groups compare.
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

    let mut ctx = AllocationContext::new(owner);
    match config.policy {
        AllocationPolicy::ContiguousBlock => ctx.place_contiguous(sorted),
        AllocationPolicy::EarliestFinish => ctx.place_earliest_finish(sorted),
    }
    let tracks = ctx.finish()?;

    tracing::debug!(
        owner,
        intervals = count,
        tracks = tracks.len(),
        policy = %config.policy,
        "allocated tracks"
    );
    Ok(tracks)
}

/// Per-track state while allocating.
#[derive(Debug)]
struct Lane<P> {
    /// End of the last interval placed here.
    cursor: f64,
    items: Vec<Interval<P>>,
}

impl<P> Lane<P> {
    const fn new() -> Self {
        Self {
            cursor: f64::NEG_INFINITY,
            items: Vec::new(),
        }
    }

    fn is_free_at(&self, time: f64) -> bool {
        self.cursor <= time
    }
}

/// State owned by a single allocation run.
#[derive(Debug)]
struct AllocationContext<'a, P> {
    owner: &'a str,
    lanes: Vec<Lane<P>>,
}

impl<'a, P> AllocationContext<'a, P> {
    const fn new(owner: &'a str) -> Self {
        Self {
            owner,
            lanes: Vec::new(),
        }
    }

    /// Places start-time groups in ascending order.
    #[expect(
        clippy::float_cmp,
        reason = "start groups are defined by exact equality"
    )]
    fn place_contiguous(&mut self, sorted: Vec<Interval<P>>) {
        let mut iter = sorted.into_iter().peekable();
        while let Some(first) = iter.next() {
            let start = first.start;
            let mut group = vec![first];
            while let Some(next) = iter.next_if(|next| next.start == start) {
                group.push(next);
            }

            let run = self.free_run(start, group.len());
            for (slot, interval) in run.zip(group) {
                self.assign(slot, interval);
            }
        }
    }

    /// Finds `size` adjacent lanes free at `start`, opening new ones as needed.
    ///
    /// The scan starts at the first lane and stops at the first busy one. A run
    /// cut short by a busy lane cannot grow contiguously, so the whole group
    /// moves to fresh lanes at the end.
    fn free_run(&mut self, start: f64, size: usize) -> Range<usize> {
        let free = self
            .lanes
            .iter()
            .take(size)
            .take_while(|lane| lane.is_free_at(start))
            .count();
        let blocked = free < size && free < self.lanes.len();
        let first = if blocked { self.lanes.len() } else { 0 };

        while self.lanes.len() < first + size {
            self.open_lane();
        }
        first..first + size
    }

    /// Places each interval on the lane that frees up earliest.
    fn place_earliest_finish(&mut self, sorted: Vec<Interval<P>>) {
        let mut ends: BinaryHeap<Reverse<LaneEnd>> = BinaryHeap::new();
        for interval in sorted {
            let reusable = ends
                .peek()
                .filter(|Reverse(top)| top.end <= interval.start)
                .map(|Reverse(top)| top.slot);
            let slot = if let Some(slot) = reusable {
                ends.pop();
                slot
            } else {
                self.open_lane()
            };

            ends.push(Reverse(LaneEnd {
                end: interval.end,
                slot,
            }));
            self.assign(slot, interval);
        }
    }

    fn open_lane(&mut self) -> usize {
        self.lanes.push(Lane::new());
        self.lanes.len() - 1
    }

    fn assign(&mut self, slot: usize, interval: Interval<P>) {
        let lane = &mut self.lanes[slot];
        lane.cursor = interval.end;
        lane.items.push(interval);
    }

    fn finish(self) -> Result<Vec<Track<P>>, InvariantViolation> {
        let owner = self.owner;
        self.lanes
            .into_iter()
            .enumerate()
            .map(|(slot, lane)| {
                let track = Track {
                    owner: owner.to_string(),
                    index: slot + 1,
                    items: lane.items,
                };
                track.check()?;
                Ok(track)
            })
            .collect()
    }
}

/// Heap entry: when a lane becomes free. Ties go to the lower lane.
#[derive(Debug, Clone, Copy)]
struct LaneEnd {
    end: f64,
    slot: usize,
}

impl PartialEq for LaneEnd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LaneEnd {}

impl PartialOrd for LaneEnd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LaneEnd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.end
            .partial_cmp(&other.end)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.slot.cmp(&other.slot))
    }
}
