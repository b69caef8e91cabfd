//! End-to-end layout: partition, allocate, fill gaps, flatten.
//!
//! Owners are independent, so allocation runs in parallel when enabled. The
//! output order never depends on completion order: owners appear in
//! first-seen order and tracks by index within each owner.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocation::{AllocationConfig, AllocationError, AllocationPolicy, allocate_with};
use crate::flatten::{OwnerGroup, flatten};
use crate::gaps::{FilledTrack, fill_gaps_from};
use crate::interval::{Interval, IntervalError};
use crate::partition::partition_by_owner;

/// Configuration for [`build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Track allocation policy.
    pub policy: AllocationPolicy,

    /// Allocate owners on the rayon thread pool.
    pub parallel: bool,

    /// Time the first filler on each track is measured from.
    /// Default: 0.0.
    pub origin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            policy: AllocationPolicy::default(),
            parallel: true,
            origin: 0.0,
        }
    }
}

/// An owner whose tracks could not be built.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("owner {owner:?}: {error}")]
pub struct OwnerFailure {
    pub owner: String,
    pub error: AllocationError,
}

/// Result of [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Layout<P> {
    /// Gap-filled tracks, owner-first-seen order then track index.
    pub tracks: Vec<FilledTrack<P>>,

    /// Input records that failed validation and were left out.
    pub rejected: Vec<IntervalError>,

    /// Owners dropped because allocation broke an invariant.
    pub failures: Vec<OwnerFailure>,
}

impl<P> Layout<P> {
    /// True when nothing was rejected and no owner failed.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.failures.is_empty()
    }

    /// Owners that produced tracks, in output order.
    pub fn owners(&self) -> Vec<&str> {
        let mut owners: Vec<&str> = Vec::new();
        for track in &self.tracks {
            if owners.last() != Some(&track.owner.as_str()) {
                owners.push(&track.owner);
            }
        }
        owners
    }
}

/// Builds gap-filled tracks for every owner.
///
/// Invalid intervals are reported in [`Layout::rejected`] and skipped; the
/// rest of their owner's intervals are still placed. A failing owner never
/// affects the tracks of other owners.
pub fn build<P: Send>(
    intervals: impl IntoIterator<Item = Interval<P>>,
    config: &LayoutConfig,
) -> Layout<P> {
    let mut rejected = Vec::new();
    let valid = intervals
        .into_iter()
        .filter_map(|interval| match interval.validate() {
            Ok(()) => Some(interval),
            Err(err) => {
                tracing::warn!(error = %err, "rejecting interval");
                rejected.push(err);
                None
            }
        });
    let partition = partition_by_owner(valid);
    tracing::debug!(
        owners = partition.len(),
        rejected = rejected.len(),
        parallel = config.parallel,
        "building layout"
    );

    let allocation = AllocationConfig {
        policy: config.policy,
    };
    let origin = config.origin;
    let run = |(owner, intervals): (String, Vec<Interval<P>>)| {
        place_owner(&owner, intervals, &allocation, origin)
            .map(|tracks| OwnerGroup {
                owner: owner.clone(),
                tracks,
            })
            .map_err(|error| OwnerFailure { owner, error })
    };

    let results: Vec<Result<OwnerGroup<P>, OwnerFailure>> = if config.parallel {
        partition
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(run)
            .collect()
    } else {
        partition.into_iter().map(run).collect()
    };

    let mut groups = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(group) => groups.push(group),
            Err(failure) => {
                tracing::warn!(owner = %failure.owner, error = %failure.error, "skipping owner");
                failures.push(failure);
            }
        }
    }

    Layout {
        tracks: flatten(groups),
        rejected,
        failures,
    }
}

fn place_owner<P>(
    owner: &str,
    intervals: Vec<Interval<P>>,
    config: &AllocationConfig,
    origin: f64,
) -> Result<Vec<FilledTrack<P>>, AllocationError> {
    allocate_with(owner, intervals, config)?
        .into_iter()
        .map(|track| fill_gaps_from(track, origin).map_err(AllocationError::from))
        .collect()
}
