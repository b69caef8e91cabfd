//! Core domain logic for voice track layout.
//!
//! This crate contains the fundamental types and logic for:
//! - Intervals: owner-tagged time spans with validation
//! - Partitioning: grouping intervals by owner in first-seen order
//! - Allocation: distributing an owner's intervals over non-overlapping tracks
//! - Gap filling: interleaving explicit fillers between placed intervals
//! - Layout: the full pipeline across owners

mod allocation;
mod flatten;
mod gaps;
mod interval;
pub mod layout;
mod partition;

pub use allocation::{
    AllocationConfig, AllocationError, AllocationPolicy, InvariantViolation, Track, UnknownPolicy,
    allocate, allocate_with,
};
pub use flatten::{OwnerGroup, flatten};
pub use gaps::{Entry, FilledTrack, fill_gaps, fill_gaps_from};
pub use interval::{InvalidReason, Interval, IntervalError};
pub use layout::{Layout, LayoutConfig, OwnerFailure};
pub use partition::{OwnerPartition, partition_by_owner};
