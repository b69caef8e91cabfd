//! Per-owner track groups and their flattening into one list.

use serde::{Deserialize, Serialize};

use crate::gaps::FilledTrack;

/// All gap-filled tracks of one owner, ordered by track index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerGroup<P> {
    pub owner: String,
    pub tracks: Vec<FilledTrack<P>>,
}

/// Concatenates groups into one list: group order first, then track index.
pub fn flatten<P>(groups: Vec<OwnerGroup<P>>) -> Vec<FilledTrack<P>> {
    groups
        .into_iter()
        .flat_map(|mut group| {
            group.tracks.sort_by_key(|track| track.index);
            group.tracks
        })
        .collect()
}
