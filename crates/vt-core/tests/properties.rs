//! Property tests for track allocation and gap filling.

use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;
use vt_core::{
    AllocationConfig, AllocationPolicy, Entry, Interval, LayoutConfig, OwnerGroup, Track, allocate,
    allocate_with, fill_gaps, flatten, layout,
};

/// Whole-second starts so that equal starts collide often.
fn intervals(owner: &'static str, min_len: u32) -> impl Strategy<Value = Vec<Interval<usize>>> {
    prop::collection::vec((0u32..20, min_len..6), 0..40).prop_map(move |spans| {
        spans
            .into_iter()
            .enumerate()
            .map(|(id, (start, len))| {
                Interval::new(owner, f64::from(start), f64::from(start + len), id).unwrap()
            })
            .collect()
    })
}

fn track_of(tracks: &[Track<usize>]) -> HashMap<usize, usize> {
    tracks
        .iter()
        .flat_map(|track| track.items.iter().map(|i| (i.payload, track.index)))
        .collect()
}

/// Most intervals covering one instant.
fn overlap_depth(input: &[Interval<usize>]) -> usize {
    input
        .iter()
        .map(|probe| {
            input
                .iter()
                .filter(|i| i.start <= probe.start && probe.start < i.end)
                .count()
        })
        .max()
        .unwrap_or(0)
}

proptest! {
    #[test]
    fn tracks_never_overlap(input in intervals("A", 0)) {
        let tracks = allocate("A", input).unwrap();
        for track in &tracks {
            for pair in track.items.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }
        }
    }

    #[test]
    fn every_interval_is_placed_once(input in intervals("A", 0)) {
        let n = input.len();
        let tracks = allocate("A", input).unwrap();
        let mut ids: Vec<usize> = tracks
            .iter()
            .flat_map(|t| t.items.iter().map(|i| i.payload))
            .collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn indices_are_dense_from_one(input in intervals("A", 0)) {
        let tracks = allocate("A", input).unwrap();
        for (i, track) in tracks.iter().enumerate() {
            prop_assert_eq!(track.index, i + 1);
            prop_assert!(!track.items.is_empty());
        }
    }

    #[test]
    fn same_start_groups_land_on_contiguous_tracks(input in intervals("A", 0)) {
        let mut groups: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        for interval in &input {
            groups.entry(interval.start.to_bits()).or_default().push(interval.payload);
        }

        let tracks = allocate("A", input).unwrap();
        let placement = track_of(&tracks);

        // Non-negative starts: bit order is numeric order.
        let mut highest_before = 0;
        for ids in groups.values() {
            let mut indices: Vec<usize> = ids.iter().map(|id| placement[id]).collect();
            indices.sort_unstable();
            for pair in indices.windows(2) {
                prop_assert_eq!(pair[1], pair[0] + 1);
            }

            // The run starts at track 1 or on the first track opened for it.
            let lowest = indices[0];
            prop_assert!(
                lowest == 1 || lowest == highest_before + 1,
                "group starts at {} with {} tracks already open",
                lowest,
                highest_before
            );
            highest_before = highest_before.max(indices[indices.len() - 1]);
        }
    }

    #[test]
    fn contiguous_uses_at_least_overlap_depth(input in intervals("A", 1)) {
        let depth = overlap_depth(&input);
        let tracks = allocate("A", input).unwrap();
        prop_assert!(tracks.len() >= depth);
    }

    #[test]
    fn earliest_finish_uses_exactly_overlap_depth(input in intervals("A", 1)) {
        let depth = overlap_depth(&input);
        let config = AllocationConfig { policy: AllocationPolicy::EarliestFinish };
        let tracks = allocate_with("A", input, &config).unwrap();
        prop_assert_eq!(tracks.len(), depth);
    }

    #[test]
    fn fillers_are_never_negative(input in intervals("A", 0)) {
        for track in allocate("A", input).unwrap() {
            let filled = fill_gaps(track).unwrap();
            let mut clock = 0.0;
            for entry in &filled.entries {
                if let Entry::Filler { duration } = entry {
                    prop_assert!(*duration >= 0.0);
                }
                if let Entry::Clip { interval } = entry {
                    prop_assert!((clock - interval.start).abs() < 1e-9);
                }
                clock += entry.duration();
            }
        }
    }

    #[test]
    fn flattening_twice_gives_same_order(
        a in intervals("Alice", 0),
        b in intervals("Bob", 0),
    ) {
        let groups: Vec<OwnerGroup<usize>> = [("Alice", a), ("Bob", b)]
            .into_iter()
            .map(|(owner, input)| OwnerGroup {
                owner: owner.to_string(),
                tracks: allocate(owner, input)
                    .unwrap()
                    .into_iter()
                    .map(|t| fill_gaps(t).unwrap())
                    .collect(),
            })
            .collect();

        prop_assert_eq!(flatten(groups.clone()), flatten(groups));
    }

    #[test]
    fn layout_is_independent_of_parallelism(
        a in intervals("Alice", 0),
        b in intervals("Bob", 0),
    ) {
        let mut input = a;
        input.extend(b);
        let serial = layout::build(
            input.clone(),
            &LayoutConfig { parallel: false, ..LayoutConfig::default() },
        );
        let parallel = layout::build(input, &LayoutConfig::default());
        prop_assert_eq!(serial, parallel);
    }
}
