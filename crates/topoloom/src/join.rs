//! Junction detection: find the buffer positions where arcs must break.
//!
//! The second pipeline stage. A *junction* is a buffer position that must
//! remain an arc boundary: every range's first and last position
//! unconditionally, any position whose coordinate value also occurs in a
//! different range, and any ring position whose value is revisited within
//! the same ring's interior.
//!
//! Detection is by coordinate value, not buffer index: adjacent
//! geometries are extracted independently, so the same geographic point
//! typically occupies several buffer positions. Values compare by exact
//! equality; no tolerance is applied.

use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use crate::extract::Extracted;
use crate::types::{Position, Range, ValueIndex};

/// Junction marker per buffer index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junctions {
    marks: Vec<bool>,
}

impl Junctions {
    /// Returns `true` if the buffer position at `index` is a junction.
    #[must_use]
    pub fn is_junction(&self, index: usize) -> bool {
        self.marks.get(index).copied().unwrap_or(false)
    }

    /// Number of junction positions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.marks.iter().filter(|&&marked| marked).count()
    }

    fn mark(&mut self, index: usize) {
        self.marks[index] = true;
    }
}

/// Which ranges a coordinate value occurs in.
///
/// Only "one range" vs "more than one" matters; the first range seen is
/// enough to detect a second.
struct Occupancy {
    range: usize,
    shared: bool,
}

/// Mark every junction position in the extracted buffer.
///
/// The marker set is a pure function of the buffer and the extracted
/// ranges; running it twice on the same input yields identical marks.
#[must_use]
pub fn junctions(extracted: &Extracted) -> Junctions {
    let coordinates = &extracted.coordinates;

    // Pass 1: index every coordinate value by the ranges touching it.
    let mut occupancy: ValueIndex<Occupancy> = ValueIndex::default();
    let ranges = extracted.lines.iter().chain(&extracted.rings);
    for (range_id, range) in ranges.enumerate() {
        for position in range.first..=range.last {
            match occupancy.entry(coordinates[position].key()) {
                Entry::Occupied(mut entry) => {
                    if entry.get().range != range_id {
                        entry.get_mut().shared = true;
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(Occupancy {
                        range: range_id,
                        shared: false,
                    });
                }
            }
        }
    }

    let shared = |position: usize| {
        occupancy
            .get(&coordinates[position].key())
            .is_some_and(|entry| entry.shared)
    };

    // Pass 2: mark endpoints, cross-range shares, and ring revisits.
    let mut junctions = Junctions {
        marks: vec![false; coordinates.len()],
    };

    for range in &extracted.lines {
        junctions.mark(range.first);
        junctions.mark(range.last);
        for position in range.first + 1..range.last {
            if shared(position) {
                junctions.mark(position);
            }
        }
    }

    for range in &extracted.rings {
        junctions.mark(range.first);
        junctions.mark(range.last);

        let revisits = ring_revisits(coordinates, *range);
        for position in range.first + 1..range.last {
            let key = coordinates[position].key();
            if shared(position) || revisits.get(&key).copied().unwrap_or(0) >= 2 {
                junctions.mark(position);
            }
        }
    }

    junctions
}

/// Occurrence count per value within one ring, the closing duplicate
/// counted once.
fn ring_revisits(coordinates: &[Position], range: Range) -> ValueIndex<u32> {
    let mut counts = ValueIndex::default();
    for position in range.first..range.last {
        *counts.entry(coordinates[position].key()).or_insert(0) += 1;
    }
    counts
}
