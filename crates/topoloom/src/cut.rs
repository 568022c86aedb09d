//! Arc cutting: split every extracted range at its junctions.
//!
//! The third pipeline stage. Each range is walked in buffer order and
//! split into *raw arcs*, minimal contiguous coordinate runs bounded by
//! junctions. The junction coordinate itself appears in both adjacent
//! raw arcs, so concatenating a range's raw arcs (dropping each repeated
//! boundary coordinate) reconstructs the range exactly. A range with no
//! interior junctions yields exactly one raw arc.
//!
//! Raw arcs are copied out of the buffer in extraction order, so their
//! placeholder indices are deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extract::Extracted;
use crate::join::Junctions;
use crate::types::{Geometry, Position, Range};

/// Output of the cutting stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    /// Every raw arc, in emission order. Placeholder indices in
    /// `objects` point into this list.
    pub raw_arcs: Vec<Vec<Position>>,
    /// Input objects with each range rewritten as an ordered list of
    /// raw-arc placeholders.
    pub objects: IndexMap<String, Geometry<Vec<usize>>>,
}

/// Cut every range into raw arcs at junction boundaries.
#[must_use]
pub fn cut(extracted: Extracted, junctions: &Junctions) -> Cut {
    let coordinates = extracted.coordinates;
    let mut raw_arcs = Vec::new();
    let mut objects = IndexMap::with_capacity(extracted.objects.len());

    for (name, geometry) in extracted.objects {
        let rewritten = geometry.map_lines(&mut |range: Range| {
            cut_range(&coordinates, junctions, range, &mut raw_arcs)
        });
        objects.insert(name, rewritten);
    }

    Cut { raw_arcs, objects }
}

/// Split one range at its interior junctions, returning the placeholder
/// list. Endpoint junctions bound the first and last raw arc and never
/// split anything by themselves.
fn cut_range(
    coordinates: &[Position],
    junctions: &Junctions,
    range: Range,
    raw_arcs: &mut Vec<Vec<Position>>,
) -> Vec<usize> {
    let mut placeholders = Vec::new();
    let mut start = range.first;

    for position in range.first + 1..range.last {
        if junctions.is_junction(position) {
            placeholders.push(emit(raw_arcs, &coordinates[start..=position]));
            start = position;
        }
    }
    placeholders.push(emit(raw_arcs, &coordinates[start..=range.last]));

    placeholders
}

fn emit(raw_arcs: &mut Vec<Vec<Position>>, run: &[Position]) -> usize {
    raw_arcs.push(run.to_vec());
    raw_arcs.len() - 1
}
