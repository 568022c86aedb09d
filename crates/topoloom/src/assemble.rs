//! Final assembly: rewrite raw-arc placeholders into signed arc ids.
//!
//! The last pipeline stage. Every placeholder list becomes an [`ArcId`]
//! list via the deduplication translation table, nesting shape intact;
//! `Point`/`MultiPoint` payloads pass through from extraction unchanged.
//! The coordinate buffer does not appear in the result.

use indexmap::IndexMap;

use crate::dedup::Deduped;
use crate::types::{ArcId, Geometry, Topology};

/// Assemble the final topology from cut objects and deduplicated arcs.
#[must_use]
pub fn assemble(
    objects: IndexMap<String, Geometry<Vec<usize>>>,
    deduped: Deduped,
) -> Topology {
    let translate = deduped.translate;
    let mut assembled = IndexMap::with_capacity(objects.len());

    for (name, geometry) in objects {
        let rewritten = geometry.map_lines(&mut |placeholders: Vec<usize>| {
            placeholders
                .into_iter()
                .map(|placeholder| translate[placeholder])
                .collect::<Vec<ArcId>>()
        });
        assembled.insert(name, rewritten);
    }

    Topology {
        objects: assembled,
        arcs: deduped.arcs,
    }
}
