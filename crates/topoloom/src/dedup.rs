//! Arc deduplication: collapse directionally equivalent raw arcs.
//!
//! The fourth pipeline stage. Raw arcs are processed in emission order.
//! Two raw arcs map to the same stored arc if and only if their
//! coordinate sequences are equal or exact reverses of one another. A
//! forward match reuses the existing id; a reverse match yields the
//! one's-complement id; anything else becomes a new arc with the next
//! sequential id, so `arcs` ends up in first-seen order.
//!
//! Candidate lookup goes through an orientation-independent key (sorted
//! endpoint pair plus length), then candidates are compared coordinate
//! by coordinate in both orientations.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

use crate::types::{ArcId, PointKey, Position};

/// Output of the deduplication stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduped {
    /// Deduplicated arcs in first-seen order; `arcs[i]` is the canonical
    /// forward sequence for id `i`.
    pub arcs: Vec<Vec<Position>>,
    /// Signed arc reference per raw-arc placeholder, in placeholder
    /// order.
    pub translate: Vec<ArcId>,
}

/// Orientation-independent lookup key: sorted endpoint pair + length.
///
/// Equal keys are necessary but not sufficient for a match, so each key
/// maps to the list of admitted arc ids to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ArcKey {
    a: Option<PointKey>,
    b: Option<PointKey>,
    len: usize,
}

impl ArcKey {
    fn of(arc: &[Position]) -> Self {
        let first = arc.first().map(|position| position.key());
        let last = arc.last().map(|position| position.key());
        let (a, b) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        Self {
            a,
            b,
            len: arc.len(),
        }
    }
}

/// Deduplicate raw arcs into the final arcs array and translation table.
#[must_use]
pub fn dedup(raw_arcs: Vec<Vec<Position>>) -> Deduped {
    let mut arcs: Vec<Vec<Position>> = Vec::new();
    let mut translate = Vec::with_capacity(raw_arcs.len());
    let mut candidates: HashMap<ArcKey, Vec<i32>, BuildHasherDefault<SipHasher13>> =
        HashMap::default();
    let mut next_id = 0_i32;

    for raw in raw_arcs {
        let ids = candidates.entry(ArcKey::of(&raw)).or_default();

        let matched = ids.iter().find_map(|&id| {
            let arc = &arcs[ArcId::forward(id).index()];
            if *arc == raw {
                Some(ArcId::forward(id))
            } else if arc.iter().eq(raw.iter().rev()) {
                Some(ArcId::forward(id).rev())
            } else {
                None
            }
        });

        match matched {
            Some(id) => translate.push(id),
            None => {
                ids.push(next_id);
                arcs.push(raw);
                translate.push(ArcId::forward(next_id));
                next_id += 1;
            }
        }
    }

    Deduped { arcs, translate }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn distinct_arcs_get_sequential_ids() {
        let deduped = dedup(vec![
            vec![pt(0.0, 0.0), pt(1.0, 0.0)],
            vec![pt(2.0, 0.0), pt(3.0, 0.0)],
        ]);

        assert_eq!(deduped.arcs.len(), 2);
        assert_eq!(
            deduped.translate,
            vec![ArcId::forward(0), ArcId::forward(1)]
        );
    }

    #[test]
    fn exact_duplicate_reuses_the_forward_id() {
        let arc = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0)];
        let deduped = dedup(vec![arc.clone(), arc.clone()]);

        assert_eq!(deduped.arcs, vec![arc]);
        assert_eq!(
            deduped.translate,
            vec![ArcId::forward(0), ArcId::forward(0)]
        );
    }

    #[test]
    fn exact_reverse_gets_the_complement_id() {
        let forward = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0)];
        let reverse = vec![pt(2.0, 0.0), pt(1.0, 0.0), pt(0.0, 0.0)];
        let deduped = dedup(vec![forward.clone(), reverse]);

        // The first-seen orientation is canonical.
        assert_eq!(deduped.arcs, vec![forward]);
        assert_eq!(
            deduped.translate,
            vec![ArcId::forward(0), ArcId::forward(0).rev()]
        );
        assert_eq!(deduped.translate[1].value(), -1);
    }

    #[test]
    fn same_endpoints_different_interior_stay_distinct() {
        // Equal keys (same endpoints, same length) but unequal coordinates.
        let over = vec![pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 0.0)];
        let under = vec![pt(0.0, 0.0), pt(1.0, -1.0), pt(2.0, 0.0)];
        let deduped = dedup(vec![over.clone(), under.clone()]);

        assert_eq!(deduped.arcs, vec![over, under]);
        assert_eq!(
            deduped.translate,
            vec![ArcId::forward(0), ArcId::forward(1)]
        );
    }

    #[test]
    fn reversed_endpoints_hash_to_the_same_bucket() {
        // An arc whose endpoints sort the other way around must still
        // find its reverse candidate.
        let forward = vec![pt(5.0, 5.0), pt(3.0, 3.0), pt(0.0, 0.0)];
        let reverse = vec![pt(0.0, 0.0), pt(3.0, 3.0), pt(5.0, 5.0)];
        let deduped = dedup(vec![forward, reverse]);

        assert_eq!(deduped.arcs.len(), 1);
        assert!(deduped.translate[1].is_reverse());
    }

    #[test]
    fn palindromic_arc_matches_forward_first() {
        let palindrome = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 0.0)];
        let deduped = dedup(vec![palindrome.clone(), palindrome]);

        assert!(!deduped.translate[1].is_reverse());
        assert_eq!(deduped.translate[1], ArcId::forward(0));
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let a = vec![pt(0.0, 0.0), pt(1.0, 0.0)];
        let b = vec![pt(9.0, 9.0), pt(8.0, 8.0)];
        let b_rev = vec![pt(8.0, 8.0), pt(9.0, 9.0)];
        let c = vec![pt(4.0, 4.0), pt(5.0, 5.0)];
        let deduped = dedup(vec![a.clone(), b.clone(), b_rev, c.clone()]);

        assert_eq!(deduped.arcs, vec![a, b, c]);
        assert_eq!(
            deduped.translate,
            vec![
                ArcId::forward(0),
                ArcId::forward(1),
                ArcId::forward(1).rev(),
                ArcId::forward(2),
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let deduped = dedup(vec![]);
        assert!(deduped.arcs.is_empty());
        assert!(deduped.translate.is_empty());
    }
}
