//! Shared types for the topoloom topology construction pipeline.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

/// A 2D position in geographic coordinates.
///
/// Both components must be finite; extraction rejects NaN and infinite
/// values with [`TopologyError::MalformedCoordinate`] before any other
/// stage runs, so downstream comparisons never see a NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal component (longitude or projected x).
    pub x: f64,
    /// Vertical component (latitude or projected y).
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both components are finite numbers.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Value-identity key for junction detection and arc deduplication.
    ///
    /// `-0.0` is folded into `0.0` so that key equality agrees with `==`
    /// for every finite value.
    pub(crate) fn key(self) -> PointKey {
        PointKey([bits(self.x), bits(self.y)])
    }
}

fn bits(v: f64) -> u64 {
    if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() }
}

/// Bit-pattern identity of a [`Position`], usable as a hash map key.
///
/// Exact equality only; the pipeline never applies an epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct PointKey([u64; 2]);

/// Hash map keyed by coordinate value with deterministic hash state.
///
/// The pipeline is a pure function of its input; fixed-key SipHash keeps
/// probe behavior reproducible across runs and platforms.
pub(crate) type ValueIndex<V> = HashMap<PointKey, V, BuildHasherDefault<SipHasher13>>;

/// A contiguous slice of the coordinate buffer, inclusive on both ends.
///
/// A range extracted from a polygon ring satisfies
/// `buffer[first] == buffer[last]` (the ring's closing coordinate is
/// stored); a range extracted from a line has no such requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Buffer index of the first coordinate.
    pub first: usize,
    /// Buffer index of the last coordinate.
    pub last: usize,
}

impl Range {
    /// Create a new inclusive range.
    #[must_use]
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Number of buffer positions covered, endpoints included.
    #[must_use]
    pub const fn len(self) -> usize {
        self.last - self.first + 1
    }

    /// An inclusive range always covers at least one position.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }
}

/// A signed reference into the final arcs array.
///
/// A non-negative id means traverse `arcs[id]` forward; a negative id is
/// the one's complement of the arc index (`-(index + 1)`) and means
/// traverse `arcs[!id]` in reverse. Complementing twice restores the
/// original id, so [`rev`](Self::rev) is an involution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcId(i32);

impl ArcId {
    /// Forward reference to the arc at `id`.
    #[must_use]
    pub const fn forward(id: i32) -> Self {
        Self(id)
    }

    /// Reference to the same arc, traversed in the opposite direction.
    #[must_use]
    pub const fn rev(self) -> Self {
        Self(!self.0)
    }

    /// Returns `true` if this reference traverses its arc in reverse.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        self.0 < 0
    }

    /// Index into the arcs array, with a negative reference decoded via
    /// one's complement.
    #[must_use]
    pub const fn index(self) -> usize {
        let id = if self.0 < 0 { !self.0 } else { self.0 };
        id.unsigned_abs() as usize
    }

    /// The raw signed value, as it appears in serialized topologies.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

/// A geometry, generic over its line/ring payload `L`.
///
/// The same shape is reused by every pipeline stage with a different
/// payload type:
///
/// - input: `Geometry<Vec<Position>>` (literal coordinate sequences),
/// - extracted: `Geometry<Range>` (slices of the shared buffer),
/// - cut: `Geometry<Vec<usize>>` (raw-arc placeholders),
/// - final: `Geometry<Vec<ArcId>>` (signed arc references).
///
/// `Point` and `MultiPoint` always carry literal positions; they are
/// passed through the pipeline untouched and never enter the coordinate
/// buffer. `GeometryCollection` nests arbitrarily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry<L> {
    /// A single position, kept inline.
    Point(Position),
    /// A list of positions, kept inline.
    MultiPoint(Vec<Position>),
    /// One line payload.
    LineString(L),
    /// One payload per member line.
    MultiLineString(Vec<L>),
    /// One payload per ring, outer ring first.
    Polygon(Vec<L>),
    /// One ring-payload list per member polygon.
    MultiPolygon(Vec<Vec<L>>),
    /// An ordered sequence of nested geometries.
    GeometryCollection(Vec<Geometry<L>>),
}

impl<L> Geometry<L> {
    /// Rewrite every line/ring payload with `f`, preserving the geometry's
    /// nesting shape and member order.
    ///
    /// Payloads are visited in encounter order (outer-to-inner for
    /// collections, declaration order for `Multi*` members and rings),
    /// which is the same order extraction assigned buffer indices in.
    pub fn map_lines<M>(self, f: &mut impl FnMut(L) -> M) -> Geometry<M> {
        match self {
            Self::Point(position) => Geometry::Point(position),
            Self::MultiPoint(positions) => Geometry::MultiPoint(positions),
            Self::LineString(line) => Geometry::LineString(f(line)),
            Self::MultiLineString(lines) => {
                Geometry::MultiLineString(lines.into_iter().map(|line| f(line)).collect())
            }
            Self::Polygon(rings) => {
                Geometry::Polygon(rings.into_iter().map(|ring| f(ring)).collect())
            }
            Self::MultiPolygon(polygons) => Geometry::MultiPolygon(
                polygons
                    .into_iter()
                    .map(|rings| rings.into_iter().map(|ring| f(ring)).collect())
                    .collect(),
            ),
            Self::GeometryCollection(members) => Geometry::GeometryCollection(
                members
                    .into_iter()
                    .map(|member| member.map_lines(f))
                    .collect(),
            ),
        }
    }
}

/// Ordered input mapping from object name to geometry.
///
/// Insertion order is significant: buffer indices, line/ring discovery
/// order, and arc ids are all derived from it.
pub type GeometryObjects = IndexMap<String, Geometry<Vec<Position>>>;

/// Ordered output mapping from object name to arc-referencing geometry.
pub type TopologyObjects = IndexMap<String, Geometry<Vec<ArcId>>>;

/// The final output of topology construction.
///
/// Every shared border appears exactly once in `arcs`; geometries
/// reference arcs by [`ArcId`]. The coordinate buffer used during
/// construction is not part of the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Input objects with line/ring payloads rewritten as arc references.
    pub objects: TopologyObjects,
    /// Deduplicated arcs in first-seen order; `arcs[i]` is the canonical
    /// forward coordinate sequence for id `i`.
    pub arcs: Vec<Vec<Position>>,
}

/// Location of a geometry within the input, for error reporting.
///
/// `indices` records the member index at each nesting level on the way
/// down: `GeometryCollection` members, `Multi*` members, and polygon
/// rings. Rendered like `counties/2/0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryPath {
    /// Name of the top-level object.
    pub object: String,
    /// Member/ring index at each nesting level.
    pub indices: Vec<usize>,
}

impl GeometryPath {
    /// Create a new path.
    #[must_use]
    pub fn new(object: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            object: object.into(),
            indices,
        }
    }
}

impl fmt::Display for GeometryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.object)?;
        for index in &self.indices {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Errors that abort topology construction.
///
/// Construction fails fast: a partially built coordinate buffer or a
/// partial arc-id assignment cannot be resumed, so no partial
/// [`Topology`] is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A coordinate component is NaN or infinite.
    #[error("coordinate at {path} is not a finite number pair")]
    MalformedCoordinate {
        /// Geometry holding the offending coordinate.
        path: GeometryPath,
    },

    /// A polygon ring whose first and last coordinates differ.
    ///
    /// An empty ring has no closing coordinate and is reported as
    /// unclosed as well.
    #[error("polygon ring at {path} is not closed")]
    UnclosedRing {
        /// Ring position within its polygon.
        path: GeometryPath,
    },

    /// A line with fewer than two positions.
    ///
    /// GeoJSON requires at least two, and an inclusive [`Range`] cannot
    /// denote an empty slice.
    #[error("line string at {path} has fewer than two positions")]
    ShortLineString {
        /// Geometry holding the offending line.
        path: GeometryPath,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Position tests ---

    #[test]
    fn position_new() {
        let p = Position::new(3.0, 4.0);
        assert!((p.x - 3.0).abs() < f64::EPSILON);
        assert!((p.y - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn position_equality() {
        assert_eq!(Position::new(1.0, 2.0), Position::new(1.0, 2.0));
        assert_ne!(Position::new(1.0, 2.0), Position::new(1.0, 3.0));
    }

    #[test]
    fn position_finite() {
        assert!(Position::new(0.0, -12.5).is_finite());
        assert!(!Position::new(f64::NAN, 0.0).is_finite());
        assert!(!Position::new(0.0, f64::INFINITY).is_finite());
        assert!(!Position::new(f64::NEG_INFINITY, 0.0).is_finite());
    }

    #[test]
    fn position_key_matches_value_equality() {
        assert_eq!(Position::new(1.5, 2.5).key(), Position::new(1.5, 2.5).key());
        assert_ne!(Position::new(1.5, 2.5).key(), Position::new(2.5, 1.5).key());
    }

    #[test]
    fn position_key_folds_negative_zero() {
        // -0.0 == 0.0, so their keys must collide.
        assert_eq!(Position::new(-0.0, 0.0).key(), Position::new(0.0, -0.0).key());
    }

    // --- Range tests ---

    #[test]
    fn range_len_is_inclusive() {
        assert_eq!(Range::new(0, 2).len(), 3);
        assert_eq!(Range::new(5, 5).len(), 1);
    }

    #[test]
    fn range_never_empty() {
        assert!(!Range::new(3, 3).is_empty());
    }

    // --- ArcId tests ---

    #[test]
    fn arc_id_forward() {
        let id = ArcId::forward(4);
        assert!(!id.is_reverse());
        assert_eq!(id.index(), 4);
        assert_eq!(id.value(), 4);
    }

    #[test]
    fn arc_id_rev_complements() {
        let id = ArcId::forward(4).rev();
        assert!(id.is_reverse());
        assert_eq!(id.index(), 4);
        assert_eq!(id.value(), -5);
    }

    #[test]
    fn arc_id_rev_is_involution() {
        let id = ArcId::forward(7);
        assert_eq!(id.rev().rev(), id);
        assert_eq!(ArcId::forward(0).rev().value(), -1);
        assert_eq!(ArcId::forward(0).rev().rev().value(), 0);
    }

    // --- Geometry tests ---

    #[test]
    fn map_lines_preserves_points() {
        let geometry: Geometry<Vec<Position>> = Geometry::Point(Position::new(1.0, 2.0));
        let mapped: Geometry<Range> = geometry.map_lines(&mut |_| Range::new(0, 0));
        assert_eq!(mapped, Geometry::Point(Position::new(1.0, 2.0)));
    }

    #[test]
    fn map_lines_visits_rings_in_order() {
        let geometry: Geometry<u32> = Geometry::MultiPolygon(vec![vec![0, 1], vec![2]]);
        let mut seen = Vec::new();
        let mapped = geometry.map_lines(&mut |ring| {
            seen.push(ring);
            ring + 10
        });
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(
            mapped,
            Geometry::MultiPolygon(vec![vec![10, 11], vec![12]])
        );
    }

    #[test]
    fn map_lines_recurses_into_collections() {
        let geometry: Geometry<u32> = Geometry::GeometryCollection(vec![
            Geometry::GeometryCollection(vec![Geometry::LineString(1)]),
            Geometry::LineString(2),
        ]);
        let mapped = geometry.map_lines(&mut |line| line * 2);
        assert_eq!(
            mapped,
            Geometry::GeometryCollection(vec![
                Geometry::GeometryCollection(vec![Geometry::LineString(2)]),
                Geometry::LineString(4),
            ])
        );
    }

    // --- Error display tests ---

    #[test]
    fn geometry_path_display() {
        assert_eq!(GeometryPath::new("counties", vec![]).to_string(), "counties");
        assert_eq!(
            GeometryPath::new("counties", vec![2, 0]).to_string(),
            "counties/2/0"
        );
    }

    #[test]
    fn error_display_includes_path() {
        let err = TopologyError::UnclosedRing {
            path: GeometryPath::new("lake", vec![0]),
        };
        assert_eq!(err.to_string(), "polygon ring at lake/0 is not closed");
    }

    // --- Serde round-trip tests ---

    #[test]
    fn position_serde_round_trip() {
        let p = Position::new(3.25, -2.5);
        let json = serde_json::to_string(&p).unwrap();
        let deserialized: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(p, deserialized);
    }

    #[test]
    fn arc_id_serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&ArcId::forward(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ArcId::forward(3).rev()).unwrap(),
            "-4"
        );
    }

    #[test]
    fn geometry_serde_round_trip() {
        let geometry: Geometry<Vec<Position>> = Geometry::Polygon(vec![vec![
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
            Position::new(0.0, 1.0),
            Position::new(0.0, 0.0),
        ]]);
        let json = serde_json::to_string(&geometry).unwrap();
        let deserialized: Geometry<Vec<Position>> = serde_json::from_str(&json).unwrap();
        assert_eq!(geometry, deserialized);
    }
}
