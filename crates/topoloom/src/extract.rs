//! Coordinate extraction: copy every line and ring into one shared buffer.
//!
//! The first pipeline stage. Walks the input objects in insertion order,
//! appends each line/ring coordinate sequence to a single growable buffer,
//! and rewrites the geometry payloads as inclusive [`Range`]s into that
//! buffer. All later stages address coordinates purely by buffer index.
//!
//! Input validation lives here: non-finite coordinates, unclosed rings,
//! and degenerate lines abort the whole pipeline before any topology is
//! built.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Geometry, GeometryObjects, GeometryPath, Position, Range, TopologyError};

/// Output of the extraction stage.
///
/// `coordinates` is frozen after extraction; `lines` and `rings` record
/// every extracted range in discovery order, independent of which named
/// object it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extracted {
    /// The shared coordinate buffer, in input traversal order.
    pub coordinates: Vec<Position>,
    /// Input objects with line/ring payloads rewritten as buffer ranges.
    pub objects: IndexMap<String, Geometry<Range>>,
    /// Ranges extracted from line strings, in discovery order.
    pub lines: Vec<Range>,
    /// Ranges extracted from polygon rings, in discovery order.
    pub rings: Vec<Range>,
}

/// Extract all line/ring coordinates into a shared buffer.
///
/// Object iteration order and, within an object, member order are
/// preserved exactly; buffer indices are reproducible from input order
/// alone. Coordinates are copied by value; the input is consumed.
///
/// # Errors
///
/// Returns [`TopologyError::MalformedCoordinate`] if any coordinate
/// component is NaN or infinite, [`TopologyError::UnclosedRing`] if a
/// polygon ring's first and last coordinates differ (or the ring is
/// empty), and [`TopologyError::ShortLineString`] if a line has fewer
/// than two positions.
pub fn extract(objects: GeometryObjects) -> Result<Extracted, TopologyError> {
    let mut extractor = Extractor::default();
    let mut extracted = IndexMap::with_capacity(objects.len());

    for (name, geometry) in objects {
        let mut indices = Vec::new();
        let rewritten = extractor.geometry(geometry, &name, &mut indices)?;
        extracted.insert(name, rewritten);
    }

    Ok(Extracted {
        coordinates: extractor.coordinates,
        objects: extracted,
        lines: extractor.lines,
        rings: extractor.rings,
    })
}

#[derive(Default)]
struct Extractor {
    coordinates: Vec<Position>,
    lines: Vec<Range>,
    rings: Vec<Range>,
}

impl Extractor {
    fn geometry(
        &mut self,
        geometry: Geometry<Vec<Position>>,
        object: &str,
        indices: &mut Vec<usize>,
    ) -> Result<Geometry<Range>, TopologyError> {
        match geometry {
            Geometry::Point(position) => {
                check_finite(&[position], object, indices)?;
                Ok(Geometry::Point(position))
            }
            Geometry::MultiPoint(positions) => {
                check_finite(&positions, object, indices)?;
                Ok(Geometry::MultiPoint(positions))
            }
            Geometry::LineString(line) => {
                Ok(Geometry::LineString(self.line(line, object, indices)?))
            }
            Geometry::MultiLineString(lines) => {
                let mut ranges = Vec::with_capacity(lines.len());
                for (member, line) in lines.into_iter().enumerate() {
                    indices.push(member);
                    ranges.push(self.line(line, object, indices)?);
                    indices.pop();
                }
                Ok(Geometry::MultiLineString(ranges))
            }
            Geometry::Polygon(rings) => {
                Ok(Geometry::Polygon(self.polygon(rings, object, indices)?))
            }
            Geometry::MultiPolygon(polygons) => {
                let mut members = Vec::with_capacity(polygons.len());
                for (member, rings) in polygons.into_iter().enumerate() {
                    indices.push(member);
                    members.push(self.polygon(rings, object, indices)?);
                    indices.pop();
                }
                Ok(Geometry::MultiPolygon(members))
            }
            Geometry::GeometryCollection(geometries) => {
                let mut members = Vec::with_capacity(geometries.len());
                for (member, geometry) in geometries.into_iter().enumerate() {
                    indices.push(member);
                    members.push(self.geometry(geometry, object, indices)?);
                    indices.pop();
                }
                Ok(Geometry::GeometryCollection(members))
            }
        }
    }

    fn polygon(
        &mut self,
        rings: Vec<Vec<Position>>,
        object: &str,
        indices: &mut Vec<usize>,
    ) -> Result<Vec<Range>, TopologyError> {
        let mut ranges = Vec::with_capacity(rings.len());
        for (member, ring) in rings.into_iter().enumerate() {
            indices.push(member);
            ranges.push(self.ring(ring, object, indices)?);
            indices.pop();
        }
        Ok(ranges)
    }

    fn line(
        &mut self,
        line: Vec<Position>,
        object: &str,
        indices: &[usize],
    ) -> Result<Range, TopologyError> {
        if line.len() < 2 {
            return Err(TopologyError::ShortLineString {
                path: GeometryPath::new(object, indices.to_vec()),
            });
        }
        let range = self.append(&line, object, indices)?;
        self.lines.push(range);
        Ok(range)
    }

    fn ring(
        &mut self,
        ring: Vec<Position>,
        object: &str,
        indices: &[usize],
    ) -> Result<Range, TopologyError> {
        match (ring.first(), ring.last()) {
            (Some(first), Some(last)) if first == last => {}
            _ => {
                return Err(TopologyError::UnclosedRing {
                    path: GeometryPath::new(object, indices.to_vec()),
                });
            }
        }
        let range = self.append(&ring, object, indices)?;
        self.rings.push(range);
        Ok(range)
    }

    fn append(
        &mut self,
        positions: &[Position],
        object: &str,
        indices: &[usize],
    ) -> Result<Range, TopologyError> {
        check_finite(positions, object, indices)?;
        let first = self.coordinates.len();
        self.coordinates.extend_from_slice(positions);
        Ok(Range::new(first, self.coordinates.len() - 1))
    }
}

fn check_finite(
    positions: &[Position],
    object: &str,
    indices: &[usize],
) -> Result<(), TopologyError> {
    if positions.iter().all(|position| position.is_finite()) {
        Ok(())
    } else {
        Err(TopologyError::MalformedCoordinate {
            path: GeometryPath::new(object, indices.to_vec()),
        })
    }
}
