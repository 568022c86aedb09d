//! topoloom: Pure topology construction pipeline (sans-IO).
//!
//! Converts a named, ordered collection of geographic geometries into a
//! topologically consistent [`Topology`]: every boundary segment shared
//! by two or more geometries is stored exactly once as an *arc* and
//! referenced by signed index, through:
//! extraction -> junction detection -> arc cutting -> deduplication ->
//! assembly.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! geometry and returns structured data. Quantization, simplification,
//! bounding boxes, and TopoJSON encoding are downstream concerns that
//! consume the `{objects, arcs}` structure produced here.
//!
//! ```
//! use topoloom::{Geometry, GeometryObjects, Position, topology};
//!
//! let mut objects = GeometryObjects::new();
//! objects.insert(
//!     "border".to_string(),
//!     Geometry::LineString(vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0)]),
//! );
//!
//! let topology = topology(objects)?;
//! assert_eq!(topology.arcs.len(), 1);
//! # Ok::<(), topoloom::TopologyError>(())
//! ```

pub mod assemble;
pub mod convert;
pub mod cut;
pub mod dedup;
pub mod extract;
pub mod join;
pub mod types;

pub use cut::Cut;
pub use dedup::Deduped;
pub use extract::Extracted;
pub use join::Junctions;
pub use types::{
    ArcId, Geometry, GeometryObjects, GeometryPath, Position, Range, Topology, TopologyError,
    TopologyObjects,
};

/// Run the full topology construction pipeline.
///
/// Consumes the ordered input objects and produces a [`Topology`] in
/// which shared borders are stored once and referenced by [`ArcId`]. The
/// transform is a pure function of its input: buffer order, junction
/// marks, and arc ids are reproducible from input order alone.
///
/// # Pipeline steps
///
/// 1. Extract every line/ring into the shared coordinate buffer
/// 2. Mark junctions by coordinate-value equality
/// 3. Cut ranges into raw arcs at junction boundaries
/// 4. Deduplicate raw arcs that are equal or exact reverses
/// 5. Assemble `{objects, arcs}` with signed arc references
///
/// # Errors
///
/// Returns [`TopologyError::MalformedCoordinate`] if a coordinate
/// component is NaN or infinite, [`TopologyError::UnclosedRing`] if a
/// polygon ring does not close, and [`TopologyError::ShortLineString`]
/// if a line has fewer than two positions. Construction fails fast; no
/// partial topology is returned.
pub fn topology(objects: GeometryObjects) -> Result<Topology, TopologyError> {
    // 1. Extract coordinates into the shared buffer.
    let extracted = extract::extract(objects)?;

    // 2. Detect junctions by coordinate value.
    let junctions = join::junctions(&extracted);

    // 3. Cut every range into raw arcs at junction boundaries.
    let cut::Cut { raw_arcs, objects } = cut::cut(extracted, &junctions);

    // 4. Collapse directionally equivalent raw arcs.
    let deduped = dedup::dedup(raw_arcs);

    // 5. Rewrite placeholders into signed arc ids.
    Ok(assemble::assemble(objects, deduped))
}
