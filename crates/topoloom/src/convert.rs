//! Conversions from `geo` ecosystem types into the input geometry model.
//!
//! Callers holding `geo` geometries can build [`GeometryObjects`] entries
//! without spelling out the enum by hand. Conversions copy coordinate
//! values exactly; nothing is reprojected or rounded. `geo` closes
//! polygon rings on construction, so converted rings always pass the
//! ring-closure check at extraction.
//!
//! `Line`, `Rect`, and `Triangle` have no direct counterpart in the
//! pipeline's tag set and convert to the nearest one: a two-point
//! `LineString` and single-ring `Polygon`s respectively.
//!
//! [`GeometryObjects`]: crate::types::GeometryObjects

use crate::types::{Geometry, Position};

impl From<geo::Coord> for Position {
    fn from(coord: geo::Coord) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<geo::Point> for Position {
    fn from(point: geo::Point) -> Self {
        Self::new(point.x(), point.y())
    }
}

fn line(line_string: geo::LineString) -> Vec<Position> {
    line_string.0.into_iter().map(Position::from).collect()
}

fn rings(polygon: geo::Polygon) -> Vec<Vec<Position>> {
    let (exterior, interiors) = polygon.into_inner();
    std::iter::once(exterior)
        .chain(interiors)
        .map(line)
        .collect()
}

impl From<geo::Point> for Geometry<Vec<Position>> {
    fn from(point: geo::Point) -> Self {
        Self::Point(point.into())
    }
}

impl From<geo::MultiPoint> for Geometry<Vec<Position>> {
    fn from(multi_point: geo::MultiPoint) -> Self {
        Self::MultiPoint(multi_point.0.into_iter().map(Position::from).collect())
    }
}

impl From<geo::Line> for Geometry<Vec<Position>> {
    fn from(segment: geo::Line) -> Self {
        Self::LineString(vec![segment.start.into(), segment.end.into()])
    }
}

impl From<geo::LineString> for Geometry<Vec<Position>> {
    fn from(line_string: geo::LineString) -> Self {
        Self::LineString(line(line_string))
    }
}

impl From<geo::MultiLineString> for Geometry<Vec<Position>> {
    fn from(multi_line_string: geo::MultiLineString) -> Self {
        Self::MultiLineString(multi_line_string.0.into_iter().map(line).collect())
    }
}

impl From<geo::Polygon> for Geometry<Vec<Position>> {
    fn from(polygon: geo::Polygon) -> Self {
        Self::Polygon(rings(polygon))
    }
}

impl From<geo::MultiPolygon> for Geometry<Vec<Position>> {
    fn from(multi_polygon: geo::MultiPolygon) -> Self {
        Self::MultiPolygon(multi_polygon.0.into_iter().map(rings).collect())
    }
}

impl From<geo::Rect> for Geometry<Vec<Position>> {
    fn from(rect: geo::Rect) -> Self {
        rect.to_polygon().into()
    }
}

impl From<geo::Triangle> for Geometry<Vec<Position>> {
    fn from(triangle: geo::Triangle) -> Self {
        triangle.to_polygon().into()
    }
}

impl From<geo::GeometryCollection> for Geometry<Vec<Position>> {
    fn from(collection: geo::GeometryCollection) -> Self {
        Self::GeometryCollection(collection.0.into_iter().map(Self::from).collect())
    }
}

impl From<geo::Geometry> for Geometry<Vec<Position>> {
    fn from(geometry: geo::Geometry) -> Self {
        match geometry {
            geo::Geometry::Point(point) => point.into(),
            geo::Geometry::Line(segment) => segment.into(),
            geo::Geometry::LineString(line_string) => line_string.into(),
            geo::Geometry::Polygon(polygon) => polygon.into(),
            geo::Geometry::MultiPoint(multi_point) => multi_point.into(),
            geo::Geometry::MultiLineString(multi_line_string) => multi_line_string.into(),
            geo::Geometry::MultiPolygon(multi_polygon) => multi_polygon.into(),
            geo::Geometry::GeometryCollection(collection) => collection.into(),
            geo::Geometry::Rect(rect) => rect.into(),
            geo::Geometry::Triangle(triangle) => triangle.into(),
        }
    }
}
