//! Point and polygon math on the unit sphere.
//!
//! Polygons are bounded by great circle arcs. The interior of a ring is the
//! smaller of the two regions it separates, so ring orientation carries no
//! meaning. Points on a boundary (edge or vertex) are inside.

use model::geo::{Point, Polygon};

pub mod arc;
pub mod bbox;
pub mod error;
pub mod polygon;
pub mod ring;

pub use bbox::BoundingBox;
pub use error::{PolygonError, RingError};
pub use polygon::PreparedPolygon;
pub use ring::{validate_ring, PreparedRing, RingLocation};

/// Checks all rings of the polygon and that every hole lies strictly inside
/// the outer ring.
pub fn validate_polygon(polygon: &Polygon) -> Result<(), PolygonError> {
    PreparedPolygon::new(polygon).map(|_| ())
}

/// The lon/lat rectangles enclosing the polygon. Two rectangles are returned
/// for polygons crossing the antimeridian.
pub fn bounding_box(polygon: &Polygon) -> Result<Vec<BoundingBox>, PolygonError> {
    PreparedPolygon::new(polygon).map(|prepared| prepared.bounding_boxes())
}

/// Exact containment test. Prefer [`PreparedPolygon`] when testing the same
/// polygon repeatedly.
pub fn contains(polygon: &Polygon, point: &Point) -> Result<bool, PolygonError> {
    PreparedPolygon::new(polygon).map(|prepared| prepared.contains(point))
}
