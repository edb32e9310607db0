use model::geo::{Point, Polygon};
use utility::geo::Vector3;

use crate::{
    bbox::{ring_bounding_boxes, BoundingBox},
    error::PolygonError,
    ring::{PreparedRing, RingLocation},
};

/// A validated polygon, ready for repeated containment tests.
#[derive(Debug, Clone)]
pub struct PreparedPolygon {
    outer: PreparedRing,
    holes: Vec<PreparedRing>,
}

impl PreparedPolygon {
    pub fn new(polygon: &Polygon) -> Result<Self, PolygonError> {
        let mut rings = polygon
            .rings()
            .iter()
            .enumerate()
            .map(|(index, ring)| {
                PreparedRing::new(ring).map_err(|error| PolygonError::Ring { ring: index, error })
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();
        let outer = rings.next().ok_or(PolygonError::Empty)?;
        let holes = rings.collect::<Vec<_>>();

        for (index, hole) in holes.iter().enumerate() {
            let strictly_inside = hole
                .vertices()
                .iter()
                .all(|vertex| outer.locate(vertex) == RingLocation::Inside)
                && !hole.intersects_ring(&outer);
            if !strictly_inside {
                return Err(PolygonError::HoleOutsideShell { ring: index + 1 });
            }
        }

        Ok(Self { outer, holes })
    }

    /// Inside the outer ring and not strictly inside any hole. Points on any
    /// boundary, hole boundaries included, are inside.
    pub fn contains(&self, point: &Point) -> bool {
        self.contains_vector(&Vector3::from_lon_lat(point.longitude(), point.latitude()))
    }

    pub fn contains_vector(&self, q: &Vector3) -> bool {
        match self.outer.locate(q) {
            RingLocation::Outside => false,
            RingLocation::Boundary => true,
            RingLocation::Inside => self
                .holes
                .iter()
                .all(|hole| hole.locate(q) != RingLocation::Inside),
        }
    }

    /// One box, or two for polygons crossing the antimeridian. Holes never
    /// extend the outer ring, so only the outer ring is considered.
    pub fn bounding_boxes(&self) -> Vec<BoundingBox> {
        ring_bounding_boxes(&self.outer)
    }
}
