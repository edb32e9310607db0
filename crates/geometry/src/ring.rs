use std::f64::consts::PI;

use model::geo::LinearRing;
use utility::geo::Vector3;

use crate::{arc, error::RingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingLocation {
    Inside,
    Boundary,
    Outside,
}

/// A validated ring, converted to unit vectors once.
#[derive(Debug, Clone)]
pub struct PreparedRing {
    /// Open list of vertices: consecutive duplicates and the closing vertex
    /// are removed.
    vertices: Vec<Vector3>,
    /// Whether the interior lies to the left when walking the vertices in
    /// order.
    interior_is_left: bool,
    /// Points just left of the first two edges.
    references: [Vector3; 2],
}

/// Upper bound for the distance between a reference point and its edge, in
/// radians.
const REFERENCE_OFFSET: f64 = 1e-4;

pub fn validate_ring(ring: &LinearRing) -> Result<(), RingError> {
    PreparedRing::new(ring).map(|_| ())
}

impl PreparedRing {
    pub fn new(ring: &LinearRing) -> Result<Self, RingError> {
        let positions = ring.positions();
        let mut closed = Vec::with_capacity(positions.len());
        for position in positions {
            let point = position.to_point().map_err(RingError::InvalidCoordinate)?;
            closed.push(Vector3::from_lon_lat(point.longitude(), point.latitude()));
        }

        let (first, last) = match (closed.first(), closed.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(RingError::Degenerate),
        };
        if !first.coincides_with(last) {
            return Err(RingError::NotClosed);
        }

        let mut vertices: Vec<Vector3> = Vec::with_capacity(closed.len());
        for vertex in &closed {
            if !vertices.last().is_some_and(|previous| previous.coincides_with(vertex)) {
                vertices.push(*vertex);
            }
        }
        // the closing vertex
        while vertices.len() > 1 && vertices[0].coincides_with(&vertices[vertices.len() - 1]) {
            vertices.pop();
        }

        if count_distinct(&vertices) < 3 {
            return Err(RingError::Degenerate);
        }
        let n = vertices.len();
        for i in 0..n {
            if vertices[i].coincides_with(&-vertices[(i + 1) % n]) {
                return Err(RingError::Degenerate);
            }
        }
        check_simple(&vertices)?;

        let turning: f64 = (0..n)
            .map(|i| {
                arc::turn_angle(&vertices[i], &vertices[(i + 1) % n], &vertices[(i + 2) % n])
            })
            .sum();
        // Gauss-Bonnet: the region to the left has area 2π minus the turning
        let left_area = 2.0 * PI - turning;

        let references = [
            left_of_edge(&vertices, 0).ok_or(RingError::Degenerate)?,
            left_of_edge(&vertices, 1).ok_or(RingError::Degenerate)?,
        ];

        Ok(Self {
            vertices,
            interior_is_left: left_area <= 2.0 * PI,
            references,
        })
    }

    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub fn edges(&self) -> impl Iterator<Item = (&Vector3, &Vector3)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    pub fn on_boundary(&self, p: &Vector3) -> bool {
        self.edges().any(|(a, b)| arc::contains_point(a, b, p))
    }

    pub fn locate(&self, q: &Vector3) -> RingLocation {
        if self.on_boundary(q) {
            return RingLocation::Boundary;
        }
        let left = self
            .winding_side(q)
            .unwrap_or_else(|| self.crossing_side(q));
        if left == self.interior_is_left {
            RingLocation::Inside
        } else {
            RingLocation::Outside
        }
    }

    /// Winding number test. The angles subtended by all edges at `q` sum up
    /// to ±2π if the ring separates `q` from its antipode, the sign telling
    /// whether `q` lies left of the ring. `None` if both lie on the same side
    /// or the antipode is on the ring.
    fn winding_side(&self, q: &Vector3) -> Option<bool> {
        if self.on_boundary(&-*q) {
            return None;
        }
        let winding: f64 = self
            .edges()
            .map(|(a, b)| arc::subtended_angle(q, a, b))
            .sum();
        if winding > PI {
            Some(true)
        } else if winding < -PI {
            Some(false)
        } else {
            None
        }
    }

    /// Crossing parity on the way from `q` to a reference point, which lies
    /// left of the ring. `q` must not be on the ring.
    fn crossing_side(&self, q: &Vector3) -> bool {
        let [first, second] = &self.references;
        // prefer the reference farther from the antipode of q
        let reference = if q.dot(first) >= q.dot(second) {
            first
        } else {
            second
        };
        let crossings = self
            .edges()
            .filter(|(a, b)| arc::crosses(q, reference, a, b))
            .count();
        crossings % 2 == 0
    }

    pub fn intersects_ring(&self, other: &PreparedRing) -> bool {
        self.edges()
            .any(|(a, b)| other.edges().any(|(c, d)| arc::intersects(a, b, c, d)))
    }
}

/// A point left of the middle of edge `i`, closer to that edge than to any
/// other.
fn left_of_edge(vertices: &[Vector3], i: usize) -> Option<Vector3> {
    let n = vertices.len();
    let (a, b) = (&vertices[i], &vertices[(i + 1) % n]);
    let middle = (*a + *b).normalized()?;
    let normal = a.cross(b).normalized()?;
    let clearance = (0..n)
        .filter(|&k| k != i)
        .map(|k| arc::distance(&vertices[k], &vertices[(k + 1) % n], &middle))
        .fold(REFERENCE_OFFSET, f64::min);
    let offset = clearance / 2.0;
    (middle * offset.cos() + normal * offset.sin()).normalized()
}

fn count_distinct(vertices: &[Vector3]) -> usize {
    let mut distinct: Vec<&Vector3> = Vec::new();
    for vertex in vertices {
        if !distinct.iter().any(|known| known.coincides_with(vertex)) {
            distinct.push(vertex);
            if distinct.len() >= 3 {
                break;
            }
        }
    }
    distinct.len()
}

/// No two non-adjacent edges may share a point, and no two adjacent edges
/// may overlap.
fn check_simple(vertices: &[Vector3]) -> Result<(), RingError> {
    let n = vertices.len();
    for i in 0..n {
        let a = &vertices[(i + n - 1) % n];
        let b = &vertices[i];
        let c = &vertices[(i + 1) % n];
        let folds_back = match (b.cross(a).normalized(), b.cross(c).normalized()) {
            (Some(towards_a), Some(towards_c)) => towards_a.coincides_with(&towards_c),
            _ => true,
        };
        if folds_back {
            return Err(RingError::SelfIntersect);
        }
    }
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                // adjacent through the closing vertex
                continue;
            }
            if arc::intersects(
                &vertices[i],
                &vertices[(i + 1) % n],
                &vertices[j],
                &vertices[(j + 1) % n],
            ) {
                return Err(RingError::SelfIntersect);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coordinates: &[[f64; 2]]) -> LinearRing {
        LinearRing::from(coordinates.to_vec())
    }

    fn at(lon: f64, lat: f64) -> Vector3 {
        Vector3::from_lon_lat(lon, lat)
    }

    #[test]
    fn rejects_open_ring() {
        assert_eq!(
            validate_ring(&ring(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]])),
            Err(RingError::NotClosed)
        );
    }

    #[test]
    fn rejects_degenerate_rings() {
        assert_eq!(validate_ring(&ring(&[])), Err(RingError::Degenerate));
        assert_eq!(
            validate_ring(&ring(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]])),
            Err(RingError::Degenerate)
        );
        assert_eq!(
            validate_ring(&ring(&[[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 0.0]])),
            Err(RingError::Degenerate)
        );
    }

    #[test]
    fn rejects_bow_tie() {
        assert_eq!(
            validate_ring(&ring(&[
                [0.0, 0.0],
                [1.0, 1.0],
                [1.0, 0.0],
                [0.0, 1.0],
                [0.0, 0.0]
            ])),
            Err(RingError::SelfIntersect)
        );
    }

    #[test]
    fn rejects_spike() {
        assert_eq!(
            validate_ring(&ring(&[
                [0.0, 0.0],
                [2.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 0.0]
            ])),
            Err(RingError::SelfIntersect)
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            validate_ring(&ring(&[[0.0, 0.0], [200.0, 0.0], [1.0, 1.0], [0.0, 0.0]])),
            Err(RingError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn accepts_repeated_consecutive_vertices() {
        assert_eq!(
            validate_ring(&ring(&[
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 0.0]
            ])),
            Ok(())
        );
    }

    #[test]
    fn orientation_does_not_matter() {
        let ccw = PreparedRing::new(&ring(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.0, 0.0],
        ]))
        .unwrap();
        let cw = PreparedRing::new(&ring(&[
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [1.0, 0.0],
            [0.0, 0.0],
        ]))
        .unwrap();
        for prepared in [ccw, cw] {
            assert_eq!(prepared.locate(&at(0.5, 0.5)), RingLocation::Inside);
            assert_eq!(prepared.locate(&at(1.5, 0.5)), RingLocation::Outside);
            assert_eq!(prepared.locate(&at(-179.5, -0.5)), RingLocation::Outside);
            assert_eq!(prepared.locate(&at(1.0, 0.5)), RingLocation::Boundary);
            assert_eq!(prepared.locate(&at(0.0, 0.0)), RingLocation::Boundary);
        }
    }

    #[test]
    fn ring_around_the_pole() {
        let prepared = PreparedRing::new(&ring(&[
            [0.0, 80.0],
            [90.0, 80.0],
            [180.0, 80.0],
            [-90.0, 80.0],
            [0.0, 80.0],
        ]))
        .unwrap();
        assert_eq!(prepared.locate(&Vector3::NORTH_POLE), RingLocation::Inside);
        assert_eq!(prepared.locate(&at(45.0, 85.0)), RingLocation::Inside);
        assert_eq!(prepared.locate(&at(-123.0, 89.0)), RingLocation::Inside);
        assert_eq!(prepared.locate(&at(45.0, 0.0)), RingLocation::Outside);
        assert_eq!(prepared.locate(&Vector3::SOUTH_POLE), RingLocation::Outside);
    }

    /// Thin band over 210 degrees of longitude: every point inside has its
    /// antipode inside too, or on the ring.
    fn band() -> LinearRing {
        ring(&[
            [0.0, -0.5],
            [70.0, -0.5],
            [140.0, -0.5],
            [-150.0, -0.5],
            [-150.0, 0.5],
            [140.0, 0.5],
            [70.0, 0.5],
            [0.0, 0.5],
            [0.0, -0.5],
        ])
    }

    #[test]
    fn band_containing_antipodal_points() {
        let forward = PreparedRing::new(&band()).unwrap();
        let mut reversed = band();
        reversed.0.reverse();
        let backward = PreparedRing::new(&reversed).unwrap();
        for prepared in [forward, backward] {
            assert_eq!(prepared.locate(&at(10.0, 0.0)), RingLocation::Inside);
            assert_eq!(prepared.locate(&at(-170.0, 0.0)), RingLocation::Inside);
            assert_eq!(prepared.locate(&at(90.0, 0.0)), RingLocation::Inside);
            // antipode on the end of the band
            assert_eq!(prepared.locate(&at(30.0, 0.0)), RingLocation::Inside);
            assert_eq!(prepared.locate(&at(-150.0, 0.0)), RingLocation::Boundary);
            assert_eq!(prepared.locate(&at(-100.0, 0.0)), RingLocation::Outside);
            assert_eq!(prepared.locate(&at(10.0, 5.0)), RingLocation::Outside);
            assert_eq!(prepared.locate(&at(-170.0, -5.0)), RingLocation::Outside);
            assert_eq!(prepared.locate(&Vector3::NORTH_POLE), RingLocation::Outside);
        }
    }
}
