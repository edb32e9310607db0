use utility::geo::{to_radians, Vector3};

use crate::{
    arc,
    ring::{PreparedRing, RingLocation},
};

/// Slack added on every side of a box, in degrees. Larger than the
/// coincidence tolerance, so points that count as on the boundary are never
/// filtered out by their box.
pub const MARGIN_DEGREES: f64 = 1e-7;

/// Axis aligned longitude/latitude rectangle. Never crosses the antimeridian,
/// so `min_lon <= max_lon` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub const WORLD: BoundingBox = BoundingBox {
        min_lon: -180.0,
        min_lat: -90.0,
        max_lon: 180.0,
        max_lat: 90.0,
    };

    /// Inclusive on all sides.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        self.min_lon <= longitude
            && longitude <= self.max_lon
            && self.min_lat <= latitude
            && latitude <= self.max_lat
    }
}

/// Boxes around the region enclosed by `ring`, including the bulge of its
/// great circle edges.
pub(crate) fn ring_bounding_boxes(ring: &PreparedRing) -> Vec<BoundingBox> {
    let vertices = ring.vertices();
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    for vertex in vertices {
        min_lat = min_lat.min(vertex.latitude());
        max_lat = max_lat.max(vertex.latitude());
    }
    for (a, b) in ring.edges() {
        let (highest, lowest) = arc::latitude_extremes(a, b);
        if let Some(highest) = highest {
            max_lat = max_lat.max(highest.latitude());
        }
        if let Some(lowest) = lowest {
            min_lat = min_lat.min(lowest.latitude());
        }
    }

    let north = ring.locate(&Vector3::NORTH_POLE) != RingLocation::Outside;
    let south = ring.locate(&Vector3::SOUTH_POLE) != RingLocation::Outside;
    if north {
        max_lat = 90.0;
    }
    if south {
        min_lat = -90.0;
    }
    let min_lat = (min_lat - MARGIN_DEGREES).max(-90.0);
    let max_lat = (max_lat + MARGIN_DEGREES).min(90.0);

    if north || south {
        return vec![BoundingBox {
            min_lon: -180.0,
            min_lat,
            max_lon: 180.0,
            max_lat,
        }];
    }

    // Walk the edges with unwrapped longitudes. Arcs not touching a pole
    // sweep their longitude monotonically over less than 180 degrees.
    let mut current = vertices[0].longitude();
    let mut min_lon = current;
    let mut max_lon = current;
    for (a, b) in ring.edges() {
        let mut delta = b.longitude() - a.longitude();
        if delta > 180.0 {
            delta -= 360.0;
        } else if delta <= -180.0 {
            delta += 360.0;
        }
        current += delta;
        min_lon = min_lon.min(current);
        max_lon = max_lon.max(current);
    }

    // a small arc near the poles spans many degrees of longitude
    let widest = min_lat.abs().max(max_lat.abs());
    let cos = to_radians(widest).cos();
    if cos <= MARGIN_DEGREES {
        return vec![BoundingBox {
            min_lon: -180.0,
            min_lat,
            max_lon: 180.0,
            max_lat,
        }];
    }
    let lon_margin = MARGIN_DEGREES / cos;

    split_longitudes(min_lon - lon_margin, max_lon + lon_margin)
        .into_iter()
        .map(|(min_lon, max_lon)| BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
        .collect()
}

/// Maps an unwrapped longitude interval onto [-180, 180], splitting it at the
/// antimeridian if needed.
fn split_longitudes(min: f64, max: f64) -> Vec<(f64, f64)> {
    if max - min >= 360.0 {
        return vec![(-180.0, 180.0)];
    }
    let shift = ((min + 180.0) / 360.0).floor() * 360.0;
    let (min, max) = (min - shift, max - shift);
    if max <= 180.0 {
        vec![(min, max)]
    } else {
        vec![(min, 180.0), (-180.0, max - 360.0)]
    }
}
