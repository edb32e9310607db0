use std::ops::{Add, Mul, Neg, Sub};

/// Two positions closer than this arc (in radians) are considered the same
/// position. Roughly 6mm on the surface of the earth.
pub const COINCIDENCE_RADIANS: f64 = 1e-9;

pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// A vector in 3d space. Positions on the unit sphere are represented as
/// vectors of length one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const NORTH_POLE: Vector3 = Vector3::new(0.0, 0.0, 1.0);
    pub const SOUTH_POLE: Vector3 = Vector3::new(0.0, 0.0, -1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector of a position given in decimal degrees.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        let lon = to_radians(longitude);
        let lat = to_radians(latitude);
        Self::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns `None` for (almost) zero vectors, which have no direction.
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.norm();
        if norm < f64::EPSILON {
            None
        } else {
            Some(*self * (1.0 / norm))
        }
    }

    /// Latitude in decimal degrees of the direction of this vector.
    pub fn latitude(&self) -> f64 {
        to_degrees(self.z.atan2(self.x.hypot(self.y)))
    }

    /// Longitude in decimal degrees of the direction of this vector.
    pub fn longitude(&self) -> f64 {
        to_degrees(self.y.atan2(self.x))
    }

    /// Angle between both directions in radians. Stable for tiny angles,
    /// unlike `acos` of the dot product.
    pub fn angle_to(&self, other: &Self) -> f64 {
        self.cross(other).norm().atan2(self.dot(other))
    }

    pub fn coincides_with(&self, other: &Self) -> bool {
        self.angle_to(other) < COINCIDENCE_RADIANS
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}
