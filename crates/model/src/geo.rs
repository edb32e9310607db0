use std::{error, fmt};

use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};

/// A validated position on the earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    longitude: f64,
    latitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl fmt::Display for InvalidPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid point ({}, {}): longitude must be within [-180, 180] \
             and latitude within [-90, 90]",
            self.longitude, self.latitude
        )
    }
}

impl error::Error for InvalidPoint {}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, InvalidPoint> {
        let valid = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        if valid {
            Ok(Self {
                longitude,
                latitude,
            })
        } else {
            Err(InvalidPoint {
                longitude,
                latitude,
            })
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

/// A vertex of a ring as it was supplied, `[longitude, latitude]`. Not
/// validated, ranges are checked together with the polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn to_point(self) -> Result<Point, InvalidPoint> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<[f64; 2]> for Position {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.longitude, position.latitude]
    }
}

impl JsonSchema for Position {
    fn schema_name() -> String {
        "Position".to_owned()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <[f64; 2]>::json_schema(gen)
    }
}

/// Closed sequence of positions. The first position is repeated at the end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LinearRing(pub Vec<Position>);

impl LinearRing {
    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<[f64; 2]>> for LinearRing {
    fn from(coordinates: Vec<[f64; 2]>) -> Self {
        Self(coordinates.into_iter().map(Position::from).collect())
    }
}

/// Polygon in GeoJSON coordinate layout: the outer ring first, followed by
/// the holes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Polygon(pub Vec<LinearRing>);

impl Polygon {
    pub fn new(outer: LinearRing, holes: Vec<LinearRing>) -> Self {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(outer);
        rings.extend(holes);
        Self(rings)
    }

    pub fn outer(&self) -> Option<&LinearRing> {
        self.0.first()
    }

    pub fn holes(&self) -> &[LinearRing] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn rings(&self) -> &[LinearRing] {
        &self.0
    }
}

impl From<Vec<Vec<[f64; 2]>>> for Polygon {
    fn from(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self(rings.into_iter().map(LinearRing::from).collect())
    }
}
