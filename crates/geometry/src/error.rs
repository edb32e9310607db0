use std::{error, fmt};

use model::geo::InvalidPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingError {
    /// The first and the last position differ.
    NotClosed,
    /// Fewer than three distinct vertices, or an edge between antipodal
    /// vertices, whose great circle is undefined.
    Degenerate,
    /// Two non-adjacent edges cross or touch, or two adjacent edges fold back
    /// onto each other.
    SelfIntersect,
    InvalidCoordinate(InvalidPoint),
}

impl RingError {
    pub fn reason(&self) -> &'static str {
        match self {
            RingError::NotClosed => "NOT_CLOSED",
            RingError::Degenerate => "DEGENERATE",
            RingError::SelfIntersect => "SELF_INTERSECT",
            RingError::InvalidCoordinate(_) => "INVALID_COORDINATE",
        }
    }
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::NotClosed => write!(f, "ring is not closed"),
            RingError::Degenerate => {
                write!(f, "ring has fewer than three distinct vertices")
            }
            RingError::SelfIntersect => write!(f, "ring intersects itself"),
            RingError::InvalidCoordinate(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for RingError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolygonError {
    /// The polygon has no outer ring.
    Empty,
    Ring { ring: usize, error: RingError },
    /// Hole `ring` is not strictly inside the outer ring.
    HoleOutsideShell { ring: usize },
}

impl PolygonError {
    pub fn reason(&self) -> &'static str {
        match self {
            PolygonError::Empty => "EMPTY",
            PolygonError::Ring { error, .. } => error.reason(),
            PolygonError::HoleOutsideShell { .. } => "HOLE_OUTSIDE_SHELL",
        }
    }
}

impl fmt::Display for PolygonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolygonError::Empty => write!(f, "polygon has no rings"),
            PolygonError::Ring { ring, error } => write!(f, "ring {}: {}", ring, error),
            PolygonError::HoleOutsideShell { ring } => {
                write!(f, "ring {}: hole is not inside the outer ring", ring)
            }
        }
    }
}

impl error::Error for PolygonError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            PolygonError::Ring { error, .. } => Some(error),
            _ => None,
        }
    }
}
