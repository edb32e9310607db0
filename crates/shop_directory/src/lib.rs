//! Which shops deliver to a point, and which food categories are available
//! there.
//!
//! A [`ShopDirectory`] keeps every stored shop together with a spatial
//! index over the bounding boxes of their delivery areas. Queries look up
//! candidate areas in the index and confirm them with the exact spherical
//! containment test.

use std::{error::Error, fmt, result};

use geometry::PolygonError;
use model::{category::UnknownCategory, geo::InvalidPoint};

pub mod config;
pub mod database;
pub mod directory;
pub mod index;
pub mod loader;
pub mod local;

pub use config::DirectoryConfig;
pub use directory::ShopDirectory;
pub use index::IndexKind;
pub use local::LocalDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPoint,
    InvalidPolygon,
    EmptyAreas,
    EmptyCategories,
    EmptyName,
    InvalidCategory,
    Cancelled,
    NotFound,
    Storage,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidPoint => "INVALID_POINT",
            ErrorKind::InvalidPolygon => "INVALID_POLYGON",
            ErrorKind::EmptyAreas => "EMPTY_AREAS",
            ErrorKind::EmptyCategories => "EMPTY_CATEGORIES",
            ErrorKind::EmptyName => "EMPTY_NAME",
            ErrorKind::InvalidCategory => "INVALID_CATEGORY",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Storage => "STORAGE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub enum DirectoryError {
    InvalidPoint(InvalidPoint),
    /// Area `area` of the submitted shop is not a well-formed polygon.
    InvalidPolygon {
        area: usize,
        error: PolygonError,
    },
    EmptyAreas,
    EmptyCategories,
    EmptyName,
    InvalidCategory(UnknownCategory),
    Cancelled,
    NotFound,
    Storage(Box<dyn Error + Send + Sync>),
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::InvalidPoint(_) => ErrorKind::InvalidPoint,
            DirectoryError::InvalidPolygon { .. } => ErrorKind::InvalidPolygon,
            DirectoryError::EmptyAreas => ErrorKind::EmptyAreas,
            DirectoryError::EmptyCategories => ErrorKind::EmptyCategories,
            DirectoryError::EmptyName => ErrorKind::EmptyName,
            DirectoryError::InvalidCategory(_) => ErrorKind::InvalidCategory,
            DirectoryError::Cancelled => ErrorKind::Cancelled,
            DirectoryError::NotFound => ErrorKind::NotFound,
            DirectoryError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// For `INVALID_POLYGON`, why the polygon was rejected, e.g.
    /// `SELF_INTERSECT`.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            DirectoryError::InvalidPolygon { error, .. } => Some(error.reason()),
            _ => None,
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::InvalidPoint(why) => write!(f, "{}: {}", self.kind(), why),
            DirectoryError::InvalidPolygon { area, error } => {
                write!(f, "{}<{}>: area {}, {}", self.kind(), error.reason(), area, error)
            }
            DirectoryError::InvalidCategory(why) => write!(f, "{}: {}", self.kind(), why),
            DirectoryError::Storage(why) => write!(f, "{}: {}", self.kind(), why),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DirectoryError::InvalidPoint(why) => Some(why),
            DirectoryError::InvalidPolygon { error, .. } => Some(error),
            DirectoryError::InvalidCategory(why) => Some(why),
            DirectoryError::Storage(why) => Some(why.as_ref()),
            _ => None,
        }
    }
}

impl From<InvalidPoint> for DirectoryError {
    fn from(why: InvalidPoint) -> Self {
        Self::InvalidPoint(why)
    }
}

impl From<UnknownCategory> for DirectoryError {
    fn from(why: UnknownCategory) -> Self {
        Self::InvalidCategory(why)
    }
}

impl From<database::DatabaseError> for DirectoryError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Other(why) => Self::Storage(why),
        }
    }
}

pub type Result<T> = result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use geometry::RingError;

    use super::*;

    #[test]
    fn errors_are_reported_by_name() {
        let error = DirectoryError::InvalidPolygon {
            area: 0,
            error: PolygonError::Ring {
                ring: 0,
                error: RingError::SelfIntersect,
            },
        };
        assert_eq!(error.kind().name(), "INVALID_POLYGON");
        assert_eq!(error.reason(), Some("SELF_INTERSECT"));
        assert!(error.to_string().starts_with("INVALID_POLYGON<SELF_INTERSECT>"));

        let error = DirectoryError::from(UnknownCategory("SUSHI".to_owned()));
        assert_eq!(error.kind(), ErrorKind::InvalidCategory);
        assert_eq!(error.reason(), None);
    }

    #[test]
    fn database_errors_map_to_kinds() {
        let not_found = DirectoryError::from(database::DatabaseError::NotFound);
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        let storage = DirectoryError::from(database::DatabaseError::other(
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        ));
        assert_eq!(storage.kind(), ErrorKind::Storage);
        assert_eq!(storage.to_string(), "STORAGE: disk full");
    }
}
