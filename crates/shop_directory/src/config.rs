use std::{env, error, fmt, path::PathBuf, str::FromStr};

use crate::index::IndexKind;

pub const DEFAULT_GRID_DEGREES: f64 = 0.05;

/// Settings read from the environment:
///
/// - `SHOP_STORE_PATH`: JSON file to keep shops in, in memory if unset
/// - `SHOP_INDEX`: `rtree` (default) or `grid`
/// - `SHOP_INDEX_GRID_DEGREES`: cell size of the grid index, 0.05 if unset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectoryConfig {
    pub store_path: Option<PathBuf>,
    pub index: IndexKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value '{}' for {}", self.value, self.variable)
    }
}

impl error::Error for ConfigError {}

impl DirectoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Result<Self, ConfigError> {
        let store_path = var("SHOP_STORE_PATH")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let grid_degrees = match var("SHOP_INDEX_GRID_DEGREES") {
            None => DEFAULT_GRID_DEGREES,
            Some(value) => value
                .parse::<f64>()
                .ok()
                .filter(|degrees| degrees.is_finite() && *degrees > 0.0)
                .ok_or(ConfigError {
                    variable: "SHOP_INDEX_GRID_DEGREES",
                    value,
                })?,
        };

        let index = match var("SHOP_INDEX") {
            None => IndexKind::default(),
            Some(value) => value
                .parse::<IndexKind>()
                .map_err(|_| ConfigError {
                    variable: "SHOP_INDEX",
                    value,
                })?
                .with_grid_degrees(grid_degrees),
        };

        Ok(Self { store_path, index })
    }
}

impl IndexKind {
    /// Sets the cell size if this is a grid.
    pub fn with_grid_degrees(self, cell_degrees: f64) -> Self {
        match self {
            IndexKind::Grid { .. } => IndexKind::Grid { cell_degrees },
            other => other,
        }
    }
}

/// Parses `rtree` or `grid`, case insensitive. Grids get the default cell
/// size.
impl FromStr for IndexKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "rtree" | "r-tree" => Ok(IndexKind::RTree),
            "grid" => Ok(IndexKind::Grid {
                cell_degrees: DEFAULT_GRID_DEGREES,
            }),
            _ => Err(format!("unknown index '{}', expected rtree or grid", value)),
        }
    }
}
