use std::collections::HashMap;

use geometry::BoundingBox;
use indexmap::IndexSet;
use model::{geo::Point, shop::AreaId};

use super::SpatialIndex;

/// Boxes covering more cells than this are kept in a list which is scanned
/// on every query.
const MAX_CELLS_PER_BOX: i64 = 4096;

/// Smallest supported cell size in degrees.
const MIN_CELL_DEGREES: f64 = 1e-4;

type Cell = (i64, i64);

/// Uniform lon/lat grid. Every box is registered in all cells it overlaps.
pub struct GridIndex {
    cell_degrees: f64,
    cells: HashMap<Cell, Vec<(AreaId, BoundingBox)>>,
    oversized: Vec<(AreaId, BoundingBox)>,
    areas: HashMap<AreaId, Vec<BoundingBox>>,
}

impl GridIndex {
    /// Cell sizes below 1e-4 degrees (or not finite) are replaced by that
    /// minimum.
    pub fn new(cell_degrees: f64) -> Self {
        let cell_degrees = if cell_degrees.is_finite() && cell_degrees > MIN_CELL_DEGREES {
            cell_degrees
        } else {
            MIN_CELL_DEGREES
        };
        Self {
            cell_degrees,
            cells: HashMap::new(),
            oversized: Vec::new(),
            areas: HashMap::new(),
        }
    }

    pub fn cell_degrees(&self) -> f64 {
        self.cell_degrees
    }

    fn cell(&self, longitude: f64, latitude: f64) -> Cell {
        (
            ((longitude + 180.0) / self.cell_degrees).floor() as i64,
            ((latitude + 90.0) / self.cell_degrees).floor() as i64,
        )
    }

    /// The cells covered by `bbox`, or `None` if there are too many.
    fn cells_of(&self, bbox: &BoundingBox) -> Option<impl Iterator<Item = Cell>> {
        let (x0, y0) = self.cell(bbox.min_lon, bbox.min_lat);
        let (x1, y1) = self.cell(bbox.max_lon, bbox.max_lat);
        if (x1 - x0 + 1).saturating_mul(y1 - y0 + 1) > MAX_CELLS_PER_BOX {
            return None;
        }
        Some((x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| (x, y))))
    }
}

impl SpatialIndex for GridIndex {
    fn insert(&mut self, area: AreaId, boxes: &[BoundingBox]) {
        self.remove(area);
        for bbox in boxes {
            match self.cells_of(bbox) {
                Some(cells) => {
                    for cell in cells.collect::<Vec<_>>() {
                        self.cells.entry(cell).or_default().push((area, *bbox));
                    }
                }
                None => self.oversized.push((area, *bbox)),
            }
        }
        self.areas.insert(area, boxes.to_vec());
    }

    fn remove(&mut self, area: AreaId) -> bool {
        let Some(boxes) = self.areas.remove(&area) else {
            return false;
        };
        for bbox in &boxes {
            match self.cells_of(bbox) {
                Some(cells) => {
                    for cell in cells.collect::<Vec<_>>() {
                        if let Some(entries) = self.cells.get_mut(&cell) {
                            entries.retain(|(id, _)| *id != area);
                            if entries.is_empty() {
                                self.cells.remove(&cell);
                            }
                        }
                    }
                }
                None => self.oversized.retain(|(id, _)| *id != area),
            }
        }
        true
    }

    fn query(&self, point: &Point) -> Vec<AreaId> {
        let (longitude, latitude) = (point.longitude(), point.latitude());
        let in_cell = self
            .cells
            .get(&self.cell(longitude, latitude))
            .into_iter()
            .flatten();
        let mut found = in_cell
            .chain(self.oversized.iter())
            .filter(|(_, bbox)| bbox.contains(longitude, latitude))
            .map(|(area, _)| *area)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }

    fn len(&self) -> usize {
        self.areas.len()
    }
}

#[cfg(test)]
mod tests {
    use model::shop::Shop;
    use utility::id::Id;

    use super::*;

    #[test]
    fn large_boxes_go_to_the_overflow_list() {
        let mut grid = GridIndex::new(0.05);
        let area = AreaId {
            shop: Id::<Shop>::new(1),
            index: 0,
        };
        grid.insert(area, &[BoundingBox::WORLD]);
        assert!(grid.cells.is_empty());
        assert_eq!(grid.oversized.len(), 1);
        assert_eq!(grid.query(&Point::new(-33.0, 71.0).unwrap()), vec![area]);

        grid.remove(area);
        assert!(grid.oversized.is_empty());
        assert!(grid.is_empty());
    }

    #[test]
    fn empty_cells_are_dropped() {
        let mut grid = GridIndex::new(1.0);
        let area = AreaId {
            shop: Id::<Shop>::new(1),
            index: 0,
        };
        grid.insert(
            area,
            &[BoundingBox {
                min_lon: 0.5,
                min_lat: 0.5,
                max_lon: 2.5,
                max_lat: 1.5,
            }],
        );
        assert_eq!(grid.cells.len(), 6);
        grid.remove(area);
        assert!(grid.cells.is_empty());
    }

    #[test]
    fn replaces_invalid_cell_size() {
        assert_eq!(GridIndex::new(0.0).cell_degrees(), MIN_CELL_DEGREES);
        assert_eq!(GridIndex::new(f64::NAN).cell_degrees(), MIN_CELL_DEGREES);
        assert_eq!(GridIndex::new(0.5).cell_degrees(), 0.5);
    }
}
