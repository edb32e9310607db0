//! Candidate lookup for delivery areas by bounding box.
//!
//! An index answers "which areas may contain this point". It never misses an
//! area whose box contains the point, the exact test happens afterwards.

use geometry::BoundingBox;
use model::{geo::Point, shop::AreaId};

pub mod grid;
pub mod rtree;

pub use grid::GridIndex;
pub use rtree::RTreeIndex;

pub trait SpatialIndex: Send + Sync {
    /// Adds one or two boxes for `area`. Inserting an area twice replaces
    /// its previous boxes.
    fn insert(&mut self, area: AreaId, boxes: &[BoundingBox]);

    /// Returns `true` if the area was indexed.
    fn remove(&mut self, area: AreaId) -> bool;

    /// All areas with a box containing `point`, each once, in ascending
    /// order.
    fn query(&self, point: &Point) -> Vec<AreaId>;

    /// Number of indexed areas.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The available index realizations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexKind {
    RTree,
    /// Uniform grid with cells of the given size in degrees.
    Grid { cell_degrees: f64 },
}

impl Default for IndexKind {
    fn default() -> Self {
        IndexKind::RTree
    }
}

impl IndexKind {
    pub fn build(self) -> Box<dyn SpatialIndex> {
        match self {
            IndexKind::RTree => Box::new(RTreeIndex::new()),
            IndexKind::Grid { cell_degrees } => Box::new(GridIndex::new(cell_degrees)),
        }
    }
}

#[cfg(test)]
mod tests {
    use model::shop::Shop;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use utility::id::Id;

    use super::*;

    fn area(shop: u64, index: usize) -> AreaId {
        AreaId {
            shop: Id::<Shop>::new(shop),
            index,
        }
    }

    fn kinds() -> [IndexKind; 3] {
        [
            IndexKind::RTree,
            IndexKind::Grid { cell_degrees: 0.05 },
            IndexKind::Grid { cell_degrees: 1.0 },
        ]
    }

    #[test]
    fn finds_areas_by_box() {
        for kind in kinds() {
            let mut index = kind.build();
            index.insert(
                area(1, 0),
                &[BoundingBox {
                    min_lon: 126.9,
                    min_lat: 37.5,
                    max_lon: 127.1,
                    max_lat: 37.7,
                }],
            );
            index.insert(
                area(2, 0),
                &[BoundingBox {
                    min_lon: 127.0,
                    min_lat: 37.6,
                    max_lon: 127.2,
                    max_lat: 37.8,
                }],
            );
            let at = |lon, lat| index.query(&Point::new(lon, lat).unwrap());
            assert_eq!(at(127.05, 37.65), vec![area(1, 0), area(2, 0)], "{:?}", kind);
            assert_eq!(at(126.95, 37.55), vec![area(1, 0)], "{:?}", kind);
            assert_eq!(at(126.9, 37.5), vec![area(1, 0)], "{:?}", kind);
            assert!(at(0.0, 0.0).is_empty(), "{:?}", kind);
            assert_eq!(index.len(), 2);
        }
    }

    #[test]
    fn two_boxes_yield_one_candidate() {
        for kind in kinds() {
            let mut index = kind.build();
            index.insert(
                area(1, 0),
                &[
                    BoundingBox {
                        min_lon: 179.5,
                        min_lat: 0.0,
                        max_lon: 180.0,
                        max_lat: 1.0,
                    },
                    BoundingBox {
                        min_lon: -180.0,
                        min_lat: 0.0,
                        max_lon: -179.5,
                        max_lat: 1.0,
                    },
                ],
            );
            let at = |lon, lat| index.query(&Point::new(lon, lat).unwrap());
            assert_eq!(at(179.9, 0.5), vec![area(1, 0)], "{:?}", kind);
            assert_eq!(at(-179.9, 0.5), vec![area(1, 0)], "{:?}", kind);
            assert_eq!(at(180.0, 0.5), vec![area(1, 0)], "{:?}", kind);
            assert_eq!(at(-180.0, 0.5), vec![area(1, 0)], "{:?}", kind);
            assert!(at(0.0, 0.5).is_empty(), "{:?}", kind);
            assert_eq!(index.len(), 1);
        }
    }

    #[test]
    fn remove_and_replace() {
        for kind in kinds() {
            let mut index = kind.build();
            let small = BoundingBox {
                min_lon: 0.0,
                min_lat: 0.0,
                max_lon: 1.0,
                max_lat: 1.0,
            };
            index.insert(area(1, 0), &[small]);
            index.insert(area(1, 1), &[BoundingBox::WORLD]);
            assert!(index.remove(area(1, 1)));
            assert!(!index.remove(area(1, 1)));
            assert_eq!(
                index.query(&Point::new(0.5, 0.5).unwrap()),
                vec![area(1, 0)]
            );

            index.insert(
                area(1, 0),
                &[BoundingBox {
                    min_lon: 10.0,
                    min_lat: 10.0,
                    max_lon: 11.0,
                    max_lat: 11.0,
                }],
            );
            assert!(index.query(&Point::new(0.5, 0.5).unwrap()).is_empty());
            assert_eq!(
                index.query(&Point::new(10.5, 10.5).unwrap()),
                vec![area(1, 0)]
            );
            assert_eq!(index.len(), 1);
        }
    }

    #[test]
    fn implementations_agree_with_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut boxes = Vec::new();
        for shop in 0..300 {
            let min_lon = rng.gen_range(-180.0..179.0);
            let min_lat = rng.gen_range(-90.0..89.0);
            let size = if shop % 50 == 0 { 60.0 } else { rng.gen_range(0.01..2.0) };
            let bbox = BoundingBox {
                min_lon,
                min_lat,
                max_lon: f64::min(min_lon + size, 180.0),
                max_lat: f64::min(min_lat + size, 90.0),
            };
            boxes.push((area(shop, 0), bbox));
        }
        let mut indexes = kinds().map(|kind| {
            let mut index = kind.build();
            for (id, bbox) in &boxes {
                index.insert(*id, &[*bbox]);
            }
            index
        });
        for _ in 0..2000 {
            let lon = rng.gen_range(-180.0..=180.0);
            let lat = rng.gen_range(-90.0..=90.0);
            let expected = boxes
                .iter()
                .filter(|(_, bbox)| bbox.contains(lon, lat))
                .map(|(id, _)| *id)
                .collect::<Vec<_>>();
            let point = Point::new(lon, lat).unwrap();
            for index in indexes.iter_mut() {
                assert_eq!(index.query(&point), expected);
            }
        }
    }
}
