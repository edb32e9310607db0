use std::collections::HashMap;

use geometry::BoundingBox;
use indexmap::IndexSet;
use model::{geo::Point, shop::AreaId};
use rstar::{RTree, RTreeObject, AABB};

use super::SpatialIndex;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    area: AreaId,
    bbox: BoundingBox,
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min_lon, self.bbox.min_lat],
            [self.bbox.max_lon, self.bbox.max_lat],
        )
    }
}

/// R*-tree over the boxes of all areas.
#[derive(Default)]
pub struct RTreeIndex {
    tree: RTree<Entry>,
    areas: HashMap<AreaId, Vec<BoundingBox>>,
}

impl RTreeIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for RTreeIndex {
    fn insert(&mut self, area: AreaId, boxes: &[BoundingBox]) {
        self.remove(area);
        for bbox in boxes {
            self.tree.insert(Entry { area, bbox: *bbox });
        }
        self.areas.insert(area, boxes.to_vec());
    }

    fn remove(&mut self, area: AreaId) -> bool {
        let Some(boxes) = self.areas.remove(&area) else {
            return false;
        };
        for bbox in boxes {
            self.tree.remove(&Entry { area, bbox });
        }
        true
    }

    fn query(&self, point: &Point) -> Vec<AreaId> {
        let envelope = AABB::from_point([point.longitude(), point.latitude()]);
        let mut found = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.area)
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
