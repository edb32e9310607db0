use std::{collections::BTreeMap, collections::BTreeSet, sync::Arc};

use geometry::{BoundingBox, PreparedPolygon};
use indexmap::IndexSet;
use log::{info, warn};
use model::{
    category::CategoryCode,
    geo::{Point, Polygon},
    shop::{AreaId, NewShop, Shop, ShopRecord, StoredShop},
    WithId,
};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;
use utility::{geo::Vector3, id::Id};

use crate::{
    database::{Database, DatabaseTransaction, ShopRepo},
    index::{IndexKind, SpatialIndex},
    local::LocalDatabase,
    DirectoryError, Result,
};

/// A delivery area ready for queries.
struct PreparedArea {
    polygon: PreparedPolygon,
    boxes: Vec<BoundingBox>,
}

struct Indexed {
    record: ShopRecord,
    areas: Vec<PreparedArea>,
}

/// Everything a query sees. Shops and index entries are only changed
/// together under the write lock.
struct State {
    shops: BTreeMap<Id<Shop>, Indexed>,
    index: Box<dyn SpatialIndex>,
}

impl State {
    fn new(index: Box<dyn SpatialIndex>) -> Self {
        Self {
            shops: BTreeMap::new(),
            index,
        }
    }

    fn publish(&mut self, record: ShopRecord, areas: Vec<PreparedArea>) {
        self.unpublish(record.id);
        for (area, prepared) in record.content.delivery_areas(record.id).zip(&areas) {
            self.index.insert(area.id, &prepared.boxes);
        }
        self.shops.insert(record.id, Indexed { record, areas });
    }

    fn unpublish(&mut self, id: Id<Shop>) -> Option<Indexed> {
        let removed = self.shops.remove(&id)?;
        for index in 0..removed.areas.len() {
            self.index.remove(AreaId { shop: id, index });
        }
        Some(removed)
    }

    /// Candidate areas of the point, by the index.
    fn candidates(&self, point: &Point) -> Vec<AreaId> {
        self.index.query(point)
    }

    /// Shops with an area containing `q`, in ascending id order. Once an
    /// area of a shop matched, its remaining areas are skipped.
    fn delivering<'a>(
        &'a self,
        q: Vector3,
        candidates: Vec<AreaId>,
    ) -> impl Iterator<Item = &'a Indexed> + 'a {
        let mut matched = None;
        candidates.into_iter().filter_map(move |area| {
            if matched == Some(area.shop) {
                return None;
            }
            let shop = self.shops.get(&area.shop)?;
            let prepared = shop.areas.get(area.index)?;
            if prepared.polygon.contains_vector(&q) {
                matched = Some(area.shop);
                Some(shop)
            } else {
                None
            }
        })
    }
}

/// Checks the submitted shop and prepares its areas. No lock is needed for
/// this.
fn validate(shop: NewShop) -> Result<(Shop, Vec<PreparedArea>)> {
    if shop.name.trim().is_empty() {
        return Err(DirectoryError::EmptyName);
    }
    if shop.categories.is_empty() {
        return Err(DirectoryError::EmptyCategories);
    }
    let categories = shop
        .categories
        .iter()
        .map(|token| token.parse::<CategoryCode>())
        .collect::<std::result::Result<IndexSet<_>, _>>()?
        .into_iter()
        .collect::<Vec<_>>();
    if shop.areas.is_empty() {
        return Err(DirectoryError::EmptyAreas);
    }
    let areas = prepare_areas(&shop.areas)?;
    Ok((
        Shop {
            name: shop.name,
            categories,
            areas: shop.areas,
        },
        areas,
    ))
}

/// Checks a stored shop again before it is served.
fn load(stored: StoredShop) -> Result<(ShopRecord, Vec<PreparedArea>)> {
    let record = stored.into_record()?;
    let areas = prepare_areas(&record.content.areas)?;
    Ok((record, areas))
}

fn prepare_areas(polygons: &[Polygon]) -> Result<Vec<PreparedArea>> {
    polygons
        .iter()
        .enumerate()
        .map(|(area, polygon)| {
            PreparedPolygon::new(polygon)
                .map(|polygon| PreparedArea {
                    boxes: polygon.bounding_boxes(),
                    polygon,
                })
                .map_err(|error| DirectoryError::InvalidPolygon { area, error })
        })
        .collect()
}

/// Shops and their delivery areas, backed by a [`Database`].
///
/// Cloning is cheap, all clones share the same shops. Any number of queries
/// may run concurrently; changes take a write lock and become visible to
/// queries all at once.
pub struct ShopDirectory<D: Database> {
    database: D,
    state: Arc<RwLock<State>>,
}

impl<D: Database> Clone for ShopDirectory<D> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            state: self.state.clone(),
        }
    }
}

impl ShopDirectory<LocalDatabase> {
    /// An empty directory which keeps nothing beyond the process.
    pub fn in_memory(index: IndexKind) -> Self {
        Self {
            database: LocalDatabase::in_memory(),
            state: Arc::new(RwLock::new(State::new(index.build()))),
        }
    }
}

impl<D: Database> ShopDirectory<D> {
    /// Loads every stored shop and builds the index before returning. Stored
    /// shops with categories or areas which are no longer valid are skipped.
    pub async fn open(database: D, index: IndexKind) -> Result<Self> {
        let stored = database.auto().get_all().await?;
        let mut state = State::new(index.build());
        for shop in stored {
            let id = shop.id;
            match load(shop) {
                Ok((record, areas)) => state.publish(record, areas),
                Err(why) => warn!("not serving stored shop {}: {}", id, why),
            }
        }
        info!(
            "built {:?} index over {} delivery areas of {} shops",
            index,
            state.index.len(),
            state.shops.len()
        );
        Ok(Self {
            database,
            state: Arc::new(RwLock::new(state)),
        })
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.shops.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Waits for the write lock unless `cancel` fires first.
    async fn lock_for_writing(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RwLockWriteGuard<'_, State>> {
        if cancel.is_cancelled() {
            return Err(DirectoryError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DirectoryError::Cancelled),
            state = self.state.write() => Ok(state),
        }
    }

    pub async fn insert_shop(&self, shop: NewShop) -> Result<Id<Shop>> {
        self.insert_shop_cancellable(shop, &CancellationToken::new())
            .await
    }

    /// Cancellation is honored until the write lock is taken. From there on
    /// the insert runs to completion.
    pub async fn insert_shop_cancellable(
        &self,
        shop: NewShop,
        cancel: &CancellationToken,
    ) -> Result<Id<Shop>> {
        let (shop, areas) = validate(shop)?;
        let mut state = self.lock_for_writing(cancel).await?;
        let record = self.database.auto().insert(shop).await?;
        let id = record.id;
        state.publish(record, areas);
        Ok(id)
    }

    /// Inserts all shops or none of them. Ids are returned in input order.
    pub async fn insert_shops<I>(&self, shops: I) -> Result<Vec<Id<Shop>>>
    where
        I: IntoIterator<Item = NewShop>,
    {
        self.insert_shops_cancellable(shops, &CancellationToken::new())
            .await
    }

    pub async fn insert_shops_cancellable<I>(
        &self,
        shops: I,
        cancel: &CancellationToken,
    ) -> Result<Vec<Id<Shop>>>
    where
        I: IntoIterator<Item = NewShop>,
    {
        let validated = shops
            .into_iter()
            .map(validate)
            .collect::<Result<Vec<_>>>()?;
        let mut state = self.lock_for_writing(cancel).await?;
        let mut tx = self.database.transaction().await?;
        let mut records = Vec::with_capacity(validated.len());
        for (shop, areas) in validated {
            records.push((tx.insert(shop).await?, areas));
        }
        tx.commit().await?;

        let ids = records.iter().map(|(record, _)| record.id).collect();
        for (record, areas) in records {
            state.publish(record, areas);
        }
        Ok(ids)
    }

    /// Replaces name, categories and areas of an existing shop.
    pub async fn update_shop(&self, id: Id<Shop>, shop: NewShop) -> Result<ShopRecord> {
        let (shop, areas) = validate(shop)?;
        let mut state = self.state.write().await;
        let record = self
            .database
            .auto()
            .update(WithId::new(id, shop))
            .await?;
        state.publish(record.clone(), areas);
        Ok(record)
    }

    /// Also removes stored shops which were skipped when opening. Returns the
    /// shop as it was stored.
    pub async fn remove_shop(&self, id: Id<Shop>) -> Result<StoredShop> {
        let mut state = self.state.write().await;
        let stored = self.database.auto().delete(id).await?;
        state.unpublish(id);
        Ok(stored)
    }

    pub async fn get_shop(&self, id: Id<Shop>) -> Result<ShopRecord> {
        self.state
            .read()
            .await
            .shops
            .get(&id)
            .map(|shop| shop.record.clone())
            .ok_or(DirectoryError::NotFound)
    }

    /// All shops, ordered by id.
    pub async fn shops(&self) -> Vec<ShopRecord> {
        self.state
            .read()
            .await
            .shops
            .values()
            .map(|shop| shop.record.clone())
            .collect()
    }

    /// Every shop delivering to the point, once, ordered by id.
    pub async fn shops_delivering_to(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<ShopRecord>> {
        self.shops_delivering_to_cancellable(longitude, latitude, &CancellationToken::new())
            .await
    }

    pub async fn shops_delivering_to_cancellable(
        &self,
        longitude: f64,
        latitude: f64,
        cancel: &CancellationToken,
    ) -> Result<Vec<ShopRecord>> {
        let point = Point::new(longitude, latitude)?;
        let state = self.state.read().await;
        let candidates = state.candidates(&point);
        if cancel.is_cancelled() {
            return Err(DirectoryError::Cancelled);
        }
        Ok(state
            .delivering(to_vector(&point), candidates)
            .map(|shop| shop.record.clone())
            .collect())
    }

    /// The union of the categories of all shops delivering to the point.
    pub async fn categories_available_at(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<BTreeSet<CategoryCode>> {
        self.categories_available_at_cancellable(longitude, latitude, &CancellationToken::new())
            .await
    }

    pub async fn categories_available_at_cancellable(
        &self,
        longitude: f64,
        latitude: f64,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<CategoryCode>> {
        let point = Point::new(longitude, latitude)?;
        let state = self.state.read().await;
        let candidates = state.candidates(&point);
        if cancel.is_cancelled() {
            return Err(DirectoryError::Cancelled);
        }
        let mut categories = BTreeSet::new();
        for shop in state.delivering(to_vector(&point), candidates) {
            categories.extend(shop.record.content.categories.iter().copied());
            if categories.len() == CategoryCode::ALL.len() {
                break;
            }
        }
        Ok(categories)
    }
}

fn to_vector(point: &Point) -> Vector3 {
    Vector3::from_lon_lat(point.longitude(), point.latitude())
}
