use async_trait::async_trait;
use model::{
    geo::Polygon,
    shop::{NewShop, Shop, ShopRecord, StoredShop},
};
use shop_directory::database::{DatabaseError, Result, ShopRepo};
use sqlx::{prelude::FromRow, types::Json};
use utility::id::Id;

use crate::queries::shop::{delete, get, get_all, insert, update};
use crate::PgDatabaseAutocommit;
use crate::PgDatabaseTransaction;

#[derive(Debug, Clone, FromRow)]
pub struct ShopRow {
    pub id: i64,
    pub name: String,
    pub categories: Vec<String>,
    pub areas: Json<Vec<Polygon>>,
}

impl ShopRow {
    pub fn into_stored(self) -> StoredShop {
        StoredShop {
            id: Id::new(self.id as u64),
            shop: NewShop {
                name: self.name,
                categories: self.categories,
                areas: self.areas.0,
            },
        }
    }

    /// Fails for category tokens which are no longer known.
    pub fn into_record(self) -> Result<ShopRecord> {
        self.into_stored()
            .into_record()
            .map_err(DatabaseError::other)
    }
}

#[async_trait]
impl ShopRepo for PgDatabaseAutocommit {
    async fn get(&mut self, id: Id<Shop>) -> Result<ShopRecord> {
        get(&self.pool, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<StoredShop>> {
        get_all(&self.pool).await
    }

    async fn insert(&mut self, shop: Shop) -> Result<ShopRecord> {
        insert(&self.pool, shop).await
    }

    async fn update(&mut self, shop: ShopRecord) -> Result<ShopRecord> {
        update(&self.pool, shop).await
    }

    async fn delete(&mut self, id: Id<Shop>) -> Result<StoredShop> {
        delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> ShopRepo for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: Id<Shop>) -> Result<ShopRecord> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<StoredShop>> {
        get_all(&mut *self.tx).await
    }

    async fn insert(&mut self, shop: Shop) -> Result<ShopRecord> {
        insert(&mut *self.tx, shop).await
    }

    async fn update(&mut self, shop: ShopRecord) -> Result<ShopRecord> {
        update(&mut *self.tx, shop).await
    }

    async fn delete(&mut self, id: Id<Shop>) -> Result<StoredShop> {
        delete(&mut *self.tx, id).await
    }
}
