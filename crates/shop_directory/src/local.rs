//! A store kept in memory, optionally mirrored to a JSON file.
//!
//! The file holds `{ "next_id": .., "shops": [records] }` and is rewritten
//! as a whole on every committed change, through a temporary file which is
//! then renamed over the original.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use log::debug;
use model::{
    shop::{Shop, ShopRecord, StoredShop},
    WithId,
};
use serde::{Deserialize, Serialize};
use tokio::{
    fs,
    sync::{Mutex, OwnedMutexGuard},
};
use utility::id::Id;

use crate::database::{
    Database, DatabaseAutocommit, DatabaseError, DatabaseTransaction, Result, ShopRepo,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Store {
    next_id: u64,
    /// Sorted by id.
    shops: Vec<StoredShop>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            next_id: 1,
            shops: Vec::new(),
        }
    }
}

impl Store {
    fn position(&self, id: Id<Shop>) -> Result<usize> {
        self.shops
            .binary_search_by_key(&id, |record| record.id)
            .map_err(|_| DatabaseError::NotFound)
    }

    fn get(&self, id: Id<Shop>) -> Result<ShopRecord> {
        let index = self.position(id)?;
        self.shops[index]
            .clone()
            .into_record()
            .map_err(DatabaseError::other)
    }

    fn insert(&mut self, shop: Shop) -> ShopRecord {
        let record = WithId::new(Id::new(self.next_id), shop);
        self.next_id += 1;
        self.shops.push(StoredShop::from(record.clone()));
        record
    }

    fn update(&mut self, record: ShopRecord) -> Result<ShopRecord> {
        let index = self.position(record.id)?;
        self.shops[index] = StoredShop::from(record.clone());
        Ok(record)
    }

    fn delete(&mut self, id: Id<Shop>) -> Result<StoredShop> {
        let index = self.position(id)?;
        Ok(self.shops.remove(index))
    }

    /// Restores the ordering and the id counter of a store read from disk.
    fn normalized(mut self) -> Self {
        self.shops.sort_by_key(|record| record.id);
        self.shops.dedup_by_key(|record| record.id);
        if let Some(last) = self.shops.last() {
            self.next_id = self.next_id.max(last.id.raw() + 1);
        }
        self
    }
}

#[derive(Clone)]
pub struct LocalDatabase {
    path: Option<Arc<PathBuf>>,
    store: Arc<Mutex<Store>>,
}

impl LocalDatabase {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            store: Arc::new(Mutex::new(Store::default())),
        }
    }

    /// Opens the store at `path`. A missing file is an empty store, the file
    /// is created on the first change.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let store = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Store>(&bytes)
                .map_err(DatabaseError::other)?
                .normalized(),
            Err(why) if why.kind() == io::ErrorKind::NotFound => Store::default(),
            Err(why) => return Err(DatabaseError::other(why)),
        };
        debug!("opened {} with {} shops", path.display(), store.shops.len());
        Ok(Self {
            path: Some(Arc::new(path)),
            store: Arc::new(Mutex::new(store)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }
}

async fn persist(path: &Path, store: &Store) -> Result<()> {
    let bytes = serde_json::to_vec(store).map_err(DatabaseError::other)?;
    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".tmp");
    fs::write(&temporary, bytes)
        .await
        .map_err(DatabaseError::other)?;
    fs::rename(&temporary, path)
        .await
        .map_err(DatabaseError::other)?;
    debug!("wrote {} shops to {}", store.shops.len(), path.display());
    Ok(())
}

pub struct LocalAutocommit {
    database: LocalDatabase,
}

impl LocalAutocommit {
    /// Applies `change` and persists the result. On failure the store keeps
    /// its previous content.
    async fn write<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Store) -> Result<T> + Send,
        T: Send,
    {
        let mut store = self.database.store.lock().await;
        match self.database.path.as_deref() {
            None => change(&mut store),
            Some(path) => {
                let mut staged = store.clone();
                let result = change(&mut staged)?;
                persist(path, &staged).await?;
                *store = staged;
                Ok(result)
            }
        }
    }
}

impl DatabaseAutocommit for LocalAutocommit {}

#[async_trait]
impl ShopRepo for LocalAutocommit {
    async fn get(&mut self, id: Id<Shop>) -> Result<ShopRecord> {
        self.database.store.lock().await.get(id)
    }

    async fn get_all(&mut self) -> Result<Vec<StoredShop>> {
        Ok(self.database.store.lock().await.shops.clone())
    }

    async fn insert(&mut self, shop: Shop) -> Result<ShopRecord> {
        self.write(|store| Ok(store.insert(shop))).await
    }

    async fn update(&mut self, shop: ShopRecord) -> Result<ShopRecord> {
        self.write(|store| store.update(shop)).await
    }

    async fn delete(&mut self, id: Id<Shop>) -> Result<StoredShop> {
        self.write(|store| store.delete(id)).await
    }
}

/// Holds the store exclusively until committed or dropped. Changes are
/// staged on a copy and only become visible on commit.
pub struct LocalTransaction {
    guard: OwnedMutexGuard<Store>,
    staged: Store,
    path: Option<Arc<PathBuf>>,
}

#[async_trait]
impl DatabaseTransaction for LocalTransaction {
    async fn commit(mut self) -> Result<()> {
        if let Some(path) = self.path.as_deref() {
            persist(path, &self.staged).await?;
        }
        *self.guard = self.staged;
        Ok(())
    }
}

#[async_trait]
impl ShopRepo for LocalTransaction {
    async fn get(&mut self, id: Id<Shop>) -> Result<ShopRecord> {
        self.staged.get(id)
    }

    async fn get_all(&mut self) -> Result<Vec<StoredShop>> {
        Ok(self.staged.shops.clone())
    }

    async fn insert(&mut self, shop: Shop) -> Result<ShopRecord> {
        Ok(self.staged.insert(shop))
    }

    async fn update(&mut self, shop: ShopRecord) -> Result<ShopRecord> {
        self.staged.update(shop)
    }

    async fn delete(&mut self, id: Id<Shop>) -> Result<StoredShop> {
        self.staged.delete(id)
    }
}

#[async_trait]
impl Database for LocalDatabase {
    type Transaction = LocalTransaction;
    type Autocommit = LocalAutocommit;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let guard = self.store.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(LocalTransaction {
            guard,
            staged,
            path: self.path.clone(),
        })
    }

    fn auto(&self) -> Self::Autocommit {
        LocalAutocommit {
            database: self.clone(),
        }
    }
}
