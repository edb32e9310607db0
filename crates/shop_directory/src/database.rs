use std::{error, fmt, result};

use async_trait::async_trait;
use model::shop::{Shop, ShopRecord, StoredShop};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::NotFound => write!(f, "not found"),
            DatabaseError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DatabaseError::NotFound => None,
            DatabaseError::Other(why) => Some(why.as_ref()),
        }
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Persistent storage of shops. Ids are assigned by the store on insert and
/// never reused.
#[async_trait]
pub trait ShopRepo {
    /// Fails if the stored categories are no longer known.
    async fn get(&mut self, id: Id<Shop>) -> Result<ShopRecord>;

    /// All shops as they were stored, ordered by id.
    async fn get_all(&mut self) -> Result<Vec<StoredShop>>;

    async fn insert(&mut self, shop: Shop) -> Result<ShopRecord>;

    /// Replaces an existing shop. Fails with `NotFound` for unknown ids.
    async fn update(&mut self, shop: ShopRecord) -> Result<ShopRecord>;

    /// Removes a shop and returns what was stored.
    async fn delete(&mut self, id: Id<Shop>) -> Result<StoredShop>;
}

#[async_trait]
pub trait DatabaseTransaction: ShopRepo {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: ShopRepo {}

/// trait to implement a shop store.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
/// A transaction which is dropped without being committed leaves no trace.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
