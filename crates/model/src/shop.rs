use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    category::{CategoryCode, UnknownCategory},
    geo::Polygon,
    WithId,
};

/// A shop as it is stored, after its input was validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub categories: Vec<CategoryCode>,
    pub areas: Vec<Polygon>,
}

impl HasId for Shop {
    type IdType = u64;
}

impl Shop {
    pub fn delivery_areas(&self, shop: Id<Shop>) -> impl Iterator<Item = DeliveryArea<'_>> {
        self.areas
            .iter()
            .enumerate()
            .map(move |(index, polygon)| DeliveryArea {
                id: AreaId { shop, index },
                polygon,
            })
    }
}

/// The record layout of a persisted shop: `{ id, name, categories, areas }`.
pub type ShopRecord = WithId<Shop>;

/// A shop as it arrives from outside. Category tokens are kept as strings so
/// unknown tokens can be reported instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewShop {
    pub name: String,
    pub categories: Vec<String>,
    pub areas: Vec<Polygon>,
}

impl NewShop {
    pub fn new<N, C, S>(name: N, categories: C, areas: Vec<Polygon>) -> Self
    where
        N: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
            areas,
        }
    }
}

impl From<Shop> for NewShop {
    fn from(shop: Shop) -> Self {
        Self {
            name: shop.name,
            categories: shop
                .categories
                .iter()
                .map(|code| code.as_str().to_owned())
                .collect(),
            areas: shop.areas,
        }
    }
}

/// A shop as it is read back from storage. Category tokens stay strings
/// until the record is loaded, so a token which is no longer known only
/// affects its own shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredShop {
    pub id: Id<Shop>,
    #[serde(flatten)]
    pub shop: NewShop,
}

impl StoredShop {
    pub fn into_record(self) -> Result<ShopRecord, UnknownCategory> {
        let categories = self
            .shop
            .categories
            .iter()
            .map(|token| token.parse::<CategoryCode>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WithId::new(
            self.id,
            Shop {
                name: self.shop.name,
                categories,
                areas: self.shop.areas,
            },
        ))
    }
}

impl From<ShopRecord> for StoredShop {
    fn from(record: ShopRecord) -> Self {
        Self {
            id: record.id,
            shop: NewShop::from(record.content),
        }
    }
}

/// Identifies one delivery area: the owning shop and the position of the
/// area in the shop's list. Stable as long as the shop is not updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId {
    pub shop: Id<Shop>,
    pub index: usize,
}

/// A polygon owned by one shop, denoting where the shop delivers.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryArea<'a> {
    pub id: AreaId,
    pub polygon: &'a Polygon,
}
