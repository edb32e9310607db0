use model::shop::{Shop, ShopRecord, StoredShop};
use shop_directory::database::Result;
use sqlx::{types::Json, Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::shop::ShopRow;

use super::convert_error;

fn category_tokens(shop: &Shop) -> Vec<String> {
    shop.categories
        .iter()
        .map(|code| code.as_str().to_owned())
        .collect()
}

pub async fn get<'c, E>(executor: E, id: Id<Shop>) -> Result<ShopRecord>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, ShopRow>(
        "
        SELECT id, name, categories, areas
        FROM shops
        WHERE id = $1;
        ",
    )
    .bind(id.raw() as i64)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: ShopRow| row.into_record())
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<StoredShop>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, categories, areas
        FROM shops
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<ShopRow>| Ok(rows.into_iter().map(ShopRow::into_stored).collect()))
}

pub async fn insert<'c, E>(executor: E, shop: Shop) -> Result<ShopRecord>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, ShopRow>(
        "
        INSERT INTO shops(
            name,
            categories,
            areas
        )
        VALUES ($1, $2, $3)
        RETURNING id, name, categories, areas;
        ",
    )
    .bind(&shop.name)
    .bind(category_tokens(&shop))
    .bind(Json(&shop.areas))
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: ShopRow| row.into_record())
}

pub async fn update<'c, E>(executor: E, shop: ShopRecord) -> Result<ShopRecord>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, ShopRow>(
        "
        UPDATE shops
        SET name = $1,
            categories = $2,
            areas = $3
        WHERE id = $4
        RETURNING id, name, categories, areas;
        ",
    )
    .bind(&shop.content.name)
    .bind(category_tokens(&shop.content))
    .bind(Json(&shop.content.areas))
    .bind(shop.id.raw() as i64)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: ShopRow| row.into_record())
}

pub async fn delete<'c, E>(executor: E, id: Id<Shop>) -> Result<StoredShop>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, ShopRow>(
        "
        DELETE FROM shops
        WHERE id = $1
        RETURNING id, name, categories, areas;
        ",
    )
    .bind(id.raw() as i64)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: ShopRow| Ok(row.into_stored()))
}
