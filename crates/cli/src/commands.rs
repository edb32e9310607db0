use std::path::Path;

use itertools::Itertools;
use log::info;
use model::shop::{NewShop, ShopRecord};
use shop_directory::{database::Database, loader, ShopDirectory};
use tokio_util::sync::CancellationToken;
use utility::id::Id;

use crate::Result;

/// One line per shop: id, name and categories, tab separated.
fn shop_line(shop: &ShopRecord) -> String {
    format!(
        "{}\t{}\t{}",
        shop.id,
        shop.content.name,
        shop.content.categories.iter().join(",")
    )
}

pub async fn import<D: Database>(
    directory: &ShopDirectory<D>,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    let summary = loader::import_directory(directory, path, cancel).await?;
    for (file, ids) in &summary.imported {
        println!("{}\timported {}", file.display(), ids.iter().join(","));
    }
    for (file, why) in &summary.skipped {
        println!("{}\tskipped: {}", file.display(), why);
    }
    info!(
        "imported {} shops from {} files, skipped {} files",
        summary.shop_count(),
        summary.imported.len(),
        summary.skipped.len()
    );
    Ok(())
}

pub async fn categories<D: Database>(
    directory: &ShopDirectory<D>,
    longitude: f64,
    latitude: f64,
    cancel: &CancellationToken,
) -> Result<()> {
    let categories = directory
        .categories_available_at_cancellable(longitude, latitude, cancel)
        .await?;
    for category in categories {
        println!("{}", category);
    }
    Ok(())
}

pub async fn shops<D: Database>(
    directory: &ShopDirectory<D>,
    longitude: f64,
    latitude: f64,
    cancel: &CancellationToken,
) -> Result<()> {
    let shops = directory
        .shops_delivering_to_cancellable(longitude, latitude, cancel)
        .await?;
    for shop in &shops {
        println!("{}", shop_line(shop));
    }
    Ok(())
}

pub async fn show<D: Database>(directory: &ShopDirectory<D>, id: u64) -> Result<()> {
    let shop = directory.get_shop(Id::new(id)).await?;
    println!("{}", serde_json::to_string_pretty(&shop)?);
    Ok(())
}

pub async fn remove<D: Database>(directory: &ShopDirectory<D>, id: u64) -> Result<()> {
    let shop = directory.remove_shop(Id::new(id)).await?;
    println!(
        "removed {}\t{}\t{}",
        shop.id,
        shop.shop.name,
        shop.shop.categories.join(",")
    );
    Ok(())
}

/// Shop files hold an array of shops.
pub fn schema() -> Result<()> {
    let schema = schemars::schema_for!(Vec<NewShop>);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
