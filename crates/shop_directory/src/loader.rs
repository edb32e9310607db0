//! Bulk import of shop files.
//!
//! Every `*.json` file in a directory holds an array of shops in the form
//! `{ "name": .., "categories": [..], "areas": [..] }`. Each file is inserted
//! as a whole or not at all.

use std::path::{Path, PathBuf};

use log::{info, warn};
use model::shop::{NewShop, Shop};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use utility::id::Id;

use crate::{database::Database, directory::ShopDirectory, DirectoryError, ErrorKind, Result};

#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Ids of the inserted shops, per imported file.
    pub imported: Vec<(PathBuf, Vec<Id<Shop>>)>,
    /// Files which could not be read, parsed or validated, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl ImportSummary {
    pub fn shop_count(&self) -> usize {
        self.imported.iter().map(|(_, ids)| ids.len()).sum()
    }
}

fn storage_error(why: std::io::Error) -> DirectoryError {
    DirectoryError::Storage(Box::new(why))
}

/// The `*.json` files directly inside `directory`, sorted by name.
async fn shop_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(directory).await.map_err(storage_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(storage_error)? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|kind| kind.is_file())
            .unwrap_or(false);
        if is_file && path.extension().is_some_and(|extension| extension == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn read_shops(path: &Path) -> std::result::Result<Vec<NewShop>, String> {
    let content = fs::read(path).await.map_err(|why| why.to_string())?;
    serde_json::from_slice(&content).map_err(|why| why.to_string())
}

/// Imports every shop file of `directory`. Files which fail to parse or
/// validate are skipped. Storage failures and cancellation abort the import;
/// files imported before stay imported.
pub async fn import_directory<D: Database>(
    shops: &ShopDirectory<D>,
    directory: &Path,
    cancel: &CancellationToken,
) -> Result<ImportSummary> {
    let files = shop_files(directory).await?;
    info!("importing {} files from {}", files.len(), directory.display());

    let mut summary = ImportSummary::default();
    for path in files {
        let new_shops = match read_shops(&path).await {
            Ok(new_shops) => new_shops,
            Err(why) => {
                warn!("skipping {}: {}", path.display(), why);
                summary.skipped.push((path, why));
                continue;
            }
        };
        match shops.insert_shops_cancellable(new_shops, cancel).await {
            Ok(ids) => {
                info!("imported {} shops from {}", ids.len(), path.display());
                summary.imported.push((path, ids));
            }
            Err(why) if matches!(why.kind(), ErrorKind::Storage | ErrorKind::Cancelled) => {
                return Err(why);
            }
            Err(why) => {
                warn!("skipping {}: {}", path.display(), why);
                summary.skipped.push((path, why.to_string()));
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::IndexKind;

    const VALID: &str = r#"[
        {
            "name": "Gangnam Chicken",
            "categories": ["CHICKEN", "NIGHT_SNACK"],
            "areas": [[[[127.0, 37.4], [127.1, 37.4], [127.1, 37.5], [127.0, 37.5], [127.0, 37.4]]]]
        },
        {
            "name": "Gangnam Pizza",
            "categories": ["PIZZA"],
            "areas": [[[[127.05, 37.45], [127.15, 37.45], [127.15, 37.55], [127.05, 37.45]]]]
        }
    ]"#;

    const UNKNOWN_CATEGORY: &str = r#"[
        {
            "name": "Somewhere",
            "categories": ["SUSHI"],
            "areas": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
        }
    ]"#;

    #[tokio::test]
    async fn imports_valid_files_and_skips_broken_ones() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.json"), VALID).unwrap();
        fs::write(directory.path().join("b.json"), UNKNOWN_CATEGORY).unwrap();
        fs::write(directory.path().join("c.json"), "[{").unwrap();
        fs::write(directory.path().join("notes.txt"), "not a shop file").unwrap();

        let shops = ShopDirectory::in_memory(IndexKind::RTree);
        let summary = import_directory(&shops, directory.path(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.shop_count(), 2);
        assert_eq!(
            summary
                .skipped
                .iter()
                .map(|(path, _)| path.file_name().unwrap().to_str().unwrap())
                .collect::<Vec<_>>(),
            vec!["b.json", "c.json"]
        );
        assert!(summary.skipped[0].1.starts_with("INVALID_CATEGORY"));
        assert_eq!(shops.len().await, 2);

        let names = shops
            .shops_delivering_to(127.07, 37.46)
            .await
            .unwrap()
            .into_iter()
            .map(|shop| shop.content.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Gangnam Chicken", "Gangnam Pizza"]);
    }

    #[tokio::test]
    async fn missing_directory_is_a_storage_error() {
        let directory = tempfile::tempdir().unwrap();
        let shops = ShopDirectory::in_memory(IndexKind::RTree);
        let missing = directory.path().join("missing");
        let result = import_directory(&shops, &missing, &CancellationToken::new()).await;
        assert_eq!(result.map(|_| ()).map_err(|why| why.kind()), Err(ErrorKind::Storage));
    }

    #[tokio::test]
    async fn cancelled_import_stops_before_inserting() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.json"), VALID).unwrap();

        let shops = ShopDirectory::in_memory(IndexKind::RTree);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = import_directory(&shops, directory.path(), &cancel).await;
        assert_eq!(result.map(|_| ()).map_err(|why| why.kind()), Err(ErrorKind::Cancelled));
        assert!(shops.is_empty().await);
    }
}
