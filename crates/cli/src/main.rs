//! `shops` - look up which shops deliver to a point.
//!
//! Shops are kept in PostgreSQL when `DATABASE_*` is set in the environment,
//! otherwise in the JSON file given by `--store` or `SHOP_STORE_PATH`. Without
//! either the directory only lives as long as the command.

use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use database::{DatabaseConnectionInfo, PgDatabase};
use log::{info, warn};
use shop_directory::{
    database::Database, DirectoryConfig, IndexKind, LocalDatabase, ShopDirectory,
};
use tokio_util::sync::CancellationToken;

mod commands;

#[derive(Parser)]
#[command(name = "shops")]
#[command(about = "Find the shops delivering to a point", long_about = None)]
struct Args {
    /// JSON file to keep shops in (overrides SHOP_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Spatial index, rtree or grid (overrides SHOP_INDEX)
    #[arg(long, global = true)]
    index: Option<IndexKind>,

    /// Cell size of the grid index in degrees
    #[arg(long, global = true)]
    grid_degrees: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import every *.json shop file of a directory
    Import { directory: PathBuf },
    /// List the categories available at a point
    Categories {
        #[command(flatten)]
        at: At,
    },
    /// List the shops delivering to a point
    Shops {
        #[command(flatten)]
        at: At,
    },
    /// Print a stored shop as JSON
    Show { id: u64 },
    /// Remove a stored shop
    Remove { id: u64 },
    /// Print the JSON schema of shop files
    Schema,
}

#[derive(clap::Args)]
struct At {
    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
}

type Result<T> = std::result::Result<T, Box<dyn Error>>;

impl Args {
    fn index(&self, config: &DirectoryConfig) -> IndexKind {
        let index = self.index.unwrap_or(config.index);
        match self.grid_degrees {
            Some(degrees) => index.with_grid_degrees(degrees),
            None => index,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match dispatch(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            eprintln!("Error: {}", why);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(args: Args) -> Result<()> {
    if let Command::Schema = args.command {
        return commands::schema();
    }

    let config = DirectoryConfig::from_env()?;
    let index = args.index(&config);

    if let Some(connection_info) = DatabaseConnectionInfo::from_env() {
        let database = PgDatabase::connect(connection_info).await?;
        return run(database, index, args.command).await;
    }

    match args.store.or(config.store_path) {
        Some(path) => {
            info!("keeping shops in {}", path.display());
            run(LocalDatabase::open(path).await?, index, args.command).await
        }
        None => {
            warn!("no store configured, shops are not kept after this command");
            run(LocalDatabase::in_memory(), index, args.command).await
        }
    }
}

async fn run<D: Database>(database: D, index: IndexKind, command: Command) -> Result<()> {
    let directory = ShopDirectory::open(database, index).await?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    match command {
        Command::Import { directory: path } => {
            commands::import(&directory, &path, &cancel).await
        }
        Command::Categories { at } => {
            commands::categories(&directory, at.lon, at.lat, &cancel).await
        }
        Command::Shops { at } => commands::shops(&directory, at.lon, at.lat, &cancel).await,
        Command::Show { id } => commands::show(&directory, id).await,
        Command::Remove { id } => commands::remove(&directory, id).await,
        Command::Schema => commands::schema(),
    }
}
