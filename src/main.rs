use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use catalog_backoffice::db::Database;
use catalog_backoffice::import::{self, ImportOptions};

/// Bulk spreadsheet import for the catalog database.
#[derive(Parser)]
#[command(name = "catalog-import", version, about)]
struct Cli {
    /// Directory containing the CSV source files
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Directory containing product photos
    #[arg(long = "images-path", default_value = ".")]
    images_path: PathBuf,

    /// SQLite database file
    #[arg(long, default_value = "catalog.db")]
    database: PathBuf,

    /// Managed media root; photos land under <media-root>/products/
    #[arg(long = "media-root", default_value = "media")]
    media_root: PathBuf,

    /// Print the run summary as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let db = Database::open(&cli.database)
        .with_context(|| format!("failed to open database {}", cli.database.display()))?;
    db.initialize().context("failed to initialize schema")?;

    let opts = ImportOptions {
        source_dir: cli.path,
        images_dir: cli.images_path,
        media_root: cli.media_root,
    };

    if cli.json {
        let summary = import::run(&db, &opts).context("import failed")?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== Импорт данных ===");
    let summary = import::run(&db, &opts).context("import failed")?;

    println!("  Пункты выдачи: {}", summary.delivery_points);
    println!("  Товары: {}", summary.products);
    println!("  Пользователи: {}", summary.users);
    println!("  Заказы: {}", summary.orders);
    for warning in &summary.warnings {
        println!("  ⚠ {}", warning);
    }
    println!("Импорт завершён!");

    Ok(())
}
