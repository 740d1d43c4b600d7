use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use transport_admin_server::db::{connect, AppState};
use transport_admin_server::storage::{FileStorage, LocalStorage};
use transport_admin_server::AppConfig;

#[derive(Parser)]
#[command(name = "transport-admin-server", about = "Transport and personnel administration service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create the schema and fill empty reference tables with defaults
    InitDb,
    /// Delete stored files older than the configured age
    CleanupFiles {
        /// Storage-relative directory, the whole storage root when omitted
        #[arg(long, default_value = "")]
        dir: String,
        /// Overrides FILE_MAX_AGE_DAYS
        #[arg(long)]
        days: Option<u64>,
    },
}

async fn init_db(config: AppConfig) -> anyhow::Result<()> {
    let pool = connect(&config.database_url)
        .await
        .with_context(|| format!("cannot open {}", config.database_url))?;
    let storage = LocalStorage::new(&config.storage_root);
    storage
        .ensure_layout()
        .context("cannot prepare the storage directory")?;
    let state = AppState::new_with_pool_and_storage(pool, Arc::new(storage), config).await?;

    let seeded = state.seed_defaults().await.context("seeding failed")?;
    if seeded.is_empty() {
        log::info!("Reference tables already filled, nothing to seed");
    } else {
        log::info!("Seeded: {}", seeded.join(", "));
    }
    Ok(())
}

fn cleanup_files(config: &AppConfig, dir: &str, days: Option<u64>) -> anyhow::Result<()> {
    let storage = LocalStorage::new(&config.storage_root);
    let days = days.unwrap_or(config.file_max_age_days);
    let removed = storage
        .cleanup_old_files(dir, days)
        .with_context(|| format!("cannot clean {}", storage.root().display()))?;
    log::info!("Cleanup finished, {} files removed", removed);
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => transport_admin_server::run(config)
            .await
            .context("server stopped with an error"),
        Commands::InitDb => init_db(config).await,
        Commands::CleanupFiles { dir, days } => {
            tokio::task::spawn_blocking(move || cleanup_files(&config, &dir, days))
                .await
                .context("cleanup task failed")?
        }
    }
}
