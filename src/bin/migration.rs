use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use woolchain_api::{config, db, migrator::Migrator};

#[derive(Debug, Parser)]
#[command(name = "migration", about = "Manage the woolchain database schema")]
struct Cli {
    /// Overrides the configured database URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back the most recent migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// Roll back all migrations
    Reset,
    /// Print applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let pool = db::establish_connection_from_app_config(&cfg).await?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            Migrator::up(&pool, steps).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&pool, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Command::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("Schema recreated");
        }
        Command::Reset => {
            Migrator::reset(&pool).await?;
            info!("All migrations rolled back");
        }
        Command::Status => Migrator::status(&pool).await?,
    }

    Ok(())
}
