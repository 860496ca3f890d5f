//! League database admin CLI.
//!
//! Roster files are JSON arrays of player objects; spreadsheet conversion
//! happens in external tooling. Exit code 0 on success, non-zero with a
//! message on stderr otherwise.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::roster_io;

#[derive(Parser)]
#[command(name = "league-admin", about = "League database administration", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the database schema.
    Init {
        /// Path to the sqlite database file.
        #[arg(long)]
        db: PathBuf,
    },
    /// Import a roster JSON file into the database.
    ImportRoster {
        #[arg(long)]
        db: PathBuf,
        /// Roster JSON file (array of player objects).
        #[arg(long)]
        file: PathBuf,
        /// replace: wipe players/roster/contracts first; upsert: merge.
        #[arg(long, default_value = "replace")]
        mode: roster_io::ImportMode,
        /// Accept bare numeric player ids and convert them to P######.
        #[arg(long)]
        allow_legacy_ids: bool,
    },
    /// Export the current roster to a JSON file.
    ExportRoster {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        file: PathBuf,
    },
    /// Run the cross-table integrity validation.
    Validate {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        allow_legacy_ids: bool,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init { db } => {
            let repo = db::LeagueRepo::open(&db).await?;
            repo.init_db().await?;
            tracing::info!(db = %db.display(), "schema initialized");
            println!("OK: initialized {}", db.display());
        }
        Command::ImportRoster {
            db,
            file,
            mode,
            allow_legacy_ids,
        } => {
            let repo = db::LeagueRepo::open(&db).await?;
            repo.init_db().await?;
            let count = roster_io::import_roster(&repo, &file, mode, !allow_legacy_ids)
                .await
                .with_context(|| format!("importing roster from {}", file.display()))?;
            println!("OK: imported {count} roster rows from {}", file.display());
        }
        Command::ExportRoster { db, file } => {
            let repo = db::LeagueRepo::open(&db).await?;
            let count = roster_io::export_roster(&repo, &file)
                .await
                .with_context(|| format!("exporting roster to {}", file.display()))?;
            println!("OK: exported {count} roster rows to {}", file.display());
        }
        Command::Validate {
            db,
            allow_legacy_ids,
        } => {
            let repo = db::LeagueRepo::open(&db).await?;
            repo.validate_integrity(!allow_legacy_ids).await?;
            println!("OK: validation passed for {}", db.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "league_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
