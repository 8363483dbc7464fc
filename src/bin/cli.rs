//! faculty-sync CLI
//!
//! Entry point for scheduled runs and manual inspection.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use faculty_sync::{
    error::Result,
    models::Config,
    pipeline::{self, ChangeLogWriter, IngestOptions, Ingestor},
    source::CmsSource,
    storage::{LocalAuditLog, SqliteStorage},
};

/// faculty-sync - Faculty Roster Synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "faculty-sync",
    version,
    about = "Synchronizes the faculty roster from the campus CMS"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Override the SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Override the audit log directory
    #[arg(long)]
    audit_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the roster, record the change log and replace the stored roster
    Sync {
        /// Stop after computing the diff; write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show recorded change logs, newest first
    History {
        /// Page number (starting at 1)
        #[arg(long)]
        page: Option<i64>,

        /// Entries per page (1-100)
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Validate the configuration file
    Validate,

    /// Show stored roster and latest change log
    Info,
}

/// Initialize logging from the verbosity flag or configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::load(&cli.config);
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let result = match config {
        Ok(mut config) => {
            if let Some(path) = cli.database {
                config.paths.database = path;
            }
            if let Some(path) = cli.audit_dir {
                config.paths.audit_dir = path;
            }
            run(cli.command, config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Sync { dry_run } => {
            config.validate()?;

            let db = Arc::new(SqliteStorage::open(&config.paths.database).await?);
            let audit = Arc::new(LocalAuditLog::new(&config.paths.audit_dir));
            let source = Arc::new(CmsSource::from_config(&config.source)?);
            let writer = ChangeLogWriter::new(db.clone(), audit);

            let result = Ingestor::new(source, db.clone(), writer, config.safety)
                .with_options(IngestOptions { dry_run })
                .run()
                .await;
            db.close().await;
            let report = result?;

            if report.committed {
                log::info!("Sync complete: {}", report.entry.summary());
            } else {
                log::info!("Dry run complete: {}", report.entry.summary());
            }
            if !report.updated_ids.is_empty() {
                log::debug!("Updated employee ids: {:?}", report.updated_ids);
            }
            if let Some(path) = report.audit_path {
                log::info!("Audit log: {}", path.display());
            }
        }

        Command::History { page, limit } => {
            let db = SqliteStorage::open(&config.paths.database).await?;
            let page = pipeline::load_history(&db, page, limit).await?;
            for line in pipeline::render_page(&page) {
                println!("{line}");
            }
            db.close().await;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Source: {}", config.source.url);
            log::info!(
                "✓ Safety: at least {} records, at most {}% change",
                config.safety.min_roster_size,
                config.safety.max_change_percent
            );
            log::info!("✓ Database: {}", config.paths.database.display());
            log::info!("✓ Audit directory: {}", config.paths.audit_dir.display());

            match config.source.token() {
                Ok(_) => log::info!("✓ {} is set", config.source.token_env),
                Err(e) => log::warn!("{}", e),
            }
        }

        Command::Info => {
            let db = SqliteStorage::open(&config.paths.database).await?;
            let audit = LocalAuditLog::new(&config.paths.audit_dir);

            log::info!("Database: {}", config.paths.database.display());
            log::info!("Stored faculty records: {}", db.faculty_count().await?);

            match db.latest_change_log().await? {
                Some(entry) => {
                    log::info!("Last sync: {}", pipeline::history::format_entry(&entry));
                    if audit.load_entry(&entry.timestamp).await?.is_none() {
                        log::warn!("No audit file found for the last sync");
                    }
                }
                None => log::info!("No sync recorded yet."),
            }

            log::info!(
                "Audit files in {}: {}",
                audit.root().display(),
                audit.list_files().await?.len()
            );
            db.close().await;
        }
    }

    Ok(())
}
