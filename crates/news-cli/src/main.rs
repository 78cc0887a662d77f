use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use news_db::{Database, DatabaseConfig};
use news_server::ServerConfig;
use news_server::config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "news-api", version, about = "News Today category API")]
struct Cli {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    /// Validate every response against its schema and log the effective configuration
    #[arg(long, env = "DEBUG", global = true)]
    debug: bool,

    #[command(flatten)]
    database: DatabaseArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct DatabaseArgs {
    /// PostgreSQL connection string (falls back to DATABASE_URL)
    #[arg(long, env = "DATABASE_DSN", global = true, hide_env_values = true)]
    database_dsn: Option<String>,

    /// Maximum number of pooled connections
    #[arg(
        long,
        env = "DATABASE_MAX_CONNECTIONS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..),
        global = true
    )]
    database_max_connections: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Http {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Largest accepted request body, in bytes
        #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,

        /// Apply the embedded migrations before serving
        #[arg(long, env = "MIGRATE_ON_START")]
        migrate: bool,
    },

    /// Apply database migrations
    Migrate {
        /// Directory of `<version>_<name>.up.sql` / `.down.sql` files (embedded set when omitted)
        #[arg(short, long, env = "MIGRATION_DIR")]
        dir: Option<PathBuf>,

        /// Version to migrate to; newer applied migrations are reverted (latest when omitted)
        #[arg(short = 'v', long, env = "DATABASE_VERSION")]
        target_version: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json)?;

    let db_config = database_config(&cli.database)?;

    match cli.command {
        Commands::Http {
            port,
            max_body_bytes,
            migrate,
        } => {
            let server_config = ServerConfig {
                port,
                debug: cli.debug,
                max_body_bytes,
            };
            if cli.debug {
                tracing::debug!(
                    ?server_config,
                    max_connections = db_config.max_connections,
                    migrate,
                    "Effective configuration"
                );
            }
            cmd_http(&db_config, server_config, migrate).await?;
        }
        Commands::Migrate {
            dir,
            target_version,
        } => {
            if cli.debug {
                tracing::debug!(
                    dir = ?dir,
                    target_version = ?target_version,
                    max_connections = db_config.max_connections,
                    "Effective configuration"
                );
            }
            cmd_migrate(&db_config, dir.as_deref(), target_version).await?;
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `--log-level` when set.
fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{level}'"))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn database_config(args: &DatabaseArgs) -> Result<DatabaseConfig> {
    match &args.database_dsn {
        Some(url) => Ok(DatabaseConfig {
            url: url.clone(),
            max_connections: args.database_max_connections,
        }),
        None => DatabaseConfig::from_env()
            .context("No database configured. Set DATABASE_DSN or pass --database-dsn."),
    }
}

async fn connect_db(config: &DatabaseConfig) -> Result<Database> {
    Database::connect(config)
        .await
        .context("Failed to connect to database")
}

async fn cmd_http(db_config: &DatabaseConfig, config: ServerConfig, migrate: bool) -> Result<()> {
    let db = connect_db(db_config).await?;
    if migrate {
        db.migrate().await.context("Failed to apply migrations")?;
        tracing::info!("Embedded migrations applied");
    }

    news_server::serve(db.category_repo(), config).await
}

async fn cmd_migrate(
    db_config: &DatabaseConfig,
    dir: Option<&Path>,
    target_version: Option<i64>,
) -> Result<()> {
    if dir.is_some_and(|dir| dir.as_os_str().is_empty()) {
        bail!("Migration directory must not be empty");
    }

    let db = connect_db(db_config).await?;
    db.migrate_to(dir, target_version)
        .await
        .context("Failed to apply migrations")?;

    match target_version {
        Some(version) => tracing::info!(version, "Database migrated"),
        None => tracing::info!("Database migrated to the latest version"),
    }
    Ok(())
}
