use anyhow::Result;
use clap::{ArgAction, Parser};
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use album_catalog_server::config::{self, StoreBackend};
use album_catalog_server::server::{metrics, run_server, RequestsLoggingLevel};
use album_catalog_server::startup::open_store;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Where albums are stored.
    #[clap(long, value_enum, default_value_t = StoreBackend::Sqlite)]
    pub backend: StoreBackend,

    /// Path to the SQLite albums database file.
    #[clap(long, value_parser = parse_path, default_value = "albums.db")]
    pub db_path: PathBuf,

    /// Start the memory backend with the three demo albums.
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub seed_memory: bool,

    /// The address to bind to.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping). 0 disables it.
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// How many times to try reaching the store at startup.
    #[clap(long, default_value_t = 5)]
    pub connect_retries: u32,

    /// Seconds to wait between connection attempts.
    #[clap(long, default_value_t = 5)]
    pub connect_retry_delay_secs: u64,

    /// Postgres connection URL. Takes precedence over the individual DB_* settings.
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[clap(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[clap(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[clap(long, env = "DB_USER")]
    pub db_user: Option<String>,

    #[clap(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    #[clap(long, env = "DB_NAME", default_value = "albums")]
    pub db_name: String,

    /// Issue CREATE DATABASE for the Postgres database before connecting.
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub create_database: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            backend: args.backend,
            db_path: args.db_path.clone(),
            seed_memory: args.seed_memory,
            bind_address: args.bind_address.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            connect_retries: args.connect_retries,
            connect_retry_delay_secs: args.connect_retry_delay_secs,
            database_url: args.database_url.clone(),
            db_host: args.db_host.clone(),
            db_port: args.db_port,
            db_user: args.db_user.clone(),
            db_password: args.db_password.clone(),
            db_name: args.db_name.clone(),
            create_database: args.create_database,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing, so env-backed args can come from the file.
    let env_file = config::load_env_file(Path::new(config::ENV_FILE));
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    if let Err(err) = env_file {
        warn!("{:#}", err);
    }

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!(
        "Album catalog server {} ({} build)",
        env!("ALBUMS_GIT_HASH"),
        env!("ALBUMS_BUILD_PROFILE")
    );
    info!("Configuration loaded:");
    info!("  backend: {}", app_config.backend);
    if app_config.backend == StoreBackend::Sqlite {
        info!("  db_path: {:?}", app_config.db_path);
    }
    info!("  listen: {}", app_config.listen_address());
    info!("  logging_level: {}", app_config.logging_level);

    info!("Initializing metrics...");
    metrics::init_metrics();

    let album_store = open_store(&app_config).await?;

    run_server(
        album_store,
        app_config.logging_level,
        &app_config.bind_address,
        app_config.port,
        app_config.metrics_port,
    )
    .await
}
