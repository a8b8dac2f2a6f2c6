mod file_config;

pub use file_config::{FileConfig, PostgresConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Postgres,
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub backend: StoreBackend,
    pub db_path: PathBuf,
    pub seed_memory: bool,
    pub bind_address: String,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub connect_retries: u32,
    pub connect_retry_delay_secs: u64,
    pub database_url: Option<String>,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: String,
    pub create_database: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            db_path: PathBuf::from("albums.db"),
            seed_memory: true,
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            connect_retries: 5,
            connect_retry_delay_secs: 5,
            database_url: None,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: None,
            db_password: None,
            db_name: "albums".to_string(),
            create_database: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub create_database: bool,
    pub max_connections: u32,
}

impl PostgresSettings {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).context("Invalid Postgres connection URL");
        }
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database);
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }

    /// Name of the albums database, taken from the URL when one is given.
    pub fn database_name(&self) -> Result<String> {
        let options = self.connect_options()?;
        Ok(options
            .get_database()
            .map(str::to_string)
            .unwrap_or_else(|| self.database.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StoreBackend,
    pub db_path: PathBuf,
    pub seed_memory: bool,
    pub bind_address: String,
    pub port: u16,
    /// 0 disables the metrics listener.
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub connect_retries: u32,
    pub connect_retry_delay: Duration,
    pub postgres: PostgresSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let backend = match file.backend {
            Some(name) => StoreBackend::from_str(&name, true)
                .map_err(|_| anyhow::anyhow!("Unknown store backend: {}", name))?,
            None => cli.backend,
        };

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if backend == StoreBackend::Sqlite && db_path.as_os_str().is_empty() {
            bail!("db_path must not be empty when using the sqlite backend");
        }

        let logging_level = match file.logging_level {
            Some(level) => parse_logging_level(&level)
                .ok_or_else(|| anyhow::anyhow!("Unknown logging level: {}", level))?,
            None => cli.logging_level.clone(),
        };

        let connect_retries = file.connect_retries.unwrap_or(cli.connect_retries);
        if connect_retries == 0 {
            bail!("connect_retries must be at least 1");
        }
        let connect_retry_delay = Duration::from_secs(
            file.connect_retry_delay_secs
                .unwrap_or(cli.connect_retry_delay_secs),
        );

        let pg_file = file.postgres.unwrap_or_default();
        let postgres = PostgresSettings {
            url: pg_file.url.or_else(|| cli.database_url.clone()),
            host: pg_file.host.unwrap_or_else(|| cli.db_host.clone()),
            port: pg_file.port.unwrap_or(cli.db_port),
            user: pg_file.user.or_else(|| cli.db_user.clone()),
            password: pg_file.password.or_else(|| cli.db_password.clone()),
            database: pg_file.database.unwrap_or_else(|| cli.db_name.clone()),
            create_database: pg_file.create_database.unwrap_or(cli.create_database),
            max_connections: pg_file.max_connections.unwrap_or(5),
        };
        if backend == StoreBackend::Postgres {
            postgres.connect_options()?;
        }

        Ok(Self {
            backend,
            db_path,
            seed_memory: file.seed_memory.unwrap_or(cli.seed_memory),
            bind_address: file
                .bind_address
                .unwrap_or_else(|| cli.bind_address.clone()),
            port: file.port.unwrap_or(cli.port),
            metrics_port: file.metrics_port.unwrap_or(cli.metrics_port),
            logging_level,
            connect_retries,
            connect_retry_delay,
            postgres,
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// File read into the process environment before the CLI is parsed.
pub const ENV_FILE: &str = ".env";

/// Loads `KEY=value` lines from `path` into the process environment, so the
/// `DATABASE_URL` and `DB_*` fallbacks can come from a file. Variables that
/// are already set are left alone.
pub fn load_env_file(path: &Path) -> Result<()> {
    dotenvy::from_path(path).with_context(|| format!("Could not load {:?}", path))
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
