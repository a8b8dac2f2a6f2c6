//! Opening the configured album store, retrying while the backend comes up.

use anyhow::{Context, Result};
use rusqlite::ErrorCode;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::album_store::{
    AlbumStore, InMemoryAlbumStore, MeteredAlbumStore, PostgresAlbumStore, SqliteAlbumStore,
};
use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ConnectRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl ConnectRetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.connect_retries.max(1),
            delay: config.connect_retry_delay,
        }
    }
}

/// Runs `op` until it succeeds or the policy runs out of attempts, sleeping a
/// fixed delay in between. The last error is returned.
pub async fn connect_with_retry<T, F, Fut>(
    policy: ConnectRetryPolicy,
    what: &str,
    op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    connect_with_retry_when(policy, what, op, |_| true).await
}

/// Like [`connect_with_retry`], but gives up at once on errors for which
/// `is_transient` is false.
pub async fn connect_with_retry_when<T, F, Fut, P>(
    policy: ConnectRetryPolicy,
    what: &str,
    mut op: F,
    is_transient: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&anyhow::Error) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_transient(&err) => {
                return Err(err).with_context(|| format!("Failed to open {}", what));
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    "Failed to connect to {}, attempt {}/{}: {:#}",
                    what, attempt, max_attempts, err
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(
                    "Failed to connect to {}, attempt {}/{}: {:#}",
                    what, attempt, max_attempts, err
                );
                return Err(err).with_context(|| {
                    format!("Failed to connect to {} after {} attempts", what, attempt)
                });
            }
        }
    }
}

/// Busy, locked or unopenable files may clear up; schema problems will not.
fn is_transient_sqlite_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(failure, _))
                if matches!(
                    failure.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
                )
        )
    })
}

async fn open_backend(config: &AppConfig) -> Result<Arc<dyn AlbumStore>> {
    let policy = ConnectRetryPolicy::from_config(config);

    match config.backend {
        StoreBackend::Memory => {
            let store = if config.seed_memory {
                InMemoryAlbumStore::seeded()
            } else {
                InMemoryAlbumStore::new()
            };
            info!("Using in-memory album store");
            Ok(Arc::new(store))
        }
        StoreBackend::Sqlite => {
            info!("Opening SQLite albums database at {:?}...", config.db_path);
            let path = config.db_path.clone();
            let store = connect_with_retry_when(
                policy,
                "sqlite database",
                || {
                    let path = path.clone();
                    async move { SqliteAlbumStore::new(path) }
                },
                is_transient_sqlite_error,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let settings = &config.postgres;
            let options = settings.connect_options()?;
            if settings.create_database {
                let database = settings.database_name()?;
                PostgresAlbumStore::ensure_database(&options, &database).await;
            }
            info!("Connecting to Postgres...");
            let store = connect_with_retry(policy, "database", || {
                PostgresAlbumStore::connect(options.clone(), settings.max_connections)
            })
            .await?;
            Ok(Arc::new(store))
        }
    }
}

/// Opens the backend named by `config`, wrapped so its calls are metered.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn AlbumStore>> {
    let store = open_backend(config).await?;
    Ok(Arc::new(MeteredAlbumStore::new(store)))
}
