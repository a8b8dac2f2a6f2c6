//! PostgreSQL-backed album store.

use super::error::{StoreError, StoreResult};
use super::trait_def::AlbumStore;
use crate::album::{Album, AlbumDraft};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Connection, PgConnection};
use tracing::{info, warn};

const CREATE_ALBUMS_TABLE: &str = "CREATE TABLE IF NOT EXISTS albums(
    id SERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    price DECIMAL(10,2) NOT NULL
)";

/// Database used to issue `CREATE DATABASE` before the albums database exists.
const MAINTENANCE_DATABASE: &str = "postgres";

type AlbumRow = (i32, String, String, f64);

fn album_from_row((id, title, artist, price): AlbumRow) -> Album {
    Album {
        id: id.to_string(),
        title,
        artist,
        price,
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub struct PostgresAlbumStore {
    pool: PgPool,
}

impl PostgresAlbumStore {
    /// Connects to the albums database and creates the table if missing.
    pub async fn connect(options: PgConnectOptions, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to albums database")?;

        sqlx::query(CREATE_ALBUMS_TABLE)
            .execute(&pool)
            .await
            .context("Failed to create albums table")?;
        info!("Albums table ready");

        Ok(Self { pool })
    }

    /// Issues `CREATE DATABASE` through the maintenance database.
    ///
    /// Failing here is expected when the database already exists, so errors
    /// are only logged.
    pub async fn ensure_database(options: &PgConnectOptions, database: &str) {
        let maintenance_options = options.clone().database(MAINTENANCE_DATABASE);
        let mut conn = match PgConnection::connect_with(&maintenance_options).await {
            Ok(conn) => conn,
            Err(err) => {
                warn!("Could not reach maintenance database: {}", err);
                return;
            }
        };

        let statement = format!("CREATE DATABASE {}", quote_identifier(database));
        match sqlx::raw_sql(&statement).execute(&mut conn).await {
            Ok(_) => info!("Created database {}", database),
            Err(err) => info!("Notice: {}", err),
        }

        if let Err(err) = conn.close().await {
            warn!("Error closing maintenance connection: {}", err);
        }
    }
}

#[async_trait]
impl AlbumStore for PostgresAlbumStore {
    async fn list_albums(&self) -> StoreResult<Vec<Album>> {
        let rows: Vec<AlbumRow> = sqlx::query_as(
            "SELECT id, title, artist, price::float8 FROM albums ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(album_from_row).collect())
    }

    async fn get_album(&self, id: i64) -> StoreResult<Option<Album>> {
        let row: Option<AlbumRow> = sqlx::query_as(
            "SELECT id, title, artist, price::float8 FROM albums WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(album_from_row))
    }

    async fn create_album(&self, draft: AlbumDraft) -> StoreResult<Album> {
        // The price comes back as stored, rounded to the column's two decimals.
        let row: AlbumRow = sqlx::query_as(
            "INSERT INTO albums (title, artist, price) VALUES ($1, $2, $3)
             RETURNING id, title, artist, price::float8",
        )
        .bind(&draft.title)
        .bind(&draft.artist)
        .bind(draft.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(album_from_row(row))
    }

    async fn update_album(&self, id: i64, draft: AlbumDraft) -> StoreResult<Option<Album>> {
        let row: Option<AlbumRow> = sqlx::query_as(
            "UPDATE albums SET title = $1, artist = $2, price = $3 WHERE id = $4
             RETURNING id, title, artist, price::float8",
        )
        .bind(&draft.title)
        .bind(&draft.artist)
        .bind(draft.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(album_from_row))
    }

    async fn delete_album(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_albums(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
            .fetch_one(&self.pool)
            .await?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidRow(format!("negative album count {}", count)))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
