//! SQLite-backed album store.

use super::error::{StoreError, StoreResult};
use super::schema::ALBUMS_VERSIONED_SCHEMAS;
use super::trait_def::AlbumStore;
use crate::album::{Album, AlbumDraft};
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::Context;
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

const DEFAULT_READ_POOL_SIZE: usize = 4;

#[derive(Clone)]
pub struct SqliteAlbumStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parse_album_row(row: &rusqlite::Row) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get::<_, i64>(0)?.to_string(),
        title: row.get(1)?,
        artist: row.get(2)?,
        price: row.get(3)?,
    })
}

impl SqliteAlbumStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        Self::with_read_pool_size(db_path, DEFAULT_READ_POOL_SIZE)
    }

    /// Opens (creating if needed) the database at `db_path`.
    ///
    /// Writes go through a single connection; reads are spread round-robin
    /// over `read_pool_size` read-only connections.
    pub fn with_read_pool_size<P: AsRef<Path>>(
        db_path: P,
        read_pool_size: usize,
    ) -> anyhow::Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open albums database at {:?}", db_path))?;

        migrate_if_needed(&mut write_conn, ALBUMS_VERSIONED_SCHEMAS)
            .context("Failed to prepare albums database schema")?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let album_count: i64 =
            write_conn.query_row("SELECT COUNT(*) FROM albums", [], |r| r.get(0))?;
        info!("Opened albums database with {} albums", album_count);

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteAlbumStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn list_sync(&self) -> StoreResult<Vec<Album>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn);
        let mut stmt =
            conn.prepare_cached("SELECT id, title, artist, price FROM albums ORDER BY id")?;
        let albums = stmt
            .query_map([], parse_album_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    fn get_sync(&self, id: i64) -> StoreResult<Option<Album>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn);
        let mut stmt =
            conn.prepare_cached("SELECT id, title, artist, price FROM albums WHERE id = ?1")?;
        match stmt.query_row(params![id], parse_album_row) {
            Ok(album) => Ok(Some(album)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create_sync(&self, draft: AlbumDraft) -> StoreResult<Album> {
        let conn = lock(&self.write_conn);
        let id: i64 = conn.query_row(
            "INSERT INTO albums (title, artist, price) VALUES (?1, ?2, ?3) RETURNING id",
            params![draft.title, draft.artist, draft.price],
            |r| r.get(0),
        )?;
        Ok(draft.into_album(id))
    }

    fn update_sync(&self, id: i64, draft: AlbumDraft) -> StoreResult<Option<Album>> {
        let conn = lock(&self.write_conn);
        let affected = conn.execute(
            "UPDATE albums SET title = ?1, artist = ?2, price = ?3 WHERE id = ?4",
            params![draft.title, draft.artist, draft.price, id],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        Ok(Some(draft.into_album(id)))
    }

    fn delete_sync(&self, id: i64) -> StoreResult<bool> {
        let conn = lock(&self.write_conn);
        let affected = conn.execute("DELETE FROM albums WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    fn count_sync(&self) -> StoreResult<usize> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn);
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM albums", [], |r| r.get(0))?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidRow(format!("negative album count {}", count)))
    }
}

#[async_trait]
impl AlbumStore for SqliteAlbumStore {
    async fn list_albums(&self) -> StoreResult<Vec<Album>> {
        self.list_sync()
    }

    async fn get_album(&self, id: i64) -> StoreResult<Option<Album>> {
        self.get_sync(id)
    }

    async fn create_album(&self, draft: AlbumDraft) -> StoreResult<Album> {
        self.create_sync(draft)
    }

    async fn update_album(&self, id: i64, draft: AlbumDraft) -> StoreResult<Option<Album>> {
        self.update_sync(id, draft)
    }

    async fn delete_album(&self, id: i64) -> StoreResult<bool> {
        self.delete_sync(id)
    }

    async fn count_albums(&self) -> StoreResult<usize> {
        self.count_sync()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
