//! Test fixture creation for album databases

use super::constants::*;
use album_catalog_server::SqliteAlbumStore;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary SQLite albums database holding the three seeded albums.
/// Returns (temp_dir, db_path)
pub fn create_test_album_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("albums.db");

    // Opening the store creates and stamps the schema
    drop(SqliteAlbumStore::new(&db_path)?);

    let conn = Connection::open(&db_path)?;
    for (title, artist, price) in [
        (ALBUM_1_TITLE, ALBUM_1_ARTIST, ALBUM_1_PRICE),
        (ALBUM_2_TITLE, ALBUM_2_ARTIST, ALBUM_2_PRICE),
        (ALBUM_3_TITLE, ALBUM_3_ARTIST, ALBUM_3_PRICE),
    ] {
        conn.execute(
            "INSERT INTO albums (title, artist, price) VALUES (?1, ?2, ?3)",
            params![title, artist, price],
        )?;
    }

    Ok((dir, db_path))
}
