//! SQLite schema for the albums database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const ALBUMS_TABLE_V0: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("price", &SqlType::Real, non_null = true),
    ],
    indices: &[],
};

const ALBUMS_TABLE_V1: Table = Table {
    name: "albums",
    columns: ALBUMS_TABLE_V0.columns,
    indices: &[("idx_albums_artist", "artist")],
};

fn migrate_v0_to_v1(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute("CREATE INDEX idx_albums_artist ON albums(artist);", [])?;
    Ok(())
}

pub const ALBUMS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[ALBUMS_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[ALBUMS_TABLE_V1],
        migration: Some(migrate_v0_to_v1),
    },
];
