//! Album Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod album;
pub mod album_store;
pub mod config;
pub mod server;
pub mod sqlite_persistence;
pub mod startup;

// Re-export commonly used types for convenience
pub use album::{Album, AlbumDraft};
pub use album_store::{AlbumStore, InMemoryAlbumStore, SqliteAlbumStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
