mod error;
mod memory_store;
mod metered;
mod postgres_store;
mod schema;
mod sqlite_store;
mod trait_def;

pub use error::{StoreError, StoreResult};
pub use memory_store::InMemoryAlbumStore;
pub use metered::MeteredAlbumStore;
pub use postgres_store::PostgresAlbumStore;
pub use schema::ALBUMS_VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteAlbumStore;
pub use trait_def::AlbumStore;
