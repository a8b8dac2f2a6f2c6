//! AlbumStore trait definition.

use super::error::StoreResult;
use crate::album::{Album, AlbumDraft};
use async_trait::async_trait;

/// Trait for album storage backends.
///
/// Every method maps to a single statement (or a single pass over a list).
/// Ids are assigned by the backend on insert and never reassigned.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// All albums, ordered by id.
    async fn list_albums(&self) -> StoreResult<Vec<Album>>;

    /// Get an album by id. Returns `Ok(None)` if no such album exists.
    async fn get_album(&self, id: i64) -> StoreResult<Option<Album>>;

    /// Insert a new album and return it with its assigned id.
    async fn create_album(&self, draft: AlbumDraft) -> StoreResult<Album>;

    /// Overwrite the fields of an existing album.
    /// Returns `Ok(None)` if no album was affected.
    async fn update_album(&self, id: i64, draft: AlbumDraft) -> StoreResult<Option<Album>>;

    /// Delete an album. Returns `Ok(false)` if no album was affected.
    async fn delete_album(&self, id: i64) -> StoreResult<bool>;

    async fn count_albums(&self) -> StoreResult<usize>;

    /// Short name of the backend, for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;
}
