//! Album store decorator that feeds the Prometheus metrics.

use super::error::StoreResult;
use super::trait_def::AlbumStore;
use crate::album::{Album, AlbumDraft};
use crate::server::metrics;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Times every call to the wrapped store and keeps the album count gauge
/// current after writes.
pub struct MeteredAlbumStore {
    inner: Arc<dyn AlbumStore>,
}

impl MeteredAlbumStore {
    pub fn new(inner: Arc<dyn AlbumStore>) -> Self {
        Self { inner }
    }

    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        let start = Instant::now();
        let result = fut.await;
        let backend = self.inner.backend_name();
        metrics::record_store_operation(backend, operation, start.elapsed(), result.is_ok());
        if let Err(err) = &result {
            error!("{} store: {} failed: {}", backend, operation, err);
        }
        result
    }

    async fn refresh_count(&self) {
        if let Ok(count) = self.inner.count_albums().await {
            metrics::set_albums_count(count);
        }
    }
}

#[async_trait]
impl AlbumStore for MeteredAlbumStore {
    async fn list_albums(&self) -> StoreResult<Vec<Album>> {
        self.timed("list", self.inner.list_albums()).await
    }

    async fn get_album(&self, id: i64) -> StoreResult<Option<Album>> {
        self.timed("get", self.inner.get_album(id)).await
    }

    async fn create_album(&self, draft: AlbumDraft) -> StoreResult<Album> {
        let album = self.timed("create", self.inner.create_album(draft)).await?;
        self.refresh_count().await;
        Ok(album)
    }

    async fn update_album(&self, id: i64, draft: AlbumDraft) -> StoreResult<Option<Album>> {
        self.timed("update", self.inner.update_album(id, draft)).await
    }

    async fn delete_album(&self, id: i64) -> StoreResult<bool> {
        let deleted = self.timed("delete", self.inner.delete_album(id)).await?;
        if deleted {
            self.refresh_count().await;
        }
        Ok(deleted)
    }

    async fn count_albums(&self) -> StoreResult<usize> {
        self.timed("count", self.inner.count_albums()).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
