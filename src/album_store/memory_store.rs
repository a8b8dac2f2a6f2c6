//! Unpersisted album store, handy for demos and tests.

use super::error::StoreResult;
use super::trait_def::AlbumStore;
use crate::album::{Album, AlbumDraft};
use async_trait::async_trait;
use std::sync::RwLock;

struct Inner {
    albums: Vec<(i64, Album)>,
    next_id: i64,
}

/// Albums held in a vector behind a lock. Lookups are linear scans.
pub struct InMemoryAlbumStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryAlbumStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAlbumStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                albums: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// A store holding the three demo albums, with ids 1, 2 and 3.
    pub fn seeded() -> Self {
        let store = Self::new();
        for (title, artist, price) in [
            ("Blue Train", "John Coltrane", 56.99),
            ("Jeru", "Gerry Mulligan", 17.99),
            ("Sarah Vaughan and Clifford Brown", "Sarah Vaughan", 39.99),
        ] {
            // Seed values are known to be valid
            if let Ok(draft) = AlbumDraft::new(title, artist, price) {
                store.insert(draft);
            }
        }
        store
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn insert(&self, draft: AlbumDraft) -> Album {
        let mut inner = self.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let album = draft.into_album(id);
        inner.albums.push((id, album.clone()));
        album
    }
}

#[async_trait]
impl AlbumStore for InMemoryAlbumStore {
    async fn list_albums(&self) -> StoreResult<Vec<Album>> {
        Ok(self.read().albums.iter().map(|(_, a)| a.clone()).collect())
    }

    async fn get_album(&self, id: i64) -> StoreResult<Option<Album>> {
        Ok(self
            .read()
            .albums
            .iter()
            .find(|(album_id, _)| *album_id == id)
            .map(|(_, a)| a.clone()))
    }

    async fn create_album(&self, draft: AlbumDraft) -> StoreResult<Album> {
        Ok(self.insert(draft))
    }

    async fn update_album(&self, id: i64, draft: AlbumDraft) -> StoreResult<Option<Album>> {
        let mut inner = self.write();
        let updated = inner
            .albums
            .iter_mut()
            .find(|(album_id, _)| *album_id == id)
            .map(|(_, album)| {
                *album = draft.into_album(id);
                album.clone()
            });
        Ok(updated)
    }

    async fn delete_album(&self, id: i64) -> StoreResult<bool> {
        let mut inner = self.write();
        let before = inner.albums.len();
        inner.albums.retain(|(album_id, _)| *album_id != id);
        Ok(inner.albums.len() < before)
    }

    async fn count_albums(&self) -> StoreResult<usize> {
        Ok(self.read().albums.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
