use axum::extract::FromRef;

use crate::album_store::AlbumStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedAlbumStore = Arc<dyn AlbumStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub album_store: GuardedAlbumStore,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, album_store: GuardedAlbumStore) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            album_store,
            hash: env!("ALBUMS_GIT_HASH").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedAlbumStore {
    fn from_ref(input: &ServerState) -> Self {
        input.album_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
