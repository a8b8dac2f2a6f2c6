use anyhow::{Context, Result};
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use axum::{
    extract::{Path, State},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::error::ApiError;
use super::metrics::{metrics_handler, set_albums_count};
use super::negotiate::{AlbumInput, GetIntent, ResponseFormat};
use super::{log_requests, render, state::*, RequestsLoggingLevel, ServerConfig};
use crate::album::{parse_album_id, Album};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub backend: String,
    pub albums: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn album_id(raw: &str) -> Result<i64, ApiError> {
    parse_album_id(raw)?.ok_or_else(ApiError::album_not_found)
}

fn list_response(format: ResponseFormat, albums: Vec<Album>) -> Response {
    match format {
        ResponseFormat::Json => Json(albums).into_response(),
        ResponseFormat::Fragment => Html(render::albums_fragment(&albums)).into_response(),
        ResponseFormat::Page => {
            Html(render::page(&render::albums_fragment(&albums))).into_response()
        }
    }
}

fn album_response(format: ResponseFormat, album: &Album) -> Response {
    if format.is_html() {
        Html(render::album_fragment(album)).into_response()
    } else {
        Json(album).into_response()
    }
}

async fn health(State(state): State<ServerState>) -> Result<Json<ServerStats>, ApiError> {
    let albums = state.album_store.count_albums().await?;
    Ok(Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        backend: state.album_store.backend_name().to_string(),
        albums,
    }))
}

async fn list_albums(
    State(store): State<GuardedAlbumStore>,
    format: ResponseFormat,
) -> Result<Response, ApiError> {
    let albums = store.list_albums().await?;
    Ok(list_response(format, albums))
}

async fn get_album(
    State(store): State<GuardedAlbumStore>,
    Path(id): Path<String>,
    format: ResponseFormat,
    intent: GetIntent,
) -> Result<Response, ApiError> {
    let id = album_id(&id)?;
    let album = store
        .get_album(id)
        .await?
        .ok_or_else(ApiError::album_not_found)?;

    Ok(match intent {
        GetIntent::Update => Html(render::update_form_fragment(&album)).into_response(),
        GetIntent::Cancel => Html(render::album_fragment(&album)).into_response(),
        GetIntent::Show => album_response(format, &album),
    })
}

async fn post_album(
    State(store): State<GuardedAlbumStore>,
    format: ResponseFormat,
    AlbumInput(draft): AlbumInput,
) -> Result<Response, ApiError> {
    let album = store.create_album(draft).await?;
    info!("Created album {} ({})", album.id, album.title);

    Ok(album_response(format, &album))
}

async fn put_album(
    State(store): State<GuardedAlbumStore>,
    Path(id): Path<String>,
    format: ResponseFormat,
    AlbumInput(draft): AlbumInput,
) -> Result<Response, ApiError> {
    let id = album_id(&id)?;
    let album = store
        .update_album(id, draft)
        .await?
        .ok_or_else(ApiError::album_not_found)?;
    Ok(album_response(format, &album))
}

async fn delete_album(
    State(store): State<GuardedAlbumStore>,
    Path(id): Path<String>,
    format: ResponseFormat,
) -> Result<Response, ApiError> {
    let id = album_id(&id)?;
    if !store.delete_album(id).await? {
        return Err(ApiError::album_not_found());
    }
    info!("Deleted album {}", id);

    let albums = store.list_albums().await?;
    Ok(list_response(format, albums))
}

fn album_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_albums).post(post_album))
        .route(
            "/{id}",
            get(get_album).put(put_album).delete(delete_album),
        )
}

/// Builds the full router: album routes at the root and under `/albums`.
pub fn make_app(config: ServerConfig, album_store: GuardedAlbumStore) -> Router {
    let state = ServerState::new(config.clone(), album_store);

    Router::new()
        .route("/health", get(health))
        .merge(album_routes())
        .nest("/albums", album_routes())
        .layer(middleware::from_fn_with_state(config, log_requests))
        .with_state(state)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install terminate handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

async fn run_metrics_server(bind_address: String, port: u16) {
    let address = format!("{}:{}", bind_address, port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Could not bind metrics server to {}: {}", address, err);
            return;
        }
    };
    info!("Metrics available at {}/metrics", address);
    if let Err(err) = axum::serve(listener, make_metrics_app()).await {
        error!("Metrics server stopped: {}", err);
    }
}

pub async fn run_server(
    album_store: GuardedAlbumStore,
    requests_logging_level: RequestsLoggingLevel,
    bind_address: &str,
    port: u16,
    metrics_port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };

    set_albums_count(album_store.count_albums().await?);
    let app = make_app(config, album_store);

    if metrics_port > 0 {
        tokio::spawn(run_metrics_server(bind_address.to_string(), metrics_port));
    }

    let address = format!("{}:{}", bind_address, port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Ready to serve at {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
