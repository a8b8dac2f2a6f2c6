//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all album endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client for the album routes
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Route prefix, either "" or "/albums"
    prefix: &'static str,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            prefix: "",
        }
    }

    /// A client that goes through the `/albums` mount instead of the root one
    pub fn with_albums_prefix(base_url: String) -> Self {
        Self {
            prefix: "/albums",
            ..Self::new(base_url)
        }
    }

    fn collection_url(&self) -> String {
        if self.prefix.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}{}", self.base_url, self.prefix)
        }
    }

    fn album_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, self.prefix, id)
    }

    // ========================================================================
    // JSON
    // ========================================================================

    /// GET /
    pub async fn list_albums(&self) -> Response {
        self.client
            .get(self.collection_url())
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /{id}
    pub async fn get_album(&self, id: &str) -> Response {
        self.client
            .get(self.album_url(id))
            .send()
            .await
            .expect("Get request failed")
    }

    /// POST / with a url-encoded form body
    pub async fn create_album_form(&self, title: &str, artist: &str, price: &str) -> Response {
        self.client
            .post(self.collection_url())
            .form(&[("title", title), ("artist", artist), ("price", price)])
            .send()
            .await
            .expect("Create request failed")
    }

    /// POST / with a JSON body
    pub async fn create_album_json(&self, title: &str, artist: &str, price: f64) -> Response {
        self.client
            .post(self.collection_url())
            .json(&json!({ "title": title, "artist": artist, "price": price }))
            .send()
            .await
            .expect("Create request failed")
    }

    /// PUT /{id} with a url-encoded form body
    pub async fn update_album(&self, id: &str, title: &str, artist: &str, price: &str) -> Response {
        self.client
            .put(self.album_url(id))
            .form(&[("title", title), ("artist", artist), ("price", price)])
            .send()
            .await
            .expect("Update request failed")
    }

    /// DELETE /{id}
    pub async fn delete_album(&self, id: &str) -> Response {
        self.client
            .delete(self.album_url(id))
            .send()
            .await
            .expect("Delete request failed")
    }

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // HTML
    // ========================================================================

    /// GET / as htmx would issue it
    pub async fn list_albums_htmx(&self) -> Response {
        self.client
            .get(self.collection_url())
            .header("HX-Request", "true")
            .send()
            .await
            .expect("List request failed")
    }

    /// GET / as a browser would issue it
    pub async fn list_albums_page(&self) -> Response {
        self.client
            .get(self.collection_url())
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /{id} as htmx, with an optional `getReq` header
    pub async fn get_album_htmx(&self, id: &str, get_req: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(self.album_url(id))
            .header("HX-Request", "true");
        if let Some(value) = get_req {
            request = request.header("getReq", value);
        }
        request.send().await.expect("Get request failed")
    }

    /// POST / as htmx
    pub async fn create_album_htmx(&self, title: &str, artist: &str, price: &str) -> Response {
        self.client
            .post(self.collection_url())
            .header("HX-Request", "true")
            .form(&[("title", title), ("artist", artist), ("price", price)])
            .send()
            .await
            .expect("Create request failed")
    }

    /// PUT /{id} as htmx
    pub async fn update_album_htmx(
        &self,
        id: &str,
        title: &str,
        artist: &str,
        price: &str,
    ) -> Response {
        self.client
            .put(self.album_url(id))
            .header("HX-Request", "true")
            .form(&[("title", title), ("artist", artist), ("price", price)])
            .send()
            .await
            .expect("Update request failed")
    }

    /// DELETE /{id} as htmx
    pub async fn delete_album_htmx(&self, id: &str) -> Response {
        self.client
            .delete(self.album_url(id))
            .header("HX-Request", "true")
            .send()
            .await
            .expect("Delete request failed")
    }
}
