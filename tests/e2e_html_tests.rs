//! End-to-end tests for the htmx and browser views

mod common;

use common::{
    TestClient, TestServer, ALBUM_1_ID, ALBUM_1_TITLE, ALBUM_2_ID, ALBUM_2_TITLE, ALBUM_3_TITLE,
};
use reqwest::StatusCode;

fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_htmx_list_returns_fragment() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.list_albums_htmx().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/html"));
    let html = response.text().await.unwrap();
    assert!(html.starts_with("<div id=\"albums\""));
    assert!(!html.contains("<html"));
    assert!(html.contains(ALBUM_1_TITLE));
    assert!(html.contains(ALBUM_3_TITLE));
}

#[tokio::test]
async fn test_browser_gets_full_page() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.list_albums_page().await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("htmx.org"));
    assert!(html.contains("<div id=\"albums\""));
}

#[tokio::test]
async fn test_get_req_update_returns_edit_form() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_album_htmx(ALBUM_2_ID, Some("update")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains(&format!("hx-put=\"/albums/{}\"", ALBUM_2_ID)));
    assert!(html.contains(&format!("value=\"{}\"", ALBUM_2_TITLE)));
}

#[tokio::test]
async fn test_get_req_cancel_returns_album_fragment() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_album_htmx(ALBUM_2_ID, Some("cancel")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(!html.contains("<form"));
    assert!(html.contains(&format!("id=\"album-{}\"", ALBUM_2_ID)));
    assert!(html.contains("$17.99"));
}

#[tokio::test]
async fn test_htmx_create_returns_escaped_fragment() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_album_htmx("<script>alert(1)</script>", "Mallory & co", "3")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("Mallory &amp; co"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("$3.00"));
}

#[tokio::test]
async fn test_htmx_update_returns_album_fragment() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .update_album_htmx(ALBUM_1_ID, ALBUM_1_TITLE, "Coltrane", "50")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Coltrane"));
    assert!(html.contains("$50.00"));
}

#[tokio::test]
async fn test_htmx_delete_returns_remaining_list() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_album_htmx(ALBUM_1_ID).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.starts_with("<div id=\"albums\""));
    assert!(!html.contains(ALBUM_1_TITLE));
    assert!(html.contains(ALBUM_2_TITLE));
}

#[tokio::test]
async fn test_errors_stay_json_for_htmx() {
    let server = TestServer::spawn_in_memory().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_album_htmx("9999", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&response).starts_with("application/json"));
}
