//! Request-side helpers: picking the response format and reading album bodies.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    Form, Json,
};
use serde::Deserialize;
use std::convert::Infallible;

use super::error::ApiError;
use crate::album::AlbumDraft;

const HX_REQUEST: &str = "hx-request";
const GET_REQ: &str = "getreq";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// htmx swap target, no page chrome.
    Fragment,
    Page,
    Json,
}

impl ResponseFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_htmx = headers
            .get(HX_REQUEST)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if is_htmx {
            return ResponseFormat::Fragment;
        }

        let wants_html = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/html"));
        if wants_html {
            ResponseFormat::Page
        } else {
            ResponseFormat::Json
        }
    }

    pub fn is_html(self) -> bool {
        self != ResponseFormat::Json
    }
}

impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ResponseFormat::from_headers(&parts.headers))
    }
}

/// What an htmx client asks `GET /{id}` to render, from the `getReq` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetIntent {
    Show,
    Update,
    Cancel,
}

impl GetIntent {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(GET_REQ).and_then(|v| v.to_str().ok()) {
            Some(v) if v.eq_ignore_ascii_case("update") => GetIntent::Update,
            Some(v) if v.eq_ignore_ascii_case("cancel") => GetIntent::Cancel,
            _ => GetIntent::Show,
        }
    }
}

impl<S> FromRequestParts<S> for GetIntent
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(GetIntent::from_headers(&parts.headers))
    }
}

#[derive(Deserialize, Debug)]
struct JsonAlbumBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    price: Option<f64>,
}

/// Form fields in arrival order. A repeated field keeps its first value.
struct FormFields(Vec<(String, String)>);

impl FormFields {
    fn first(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

/// A validated album body, read as JSON or as a url-encoded form.
#[derive(Debug)]
pub struct AlbumInput(pub AlbumDraft);

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

impl<S> FromRequest<S> for AlbumInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(req.headers()) {
            let Json(body) = Json::<JsonAlbumBody>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            // An absent price fails validation after title and artist are checked.
            let price = body.price.unwrap_or(f64::NAN);
            return Ok(AlbumInput(AlbumDraft::new(body.title, body.artist, price)?));
        }

        // Whatever else arrives is treated as a url-encoded form.
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        let fields = FormFields(pairs);
        Ok(AlbumInput(AlbumDraft::parse(
            fields.first("title"),
            fields.first("artist"),
            fields.first("price"),
        )?))
    }
}
