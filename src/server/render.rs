//! HTML views for htmx clients and browsers.

use crate::album::Album;

const HTMX_SCRIPT: &str = "https://unpkg.com/htmx.org@1.9.12";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn price(value: f64) -> String {
    format!("{:.2}", value)
}

/// One album card. Edit swaps the card for its form, delete swaps the whole list.
pub fn album_fragment(album: &Album) -> String {
    let id = escape(&album.id);
    format!(
        r##"<div class="album" id="album-{id}" hx-target="this" hx-swap="outerHTML">
    <span class="title">{title}</span>
    <span class="artist">{artist}</span>
    <span class="price">${price}</span>
    <button hx-get="/albums/{id}" hx-headers='{{"getReq": "update"}}'>Edit</button>
    <button hx-delete="/albums/{id}" hx-target="#albums" hx-confirm="Delete this album?">Delete</button>
</div>"##,
        id = id,
        title = escape(&album.title),
        artist = escape(&album.artist),
        price = price(album.price),
    )
}

pub fn albums_fragment(albums: &[Album]) -> String {
    let cards: Vec<String> = albums.iter().map(album_fragment).collect();
    format!(
        "<div id=\"albums\" hx-swap=\"outerHTML\">\n{}\n</div>",
        cards.join("\n")
    )
}

pub fn update_form_fragment(album: &Album) -> String {
    let id = escape(&album.id);
    format!(
        r##"<form class="album" id="album-{id}" hx-put="/albums/{id}" hx-target="this" hx-swap="outerHTML">
    <input name="title" value="{title}" required>
    <input name="artist" value="{artist}" required>
    <input name="price" type="number" step="0.01" min="0" value="{price}" required>
    <button type="submit">Save</button>
    <button type="button" hx-get="/albums/{id}" hx-headers='{{"getReq": "cancel"}}'>Cancel</button>
</form>"##,
        id = id,
        title = escape(&album.title),
        artist = escape(&album.artist),
        price = price(album.price),
    )
}

pub fn page(body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Albums</title>
    <script src="{htmx}"></script>
    <style>
        body {{ font-family: sans-serif; margin: 2rem; }}
        .album {{ display: flex; gap: 1rem; align-items: center; padding: 0.4rem 0; }}
        .price {{ font-variant-numeric: tabular-nums; }}
    </style>
</head>
<body>
    <h1>Albums</h1>
    <form hx-post="/albums" hx-target="#albums" hx-swap="beforeend" hx-on::after-request="if (event.detail.successful) this.reset()">
        <input name="title" placeholder="Title" required>
        <input name="artist" placeholder="Artist" required>
        <input name="price" type="number" step="0.01" min="0" placeholder="Price" required>
        <button type="submit">Add album</button>
    </form>
{body}
</body>
</html>"##,
        htmx = HTMX_SCRIPT,
        body = body,
    )
}
