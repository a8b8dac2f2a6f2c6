//! Shared constants for end-to-end tests
//!
//! When the seeded albums change, update only this file.

// ============================================================================
// Seeded Albums
// ============================================================================

pub const ALBUM_1_ID: &str = "1";
pub const ALBUM_1_TITLE: &str = "Blue Train";
pub const ALBUM_1_ARTIST: &str = "John Coltrane";
pub const ALBUM_1_PRICE: f64 = 56.99;

pub const ALBUM_2_ID: &str = "2";
pub const ALBUM_2_TITLE: &str = "Jeru";
pub const ALBUM_2_ARTIST: &str = "Gerry Mulligan";
pub const ALBUM_2_PRICE: f64 = 17.99;

pub const ALBUM_3_ID: &str = "3";
pub const ALBUM_3_TITLE: &str = "Sarah Vaughan and Clifford Brown";
pub const ALBUM_3_ARTIST: &str = "Sarah Vaughan";
pub const ALBUM_3_PRICE: f64 = 39.99;

pub const SEEDED_ALBUM_COUNT: usize = 3;

/// An id no seeded store ever hands out
pub const MISSING_ALBUM_ID: &str = "9999";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to answer /health
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
