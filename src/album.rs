//! The album record and the validated input used to create or update one.

use serde::{Deserialize, Serialize};

/// A catalog entry.
///
/// The id is a decimal integer in storage but travels as a string, so clients
/// never have to care about its width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("artist is required")]
    MissingArtist,
    #[error("Invalid price")]
    InvalidPrice,
    #[error("invalid album id")]
    InvalidId,
}

/// Prices are stored as `DECIMAL(10,2)` on Postgres, so they stay below this.
pub const MAX_PRICE: f64 = 100_000_000.0;

/// Album fields that passed validation, ready to be written to a store.
#[derive(Clone, Debug, PartialEq)]
pub struct AlbumDraft {
    pub title: String,
    pub artist: String,
    pub price: f64,
}

impl AlbumDraft {
    /// Builds a draft from an already numeric price.
    ///
    /// Fields are checked in order title, artist, price; the first failure wins.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        price: f64,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let artist = artist.into();
        if title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if artist.trim().is_empty() {
            return Err(ValidationError::MissingArtist);
        }
        if !price.is_finite() || price < 0.0 || price >= MAX_PRICE {
            return Err(ValidationError::InvalidPrice);
        }
        Ok(Self {
            title,
            artist,
            price,
        })
    }

    /// Builds a draft from form text fields.
    pub fn parse(title: &str, artist: &str, price: &str) -> Result<Self, ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if artist.trim().is_empty() {
            return Err(ValidationError::MissingArtist);
        }
        let price = price
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidPrice)?;
        Self::new(title, artist, price)
    }

    pub fn into_album(self, id: i64) -> Album {
        Album {
            id: id.to_string(),
            title: self.title,
            artist: self.artist,
            price: self.price,
        }
    }
}

/// Parses a path id.
///
/// Anything but decimal digits is an `InvalidId`. Digits that cannot name a
/// row (zero, or too wide for an `i64`) give `Ok(None)`.
pub fn parse_album_id(raw: &str) -> Result<Option<i64>, ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidId);
    }
    Ok(raw.parse::<i64>().ok().filter(|id| *id > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_fields() {
        let draft = AlbumDraft::parse("Blue Train", "John Coltrane", "56.99").unwrap();
        assert_eq!(draft.title, "Blue Train");
        assert_eq!(draft.artist, "John Coltrane");
        assert_eq!(draft.price, 56.99);
    }

    #[test]
    fn parse_checks_title_before_artist_and_price() {
        assert_eq!(
            AlbumDraft::parse("", "", "nope"),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            AlbumDraft::parse("Jeru", "  ", "nope"),
            Err(ValidationError::MissingArtist)
        );
        assert_eq!(
            AlbumDraft::parse("Jeru", "Gerry Mulligan", "nope"),
            Err(ValidationError::InvalidPrice)
        );
    }

    #[test]
    fn negative_and_non_finite_prices_are_rejected() {
        assert_eq!(
            AlbumDraft::parse("Jeru", "Gerry Mulligan", "-1"),
            Err(ValidationError::InvalidPrice)
        );
        assert_eq!(
            AlbumDraft::parse("Jeru", "Gerry Mulligan", "NaN"),
            Err(ValidationError::InvalidPrice)
        );
        assert_eq!(
            AlbumDraft::new("Jeru", "Gerry Mulligan", f64::INFINITY),
            Err(ValidationError::InvalidPrice)
        );
        assert!(AlbumDraft::new("Jeru", "Gerry Mulligan", 0.0).is_ok());
    }

    #[test]
    fn prices_must_fit_two_decimal_storage() {
        assert!(AlbumDraft::new("Jeru", "Gerry Mulligan", 99_999_999.99).is_ok());
        assert_eq!(
            AlbumDraft::new("Jeru", "Gerry Mulligan", MAX_PRICE),
            Err(ValidationError::InvalidPrice)
        );
        assert_eq!(
            AlbumDraft::parse("Jeru", "Gerry Mulligan", "1e9"),
            Err(ValidationError::InvalidPrice)
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(ValidationError::MissingTitle.to_string(), "title is required");
        assert_eq!(ValidationError::MissingArtist.to_string(), "artist is required");
        assert_eq!(ValidationError::InvalidPrice.to_string(), "Invalid price");
        assert_eq!(ValidationError::InvalidId.to_string(), "invalid album id");
    }

    #[test]
    fn album_ids() {
        assert_eq!(parse_album_id("42"), Ok(Some(42)));
        assert_eq!(parse_album_id("0"), Ok(None));
        assert_eq!(parse_album_id("99999999999999999999"), Ok(None));
        for raw in ["-3", "+3", "abc", "4x", ""] {
            assert_eq!(parse_album_id(raw), Err(ValidationError::InvalidId), "{:?}", raw);
        }
    }

    #[test]
    fn into_album_stringifies_id() {
        let album = AlbumDraft::new("Jeru", "Gerry Mulligan", 17.99)
            .unwrap()
            .into_album(7);
        assert_eq!(album.id, "7");
    }
}
