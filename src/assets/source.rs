//! Image references and sources.
//!
//! [`ImageRef`] is what the presentation shell hands us for each page face:
//! either one of three sentinels or an opaque content payload. The surface
//! resolver turns those into [`ImageSource`]s, which the asset server knows
//! how to load.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::{FlipbookError, Result};

pub const BOOK_COVER: &str = "book-cover";
pub const BOOK_BACK: &str = "book-back";
pub const BLANK_PAGE: &str = "blank-page";

/// A page face as supplied by the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    /// Built-in front cover artwork (`"book-cover"`).
    BookCover,
    /// Built-in back cover artwork (`"book-back"`).
    BookBack,
    /// An intentionally empty page (`"blank-page"`).
    BlankPage,
    /// A data URI or a path relative to the asset root.
    Content(String),
}

impl ImageRef {
    pub fn content(payload: impl Into<String>) -> Self {
        Self::Content(payload.into())
    }

    #[inline]
    #[must_use]
    pub fn is_cover_sentinel(&self) -> bool {
        matches!(self, Self::BookCover | Self::BookBack)
    }

    #[inline]
    #[must_use]
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BookCover => BOOK_COVER,
            Self::BookBack => BOOK_BACK,
            Self::BlankPage => BLANK_PAGE,
            Self::Content(payload) => payload,
        }
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        match s {
            BOOK_COVER => Self::BookCover,
            BOOK_BACK => Self::BookBack,
            BLANK_PAGE => Self::BlankPage,
            other => Self::Content(other.to_string()),
        }
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        match s.as_str() {
            BOOK_COVER => Self::BookCover,
            BOOK_BACK => Self::BookBack,
            BLANK_PAGE => Self::BlankPage,
            _ => Self::Content(s),
        }
    }
}

impl From<ImageRef> for String {
    fn from(r: ImageRef) -> Self {
        match r {
            ImageRef::Content(payload) => payload,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for ImageRef {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Data URIs can be megabytes long
            Self::Content(payload) if payload.len() > 48 => {
                let head: String = payload.chars().take(40).collect();
                write!(f, "{head}…({} bytes)", payload.len())
            }
            other => f.write_str(other.as_str()),
        }
    }
}

/// Artwork shipped with the book, resolved against the asset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinArt {
    BookCover,
    BookBack,
    CoverRoughness,
}

impl BuiltinArt {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::BookCover => "textures/book-cover.jpg",
            Self::BookBack => "textures/book-back.jpg",
            Self::CoverRoughness => "textures/book-cover-roughness.jpg",
        }
    }
}

/// A concrete, loadable image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// The generated solid-white page.
    Blank,
    Builtin(BuiltinArt),
    /// A data URI or a path relative to the asset root.
    Payload(String),
}

impl ImageSource {
    /// Stable key used to deduplicate loads.
    ///
    /// Data URIs are keyed by an xxh3-128 digest of the payload, so the
    /// store never keeps a second copy of the encoded image.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::Blank => BLANK_PAGE.to_string(),
            Self::Builtin(art) => format!("builtin:{}", art.path()),
            Self::Payload(payload) if is_data_uri(payload) => {
                format!("data:{:032x}", xxh3_128(payload.as_bytes()))
            }
            Self::Payload(path) => format!("path:{path}"),
        }
    }

    /// Short human-readable label for logs and texture names.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Blank => BLANK_PAGE.to_string(),
            Self::Builtin(art) => art.path().to_string(),
            Self::Payload(payload) if is_data_uri(payload) => {
                format!("data-uri({} bytes)", payload.len())
            }
            Self::Payload(path) => path.clone(),
        }
    }
}

#[inline]
#[must_use]
pub fn is_data_uri(s: &str) -> bool {
    s.starts_with("data:")
}

/// Decodes the bytes of a base64 `data:` URI.
///
/// Only base64 payloads are accepted; page images are never percent-encoded.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FlipbookError::DataUriError("missing 'data:' scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FlipbookError::DataUriError("missing ',' separator".to_string()))?;
    if !header.split(';').any(|part| part == "base64") {
        return Err(FlipbookError::DataUriError(format!(
            "unsupported encoding in header '{header}'"
        )));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_parse() {
        assert_eq!(ImageRef::from("book-cover"), ImageRef::BookCover);
        assert_eq!(ImageRef::from("book-back"), ImageRef::BookBack);
        assert_eq!(ImageRef::from("blank-page"), ImageRef::BlankPage);
        assert_eq!(
            ImageRef::from("pages/1.png"),
            ImageRef::Content("pages/1.png".to_string())
        );
    }

    #[test]
    fn serde_uses_string_form() {
        let json =
            serde_json::to_string(&vec![ImageRef::BookCover, ImageRef::content("a.png")]).unwrap();
        assert_eq!(json, r#"["book-cover","a.png"]"#);
        let back: Vec<ImageRef> = serde_json::from_str(r#"["blank-page","b.png"]"#).unwrap();
        assert_eq!(back, vec![ImageRef::BlankPage, ImageRef::content("b.png")]);
    }

    #[test]
    fn data_uri_roundtrip() {
        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn data_uri_rejects_plain_text() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(FlipbookError::DataUriError(_))
        ));
        assert!(decode_data_uri("pages/1.png").is_err());
    }
}
