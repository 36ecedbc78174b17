//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`FlipbookError`] covers the failure modes that can
//! surface through the public API:
//! - Invalid book settings
//! - Image source decoding (data URIs, base64 payloads, pixel formats)
//! - File I/O and background task failures
//!
//! Runtime paths that drive the animation (page clicks, target changes,
//! missing cover art, unresolved textures) never return errors: they clamp,
//! log and fall back instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use flipbook::errors::{FlipbookError, Result};
//!
//! fn load_settings(json: &str) -> Result<BookSettings> {
//!     BookSettings::from_json_str(json)
//! }
//! ```

use thiserror::Error;

/// The main error type for the flipbook engine.
#[derive(Error, Debug)]
pub enum FlipbookError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A book setting is outside its valid range.
    #[error("Invalid book settings: {field} {reason}")]
    InvalidSettings {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Image Source Errors
    // ========================================================================
    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    // ========================================================================
    // I/O & Async Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Task join error (when a background decode fails to complete).
    #[error("Task join error: {0}")]
    TaskJoinError(String),

    /// The loader dropped a pending texture without delivering a result.
    #[error("Texture loader disconnected before delivering {0}")]
    LoaderDisconnected(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for FlipbookError {
    fn from(err: image::ImageError) -> Self {
        FlipbookError::ImageDecodeError(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio::task::JoinError> for FlipbookError {
    fn from(err: tokio::task::JoinError) -> Self {
        FlipbookError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, FlipbookError>`.
pub type Result<T> = std::result::Result<T, FlipbookError>;
