//! Book Settings
//!
//! Tunable constants for page geometry, curvature and damping. Everything
//! has a default matching the stock flipbook look, so most callers only
//! override a field or two:
//!
//! ```rust,ignore
//! use flipbook::settings::BookSettings;
//!
//! let settings = BookSettings {
//!     page_segments: 20,
//!     ..Default::default()
//! };
//! settings.validate()?;
//! ```
//!
//! Settings can also be loaded from JSON; missing fields take their default.

use serde::{Deserialize, Serialize};

use crate::errors::{FlipbookError, Result};

/// Segment count at or above which the stronger turn curvature is used.
const DENSE_SEGMENT_THRESHOLD: u32 = 30;

/// Configuration shared by every page of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSettings {
    // === Page Geometry ===
    pub page_width: f32,
    pub page_height: f32,
    pub page_depth: f32,
    /// Number of columns along the turn axis. A page has `page_segments + 1` joints.
    pub page_segments: u32,

    // === Curvature ===
    pub inside_curve_strength: f32,
    pub outside_curve_strength: f32,
    /// Explicit turn curvature. `None` derives it from the segment density.
    pub turn_curve_strength: Option<f32>,
    /// Per-spread fan-out added to the target rotation while the book is open, in degrees.
    pub stack_offset_degrees: f32,
    /// Peak crease angle in degrees.
    pub fold_degrees: f32,

    // === Timing ===
    /// Duration of the turning envelope in milliseconds.
    pub turn_duration_ms: u64,
    /// Smooth time (seconds) of the bend axis.
    pub bend_smooth_time: f32,
    /// Smooth time (seconds) of the fold axis.
    pub fold_smooth_time: f32,
    /// Smooth time (seconds) of the hover glow.
    pub hover_smooth_time: f32,
    /// Smooth time (seconds) of the book position, scale and camera distance.
    pub book_smooth_time: f32,

    // === Materials ===
    pub hover_emissive_intensity: f32,

    // === Assets ===
    /// Directory that built-in artwork paths are resolved against.
    pub asset_root: String,
}

impl Default for BookSettings {
    fn default() -> Self {
        Self {
            page_width: 1.28,
            page_height: 1.71,
            page_depth: 0.003,
            page_segments: 30,

            inside_curve_strength: 0.18,
            outside_curve_strength: -0.002,
            turn_curve_strength: None,
            stack_offset_degrees: 0.8,
            fold_degrees: 2.0,

            turn_duration_ms: 400,
            bend_smooth_time: 0.5,
            fold_smooth_time: 0.3,
            hover_smooth_time: 0.1,
            book_smooth_time: 0.35,

            hover_emissive_intensity: 0.22,

            asset_root: ".".to_string(),
        }
    }
}

impl BookSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Width of one segment along the turn axis.
    #[inline]
    #[must_use]
    pub fn segment_width(&self) -> f32 {
        self.page_width / self.page_segments as f32
    }

    /// Number of joints in each page skeleton.
    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.page_segments as usize + 1
    }

    /// Turn curvature to use. Denser pages spread the bend over more joints,
    /// so they get a slightly stronger curve.
    #[must_use]
    pub fn effective_turn_strength(&self) -> f32 {
        self.turn_curve_strength.unwrap_or(if self.page_segments >= DENSE_SEGMENT_THRESHOLD {
            0.09
        } else {
            0.05
        })
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: f32) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(FlipbookError::InvalidSettings {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                })
            }
        }

        if self.page_segments == 0 {
            return Err(FlipbookError::InvalidSettings {
                field: "page_segments",
                reason: "must be at least 1".to_string(),
            });
        }
        positive("page_width", self.page_width)?;
        positive("page_height", self.page_height)?;
        positive("page_depth", self.page_depth)?;
        positive("bend_smooth_time", self.bend_smooth_time)?;
        positive("fold_smooth_time", self.fold_smooth_time)?;
        positive("hover_smooth_time", self.hover_smooth_time)?;
        positive("book_smooth_time", self.book_smooth_time)?;
        if self.turn_duration_ms == 0 {
            return Err(FlipbookError::InvalidSettings {
                field: "turn_duration_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BookSettings::default().validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields() {
        let settings = BookSettings::from_json_str(r#"{ "page_segments": 12 }"#).unwrap();
        assert_eq!(settings.page_segments, 12);
        assert!((settings.page_width - 1.28).abs() < 1e-6);
        assert!((settings.effective_turn_strength() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_segments_rejected() {
        let settings = BookSettings {
            page_segments: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(FlipbookError::InvalidSettings { field: "page_segments", .. })
        ));
    }
}
