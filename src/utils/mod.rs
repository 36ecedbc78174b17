//! Utility Module
//!
//! - [`damp`]: critically-damped smoothing used by every animated value
//! - [`time`]: frame clock ([`Timer`]) and the per-frame [`FrameTime`] snapshot
//!
//! ```rust,ignore
//! use flipbook::utils::{SmoothDamp, Timer};
//!
//! let mut timer = Timer::new();
//! let mut glow = SmoothDamp::new(0.0);
//! let frame = timer.tick();
//! glow.step(0.22, 0.1, frame.dt_seconds());
//! ```

pub mod damp;
pub mod time;

pub use damp::{SmoothDamp, SmoothDampVec3};
pub use time::{FrameTime, Timer};
