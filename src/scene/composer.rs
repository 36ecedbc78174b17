//! Scene Composer
//!
//! Places the whole book and the camera. Three viewport classes pick the
//! scale, camera distance and shadow resolution; the scroll progress
//! raises the book; the horizontal offset recenters it depending on
//! whether it is closed, open, or open on a single-page viewport.
//!
//! Nothing is assigned directly: position, scale and camera distance are
//! damped toward their targets every frame.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::book::{BookState, Focus};
use crate::scene::transform::Transform;
use crate::settings::BookSettings;
use crate::utils::{SmoothDamp, SmoothDampVec3};

/// Book height with no scroll progress.
pub const LOWERED_Y: f32 = -1.6;
pub const RAISED_Y: f32 = 0.0;
/// Extra lift of an open book on narrow viewports.
pub const NARROW_OPEN_LIFT: f32 = 0.2;

/// Viewport class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Breakpoint {
    /// Below 768 px.
    Narrow,
    /// Below 1024 px.
    Medium,
    #[default]
    Wide,
}

impl Breakpoint {
    #[must_use]
    pub fn from_width(px: f32) -> Self {
        if px < 768.0 {
            Self::Narrow
        } else if px < 1024.0 {
            Self::Medium
        } else {
            Self::Wide
        }
    }

    #[must_use]
    pub fn profile(self) -> ViewportProfile {
        match self {
            Self::Narrow => ViewportProfile {
                closed_scale: 0.7,
                open_scale: 1.1,
                camera_distance: 4.3,
                shadow_map_size: 1024,
                closed_offset_factor: 0.8,
            },
            Self::Medium => ViewportProfile {
                closed_scale: 0.85,
                open_scale: 0.85,
                camera_distance: 3.5,
                shadow_map_size: 2048,
                closed_offset_factor: 0.85,
            },
            Self::Wide => ViewportProfile {
                closed_scale: 1.0,
                open_scale: 1.0,
                camera_distance: 2.5,
                shadow_map_size: 2048,
                closed_offset_factor: 1.0,
            },
        }
    }
}

/// Per-breakpoint framing constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProfile {
    pub closed_scale: f32,
    pub open_scale: f32,
    pub camera_distance: f32,
    pub shadow_map_size: u32,
    /// Fraction of half a page the closed book shifts by.
    pub closed_offset_factor: f32,
}

impl ViewportProfile {
    #[inline]
    #[must_use]
    pub fn scale(&self, book_closed: bool) -> f32 {
        if book_closed { self.closed_scale } else { self.open_scale }
    }
}

#[derive(Debug, Clone)]
pub struct SceneComposer {
    breakpoint: Breakpoint,
    scroll_progress: f32,
    page_width: f32,
    smooth_time: f32,

    position: SmoothDampVec3,
    scale: SmoothDamp,
    camera_distance: SmoothDamp,

    /// Book root. Rotated so page faces look down +z.
    pub root: Transform,
    /// Camera on +z, looking at the origin.
    pub camera: Transform,
}

impl SceneComposer {
    /// Starts framed for a closed book on its front cover.
    #[must_use]
    pub fn new(settings: &BookSettings, breakpoint: Breakpoint) -> Self {
        let mut composer = Self {
            breakpoint,
            scroll_progress: 0.0,
            page_width: settings.page_width,
            smooth_time: settings.book_smooth_time,
            position: SmoothDampVec3::default(),
            scale: SmoothDamp::default(),
            camera_distance: SmoothDamp::default(),
            root: Transform::new(),
            camera: Transform::new(),
        };
        let closed = BookState::new(0);
        composer.position.reset(composer.target_position(&closed));
        composer.scale.reset(composer.target_scale(&closed));
        composer.camera_distance.reset(breakpoint.profile().camera_distance);
        composer.apply();
        composer
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Returns `true` if the breakpoint changed.
    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) -> bool {
        let changed = self.breakpoint != breakpoint;
        if changed {
            log::debug!("Viewport breakpoint {:?} -> {breakpoint:?}", self.breakpoint);
        }
        self.breakpoint = breakpoint;
        changed
    }

    pub fn set_viewport_width(&mut self, px: f32) -> bool {
        self.set_breakpoint(Breakpoint::from_width(px))
    }

    /// Clamped to `[0, 1]`; NaN counts as 0.
    pub fn set_scroll_progress(&mut self, progress: f32) {
        self.scroll_progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    }

    #[inline]
    #[must_use]
    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    #[inline]
    #[must_use]
    pub fn scroll_progress(&self) -> f32 {
        self.scroll_progress
    }

    #[inline]
    #[must_use]
    pub fn profile(&self) -> ViewportProfile {
        self.breakpoint.profile()
    }

    // ========================================================================
    // Targets
    // ========================================================================

    #[must_use]
    pub fn target_scale(&self, state: &BookState) -> f32 {
        self.profile().scale(state.is_book_closed())
    }

    #[must_use]
    pub fn target_position(&self, state: &BookState) -> Vec3 {
        let profile = self.profile();
        let narrow = self.breakpoint == Breakpoint::Narrow;
        let closed = state.is_book_closed();

        let mut y = LOWERED_Y + (RAISED_Y - LOWERED_Y) * self.scroll_progress;
        if narrow && !closed {
            y += NARROW_OPEN_LIFT;
        }

        let half_page = self.page_width / 2.0;
        let x = if closed {
            // The pivot is the spine: a closed book lies entirely on one side of it
            let shift = half_page * profile.closed_offset_factor;
            if state.displayed_page() > 0 && state.displayed_page() == state.total_spreads() {
                shift
            } else {
                -shift
            }
        } else if narrow {
            let shift = half_page * profile.scale(false);
            match state.focus() {
                Focus::Left => shift,
                Focus::Right => -shift,
            }
        } else {
            0.0
        };

        Vec3::new(x, y, 0.0)
    }

    // ========================================================================
    // Frame Update
    // ========================================================================

    pub fn update(&mut self, state: &BookState, dt: f32) {
        let position = self.target_position(state);
        let scale = self.target_scale(state);
        let distance = self.profile().camera_distance;

        self.position.step(position, self.smooth_time, dt);
        self.scale.step(scale, self.smooth_time, dt);
        self.camera_distance.step(distance, self.smooth_time, dt);
        self.apply();
    }

    fn apply(&mut self) {
        self.root.position = self.position.value;
        self.root.scale = Vec3::splat(self.scale.value);
        self.root.rotation = Quat::from_rotation_y(-FRAC_PI_2);
        self.root.update_local_matrix();
        self.root.set_world_matrix(self.root.local_matrix);

        self.camera.position = Vec3::new(0.0, 0.0, self.camera_distance.value);
        self.camera.look_at(Vec3::ZERO, Vec3::Y);
        self.camera.update_local_matrix();
        self.camera.set_world_matrix(self.camera.local_matrix);
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position.value
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale.value
    }

    #[inline]
    #[must_use]
    pub fn camera_distance(&self) -> f32 {
        self.camera_distance.value
    }

    #[inline]
    #[must_use]
    pub fn shadow_map_size(&self) -> u32 {
        self.profile().shadow_map_size
    }
}
