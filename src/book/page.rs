//! Page Deformation Controller
//!
//! Each spread is one skinned page. Every frame the controller derives a
//! target bend (y) and fold (x) angle for each joint from three curves:
//!
//! - **inside**: a strong curl near the spine, joints `0..8`
//! - **outside**: a faint counter-curve over the rest of the page
//! - **turn**: a whole-page arc that only exists while the page is flipping
//!
//! and damps the joints toward them. The turn arc and the fold are scaled by
//! the turning progress, a `sin` envelope that rises and falls over the
//! turn duration after the page changes side.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;
use std::time::Duration;

use crate::assets::AssetServer;
use crate::book::state::{BookState, Face};
use crate::book::surface::SpreadSurfaces;
use crate::resources::material::PageMaterial;
use crate::resources::primitives::{PageTemplate, material_slot};
use crate::scene::{Skeleton, Transform};
use crate::settings::BookSettings;
use crate::utils::{FrameTime, SmoothDamp};

/// Joints below this index get the inside curve, the rest the outside curve.
pub const INSIDE_CURVE_JOINTS: usize = 8;
/// Joints above this index fold.
pub const FOLD_START_JOINT: usize = 8;

/// Turning envelope `sin(π · t)` with `t` the clamped fraction of the turn duration.
///
/// Zero before the first turn and again once the turn is over.
#[must_use]
pub fn turning_progress(now: Duration, turned_at: Option<Duration>, duration: Duration) -> f32 {
    let Some(turned_at) = turned_at else {
        return 0.0;
    };
    let elapsed = now.saturating_sub(turned_at).as_secs_f32();
    let t = (elapsed / duration.as_secs_f32()).min(1.0);
    (PI * t).sin()
}

/// Root rotation a page settles at: `-90°` once turned, `+90°` before,
/// fanned out per spread while the book is open.
#[must_use]
pub fn target_rotation(
    number: usize,
    opened: bool,
    book_closed: bool,
    settings: &BookSettings,
) -> f32 {
    let mut target = if opened { -FRAC_PI_2 } else { FRAC_PI_2 };
    if !book_closed {
        target += (settings.stack_offset_degrees * number as f32).to_radians();
    }
    target
}

/// Target `(bend, fold)` of joint `i`.
#[must_use]
pub fn joint_targets(
    i: usize,
    joint_count: usize,
    target: f32,
    progress: f32,
    book_closed: bool,
    settings: &BookSettings,
) -> (f32, f32) {
    if book_closed {
        // A closed book is a rigid block hinged at the spine
        return (if i == 0 { target } else { 0.0 }, 0.0);
    }

    let fi = i as f32;
    let phase = fi * PI / joint_count as f32;

    let inside = if i < INSIDE_CURVE_JOINTS { (fi * 0.2 + 0.25).sin() } else { 0.0 };
    let outside = if i >= INSIDE_CURVE_JOINTS { (fi * 0.1 + 0.35).cos() } else { 0.0 };
    let turn = phase.sin() * progress;

    let bend = settings.inside_curve_strength * inside * target
        - settings.outside_curve_strength * outside * target
        + settings.effective_turn_strength() * turn * target;

    let fold_intensity = if i > FOLD_START_JOINT { (phase - 0.3).sin() * progress } else { 0.0 };
    let fold = target.signum() * settings.fold_degrees.to_radians() * fold_intensity;

    (bend, fold)
}

/// One animated spread.
#[derive(Debug)]
pub struct Page {
    number: usize,
    surfaces: SpreadSurfaces,
    template: Arc<PageTemplate>,

    pub root: Transform,
    skeleton: Skeleton,
    bend: Vec<SmoothDamp>,
    fold: Vec<SmoothDamp>,
    materials: [PageMaterial; material_slot::COUNT],

    // === Turn State ===
    opened: bool,
    book_closed: bool,
    last_opened: bool,
    turned_at: Option<Duration>,
    hovered: bool,
}

impl Page {
    /// Creates spread `number`, starting its texture loads.
    ///
    /// The page starts flat; its first frames swing it onto the side `state`
    /// puts it on without playing the turn envelope.
    #[must_use]
    pub fn new(
        number: usize,
        surfaces: SpreadSurfaces,
        template: Arc<PageTemplate>,
        state: &BookState,
        assets: &AssetServer,
    ) -> Self {
        let joint_count = template.joint_count();
        let skeleton =
            Skeleton::new(&format!("page_{number}"), joint_count, template.segment_width());

        let front = PageMaterial::face(
            assets,
            &surfaces.front.source(),
            surfaces.roughness_for(Face::Front),
        );
        let back = PageMaterial::face(
            assets,
            &surfaces.back.source(),
            surfaces.roughness_for(Face::Back),
        );
        let materials = [
            PageMaterial::edge(),
            PageMaterial::spine(),
            PageMaterial::edge(),
            PageMaterial::edge(),
            front,
            back,
        ];

        let opened = state.is_opened(number);
        Self {
            number,
            surfaces,
            template,
            root: Transform::new(),
            skeleton,
            bend: vec![SmoothDamp::default(); joint_count],
            fold: vec![SmoothDamp::default(); joint_count],
            materials,
            opened,
            book_closed: state.is_book_closed(),
            last_opened: opened,
            turned_at: None,
            hovered: false,
        }
    }

    // ========================================================================
    // Frame Update
    // ========================================================================

    pub fn update(
        &mut self,
        state: &BookState,
        frame: FrameTime,
        settings: &BookSettings,
        assets: &AssetServer,
    ) {
        let now = frame.elapsed;
        let dt = frame.dt_seconds();

        self.opened = state.is_opened(self.number);
        self.book_closed = state.is_book_closed();
        if self.opened != self.last_opened {
            self.turned_at = Some(now);
            self.last_opened = self.opened;
            let side = if self.opened { "left" } else { "right" };
            log::trace!("Page {} turned {side}", self.number);
        }

        let progress = self.turning_progress(now, settings);
        let target = target_rotation(self.number, self.opened, self.book_closed, settings);
        let joint_count = self.skeleton.joint_count();

        for i in 0..joint_count {
            let (bend, fold) =
                joint_targets(i, joint_count, target, progress, self.book_closed, settings);
            self.bend[i].step_angle(bend, settings.bend_smooth_time, dt);
            self.fold[i].step_angle(fold, settings.fold_smooth_time, dt);
            self.skeleton.set_joint_rotation(i, self.fold[i].value, self.bend[i].value);
        }
        self.skeleton.compute_joint_matrices();

        let offset = state.displayed_page() as f32 - self.number as f32;
        self.root.position.z = offset * self.template.depth;
        self.root.update_local_matrix();

        let glow = if self.hovered { settings.hover_emissive_intensity } else { 0.0 };
        for slot in [material_slot::FRONT, material_slot::BACK] {
            self.materials[slot].update_emissive(glow, settings.hover_smooth_time, dt);
        }
        for material in &mut self.materials {
            material.poll_textures(assets);
        }
    }

    #[must_use]
    pub fn turning_progress(&self, now: Duration, settings: &BookSettings) -> f32 {
        turning_progress(now, self.turned_at, Duration::from_millis(settings.turn_duration_ms))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    #[inline]
    #[must_use]
    pub fn surfaces(&self) -> &SpreadSurfaces {
        &self.surfaces
    }

    #[inline]
    #[must_use]
    pub fn template(&self) -> &Arc<PageTemplate> {
        &self.template
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Matrices to upload for skinning, in page space.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[glam::Mat4] {
        self.skeleton.joint_matrices()
    }

    #[inline]
    #[must_use]
    pub fn materials(&self) -> &[PageMaterial; material_slot::COUNT] {
        &self.materials
    }

    #[must_use]
    pub fn face_material(&self, face: Face) -> &PageMaterial {
        match face {
            Face::Front => &self.materials[material_slot::FRONT],
            Face::Back => &self.materials[material_slot::BACK],
        }
    }

    /// Current `(bend, fold)` of joint `i`.
    #[must_use]
    pub fn joint_angles(&self, i: usize) -> Option<(f32, f32)> {
        Some((self.bend.get(i)?.value, self.fold.get(i)?.value))
    }

    #[inline]
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    #[inline]
    #[must_use]
    pub fn turned_at(&self) -> Option<Duration> {
        self.turned_at
    }

    #[inline]
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_envelope() {
        let d = Duration::from_millis(400);
        assert_eq!(turning_progress(Duration::from_secs(5), None, d), 0.0);
        let mid = turning_progress(Duration::from_millis(200), Some(Duration::ZERO), d);
        assert!((mid - 1.0).abs() < 1e-6);
        let done = turning_progress(Duration::from_secs(2), Some(Duration::ZERO), d);
        assert!(done.abs() < 1e-6);
    }

    #[test]
    fn closed_book_hinges_at_spine() {
        let s = BookSettings::default();
        assert_eq!(joint_targets(0, 31, FRAC_PI_2, 0.7, true, &s), (FRAC_PI_2, 0.0));
        assert_eq!(joint_targets(12, 31, FRAC_PI_2, 0.7, true, &s), (0.0, 0.0));
    }

    #[test]
    fn no_fold_near_spine() {
        let s = BookSettings::default();
        for i in 0..=FOLD_START_JOINT {
            assert_eq!(joint_targets(i, 31, -FRAC_PI_2, 1.0, false, &s).1, 0.0);
        }
        assert!(joint_targets(20, 31, -FRAC_PI_2, 1.0, false, &s).1 < 0.0);
    }
}
