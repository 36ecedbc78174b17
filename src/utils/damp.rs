//! Critically-damped smoothing.
//!
//! Every animated quantity in the book (joint bend and fold, hover glow,
//! book position, camera distance) approaches its target through the
//! same spring so motion stays frame-rate independent and never pops
//! when the target flips mid-flight.
//!
//! The spring is the classic "smooth damp": `smooth_time` is roughly the
//! time to reach the target, the per-step decay uses a cubic
//! approximation of `exp(-x)`, and the output never overshoots.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Distance below which the value snaps onto the target and the spring rests.
pub const REST_EPSILON: f32 = 0.001;

#[inline]
fn exp_decay(x: f32) -> f32 {
    1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x)
}

/// Advances one spring step. Returns the new value and updates `velocity`.
#[must_use]
pub fn smooth_damp(
    current: f32,
    velocity: &mut f32,
    target: f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if (current - target).abs() <= REST_EPSILON {
        *velocity = 0.0;
        return target;
    }
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let decay = exp_decay(omega * dt);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp overshoot
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Signed shortest angular distance from `current` to `target`, in `(-π, π]`.
#[must_use]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    delta
}

/// A scalar driven toward a target by [`smooth_damp`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothDamp {
    pub value: f32,
    velocity: f32,
}

impl SmoothDamp {
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Steps toward `target`. Returns `true` while still moving.
    pub fn step(&mut self, target: f32, smooth_time: f32, dt: f32) -> bool {
        let before = self.value;
        self.value = smooth_damp(self.value, &mut self.velocity, target, smooth_time, dt);
        self.value != before
    }

    /// Steps toward `target` along the shorter arc.
    pub fn step_angle(&mut self, target: f32, smooth_time: f32, dt: f32) -> bool {
        let unwrapped = if (target - self.value).abs() <= PI {
            target
        } else {
            self.value + delta_angle(self.value, target)
        };
        self.step(unwrapped, smooth_time, dt)
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Jumps to `value` and stops.
    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.velocity = 0.0;
    }
}

/// Per-component [`smooth_damp`] for positions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothDampVec3 {
    pub value: Vec3,
    velocity: Vec3,
}

impl SmoothDampVec3 {
    #[must_use]
    pub fn new(value: Vec3) -> Self {
        Self {
            value,
            velocity: Vec3::ZERO,
        }
    }

    pub fn step(&mut self, target: Vec3, smooth_time: f32, dt: f32) -> bool {
        let before = self.value;
        self.value = Vec3::new(
            smooth_damp(self.value.x, &mut self.velocity.x, target.x, smooth_time, dt),
            smooth_damp(self.value.y, &mut self.velocity.y, target.y, smooth_time, dt),
            smooth_damp(self.value.z, &mut self.velocity.z, target.z, smooth_time, dt),
        );
        self.value != before
    }

    pub fn reset(&mut self, value: Vec3) {
        self.value = value;
        self.velocity = Vec3::ZERO;
    }
}
