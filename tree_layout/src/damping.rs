//! Frame-rate independent exponential damping.
//!
//! Each step moves a value toward its target by `1 − exp(−dt / smooth_time)`
//! of the remaining distance.  Two half-steps land exactly where one full
//! step does, and the current value is always the start of the next decay,
//! so changing the target mid-flight never produces a jump.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::Deserialize;

/// Fraction of the remaining distance still left after `dt`.
fn remaining(smooth_time: f32, dt: f32) -> f32 {
    if smooth_time <= 0.0 || !dt.is_finite() {
        0.0
    } else {
        (-dt / smooth_time).exp()
    }
}

/// Damp a scalar.  `smooth_time <= 0` snaps straight to `target`; a zero
/// step leaves `current` untouched.
pub fn damp(current: f32, target: f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    target + (current - target) * remaining(smooth_time, dt)
}

pub fn damp_vec3(current: Vec3, target: Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    target + (current - target) * remaining(smooth_time, dt)
}

/// Damp an angle in radians along the shorter way around the circle.
pub fn damp_angle(current: f32, target: f32, smooth_time: f32, dt: f32) -> f32 {
    let delta = wrap_angle(target - current);
    if delta == 0.0 || dt <= 0.0 {
        return current;
    }
    current + delta * (1.0 - remaining(smooth_time, dt))
}

/// Wrap into `(−π, π]`.
pub fn wrap_angle(a: f32) -> f32 {
    let w = (a + PI).rem_euclid(TAU) - PI;
    if w == -PI { PI } else { w }
}

// ════════════════════════════════════════════════════════════════════════════
// Transform
// ════════════════════════════════════════════════════════════════════════════

/// Live transform of one scene entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale:    f32,
    /// Euler XYZ, radians.
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Transform { position, scale: 1.0, rotation: Vec3::ZERO }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// One damping step toward `target`, each property on its own time constant.
    pub fn damp_toward(&mut self, target: &Transform, rates: &DampRates, dt: f32) {
        self.position = damp_vec3(self.position, target.position, rates.position, dt);
        self.scale    = damp(self.scale, target.scale, rates.scale, dt);
        self.rotation = Vec3::new(
            damp_angle(self.rotation.x, target.rotation.x, rates.rotation, dt),
            damp_angle(self.rotation.y, target.rotation.y, rates.rotation, dt),
            damp_angle(self.rotation.z, target.rotation.z, rates.rotation, dt),
        );
    }
}

/// Smooth times (seconds) per transform property.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DampRates {
    pub position: f32,
    pub scale:    f32,
    pub rotation: f32,
}

impl Default for DampRates {
    fn default() -> Self {
        DampRates { position: 0.35, scale: 0.25, rotation: 0.3 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn idempotent_at_target() {
        let target = Transform::at(Vec3::new(1.0, -2.0, 3.5))
            .with_scale(2.5)
            .with_rotation(Vec3::new(0.1, -3.0, 2.0));
        let mut t = target;
        for _ in 0..100 {
            t.damp_toward(&target, &DampRates::default(), 1.0 / 60.0);
            assert_eq!(t, target);
        }
    }

    #[test]
    fn converges_toward_target() {
        let mut x = 0.0;
        for _ in 0..600 {
            x = damp(x, 10.0, 0.3, 1.0 / 60.0);
        }
        assert_relative_eq!(x, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn never_overshoots() {
        let mut x = 0.0;
        for _ in 0..100 {
            x = damp(x, 1.0, 0.2, 0.5);
            assert!(x <= 1.0);
        }
    }

    #[test]
    fn frame_rate_independent() {
        let one = damp(0.0, 1.0, 0.4, 1.0 / 30.0);
        let two = damp(damp(0.0, 1.0, 0.4, 1.0 / 60.0), 1.0, 0.4, 1.0 / 60.0);
        assert_relative_eq!(one, two, epsilon = 1e-6);
    }

    #[test]
    fn target_change_is_continuous() {
        let a = damp_vec3(Vec3::ZERO, Vec3::X, 0.3, 0.1);
        // Swapping the target mid-flight starts from where we are.
        let b = damp_vec3(a, -Vec3::X, 0.3, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn non_positive_smooth_time_snaps() {
        assert_eq!(damp(3.0, 7.0, 0.0, 0.016), 7.0);
        assert_eq!(damp_vec3(Vec3::ONE, Vec3::ZERO, -1.0, 0.016), Vec3::ZERO);
    }

    #[test]
    fn angle_takes_short_way() {
        // From just below +π to just above −π: should move upward through π.
        let a = damp_angle(PI - 0.1, -PI + 0.1, 0.3, 0.05);
        assert!(a > PI - 0.1);
    }

    #[test]
    fn wrap_angle_range() {
        for a in [-10.0f32, -PI, 0.0, PI, 7.0, 100.0] {
            let w = wrap_angle(a);
            assert!(w > -PI - 1e-6 && w <= PI + 1e-6, "{} -> {}", a, w);
        }
        assert_relative_eq!(wrap_angle(TAU + 0.5), 0.5, epsilon = 1e-5);
    }
}
