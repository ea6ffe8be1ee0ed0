//! Core domain: angle, interpolation and timer helpers shared by the simulation.

use bevy::prelude::*;

/// Guard used wherever a value is compared against "effectively zero".
pub const EPSILON: f32 = 1.0e-4;

/// Horizontal unit vector for a yaw angle in degrees. Yaw 0 faces +Z, yaw 90 faces +X.
pub fn yaw_dir(degrees: f32) -> Vec3 {
    let radians = degrees.to_radians();
    Vec3::new(radians.sin(), 0.0, radians.cos())
}

/// Horizontal unit vector 90 degrees clockwise (seen from above) of [`yaw_dir`].
pub fn yaw_right(degrees: f32) -> Vec3 {
    yaw_dir(degrees + 90.0)
}

/// Yaw angle in degrees of a horizontal vector. Returns 0 for vectors with no horizontal extent.
pub fn yaw_of(v: Vec3) -> f32 {
    if v.x.abs() < EPSILON && v.z.abs() < EPSILON {
        return 0.0;
    }
    v.x.atan2(v.z).to_degrees()
}

pub fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}

/// Shortest signed difference between two angles, in `[-180, 180)`.
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta >= 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

pub fn lerp_vec(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, t.clamp(0.0, 1.0))
}

/// Hermite ease `t² (3 − 2t)` over a clamped `t`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Decrements a countdown timer, never going below zero.
pub fn countdown(timer: &mut f32, dt: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt).max(0.0);
    }
}

/// Increments a warm-up timer, saturating at `cap`.
pub fn count_up(timer: &mut f32, dt: f32, cap: f32) {
    if *timer < cap {
        *timer = (*timer + dt).min(cap);
    }
}

/// Closest point to `point` on the infinite line through `a` and `b`.
pub fn closest_point_on_line(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let line = b - a;
    let length_squared = line.length_squared();
    if length_squared < EPSILON {
        return a;
    }
    a + line * ((point - a).dot(line) / length_squared)
}

/// Surface inclination in degrees for a contact normal. Near-flat surfaces snap to zero.
pub fn slope_angle(normal: Vec3) -> f32 {
    let up = Vec3::Y.dot(normal).clamp(-1.0, 1.0);
    if up > 0.99 {
        return 0.0;
    }
    up.acos().to_degrees()
}

pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
