//! World domain: grabbable ledges.

use bevy::prelude::*;

/// An oriented grab box placed on a ledge lip.
///
/// Local +X (`right`) points from the hanging side into the platform, so a hanging
/// character faces `right` and climbing moves along it. Local Z runs along the lip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    center: Vec3,
    half_extents: Vec3,
    rotation: Quat,
    left_local: Vec3,
    right_local: Vec3,
}

impl Edge {
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        let half_extents = half_extents.abs();
        Self {
            center,
            half_extents,
            rotation,
            left_local: Vec3::new(-half_extents.x, half_extents.y, half_extents.z),
            right_local: Vec3::new(-half_extents.x, half_extents.y, -half_extents.z),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Moves the box; cached hand anchors follow since they are stored locally.
    pub fn set_pose(&mut self, center: Vec3, rotation: Quat) {
        self.center = center;
        self.rotation = rotation;
    }

    /// Height of the top plane (world bounds max y).
    pub fn top(&self) -> f32 {
        let h = self.half_extents;
        let extent_y = (self.rotation * Vec3::new(h.x, 0.0, 0.0)).y.abs()
            + (self.rotation * Vec3::new(0.0, h.y, 0.0)).y.abs()
            + (self.rotation * Vec3::new(0.0, 0.0, h.z)).y.abs();
        self.center.y + extent_y
    }

    /// Middle of the box lifted to the top plane.
    pub fn top_point(&self) -> Vec3 {
        Vec3::new(self.center.x, self.top(), self.center.z)
    }

    pub fn left_point(&self) -> Vec3 {
        self.to_world(self.left_local)
    }

    pub fn right_point(&self) -> Vec3 {
        self.to_world(self.right_local)
    }

    /// Direction from the hanging side into the platform.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Direction along the lip.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Where a body of the given radius and height hangs, feet position.
    pub fn hang_anchor(&self, radius: f32, height: f32, edge_height: f32) -> Vec3 {
        self.top_point() - self.right() * (self.half_extents.x + radius)
            + Vec3::Y * (edge_height - height)
    }

    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.center)
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.center + self.rotation * local
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let local = self.to_local(center);
        let closest = local.clamp(-self.half_extents, self.half_extents);
        local.distance_squared(closest) <= radius * radius
    }
}
