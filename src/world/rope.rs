//! World domain: swinging ropes.
//!
//! A rope is a chain of nodes hanging from a fixed anchor. Each pair of neighbouring
//! nodes forms one grabbable segment; segment 0 is the topmost. The chain is simulated
//! with position-based dynamics: gravity is integrated on the free nodes, then the
//! segment lengths are restored from the anchor downwards.

use bevy::prelude::*;

use crate::core::{EPSILON, lerp_vec};

const CONSTRAINT_ITERATIONS: usize = 8;

/// Rope is considered calm when every segment up to the anchor is within this cosine of vertical.
const CALM_COSINE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
struct RopeNode {
    position: Vec3,
    velocity: Vec3,
}

/// Snapshot of a single segment in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeSegment {
    pub top: Vec3,
    pub bottom: Vec3,
    /// Swing direction of the segment, perpendicular to its long axis.
    pub forward: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
}

impl RopeSegment {
    pub fn center(&self) -> Vec3 {
        (self.top + self.bottom) * 0.5
    }

    /// Unit vector from bottom to top. Falls back to world up for degenerate segments.
    pub fn up(&self) -> Vec3 {
        (self.top - self.bottom).try_normalize().unwrap_or(Vec3::Y)
    }

    pub fn length(&self) -> f32 {
        self.top.distance(self.bottom)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, self.up())
    }

    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation().inverse() * (point - self.center())
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.center() + self.rotation() * local
    }

    /// Height of `point` projected on the segment axis, measured from the center.
    pub fn projected_height(&self, point: Vec3) -> f32 {
        self.up().dot(point - self.center())
    }

    /// True if the projection of `point` on the segment axis lies strictly between bottom and top.
    pub fn spans_height(&self, point: Vec3) -> bool {
        let up = self.up();
        up.dot(point - self.bottom) > 0.0 && up.dot(self.top - point) > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rope {
    nodes: Vec<RopeNode>,
    segment_length: f32,
    radius: f32,
    swing_axis: Vec3,
    damping: f32,
}

impl Rope {
    /// A rope hanging straight down from `anchor`.
    pub fn hanging(
        anchor: Vec3,
        segments: usize,
        segment_length: f32,
        radius: f32,
        swing_axis: Vec3,
    ) -> Self {
        let segments = segments.max(1);
        let segment_length = segment_length.max(EPSILON);
        let nodes = (0..=segments)
            .map(|i| RopeNode {
                position: anchor - Vec3::Y * segment_length * i as f32,
                velocity: Vec3::ZERO,
            })
            .collect();

        Self {
            nodes,
            segment_length,
            radius,
            swing_axis: Vec3::new(swing_axis.x, 0.0, swing_axis.z)
                .try_normalize()
                .unwrap_or(Vec3::X),
            damping: 0.2,
        }
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.max(0.0);
        self
    }

    pub fn anchor(&self) -> Vec3 {
        self.nodes[0].position
    }

    pub fn segment_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    pub fn segment(&self, index: usize) -> Option<RopeSegment> {
        let top = self.nodes.get(index)?;
        let bottom = self.nodes.get(index + 1)?;

        let up = (top.position - bottom.position)
            .try_normalize()
            .unwrap_or(Vec3::Y);
        let forward = (self.swing_axis - up * self.swing_axis.dot(up))
            .try_normalize()
            .unwrap_or(self.swing_axis);

        Some(RopeSegment {
            top: top.position,
            bottom: bottom.position,
            forward,
            velocity: (top.velocity + bottom.velocity) * 0.5,
            radius: self.radius,
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = RopeSegment> + '_ {
        (0..self.segment_count()).filter_map(|i| self.segment(i))
    }

    /// True if this segment and every segment above it hang close to vertical.
    pub fn is_calm(&self, index: usize) -> bool {
        (0..=index.min(self.segment_count().saturating_sub(1)))
            .filter_map(|i| self.segment(i))
            .all(|s| s.up().dot(Vec3::Y) > CALM_COSINE)
    }

    /// Damps horizontal motion of this segment and everything above it.
    pub fn calm(&mut self, index: usize, dt: f32) {
        let last = (index + 1).min(self.nodes.len() - 1);
        for node in self.nodes[1..=last].iter_mut() {
            let target = Vec3::new(0.0, node.velocity.y, 0.0);
            node.velocity = lerp_vec(node.velocity, target, dt * 20.0);
        }
    }

    /// Adds a velocity impulse to the body of a segment.
    pub fn apply_velocity(&mut self, index: usize, velocity: Vec3) {
        let bottom = index + 1;
        if bottom >= self.nodes.len() {
            return;
        }
        self.nodes[bottom].velocity += velocity;
        if index > 0 {
            self.nodes[index].velocity += velocity * 0.5;
        }
    }

    /// Accumulated displacement from this segment up to the highest segment above it,
    /// plus a unit up vector. Horizontal components measure how far the rope swings out.
    pub fn offset_to_root(&self, index: usize) -> Vec3 {
        let mut offset = Vec3::Y;
        let Some(mut current) = self.segment(index) else {
            return offset;
        };

        let mut i = index;
        while i > 0 {
            let Some(parent) = self.segment(i - 1) else {
                break;
            };
            if parent.center().y < current.center().y {
                break;
            }
            offset += parent.center() - current.center();
            current = parent;
            i -= 1;
        }

        offset
    }

    /// Advances the chain by one step.
    pub fn step(&mut self, dt: f32, gravity: Vec3) {
        if dt <= EPSILON {
            return;
        }

        let keep = (1.0 - self.damping * dt).max(0.0);
        let mut predicted: Vec<Vec3> = Vec::with_capacity(self.nodes.len());
        predicted.push(self.nodes[0].position);

        for node in self.nodes.iter_mut().skip(1) {
            node.velocity = (node.velocity + gravity * dt) * keep;
            predicted.push(node.position + node.velocity * dt);
        }

        for _ in 0..CONSTRAINT_ITERATIONS {
            for a in 0..predicted.len() - 1 {
                let b = a + 1;
                let delta = predicted[b] - predicted[a];
                let length = delta.length();
                if length < EPSILON {
                    continue;
                }
                let correction = delta * ((length - self.segment_length) / length);
                if a == 0 {
                    predicted[b] -= correction;
                } else {
                    predicted[a] += correction * 0.5;
                    predicted[b] -= correction * 0.5;
                }
            }
        }

        for (node, target) in self.nodes.iter_mut().zip(predicted).skip(1) {
            node.velocity = (target - node.position) / dt;
            node.position = target;
        }
    }
}
