//! World domain: arena of ropes and edges addressed by stable handles.
//!
//! Removing an item leaves an empty slot, so handles held by characters never point at
//! a different item; lookups on removed handles return `None`.

use bevy::prelude::*;

use super::edge::Edge;
use super::rope::{Rope, RopeSegment};

/// Slack added to the body radius when testing edge contact, so a body resting on the
/// hang anchor keeps touching its edge.
const EDGE_CONTACT_MARGIN: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

/// A single segment of a rope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentRef {
    pub rope: RopeId,
    pub index: usize,
}

/// Capsule approximating a character body, used for contact tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyCapsule {
    pub bottom: Vec3,
    pub top: Vec3,
    pub radius: f32,
}

impl BodyCapsule {
    /// Capsule standing on `feet`.
    pub fn standing(feet: Vec3, height: f32, radius: f32) -> Self {
        let radius = radius.min(height * 0.5);
        Self {
            bottom: feet + Vec3::Y * radius,
            top: feet + Vec3::Y * (height - radius),
            radius,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Climbables {
    ropes: Vec<Option<Rope>>,
    edges: Vec<Option<Edge>>,
}

impl Climbables {
    pub fn add_rope(&mut self, rope: Rope) -> RopeId {
        self.ropes.push(Some(rope));
        RopeId((self.ropes.len() - 1) as u32)
    }

    pub fn remove_rope(&mut self, id: RopeId) -> Option<Rope> {
        self.ropes.get_mut(id.0 as usize)?.take()
    }

    pub fn rope(&self, id: RopeId) -> Option<&Rope> {
        self.ropes.get(id.0 as usize)?.as_ref()
    }

    pub fn rope_mut(&mut self, id: RopeId) -> Option<&mut Rope> {
        self.ropes.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        self.edges.push(Some(edge));
        EdgeId((self.edges.len() - 1) as u32)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.edges.get_mut(id.0 as usize)?.take()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)?.as_ref()
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn segment(&self, segment: SegmentRef) -> Option<RopeSegment> {
        self.rope(segment.rope)?.segment(segment.index)
    }

    pub fn ropes(&self) -> impl Iterator<Item = (RopeId, &Rope)> {
        self.ropes
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|r| (RopeId(i as u32), r)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    /// First edge whose grab box touches the body.
    pub fn edge_contact(&self, body: &BodyCapsule) -> Option<EdgeId> {
        self.edges().find_map(|(id, edge)| {
            let touching = [0.0, 0.5, 1.0].into_iter().any(|t| {
                edge.intersects_sphere(body.bottom.lerp(body.top, t), body.radius + EDGE_CONTACT_MARGIN)
            });
            touching.then_some(id)
        })
    }

    /// All rope segments touching the body, top segments first within each rope.
    pub fn rope_contacts(&self, body: &BodyCapsule) -> Vec<SegmentRef> {
        let mut contacts = Vec::new();
        for (id, rope) in self.ropes() {
            for (index, segment) in rope.segments().enumerate() {
                let distance =
                    segment_distance(body.bottom, body.top, segment.bottom, segment.top);
                if distance <= body.radius + segment.radius {
                    contacts.push(SegmentRef { rope: id, index });
                }
            }
        }
        contacts
    }

    pub fn step_ropes(&mut self, dt: f32, gravity: Vec3) {
        for rope in self.ropes.iter_mut().flatten() {
            rope.step(dt, gravity);
        }
    }
}

/// Shortest distance between segments `p1-q1` and `p2-q2`.
pub fn segment_distance(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    const SMALL: f32 = 1.0e-6;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= SMALL && e <= SMALL {
        (0.0, 0.0)
    } else if a <= SMALL {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= SMALL {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > SMALL {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s).distance(p2 + d2 * t)
}
