//! World domain: an in-memory geometry service made of boxes and balls.
//!
//! Used for headless simulation and tests where the physics engine is not running.
//! Rays that start inside a shape do not report it.

use bevy::prelude::*;

use super::query::{ColliderKind, GeometryQuery, Overlap, QueryFilter, RayHit};
use crate::core::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    pub entity: Entity,
    pub kind: ColliderKind,
    pub shape: StaticShape,
    pub center: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Clone, Default)]
pub struct StaticGeometry {
    colliders: Vec<StaticCollider>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cuboid(
        &mut self,
        entity: Entity,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        kind: ColliderKind,
    ) -> &mut Self {
        self.colliders.push(StaticCollider {
            entity,
            kind,
            shape: StaticShape::Cuboid { half_extents },
            center,
            rotation,
        });
        self
    }

    pub fn add_ball(
        &mut self,
        entity: Entity,
        center: Vec3,
        radius: f32,
        kind: ColliderKind,
    ) -> &mut Self {
        self.colliders.push(StaticCollider {
            entity,
            kind,
            shape: StaticShape::Ball { radius },
            center,
            rotation: Quat::IDENTITY,
        });
        self
    }

    /// Moves every shape registered for `entity`.
    pub fn move_collider(&mut self, entity: Entity, center: Vec3) {
        for collider in self.colliders.iter_mut().filter(|c| c.entity == entity) {
            collider.center = center;
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.colliders.retain(|c| c.entity != entity);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl GeometryQuery for StaticGeometry {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Vec<RayHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };

        let mut hits: Vec<RayHit> = self
            .colliders
            .iter()
            .filter(|c| filter.accepts(c.entity, c.kind))
            .filter_map(|c| {
                let (distance, normal) = match c.shape {
                    StaticShape::Cuboid { half_extents } => {
                        ray_cuboid(origin, direction, c.center, c.rotation, half_extents)?
                    }
                    StaticShape::Ball { radius } => ray_ball(origin, direction, c.center, radius)?,
                };
                (distance <= max_distance).then(|| RayHit {
                    collider: c.entity,
                    kind: c.kind,
                    point: origin + direction * distance,
                    normal,
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: &QueryFilter) -> Vec<Overlap> {
        self.colliders
            .iter()
            .filter(|c| filter.accepts(c.entity, c.kind))
            .filter(|c| match c.shape {
                StaticShape::Cuboid { half_extents } => {
                    let local = c.rotation.inverse() * (center - c.center);
                    let closest = local.clamp(-half_extents, half_extents);
                    local.distance_squared(closest) <= radius * radius
                }
                StaticShape::Ball { radius: other } => {
                    center.distance_squared(c.center) <= (radius + other) * (radius + other)
                }
            })
            .map(|c| Overlap {
                collider: c.entity,
                kind: c.kind,
            })
            .collect()
    }
}

fn ray_cuboid(
    origin: Vec3,
    direction: Vec3,
    center: Vec3,
    rotation: Quat,
    half_extents: Vec3,
) -> Option<(f32, Vec3)> {
    let inverse = rotation.inverse();
    let o = (inverse * (origin - center)).to_array();
    let d = (inverse * direction).to_array();
    let h = half_extents.to_array();

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_normal = Vec3::ZERO;

    for axis in 0..3 {
        if d[axis].abs() < EPSILON {
            if o[axis].abs() > h[axis] {
                return None;
            }
            continue;
        }

        let mut t1 = (-h[axis] - o[axis]) / d[axis];
        let mut t2 = (h[axis] - o[axis]) / d[axis];
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        if t1 > t_enter {
            t_enter = t1;
            let mut normal = [0.0; 3];
            normal[axis] = -d[axis].signum();
            enter_normal = Vec3::from_array(normal);
        }
        t_exit = t_exit.min(t2);

        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 {
        return None;
    }

    Some((t_enter, rotation * enter_normal))
}

fn ray_ball(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;

    if c < 0.0 || b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = -b - discriminant.sqrt();
    let point = origin + direction * distance;
    Some((distance, (point - center).normalize_or_zero()))
}
