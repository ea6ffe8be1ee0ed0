//! World domain: the geometry query contract consumed by the simulation.

use bevy::prelude::*;

/// How the simulation treats a collider it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderKind {
    /// Static or dynamic level geometry.
    Solid,
    /// Solid geometry a character can push against.
    Pushable,
    /// Another character's body.
    Character,
    /// Non-blocking volume (rope segments, edge grabs, hazards).
    Trigger,
}

impl ColliderKind {
    pub fn is_solid(self) -> bool {
        !matches!(self, ColliderKind::Trigger)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub collider: Entity,
    pub kind: ColliderKind,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub collider: Entity,
    pub kind: ColliderKind,
}

/// Which colliders a query may report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QueryFilter {
    /// Collider never reported, normally the querying character itself.
    pub exclude: Option<Entity>,
    pub include_triggers: bool,
    pub include_characters: bool,
}

impl QueryFilter {
    /// Solid level geometry plus other characters, excluding `me`.
    pub fn solids_excluding(me: Entity) -> Self {
        Self {
            exclude: Some(me),
            include_triggers: false,
            include_characters: true,
        }
    }

    /// Level geometry only, no characters and no triggers.
    pub fn level_only() -> Self {
        Self {
            exclude: None,
            include_triggers: false,
            include_characters: false,
        }
    }

    pub fn with_characters(mut self) -> Self {
        self.include_characters = true;
        self
    }

    pub fn with_triggers(mut self) -> Self {
        self.include_triggers = true;
        self
    }

    pub fn accepts(&self, collider: Entity, kind: ColliderKind) -> bool {
        if self.exclude == Some(collider) {
            return false;
        }
        match kind {
            ColliderKind::Trigger => self.include_triggers,
            ColliderKind::Character => self.include_characters,
            ColliderKind::Solid | ColliderKind::Pushable => true,
        }
    }
}

/// Synchronous geometry service.
///
/// Queries that find nothing return empty results; they never fail.
pub trait GeometryQuery {
    /// All hits along the ray, ordered by increasing distance. `direction` need not be
    /// normalized; a zero direction yields no hits.
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Vec<RayHit>;

    /// Colliders intersecting a sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: &QueryFilter) -> Vec<Overlap>;

    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<RayHit> {
        self.ray_cast(origin, direction, max_distance, filter)
            .into_iter()
            .next()
    }
}
