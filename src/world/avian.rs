//! World domain: geometry queries backed by Avian's spatial query pipeline.

use avian3d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::query::{ColliderKind, GeometryQuery, Overlap, QueryFilter, RayHit};

/// Upper bound on hits gathered per ray.
const MAX_RAY_HITS: u32 = 16;

/// Physics layers for collision filtering
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Static and dynamic level geometry
    Level,
    /// Standing characters
    Character,
    /// Knocked-out or dead characters, which only collide with the level
    Fallen,
    /// Grab volumes and hazards
    Sensor,
}

impl GameLayer {
    pub fn character() -> CollisionLayers {
        CollisionLayers::new(
            GameLayer::Character,
            [GameLayer::Default, GameLayer::Level, GameLayer::Character],
        )
    }

    pub fn fallen() -> CollisionLayers {
        CollisionLayers::new(GameLayer::Fallen, [GameLayer::Default, GameLayer::Level])
    }

    pub fn level() -> CollisionLayers {
        CollisionLayers::new(
            GameLayer::Level,
            [GameLayer::Character, GameLayer::Fallen, GameLayer::Default],
        )
    }
}

/// Marks a collider as belonging to a character body.
#[derive(Component, Debug, Default)]
pub struct CharacterCollider;

/// Marks solid geometry a character can push against.
#[derive(Component, Debug, Default)]
pub struct Pushable;

#[derive(SystemParam)]
pub struct AvianGeometry<'w, 's> {
    spatial: SpatialQuery<'w, 's>,
    kinds: Query<'w, 's, (Has<Sensor>, Has<CharacterCollider>, Has<Pushable>)>,
}

impl AvianGeometry<'_, '_> {
    fn kind_of(&self, entity: Entity) -> ColliderKind {
        match self.kinds.get(entity) {
            Ok((true, _, _)) => ColliderKind::Trigger,
            Ok((_, true, _)) => ColliderKind::Character,
            Ok((_, _, true)) => ColliderKind::Pushable,
            _ => ColliderKind::Solid,
        }
    }

    fn spatial_filter(filter: &QueryFilter) -> SpatialQueryFilter {
        match filter.exclude {
            Some(entity) => SpatialQueryFilter::default().with_excluded_entities([entity]),
            None => SpatialQueryFilter::default(),
        }
    }
}

impl GeometryQuery for AvianGeometry<'_, '_> {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Vec<RayHit> {
        let Ok(direction) = Dir3::new(direction) else {
            return Vec::new();
        };

        let mut hits: Vec<RayHit> = self
            .spatial
            .ray_hits(
                origin,
                direction,
                max_distance,
                MAX_RAY_HITS,
                true,
                &Self::spatial_filter(filter),
            )
            .into_iter()
            .filter_map(|hit| {
                let kind = self.kind_of(hit.entity);
                filter.accepts(hit.entity, kind).then(|| RayHit {
                    collider: hit.entity,
                    kind,
                    point: origin + *direction * hit.distance,
                    normal: hit.normal,
                    distance: hit.distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: &QueryFilter) -> Vec<Overlap> {
        self.spatial
            .shape_intersections(
                &Collider::sphere(radius),
                center,
                Quat::IDENTITY,
                &Self::spatial_filter(filter),
            )
            .into_iter()
            .filter_map(|collider| {
                let kind = self.kind_of(collider);
                filter
                    .accepts(collider, kind)
                    .then_some(Overlap { collider, kind })
            })
            .collect()
    }
}
