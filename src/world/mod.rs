//! World domain: geometry queries, climbable ropes and edges, hazard volumes.

use avian3d::prelude::Gravity;
use bevy::prelude::*;

pub mod avian;
pub mod climbables;
pub mod edge;
pub mod query;
pub mod rope;
pub mod static_geometry;


pub use avian::{AvianGeometry, CharacterCollider, GameLayer, Pushable};
pub use climbables::{BodyCapsule, Climbables, EdgeId, RopeId, SegmentRef};
pub use edge::Edge;
pub use query::{ColliderKind, GeometryQuery, Overlap, QueryFilter, RayHit};
pub use rope::{Rope, RopeSegment};
pub use static_geometry::StaticGeometry;

use crate::core::SimSet;

/// Binds an entity's transform to an edge in the arena, so moving platforms carry their ledges.
#[derive(Component, Debug, Clone, Copy)]
pub struct EdgeVolume {
    pub id: EdgeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    /// Kills any character that enters.
    Death,
    /// Knocks characters over while they stay inside.
    Fall,
}

/// Axis-aligned hazard box centered on the entity's transform.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hazard {
    pub kind: HazardKind,
    pub half_extents: Vec3,
}

impl Hazard {
    pub fn contains(&self, center: Vec3, point: Vec3) -> bool {
        let local = (point - center).abs();
        local.x <= self.half_extents.x
            && local.y <= self.half_extents.y
            && local.z <= self.half_extents.z
    }
}

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Climbables>()
            .add_systems(Update, sync_edge_volumes.in_set(SimSet::Intent))
            .add_systems(FixedUpdate, step_ropes.in_set(SimSet::Fixed));
    }
}

pub(crate) fn sync_edge_volumes(
    mut climbables: ResMut<Climbables>,
    volumes: Query<(&EdgeVolume, &GlobalTransform), Changed<GlobalTransform>>,
) {
    for (volume, transform) in &volumes {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        match climbables.edge_mut(volume.id) {
            Some(edge) => edge.set_pose(translation, rotation),
            None => warn!("Edge volume points at removed edge {:?}", volume.id),
        }
    }
}

pub(crate) fn step_ropes(time: Res<Time>, gravity: Res<Gravity>, mut climbables: ResMut<Climbables>) {
    climbables.step_ropes(time.delta_secs(), gravity.0);
}
