//! Characters domain: the index of every character in play.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::world::{GeometryQuery, QueryFilter};

/// Occluders closer than this to the sighted point do not block the view.
const SIGHT_TOLERANCE: f32 = 0.5;

/// Team a character fights for. Characters without one are grouped by whether an AI drives them.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharacterSide(pub i32);

/// Marks the character driven by the local player.
#[derive(Component, Debug, Default)]
pub struct Player;

/// Snapshot of one character, refreshed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterEntry {
    pub entity: Entity,
    pub feet: Vec3,
    pub height: f32,
    pub radius: f32,
    pub side: Option<i32>,
    pub has_ai: bool,
    pub is_player: bool,
    pub alive: bool,
}

impl CharacterEntry {
    pub fn is_same_side(&self, other: &CharacterEntry) -> bool {
        match (self.side, other.side) {
            (Some(a), Some(b)) => a == b,
            _ => self.has_ai == other.has_ai,
        }
    }

    /// Point `fraction` of the body height above the feet.
    pub fn position_at_height(&self, fraction: f32) -> Vec3 {
        self.feet + Vec3::Y * fraction * self.height
    }
}

/// What the main camera sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub clip_from_world: Mat4,
    /// Viewport width over height.
    pub aspect: f32,
}

impl CameraView {
    /// View of a rendering camera. None until the camera knows its viewport size.
    pub fn from_camera(camera: &Camera, transform: &GlobalTransform) -> Option<Self> {
        let size = camera.logical_viewport_size()?;
        if size.y <= f32::EPSILON {
            return None;
        }
        Some(Self {
            position: transform.translation(),
            clip_from_world: camera.clip_from_view() * transform.to_matrix().inverse(),
            aspect: size.x / size.y,
        })
    }

    /// Viewport coordinates in `[0, 1]` across the screen, and the depth in front of the camera.
    pub fn viewport_point(&self, position: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.clip_from_world * position.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some((Vec2::new(ndc.x, ndc.y) * 0.5 + 0.5, clip.w))
    }
}

#[derive(Resource, Debug, Default)]
pub struct CharacterRegistry {
    entries: HashMap<Entity, CharacterEntry>,
    /// Registration order, so iteration is stable.
    order: Vec<Entity>,
    main_player: Option<Entity>,
}

impl CharacterRegistry {
    /// Adds or refreshes a character. Returns true when it was not known before.
    pub fn register(&mut self, entry: CharacterEntry) -> bool {
        let is_new = self.entries.insert(entry.entity, entry).is_none();
        if is_new {
            self.order.push(entry.entity);
        }
        if self.main_player.is_none() && entry.is_player {
            self.main_player = Some(entry.entity);
        }
        is_new
    }

    pub fn unregister(&mut self, entity: Entity) -> Option<CharacterEntry> {
        let removed = self.entries.remove(&entity)?;
        self.order.retain(|e| *e != entity);
        if self.main_player == Some(entity) {
            self.main_player = None;
        }
        Some(removed)
    }

    pub fn get(&self, entity: Entity) -> Option<&CharacterEntry> {
        self.entries.get(&entity)
    }

    /// Living characters, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &CharacterEntry> {
        self.order
            .iter()
            .filter_map(|entity| self.entries.get(entity))
            .filter(|entry| entry.alive)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn main_player(&self) -> Option<&CharacterEntry> {
        self.main_player.and_then(|entity| self.entries.get(&entity))
    }

    /// False when either character is unknown.
    pub fn is_same_side(&self, a: Entity, b: Entity) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.is_same_side(b),
            _ => false,
        }
    }

    /// Whether the point `height` (fraction of body height) above the character's feet is on
    /// screen, widened by `margin` of the viewport, and not hidden behind level geometry.
    pub fn is_in_sight(
        &self,
        entity: Entity,
        height: f32,
        margin: f32,
        view: &CameraView,
        geometry: &dyn GeometryQuery,
    ) -> bool {
        let Some(entry) = self.get(entity) else {
            return false;
        };
        let position = entry.position_at_height(height);

        let Some((viewport, depth)) = view.viewport_point(position) else {
            return false;
        };
        let horizontal_margin = if view.aspect > f32::EPSILON {
            margin / view.aspect
        } else {
            margin
        };
        let on_screen = viewport.x >= -horizontal_margin
            && viewport.x <= 1.0 + horizontal_margin
            && viewport.y >= -margin
            && viewport.y <= 1.0 + margin
            && depth > 0.0;
        if !on_screen {
            return false;
        }

        let to_point = position - view.position;
        let distance = to_point.length();
        geometry
            .first_hit(view.position, to_point, distance, &QueryFilter::level_only())
            .is_none_or(|hit| hit.distance >= distance - SIGHT_TOLERANCE)
    }
}
