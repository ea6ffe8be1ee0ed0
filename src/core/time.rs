//! Core domain: global hit pause and per-character time scaling.

use bevy::prelude::*;

/// Global freeze-frame requested by landed hits.
///
/// Windows are measured on the real clock so the pause itself is never slowed down.
/// While a window is active the virtual clock runs at relative speed 0, which stops
/// `FixedUpdate` and zeroes the `Update` delta for every character at once.
#[derive(Resource, Debug, Default, Clone)]
pub struct HitPause {
    window: Option<PauseWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PauseWindow {
    start: f32,
    end: f32,
}

impl HitPause {
    /// Requests a pause of `duration` seconds starting `delay` seconds after `now`.
    /// Overlapping requests extend the current window instead of restarting it.
    pub fn request(&mut self, now: f32, duration: f32, delay: f32) {
        if duration <= 0.0 {
            return;
        }

        let start = now + delay.max(0.0);
        let end = start + duration;

        self.window = Some(match self.window {
            Some(current) if current.end >= start => PauseWindow {
                start: current.start.min(start),
                end: current.end.max(end),
            },
            _ => PauseWindow { start, end },
        });
    }

    /// Relative speed the virtual clock should run at.
    pub fn time_scale(&self, now: f32) -> f32 {
        match self.window {
            Some(window) if now >= window.start && now < window.end => 0.0,
            _ => 1.0,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.window.is_some()
    }

    pub fn clear_expired(&mut self, now: f32) {
        if self.window.is_some_and(|w| now >= w.end) {
            self.window = None;
        }
    }
}

/// Optional per-character multiplier applied to the late-phase delta.
#[derive(Component, Debug, Clone, Copy)]
pub struct CharacterTime {
    pub scale: f32,
}

impl Default for CharacterTime {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl CharacterTime {
    pub fn scaled(&self, dt: f32) -> f32 {
        dt * self.scale.max(0.0)
    }
}

pub(crate) fn apply_hit_pause(
    real: Res<Time<Real>>,
    mut pause: ResMut<HitPause>,
    mut virtual_time: ResMut<Time<Virtual>>,
) {
    let now = real.elapsed_secs();
    let scale = pause.time_scale(now);

    if (virtual_time.relative_speed() - scale).abs() > f32::EPSILON {
        debug!("Hit pause: virtual time scale -> {}", scale);
        virtual_time.set_relative_speed(scale);
    }

    pause.clear_expired(now);
}
