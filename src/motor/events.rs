//! Motor domain: typed notifications raised during a motor update.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::combat::Attack;

/// Receiver of motor notifications. Every method defaults to a no-op.
pub trait MotorListener {
    /// Landed after being airborne, with the downward speed at impact.
    fn on_land(&mut self, _speed: f32) {}
    fn on_step(&mut self, _position: Vec3) {}
    fn on_slide(&mut self, _position: Vec3) {}
    /// A strong dash ran into another character.
    fn on_dash_impact(&mut self, _target: Entity, _impulse: Vec3) {}
    fn on_attack(&mut self, _attack: &Attack) {}
    fn on_initiate_attack(&mut self) {}
    fn on_finish_attack(&mut self) {}
}

impl MotorListener for () {}

#[derive(Debug, Clone, PartialEq)]
pub enum MotorEvent {
    Land { speed: f32 },
    Step { position: Vec3 },
    Slide { position: Vec3 },
    DashImpact { target: Entity, impulse: Vec3 },
    Attack { state: String, damage: f32 },
    InitiateAttack,
    FinishAttack,
}

/// Collects every notification in order.
impl MotorListener for Vec<MotorEvent> {
    fn on_land(&mut self, speed: f32) {
        self.push(MotorEvent::Land { speed });
    }

    fn on_step(&mut self, position: Vec3) {
        self.push(MotorEvent::Step { position });
    }

    fn on_slide(&mut self, position: Vec3) {
        self.push(MotorEvent::Slide { position });
    }

    fn on_dash_impact(&mut self, target: Entity, impulse: Vec3) {
        self.push(MotorEvent::DashImpact { target, impulse });
    }

    fn on_attack(&mut self, attack: &Attack) {
        self.push(MotorEvent::Attack {
            state: attack.state.clone(),
            damage: attack.damage,
        });
    }

    fn on_initiate_attack(&mut self) {
        self.push(MotorEvent::InitiateAttack);
    }

    fn on_finish_attack(&mut self) {
        self.push(MotorEvent::FinishAttack);
    }
}

/// Motor notification broadcast to the rest of the app.
#[derive(Debug, Clone)]
pub struct MotorMessage {
    pub character: Entity,
    pub event: MotorEvent,
}

impl Message for MotorMessage {}
