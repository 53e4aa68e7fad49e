//! Animation events and advancement

use strata_math::{Quat, Vec3};

use crate::actor::Spatial;
use crate::message::ScriptMsgKind;
use crate::state_manager::StateManager;

/// Event embedded in an animation track
#[derive(Clone, Debug, PartialEq)]
pub enum AnimUserNotify {
    Footstep,
    /// Start the named particle emitter
    Particle(String),
    Sound(String),
    /// Send a script message to the actor's targets
    Script(ScriptMsgKind),
}

/// Whether playback is entering or leaving the event's window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimEventState {
    Entering,
    Exiting,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimEvent {
    pub notify: AnimUserNotify,
    pub state: AnimEventState,
    /// Animation time the event fired at
    pub time: f32,
}

impl AnimEvent {
    pub fn entering(notify: AnimUserNotify, time: f32) -> Self {
        Self {
            notify,
            state: AnimEventState::Entering,
            time,
        }
    }
}

/// How far animation moved this tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvancementDeltas {
    pub dt: f32,
    /// Root motion in the actor's local space
    pub translation: Vec3,
    pub rotation: Quat,
}

impl AdvancementDeltas {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn with_root_motion(mut self, translation: Vec3, rotation: Quat) -> Self {
        self.translation = translation;
        self.rotation = rotation;
        self
    }
}

/// Move `this` by root motion expressed in its own local space
pub fn apply_root_motion<T: Spatial + ?Sized>(this: &mut T, deltas: &AdvancementDeltas) {
    let moved = deltas.translation.length_squared() > 0.0;
    let turned = deltas.rotation != Quat::IDENTITY;
    if !moved && !turned {
        return;
    }
    let mut transform = *this.transform();
    transform.position += transform.rotation.rotate(deltas.translation);
    transform.rotation = deltas.rotation.compose(&transform.rotation).normalize();
    this.set_transform(transform);
}

/// Receives animation events and advancement
pub trait Animatable: Spatial {
    fn do_user_anim_event(&mut self, mgr: &mut StateManager, notify: &AnimUserNotify, state: AnimEventState, time: f32);

    fn on_animation_advancement(&mut self, deltas: &AdvancementDeltas);

    /// Events this actor's own animation produced since the last call
    fn take_anim_events(&mut self) -> Vec<AnimEvent> {
        Vec::new()
    }
}
