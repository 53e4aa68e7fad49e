//! Particle effects attached to an actor
//!
//! Emitters are started by animation events and drawn either just before or
//! just after their actor's sorted geometry.

use serde::{Deserialize, Serialize};

/// Whether an emitter draws before or after its actor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleOrder {
    /// Behind the actor (dust kicked up at the feet)
    WithActorFirst,
    /// In front of the actor (sparks, breath)
    #[default]
    WithActorLast,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleEmitter {
    pub name: String,
    pub order: ParticleOrder,
    /// How long one trigger keeps the emitter alive
    pub duration: f32,
    remaining: f32,
}

impl ParticleEmitter {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// The emitters owned by one actor
#[derive(Clone, Debug, Default)]
pub struct AnimParticleManager {
    emitters: Vec<ParticleEmitter>,
}

impl AnimParticleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an emitter and return its index
    pub fn add_emitter(&mut self, name: impl Into<String>, order: ParticleOrder, duration: f32) -> usize {
        self.emitters.push(ParticleEmitter {
            name: name.into(),
            order,
            duration,
            remaining: 0.0,
        });
        self.emitters.len() - 1
    }

    /// Start (or restart) every emitter with this name
    pub fn trigger(&mut self, name: &str) -> bool {
        let mut found = false;
        for emitter in self.emitters.iter_mut().filter(|e| e.name == name) {
            emitter.remaining = emitter.duration;
            found = true;
        }
        found
    }

    pub fn advance(&mut self, dt: f32) {
        for emitter in &mut self.emitters {
            emitter.remaining = (emitter.remaining - dt).max(0.0);
        }
    }

    pub fn stop_all(&mut self) {
        for emitter in &mut self.emitters {
            emitter.remaining = 0.0;
        }
    }

    /// Active emitters drawn with the given order, with their indices
    pub fn active(&self, order: ParticleOrder) -> impl Iterator<Item = (usize, &ParticleEmitter)> {
        self.emitters
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.order == order && e.is_active())
    }

    pub fn any_active(&self) -> bool {
        self.emitters.iter().any(ParticleEmitter::is_active)
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }
}
