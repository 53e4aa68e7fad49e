//! The tagged dispatch table over every object layer
//!
//! The state manager stores one [`Object`] per id. Systems ask it for the
//! capability they need and skip objects that lack it.

use crate::actor::{Actor, Damageable, Spatial};
use crate::anim::Animatable;
use crate::character::GameCharacter;
use crate::entity::Thinkable;
use crate::id::UniqueId;
use crate::physics_actor::{Collidable, PhysicsActor};
use crate::render_actor::{RenderActor, Renderable};
use crate::type_tag::TypeTag;

pub enum Object {
    /// Bare entities such as script relays, timers and counters
    Entity(Box<dyn Thinkable>),
    Actor(Actor),
    Physics(PhysicsActor),
    Render(RenderActor),
    Character(GameCharacter),
}

impl Object {
    pub fn thinkable(&self) -> &dyn Thinkable {
        match self {
            Object::Entity(e) => e.as_ref(),
            Object::Actor(a) => a,
            Object::Physics(p) => p,
            Object::Render(r) => r,
            Object::Character(c) => c,
        }
    }

    pub fn thinkable_mut(&mut self) -> &mut dyn Thinkable {
        match self {
            Object::Entity(e) => e.as_mut(),
            Object::Actor(a) => a,
            Object::Physics(p) => p,
            Object::Render(r) => r,
            Object::Character(c) => c,
        }
    }

    pub fn spatial(&self) -> Option<&dyn Spatial> {
        match self {
            Object::Entity(_) => None,
            Object::Actor(a) => Some(a),
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
        }
    }

    pub fn spatial_mut(&mut self) -> Option<&mut dyn Spatial> {
        match self {
            Object::Entity(_) => None,
            Object::Actor(a) => Some(a),
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
        }
    }

    pub fn damageable(&self) -> Option<&dyn Damageable> {
        match self {
            Object::Entity(_) => None,
            Object::Actor(a) => Some(a),
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
        }
    }

    pub fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        match self {
            Object::Entity(_) => None,
            Object::Actor(a) => Some(a),
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
        }
    }

    pub fn collidable(&self) -> Option<&dyn Collidable> {
        match self {
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        match self {
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn renderable(&self) -> Option<&dyn Renderable> {
        match self {
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        match self {
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn animatable_mut(&mut self) -> Option<&mut dyn Animatable> {
        match self {
            Object::Physics(p) => Some(p),
            Object::Render(r) => Some(r),
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn character(&self) -> Option<&GameCharacter> {
        match self {
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn character_mut(&mut self) -> Option<&mut GameCharacter> {
        match self {
            Object::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.thinkable().type_tag()
    }

    pub fn id(&self) -> UniqueId {
        self.thinkable().id()
    }

    pub fn is_active(&self) -> bool {
        self.thinkable().is_active()
    }
}

impl From<Actor> for Object {
    fn from(actor: Actor) -> Self {
        Object::Actor(actor)
    }
}

impl From<PhysicsActor> for Object {
    fn from(actor: PhysicsActor) -> Self {
        Object::Physics(actor)
    }
}

impl From<RenderActor> for Object {
    fn from(actor: RenderActor) -> Self {
        Object::Render(actor)
    }
}

impl From<GameCharacter> for Object {
    fn from(character: GameCharacter) -> Self {
        Object::Character(character)
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("tag", &self.type_tag())
            .field("id", &self.id())
            .field("name", &self.thinkable().name())
            .field("active", &self.is_active())
            .finish()
    }
}
