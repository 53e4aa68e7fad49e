//! Actor hierarchy for the Strata runtime
//!
//! Every simulated object is one of five layers, each built on the one
//! below it:
//!
//! - [`Entity`](entity) - Identity, activation and the two-phase tick ([`Thinkable`])
//! - [`Actor`] - Spatial bounds, visibility, touch and damage ([`Spatial`], [`Damageable`])
//! - [`PhysicsActor`] - A body for the collision solver ([`Collidable`])
//! - [`RenderActor`] - Render submission, particles and shadows ([`Renderable`], [`Animatable`])
//! - [`GameCharacter`] - AI and animation state machines, spline paths, thrown objects
//!
//! Objects live in the [`StateManager`], addressed by [`UniqueId`] and stored
//! as the [`Object`] dispatch table. The manager drives the tick
//! ([`StateManager::update`]); [`run_render_pass`] collects draw work into a
//! [`RenderManager`].

pub mod actor;
pub mod anim;
pub mod character;
pub mod collision_pass;
pub mod damage;
pub mod entity;
pub mod error;
pub mod fsm;
pub mod id;
pub mod message;
pub mod object;
pub mod physics_actor;
pub mod render_actor;
pub mod render_pass;
pub mod scheduler;
pub mod script;
pub mod state_manager;
pub mod transform;
pub mod type_tag;

pub use actor::{Actor, ActorBase, Damageable, Spatial};
pub use anim::{apply_root_motion, AdvancementDeltas, AnimEvent, AnimEventState, AnimUserNotify, Animatable};
pub use character::{CharacterState, GameCharacter, SplineFollow, THROWN_LIFETIME};
pub use collision_pass::{run_collision_pass, run_touch_pass, CollisionReport};
pub use damage::{
    compute_damage, DamageInfo, DamageKind, DamageOriginator, DamageResult, DamageVulnerability, HealthInfo,
};
pub use entity::{route_activation, EntityBase, Thinkable};
pub use error::CoreError;
pub use fsm::{AiInputs, AiState, AiStateMachine, AnimState, AnimStateMachine, FsmProperties};
pub use id::{Key, SplinePathId, UniqueId};
pub use message::{ScriptMsg, ScriptMsgKind};
pub use object::Object;
pub use physics_actor::{advance_body, finish_thrown, integrate, Collidable, PhysicsActor, PhysicsState, ThrownBy};
pub use render_actor::{
    prepare_scene, prepare_viewport, submit_model, view_depth, RenderActor, RenderState, Renderable, HIT_EMITTER,
};
pub use render_pass::{run_render_pass, sort_tie_break};
pub use scheduler::TickReport;
pub use script::{Counter, Relay, Timer};
pub use state_manager::{ManagerConfig, StateManager};
pub use transform::{DirtyFlags, Transform};
pub use type_tag::TypeTag;

// Re-export the collaborator crates' commonly used types
pub use strata_math::{Aabb, Quat, SplinePath, Vec3};
pub use strata_physics::{CollisionPrimitive, CollisionResponse, PhysicsMaterial, SolverConfig, StaticCollider};
pub use strata_render::{Camera, ModelId, RenderManager, SortLayer, Viewport};
