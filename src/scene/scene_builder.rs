//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for populating a state manager with actors.

use strata_core::{
    Actor, ActorBase, CollisionPrimitive, Counter, GameCharacter, ManagerConfig, Object, PhysicsActor,
    PhysicsMaterial, PhysicsState, RenderActor, RenderState, ScriptMsgKind, SplinePath, StateManager,
    StaticCollider, Timer, UniqueId, Vec3,
};
use strata_physics::CollisionFilter;
use strata_render::ParticleOrder;

/// Model ids used by the demo content
pub mod models {
    use strata_core::ModelId;

    pub const PLAYER: ModelId = ModelId(1);
    pub const GRUNT: ModelId = ModelId(2);
    pub const CRATE: ModelId = ModelId(3);
    pub const GLASS: ModelId = ModelId(4);
}

/// A populated state manager plus the names it was built with
pub struct Scene {
    pub manager: StateManager,
    names: Vec<(String, UniqueId)>,
}

impl Scene {
    pub fn get_by_name(&self, name: &str) -> Option<UniqueId> {
        self.names
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, id)| *id)
    }

    pub fn object_count(&self) -> usize {
        self.manager.len()
    }
}

/// Builder for constructing scenes
///
/// # Example
/// ```ignore
/// let scene = SceneBuilder::new()
///     .add_floor(0.0, PhysicsMaterial::STONE)
///     .add_player(Vec3::new(0.0, 1.0, 8.0))
///     .add_grunt("grunt", Vec3::ZERO, 100.0)
///     .build();
/// ```
pub struct SceneBuilder {
    manager: StateManager,
    names: Vec<(String, UniqueId)>,
    player_start: Option<Vec3>,
}

impl SceneBuilder {
    /// Create a new scene builder
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            manager: StateManager::with_config(config),
            names: Vec::new(),
            player_start: None,
        }
    }

    fn spawn_named(&mut self, name: &str, build: impl FnOnce(UniqueId, String) -> Object) -> UniqueId {
        let owned = name.to_string();
        let id = self.manager.spawn(|id| build(id, owned));
        self.names.push((name.to_string(), id));
        id
    }

    fn id(&self, name: &str) -> Option<UniqueId> {
        self.names
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, id)| *id)
    }

    /// Add a floor collider at the given Y position
    pub fn add_floor(mut self, y: f32, material: PhysicsMaterial) -> Self {
        self.manager.add_static_collider(StaticCollider::floor(y, material));
        self
    }

    /// Add a wall plane with the given normal and distance from origin
    pub fn add_wall(mut self, normal: Vec3, distance: f32, material: PhysicsMaterial) -> Self {
        self.manager
            .add_static_collider(StaticCollider::plane(normal, distance, material));
        self
    }

    /// Add the player body and register it with the state manager
    pub fn add_player(mut self, position: Vec3) -> Self {
        self.player_start = Some(position);
        let id = self.spawn_named("player", |id, name| {
            let base = ActorBase::named(id, name).activated().with_position(position);
            let physics = PhysicsState::new(
                CollisionPrimitive::sphere(0.5)
                    .with_offset(Vec3::new(0.0, 0.5, 0.0))
                    .with_filter(CollisionFilter::player())
                    .with_material(PhysicsMaterial::ORGANIC),
            )
            .with_mass(80.0);
            Object::Render(RenderActor::new(base, physics, RenderState::new(models::PLAYER)))
        });
        self.manager.set_player(Some(id));
        self
    }

    /// Add an AI character with fresh state machines
    pub fn add_grunt(mut self, name: &str, position: Vec3, health: f32) -> Self {
        let id = self.spawn_named(name, |id, name| {
            let base = ActorBase::named(id, name).activated().with_position(position);
            let render = RenderState::new(models::GRUNT).with_emitter("dust", ParticleOrder::WithActorFirst, 0.3);
            Object::Character(GameCharacter::humanoid(base, render, health))
        });
        self.setup_machines(id);
        self
    }

    /// Add a character that walks a spline through `points`
    pub fn add_patrol(mut self, name: &str, points: Vec<Vec3>, closed: bool) -> Self {
        let path = if closed {
            SplinePath::closed(points)
        } else {
            SplinePath::new(points)
        };
        let path = self.manager.add_spline(path);
        let id = self.spawn_named(name, |id, name| {
            let base = ActorBase::named(id, name).activated();
            Object::Character(GameCharacter::humanoid(base, RenderState::new(models::GRUNT), 60.0))
        });
        let attached = self.manager.with_object(id, |object, mgr| {
            object
                .character_mut()
                .is_some_and(|character| character.set_spline_path_id(mgr, path))
        });
        if attached != Ok(true) {
            log::warn!("'{}' could not attach to its patrol path", name);
        }
        self.setup_machines(id);
        self
    }

    fn setup_machines(&mut self, id: UniqueId) {
        let _ = self.manager.with_object(id, |object, mgr| {
            if let Some(character) = object.character_mut() {
                character.setup_ai_state_machine(mgr);
                character.setup_anim_state_machine(mgr);
            }
        });
    }

    /// Add a dynamic crate with a box body
    pub fn add_crate(mut self, name: &str, position: Vec3, size: f32) -> Self {
        let half = size / 2.0;
        self.spawn_named(name, |id, name| {
            let base = ActorBase::named(id, name)
                .activated()
                .with_position(position)
                .with_touch_extents(Some(strata_core::Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(half))));
            let physics = PhysicsState::new(
                CollisionPrimitive::cuboid(Vec3::splat(half)).with_material(PhysicsMaterial::WOOD),
            )
            .with_mass(10.0);
            Object::Render(RenderActor::new(base, physics, RenderState::new(models::CRATE)))
        });
        self
    }

    /// Add static translucent scenery with no body
    pub fn add_window(mut self, name: &str, position: Vec3) -> Self {
        self.spawn_named(name, |id, name| {
            let base = ActorBase::named(id, name).activated().with_position(position);
            Object::Render(RenderActor::scenery(base, RenderState::new(models::GLASS).translucent()))
        });
        self
    }

    /// Add a one-shot pressure plate that sends `message` to the named target
    pub fn add_pressure_plate(mut self, name: &str, position: Vec3, target: &str, message: ScriptMsgKind) -> Self {
        let target = self.id(target);
        if target.is_none() {
            log::warn!("pressure plate '{}' has no target", name);
        }
        self.spawn_named(name, |id, name| {
            let mut base = ActorBase::named(id, name).activated().with_position(position);
            if let Some(target) = target {
                base = base.with_target(target);
            }
            Object::Actor(Actor::trigger(base, message).once())
        });
        self
    }

    /// Add a counter that fires `MaxReached` at the named target
    pub fn add_counter(mut self, name: &str, max: u32, target: &str) -> Self {
        let target = self.id(target);
        self.spawn_named(name, |id, name| {
            let mut counter = Counter::new(id, name, max);
            if let Some(target) = target {
                counter = counter.with_target(target);
            }
            Object::Entity(Box::new(counter))
        });
        self
    }

    /// Add a repeating timer that sends `Action` to the named target
    pub fn add_timer(mut self, name: &str, period: f32, target: &str) -> Self {
        let target = self.id(target);
        self.spawn_named(name, |id, name| {
            let mut timer = Timer::new(id, name, period).repeating().running();
            if let Some(target) = target {
                timer = timer.with_target(target);
            }
            Object::Entity(Box::new(timer))
        });
        self
    }

    /// Add a custom object to the scene
    ///
    /// For objects that don't fit the standard patterns.
    pub fn add_object(mut self, name: &str, build: impl FnOnce(UniqueId, String) -> Object) -> Self {
        self.spawn_named(name, build);
        self
    }

    /// Add a bare physics body without a model
    pub fn add_body(mut self, name: &str, position: Vec3, physics: PhysicsState) -> Self {
        self.spawn_named(name, |id, name| {
            let base = ActorBase::named(id, name).activated().with_position(position);
            Object::Physics(PhysicsActor::new(base, physics))
        });
        self
    }

    /// Build the scene
    pub fn build(self) -> Scene {
        Scene {
            manager: self.manager,
            names: self.names,
        }
    }

    /// Get the player's starting position (if a player was added)
    pub fn player_start(&self) -> Option<Vec3> {
        self.player_start
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The arena the headless demo runs
pub fn demo_scene(config: ManagerConfig) -> Scene {
    SceneBuilder::with_config(config)
        .add_floor(0.0, PhysicsMaterial::STONE)
        .add_wall(Vec3::new(1.0, 0.0, 0.0), -20.0, PhysicsMaterial::STONE)
        .add_wall(Vec3::new(-1.0, 0.0, 0.0), -20.0, PhysicsMaterial::STONE)
        .add_player(Vec3::new(0.0, 0.0, 8.0))
        .add_grunt("grunt", Vec3::new(0.0, 0.0, -4.0), 100.0)
        .add_patrol(
            "sentry",
            vec![
                Vec3::new(-10.0, 0.0, -10.0),
                Vec3::new(10.0, 0.0, -10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(-10.0, 0.0, 10.0),
            ],
            true,
        )
        .add_crate("crate", Vec3::new(3.0, 2.0, 0.0), 1.0)
        .add_window("window", Vec3::new(-3.0, 1.0, 0.0))
        .add_counter("alarm", 2, "grunt")
        .add_pressure_plate("plate", Vec3::new(0.0, 0.0, 6.0), "alarm", ScriptMsgKind::Increment)
        .build()
}
