//! PhysicsActor layer: movement and the collision contract

use log::trace;
use strata_math::Vec3;
use strata_physics::{CollisionInfoList, CollisionPrimitive, CollisionResponse, SurfaceKind};

use crate::actor::{Actor, ActorBase, Damageable, Spatial};
use crate::anim::{apply_root_motion, AdvancementDeltas, AnimEventState, AnimUserNotify, Animatable};
use crate::damage::{DamageInfo, DamageOriginator, DamageResult};
use crate::entity::{EntityBase, Thinkable};
use crate::id::{Key, UniqueId};
use crate::message::{ScriptMsg, ScriptMsgKind};
use crate::state_manager::StateManager;
use crate::transform::Transform;
use crate::type_tag::TypeTag;

/// Links a thrown object back to the character that threw it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrownBy {
    pub owner: UniqueId,
    /// Seconds until the object finishes on its own
    pub lifetime: f32,
}

/// Movement and collision state
#[derive(Clone, Debug)]
pub struct PhysicsState {
    pub velocity: Vec3,
    pub mass: f32,
    /// Immovable actors are never integrated or pushed
    pub movable: bool,
    pub gravity_scale: f32,
    /// Set by the collision pass when a contact holds this actor up
    pub grounded: bool,
    pub ground_surface: Option<SurfaceKind>,
    /// None excludes the actor from the collision solver entirely
    pub primitive: Option<CollisionPrimitive>,
    pub response: CollisionResponse,
    /// Dealt to whatever this actor collides with
    pub contact_damage: Option<DamageInfo>,
    /// Forward speed added per footstep event
    pub footstep_impulse: f32,
    pub thrown: Option<ThrownBy>,
    /// Number of `collided_with` notifications received
    pub collisions: u32,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 1.0,
            movable: true,
            gravity_scale: 1.0,
            grounded: false,
            ground_surface: None,
            primitive: None,
            response: CollisionResponse::default(),
            contact_damage: None,
            footstep_impulse: 0.0,
            thrown: None,
            collisions: 0,
        }
    }
}

impl PhysicsState {
    pub fn new(primitive: CollisionPrimitive) -> Self {
        Self {
            primitive: Some(primitive),
            ..Self::default()
        }
    }

    /// A body the solver never sees
    pub fn without_primitive() -> Self {
        Self::default()
    }

    /// Never moves, but still collides
    pub fn immovable(mut self) -> Self {
        self.movable = false;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(0.0);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_response(mut self, response: CollisionResponse) -> Self {
        self.response = response;
        self
    }

    pub fn with_contact_damage(mut self, damage: DamageInfo) -> Self {
        self.contact_damage = Some(damage);
        self
    }

    pub fn with_footstep_impulse(mut self, impulse: f32) -> Self {
        self.footstep_impulse = impulse;
        self
    }

    pub fn without_gravity(mut self) -> Self {
        self.gravity_scale = 0.0;
        self
    }

    pub fn thrown_by(mut self, owner: UniqueId, lifetime: f32) -> Self {
        self.thrown = Some(ThrownBy { owner, lifetime });
        self
    }
}

/// Movement and collision policy seen by the collision pass
pub trait Collidable: Damageable {
    fn physics(&self) -> &PhysicsState;
    fn physics_mut(&mut self) -> &mut PhysicsState;

    /// Whether the solver may integrate and push this actor
    fn will_move(&self, _mgr: &StateManager) -> bool {
        self.physics().movable && self.is_active()
    }

    fn collision_primitive(&self) -> Option<&CollisionPrimitive> {
        self.physics().primitive.as_ref()
    }

    /// World placement of the primitive's center
    fn primitive_transform(&self) -> Option<Transform> {
        self.collision_primitive().map(|p| {
            Transform::from_position_rotation(self.transform().position + p.offset, self.transform().rotation)
        })
    }

    /// How this actor wants an overlap with `other` resolved
    fn collision_resolution_response(&self, _mgr: &StateManager, _other: UniqueId) -> CollisionResponse {
        self.physics().response
    }

    /// Notification after resolution; `partner` is null for world geometry
    fn collided_with(&mut self, mgr: &mut StateManager, partner: UniqueId, contacts: &CollisionInfoList);

    fn weight(&self, mgr: &StateManager) -> f32 {
        self.physics().mass * mgr.gravity().abs()
    }
}

/// An actor with a body
#[derive(Clone, Debug)]
pub struct PhysicsActor {
    pub actor: Actor,
    pub physics: PhysicsState,
}

impl PhysicsActor {
    pub fn new(base: ActorBase, physics: PhysicsState) -> Self {
        let mut actor = Actor::new(base);
        if let Some(primitive) = physics.primitive {
            actor.base = actor.base.with_material(primitive.material);
        }
        Self { actor, physics }
    }
}

/// Apply gravity and move by the current velocity
pub fn integrate<T: Collidable + ?Sized>(this: &mut T, dt: f32, gravity: f32) {
    let physics = this.physics_mut();
    physics.grounded = false;
    physics.velocity.y += gravity * physics.gravity_scale * dt;
    let step = physics.velocity * dt;
    if step.length_squared() > 0.0 {
        this.translate(step);
    }
}

/// End a thrown object's flight: tell the owner and switch off
pub fn finish_thrown<T: Collidable + ?Sized>(this: &mut T, mgr: &mut StateManager) {
    let Some(thrown) = this.physics_mut().thrown.take() else {
        return;
    };
    let id = this.id();
    mgr.notify_thrown_object_finished(thrown.owner, id);
    mgr.post_message(id, ScriptMsg::new(ScriptMsgKind::Deactivate, id));
}

/// The body half of a physics think: thrown lifetime, then integration
///
/// `will_move` is asked of `this`, so layers that restrict movement are
/// honoured.
pub fn advance_body<T: Collidable + ?Sized>(this: &mut T, dt: f32, mgr: &mut StateManager) {
    let expired = match this.physics_mut().thrown.as_mut() {
        Some(thrown) => {
            thrown.lifetime -= dt;
            thrown.lifetime <= 0.0
        }
        None => false,
    };
    if expired {
        finish_thrown(this, mgr);
    }

    if this.will_move(mgr) {
        integrate(this, dt, mgr.gravity());
    }
}

impl Thinkable for PhysicsActor {
    fn base(&self) -> &EntityBase {
        &self.actor.base.entity
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.actor.base.entity
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::PhysicsActor
    }

    fn pre_think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.actor.pre_think(dt, mgr);
    }

    fn think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.actor.think(dt, mgr);
        advance_body(self, dt, mgr);
    }

    fn finalize(&mut self, mgr: &mut StateManager) {
        self.physics.velocity = Vec3::ZERO;
        if let Some(thrown) = self.physics.thrown.take() {
            mgr.notify_thrown_object_finished(thrown.owner, self.id());
        }
        self.actor.finalize(mgr);
    }
}

impl Spatial for PhysicsActor {
    fn actor(&self) -> &ActorBase {
        &self.actor.base
    }

    fn actor_mut(&mut self) -> &mut ActorBase {
        &mut self.actor.base
    }

    fn touch(&mut self, mgr: &mut StateManager, other: UniqueId) {
        self.actor.touch(mgr, other);
    }

    /// Leads the aim point by the current velocity
    fn aim_position(&self, mgr: &StateManager, dt: f32) -> Vec3 {
        self.actor.aim_position(mgr, dt) + self.physics.velocity * dt
    }

    fn notify_material_list_changed(&mut self) {
        self.actor.notify_material_list_changed();
        let material = self.actor.base.material;
        if let Some(primitive) = self.physics.primitive.as_mut() {
            primitive.material = material;
        }
    }
}

impl Damageable for PhysicsActor {
    fn notify_damage_event(
        &mut self,
        mgr: &mut StateManager,
        source: UniqueId,
        info: &DamageInfo,
        result: &DamageResult,
        originator: DamageOriginator,
    ) {
        if self.physics.movable && result.knockback.length_squared() > 0.0 {
            self.physics.velocity += result.knockback;
            self.physics.grounded = false;
        }
        self.actor.notify_damage_event(mgr, source, info, result, originator);
    }
}

impl Collidable for PhysicsActor {
    fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    fn physics_mut(&mut self) -> &mut PhysicsState {
        &mut self.physics
    }

    fn collided_with(&mut self, mgr: &mut StateManager, partner: UniqueId, contacts: &CollisionInfoList) {
        self.physics.collisions += 1;
        if let Some(ground) = contacts.iter().find(|c| c.is_ground()) {
            self.physics.grounded = true;
            self.physics.ground_surface = Some(ground.material.surface);
        }

        let id = self.id();
        if let (Some(damage), false) = (self.physics.contact_damage, partner.is_null()) {
            // Contact normals point at us, so the hit travels the other way
            let direction = contacts.deepest().map_or(Vec3::ZERO, |c| -c.normal);
            let hit = DamageInfo { direction, ..damage };
            if let Ok(result) = mgr.apply_damage(partner, id, &hit) {
                if let (true, Some(thrown)) = (result.died, self.physics.thrown) {
                    mgr.notify_thrown_object_kill(thrown.owner, id, *self.transform());
                }
            }
        }

        trace!("'{}' collided with {:?} ({} contacts)", self.name(), partner, contacts.len());
        if self.physics.thrown.is_some() {
            finish_thrown(self, mgr);
        }
    }
}

impl Animatable for PhysicsActor {
    fn do_user_anim_event(&mut self, mgr: &mut StateManager, notify: &AnimUserNotify, state: AnimEventState, _time: f32) {
        if state != AnimEventState::Entering {
            return;
        }
        match notify {
            AnimUserNotify::Footstep if self.physics.grounded && self.physics.movable => {
                let forward = self.transform().forward().horizontal().normalized();
                let mass = self.physics.mass.max(1e-3);
                self.physics.velocity += forward * (self.physics.footstep_impulse / mass);
            }
            AnimUserNotify::Script(kind) => self.actor.base.entity.send_to_targets(mgr, *kind),
            _ => {}
        }
    }

    fn on_animation_advancement(&mut self, deltas: &AdvancementDeltas) {
        if self.physics.movable {
            apply_root_motion(self, deltas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_physics::{CollisionInfo, Contact, PhysicsMaterial};

    fn ball() -> PhysicsActor {
        PhysicsActor::new(
            ActorBase::named(UniqueId::default(), "ball").with_position(Vec3::new(0.0, 5.0, 0.0)),
            PhysicsState::new(CollisionPrimitive::sphere(0.5)),
        )
    }

    #[test]
    fn test_integrate_applies_gravity() {
        let mut body = ball();
        integrate(&mut body, 0.5, -20.0);
        assert_eq!(body.physics.velocity.y, -10.0);
        assert_eq!(body.transform().position.y, 0.0);
    }

    #[test]
    fn test_primitive_transform_includes_offset() {
        let mut body = ball();
        body.physics.primitive = Some(CollisionPrimitive::sphere(0.5).with_offset(Vec3::new(0.0, 1.0, 0.0)));
        let placed = body.primitive_transform().map(|t| t.position);
        assert_eq!(placed, Some(Vec3::new(0.0, 6.0, 0.0)));

        body.physics.primitive = None;
        assert!(body.primitive_transform().is_none());
    }

    #[test]
    fn test_material_change_reaches_primitive() {
        let mut body = ball();
        body.actor.base.material = PhysicsMaterial::ICE;
        body.notify_material_list_changed();
        assert_eq!(body.physics.primitive.map(|p| p.material.surface), Some(SurfaceKind::Ice));
    }

    #[test]
    fn test_root_motion_is_local() {
        let mut body = ball();
        body.set_transform(Transform::from_position_rotation(Vec3::ZERO, strata_math::Quat::from_yaw(std::f32::consts::FRAC_PI_2)));
        body.on_animation_advancement(&AdvancementDeltas::new(0.1).with_root_motion(-Vec3::Z, strata_math::Quat::IDENTITY));
        // Facing -X after a quarter turn
        assert!((body.transform().position - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_ground_contact_sets_grounded_surface() {
        let info = CollisionInfo::from_contact(&Contact::new(Vec3::ZERO, Vec3::UP, 0.1), PhysicsMaterial::WOOD);
        let list: CollisionInfoList = std::iter::once(info).collect();
        assert!(list.touches_ground());
        assert_eq!(list.deepest().map(|c| c.material.surface), Some(SurfaceKind::Wood));
    }
}
