//! GameCharacter layer: AI, animation, path following and thrown objects
//!
//! A character owns an AI machine and an animation machine (both optional
//! until set up), may be attached to a spline path, and tracks the objects
//! it has thrown. While it follows a path its position comes from the path
//! and the physics integration is switched off.

use log::{debug, trace, warn};
use strata_math::{Aabb, Quat, Vec3};
use strata_physics::{CollisionFilter, CollisionInfoList, CollisionPrimitive};
use strata_render::{RenderBucket, RenderManager, SortFlags, SortLayer};

use crate::actor::{ActorBase, Damageable, Spatial};
use crate::anim::{apply_root_motion, AdvancementDeltas, AnimEvent, AnimEventState, AnimUserNotify, Animatable};
use crate::damage::{DamageInfo, DamageOriginator, DamageResult, DamageVulnerability, HealthInfo};
use crate::entity::{route_activation, EntityBase, Thinkable};
use crate::fsm::{AiInputs, AiState, AiStateMachine, AnimState, AnimStateMachine, FsmProperties};
use crate::id::{Key, SplinePathId, UniqueId};
use crate::message::{ScriptMsg, ScriptMsgKind};
use crate::object::Object;
use crate::physics_actor::{advance_body, Collidable, PhysicsActor, PhysicsState};
use crate::render_actor::{prepare_viewport, submit_model, view_depth, RenderActor, RenderState, Renderable};
use crate::state_manager::StateManager;
use crate::transform::Transform;
use crate::type_tag::TypeTag;

/// Seconds a thrown object lives before finishing on its own
pub const THROWN_LIFETIME: f32 = 3.0;

/// Attachment to a spline path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineFollow {
    pub path: SplinePathId,
    /// Parametric position along the path
    pub t: f32,
    /// Set once an open path has been run to its end
    pub arrived: bool,
}

/// Character-only state
#[derive(Clone, Debug)]
pub struct CharacterState {
    pub health: HealthInfo,
    /// Replaces the actor's vulnerability when set
    pub vulnerability: Option<DamageVulnerability>,
    pub ai: Option<AiStateMachine>,
    pub anim: Option<AnimStateMachine>,
    pub fsm_props: FsmProperties,
    pub spline: Option<SplineFollow>,
    /// Layer used when drawn up close
    pub sort_layer: SortLayer,
    /// Layer chosen for the current frame
    pub current_layer: SortLayer,
    pub sort_flags: SortFlags,
    /// Beyond this camera distance the character draws as an imposter
    pub imposter_distance: f32,
    /// Thrown objects still in flight
    pub thrown: Vec<UniqueId>,
    /// Seconds until the next throw is allowed
    pub throw_cooldown: f32,
    pub throw_cooldown_time: f32,
    pub attack_timer: f32,
    /// How many times the state machines were built
    pub machines_built: u32,
    /// Kills scored with thrown objects
    pub kills: u32,
    pending_anim_events: Vec<AnimEvent>,
}

impl CharacterState {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: HealthInfo::new(max_health),
            vulnerability: None,
            ai: None,
            anim: None,
            fsm_props: FsmProperties::default(),
            spline: None,
            sort_layer: SortLayer::Character,
            current_layer: SortLayer::Character,
            sort_flags: SortFlags::NONE,
            imposter_distance: 60.0,
            thrown: Vec::new(),
            throw_cooldown: 0.0,
            throw_cooldown_time: 2.0,
            attack_timer: 0.0,
            machines_built: 0,
            kills: 0,
            pending_anim_events: Vec::new(),
        }
    }

    pub fn with_props(mut self, props: FsmProperties) -> Self {
        self.fsm_props = props;
        self
    }

    pub fn with_vulnerability(mut self, vulnerability: DamageVulnerability) -> Self {
        self.vulnerability = Some(vulnerability);
        self
    }

    pub fn is_imposter(&self) -> bool {
        self.sort_flags.contains(SortFlags::IMPOSTER)
    }
}

/// An AI-driven, animated, drawable body
#[derive(Clone, Debug)]
pub struct GameCharacter {
    pub render_actor: RenderActor,
    pub character: CharacterState,
}

impl GameCharacter {
    pub fn new(base: ActorBase, physics: PhysicsState, render: RenderState, character: CharacterState) -> Self {
        Self {
            render_actor: RenderActor::new(base, physics, render),
            character,
        }
    }

    /// A character with the usual body: a capsule-sized sphere that skips other characters
    pub fn humanoid(base: ActorBase, render: RenderState, max_health: f32) -> Self {
        let primitive = CollisionPrimitive::sphere(0.5)
            .with_offset(Vec3::new(0.0, 0.5, 0.0))
            .with_filter(CollisionFilter::character());
        let base = base.with_touch_extents(Some(Aabb::new(Vec3::new(-0.4, 0.0, -0.4), Vec3::new(0.4, 1.8, 0.4))));
        let physics = PhysicsState::new(primitive).with_mass(70.0).with_footstep_impulse(7.0);
        Self::new(base, physics, render, CharacterState::new(max_health))
    }

    pub fn ai_state(&self) -> Option<AiState> {
        self.character.ai.as_ref().map(AiStateMachine::state)
    }

    pub fn anim_state(&self) -> Option<AnimState> {
        self.character.anim.as_ref().map(AnimStateMachine::state)
    }

    pub fn is_dead(&self) -> bool {
        self.character.health.is_dead()
    }

    /// Build a fresh AI machine, dropping any previous one
    pub fn setup_ai_state_machine(&mut self, _mgr: &StateManager) {
        self.character.machines_built += 1;
        let initial = if self.is_dead() {
            AiState::Dead
        } else if self.character.spline.is_some() {
            AiState::Patrol
        } else {
            AiState::Idle
        };
        if self.character.ai.replace(AiStateMachine::new(self.character.machines_built, initial)).is_some() {
            trace!("'{}' replaced its AI state machine", self.name());
        }
    }

    /// Build a fresh animation machine, dropping any previous one
    pub fn setup_anim_state_machine(&mut self, _mgr: &StateManager) {
        self.character.machines_built += 1;
        let mut anim = AnimStateMachine::new(self.character.machines_built);
        if self.is_dead() {
            anim.play(AnimState::Death);
        }
        self.character.pending_anim_events.clear();
        if self.character.anim.replace(anim).is_some() {
            trace!("'{}' replaced its animation state machine", self.name());
        }
    }

    /// Feed locomotion speed into the animation machine
    pub fn sync_to_current_movement_speed(&mut self, _mgr: &StateManager, props: &FsmProperties, speed: f32) {
        if let Some(anim) = self.character.anim.as_mut() {
            anim.sync_to_speed(props, speed);
        }
    }

    /// Attach to a spline path
    ///
    /// A null, unknown or degenerate id clears path following. Returns
    /// whether the character is now on a path.
    pub fn set_spline_path_id(&mut self, mgr: &StateManager, id: SplinePathId) -> bool {
        let valid = !id.is_null() && mgr.spline(id).is_some_and(|path| path.is_valid());
        if !valid {
            if self.character.spline.take().is_some() {
                debug!("'{}' left its spline path", self.name());
            }
            return false;
        }

        self.character.spline = Some(SplineFollow {
            path: id,
            t: 0.0,
            arrived: false,
        });
        if let Some(transform) = self.transform_on_spline(mgr) {
            self.set_transform(transform);
        }
        true
    }

    /// Where the path puts the character, or None when not on a path
    pub fn transform_on_spline(&self, mgr: &StateManager) -> Option<Transform> {
        let follow = self.character.spline?;
        let sample = mgr.spline(follow.path)?.sample(follow.t)?;
        let rotation = if sample.tangent.horizontal().length_squared() > 1e-8 {
            Quat::facing(sample.tangent)
        } else {
            self.transform().rotation
        };
        Some(Transform {
            position: sample.position,
            rotation,
            scale: self.transform().scale,
        })
    }

    /// On a path and not overridden by combat
    pub fn is_path_following(&self) -> bool {
        self.character.spline.is_some() && !matches!(self.ai_state(), Some(AiState::Chase | AiState::Attack))
    }

    /// An object this character threw killed something
    pub fn notify_thrown_object_kill(&mut self, mgr: &mut StateManager, id: UniqueId, at: Transform) {
        if !self.character.thrown.contains(&id) {
            return;
        }
        self.character.kills += 1;
        debug!("'{}' scored a kill with {:?} at {:?}", self.name(), id, at.position);
        self.base().send_to_targets(mgr, ScriptMsgKind::Increment);
    }

    /// An object this character threw was destroyed or ran out of time
    pub fn notify_thrown_object_finished(&mut self, _mgr: &mut StateManager, id: UniqueId) {
        self.character.thrown.retain(|thrown| *thrown != id);
        if self.character.thrown.is_empty() {
            self.character.throw_cooldown = 0.0;
        }
    }

    /// Throw a projectile; None while the throw is cooling down
    pub fn throw_object(&mut self, mgr: &mut StateManager, velocity: Vec3) -> Option<UniqueId> {
        if self.character.throw_cooldown > 0.0 || self.is_dead() {
            return None;
        }
        let owner = self.id();
        let forward = self.transform().forward().horizontal().normalized();
        let origin = self.transform().position + Vec3::new(0.0, 1.2, 0.0) + forward * 1.0;
        let damage = DamageInfo::physical(self.character.fsm_props.attack_damage).with_knockback(velocity, 2.0);

        let id = mgr.spawn(|id| {
            let base = ActorBase::named(id, "thrown")
                .activated()
                .with_position(origin)
                .with_touch_extents(None);
            let physics = PhysicsState::new(CollisionPrimitive::sphere(0.15).with_filter(CollisionFilter::projectile()))
                .with_mass(0.5)
                .with_velocity(velocity)
                .with_contact_damage(damage)
                .thrown_by(owner, THROWN_LIFETIME);
            Object::Physics(PhysicsActor::new(base, physics))
        });

        self.character.thrown.push(id);
        self.character.throw_cooldown = self.character.throw_cooldown_time;
        Some(id)
    }

    /// Re-snap to the path after player movement may have pushed us off it
    pub fn after_move_players(&mut self, mgr: &StateManager, _dt: f32) {
        if !self.is_path_following() {
            return;
        }
        if let Some(transform) = self.transform_on_spline(mgr) {
            if transform.position.distance(self.transform().position) > 1e-4 {
                self.set_transform(transform);
            }
        }
    }

    /// Advance along the path at walking speed; returns the speed moved at
    fn follow_spline(&mut self, mgr: &mut StateManager, dt: f32) -> f32 {
        let Some(mut follow) = self.character.spline else {
            return 0.0;
        };
        let Some(path) = mgr.spline(follow.path) else {
            warn!("'{}' follows a spline path that no longer exists", self.name());
            self.character.spline = None;
            return 0.0;
        };
        self.halt();
        if follow.arrived {
            return 0.0;
        }

        let length = path.approximate_length();
        let closed = path.closed;
        let speed = self.character.fsm_props.walk_speed;
        if length > 0.0 {
            follow.t += speed * dt / length;
        }
        let mut arrived_now = false;
        if closed {
            follow.t = follow.t.rem_euclid(1.0);
        } else if follow.t >= 1.0 {
            follow.t = 1.0;
            follow.arrived = true;
            arrived_now = true;
        }
        self.character.spline = Some(follow);

        if let Some(transform) = self.transform_on_spline(mgr) {
            self.set_transform(transform);
        }
        if arrived_now {
            debug!("'{}' reached the end of its path", self.name());
            self.base().send_to_targets(mgr, ScriptMsgKind::Arrived);
        }
        speed
    }

    fn target_position(&self, mgr: &StateManager) -> Option<Vec3> {
        let player = mgr.player().filter(|player| *player != self.id())?;
        let target = mgr.object(player)?.spatial()?;
        target.is_active().then(|| target.transform().position)
    }

    /// Run toward `target` and face it; returns the speed
    fn chase(&mut self, target: Vec3) -> f32 {
        let to_target = (target - self.transform().position).horizontal();
        let direction = to_target.normalized();
        let speed = self.character.fsm_props.run_speed;
        let physics = self.physics_mut();
        physics.velocity.x = direction.x * speed;
        physics.velocity.z = direction.z * speed;
        if direction.length_squared() > 0.0 {
            let mut transform = *self.transform();
            transform.rotation = Quat::facing(direction);
            self.set_transform(transform);
        }
        speed
    }

    fn attack(&mut self, mgr: &mut StateManager, target: Vec3, dt: f32) {
        self.halt();
        self.character.attack_timer -= dt;
        if self.character.attack_timer > 0.0 {
            return;
        }
        self.character.attack_timer = self.character.fsm_props.attack_interval;
        let Some(player) = mgr.player() else {
            return;
        };
        let direction = (target - self.transform().position).horizontal();
        let hit = DamageInfo::physical(self.character.fsm_props.attack_damage).with_knockback(direction, 3.0);
        match mgr.apply_damage(player, self.id(), &hit) {
            Ok(result) => trace!("'{}' hit the player for {:.1}", self.name(), result.applied),
            Err(err) => debug!("'{}' could not attack: {}", self.name(), err),
        }
    }

    fn halt(&mut self) {
        let physics = self.physics_mut();
        physics.velocity.x = 0.0;
        physics.velocity.z = 0.0;
    }

    fn on_ai_state_entered(&mut self, state: AiState) {
        trace!("'{}' AI -> {:?}", self.name(), state);
        match state {
            AiState::Attack => self.character.attack_timer = 0.0,
            AiState::Dead => {
                if let Some(anim) = self.character.anim.as_mut() {
                    anim.play(AnimState::Death);
                }
            }
            _ => {}
        }
    }
}

impl Thinkable for GameCharacter {
    fn base(&self) -> &EntityBase {
        self.render_actor.base()
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        self.render_actor.base_mut()
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::GameCharacter
    }

    fn pre_think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.render_actor.pre_think(dt, mgr);
    }

    fn think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.character.throw_cooldown = (self.character.throw_cooldown - dt).max(0.0);

        let target = self.target_position(mgr);
        let inputs = AiInputs {
            target_distance: target.map(|t| t.distance(self.transform().position)),
            on_path: self.character.spline.is_some(),
        };
        let props = self.character.fsm_props;
        let entered = self
            .character
            .ai
            .as_mut()
            .and_then(|ai| ai.update(dt, &inputs, &props));
        if let Some(state) = entered {
            self.on_ai_state_entered(state);
        }

        let speed = match (self.ai_state(), target) {
            (Some(AiState::Chase), Some(target)) => self.chase(target),
            (Some(AiState::Attack), Some(target)) => {
                self.attack(mgr, target, dt);
                0.0
            }
            _ if self.is_path_following() => self.follow_spline(mgr, dt),
            (Some(_), _) => {
                self.halt();
                0.0
            }
            (None, _) => self.physics().velocity.horizontal().length(),
        };

        advance_body(self, dt, mgr);
        self.sync_to_current_movement_speed(mgr, &props, speed);
    }

    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        match msg.kind {
            ScriptMsgKind::Reset => {
                self.character.health.health = self.character.health.max_health;
                self.setup_ai_state_machine(mgr);
                self.setup_anim_state_machine(mgr);
                self.render_actor.accept_script_msg(mgr, msg);
            }
            ScriptMsgKind::Start => {
                if let Some(follow) = self.character.spline.as_mut() {
                    follow.t = 0.0;
                    follow.arrived = false;
                }
            }
            _ => {
                route_activation(self, mgr, msg);
            }
        }
    }

    fn set_active(&mut self, mgr: &mut StateManager, active: bool) -> bool {
        self.render_actor.set_active(mgr, active)
    }

    fn finalize(&mut self, mgr: &mut StateManager) {
        self.character.ai = None;
        self.character.anim = None;
        self.character.pending_anim_events.clear();
        self.render_actor.finalize(mgr);
    }
}

impl Spatial for GameCharacter {
    fn actor(&self) -> &ActorBase {
        self.render_actor.actor()
    }

    fn actor_mut(&mut self) -> &mut ActorBase {
        self.render_actor.actor_mut()
    }

    fn set_transform_dirty(&mut self) {
        self.render_actor.set_transform_dirty();
    }

    fn detailed_touch_bounds(&self) -> Vec<Aabb> {
        self.render_actor.detailed_touch_bounds()
    }

    /// Being touched by the player starts a chase
    fn touch(&mut self, mgr: &mut StateManager, other: UniqueId) {
        self.render_actor.touch(mgr, other);
        if mgr.player() == Some(other) {
            if let Some(ai) = self.character.ai.as_mut() {
                if ai.transition(AiState::Chase) {
                    trace!("'{}' touched by the player", self.render_actor.name());
                }
            }
        }
    }

    fn aim_position(&self, mgr: &StateManager, dt: f32) -> Vec3 {
        self.render_actor.aim_position(mgr, dt)
    }

    fn notify_material_list_changed(&mut self) {
        self.render_actor.notify_material_list_changed();
    }
}

impl Damageable for GameCharacter {
    fn health_info(&self) -> Option<&HealthInfo> {
        Some(&self.character.health)
    }

    fn damage_vulnerability(&self) -> &DamageVulnerability {
        self.character
            .vulnerability
            .as_ref()
            .unwrap_or(&self.actor().vulnerability)
    }

    fn commit_damage(&mut self, result: &DamageResult) {
        self.character.health.health = result.remaining_health;
    }

    /// Stagger on a hit; on death stop the AI, play the death clip and switch off
    fn notify_damage_event(
        &mut self,
        mgr: &mut StateManager,
        source: UniqueId,
        info: &DamageInfo,
        result: &DamageResult,
        originator: DamageOriginator,
    ) {
        self.render_actor.notify_damage_event(mgr, source, info, result, originator);

        if result.died {
            if let Some(ai) = self.character.ai.as_mut() {
                ai.kill();
            }
            if let Some(anim) = self.character.anim.as_mut() {
                anim.play(AnimState::Death);
            }
            debug!("'{}' was killed by {:?} ({:?})", self.name(), source, originator);
            let id = self.id();
            mgr.post_message(id, ScriptMsg::new(ScriptMsgKind::Deactivate, id));
        } else if result.applied > 0.0 {
            if let Some(ai) = self.character.ai.as_mut() {
                ai.stagger();
            }
            if let Some(anim) = self.character.anim.as_mut() {
                anim.play(AnimState::Hit);
            }
        }
    }
}

impl Collidable for GameCharacter {
    fn physics(&self) -> &PhysicsState {
        self.render_actor.physics()
    }

    fn physics_mut(&mut self) -> &mut PhysicsState {
        self.render_actor.physics_mut()
    }

    /// Path following owns the position
    fn will_move(&self, _mgr: &StateManager) -> bool {
        self.physics().movable && self.is_active() && !self.is_path_following()
    }

    fn collided_with(&mut self, mgr: &mut StateManager, partner: UniqueId, contacts: &CollisionInfoList) {
        self.render_actor.collided_with(mgr, partner, contacts);
    }
}

impl Animatable for GameCharacter {
    fn do_user_anim_event(&mut self, mgr: &mut StateManager, notify: &AnimUserNotify, state: AnimEventState, time: f32) {
        self.render_actor.do_user_anim_event(mgr, notify, state, time);
    }

    /// Root motion is ignored while on a path
    fn on_animation_advancement(&mut self, deltas: &AdvancementDeltas) {
        if self.physics().movable && !self.is_path_following() {
            apply_root_motion(self, deltas);
        }
        let props = self.character.fsm_props;
        if let Some(anim) = self.character.anim.as_mut() {
            let events = anim.advance(deltas.dt, &props);
            self.character.pending_anim_events.extend(events);
        }
        let render = &mut self.render_actor.render;
        render.anim_time += deltas.dt;
        render.particles.advance(deltas.dt);
    }

    fn take_anim_events(&mut self) -> Vec<AnimEvent> {
        std::mem::take(&mut self.character.pending_anim_events)
    }
}

impl Renderable for GameCharacter {
    fn render(&self) -> &RenderState {
        &self.render_actor.render
    }

    fn render_mut(&mut self) -> &mut RenderState {
        &mut self.render_actor.render
    }

    /// Distant characters switch to the imposter layer
    ///
    /// A character is an imposter only if it is far away in every
    /// viewport it was seen in this frame.
    fn pre_render_in_viewport(&mut self, rm: &mut RenderManager<UniqueId>) {
        prepare_viewport(self, rm);
        let far = rm.current_viewport().is_some_and(|viewport| {
            viewport.camera.position.distance(self.transform().position) > self.character.imposter_distance
        });
        let first = self.render().viewports_seen == 1;
        let imposter = if first { far } else { self.character.is_imposter() && far };
        self.character.sort_flags.set(SortFlags::IMPOSTER, imposter);
        self.character.current_layer = if imposter {
            SortLayer::Imposter
        } else {
            self.character.sort_layer
        };
    }

    fn render_unsorted_and_add_sorted(&mut self, mgr: &StateManager, rm: &mut RenderManager<UniqueId>) {
        let sorted_model = self.character.is_imposter() || self.render().translucent;
        if !sorted_model {
            submit_model(self, rm, RenderBucket::Unsorted);
            self.render_unsorted_model_data(rm);
        }
        if sorted_model || self.render().particles.any_active() {
            let flags = self.character.sort_flags;
            self.add_to_special_sort(mgr, rm, flags);
        }
    }

    fn render_sorted(&mut self, _mgr: &StateManager, rm: &mut RenderManager<UniqueId>) {
        if self.character.is_imposter() || self.render().translucent {
            submit_model(self, rm, RenderBucket::Sorted);
        }
    }

    fn render_sort_layer(&self, _mgr: &StateManager) -> Option<SortLayer> {
        Some(self.character.current_layer)
    }

    /// Characters draw ahead of non-character work sharing their layer
    fn can_render_sort_with(
        &self,
        _mgr: &StateManager,
        other: &dyn Renderable,
        my_layer: SortLayer,
        other_layer: SortLayer,
    ) -> bool {
        my_layer == other_layer && !other.types_match(TypeTag::GameCharacter)
    }

    fn add_to_special_sort(&mut self, mgr: &StateManager, rm: &mut RenderManager<UniqueId>, flags: SortFlags) {
        if let Some(layer) = self.render_sort_layer(mgr) {
            let depth = view_depth(self, rm);
            rm.add_to_special_sort(self.id(), layer, depth, flags | self.character.sort_flags);
        }
    }
}
