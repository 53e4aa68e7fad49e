//! RenderActor layer: render submission, particles and shadows
//!
//! Rendering happens in two passes over the scene. In the first, every
//! visible actor prepares itself once per viewport it appears in and then
//! once for the whole scene. In the second, opaque work goes straight into
//! the unsorted bucket while translucent work is only registered; the
//! render pass emits it later in sorted order.

use log::{debug, trace};
use strata_math::{Aabb, Vec3};
use strata_physics::CollisionInfoList;
use strata_render::{
    AnimParticleManager, DrawCommand, DrawKind, ModelId, ParticleOrder, RenderBucket, RenderManager,
    ShadowHitResponse, ShadowPolicy, SortFlags, SortLayer,
};

use crate::actor::{ActorBase, Damageable, Spatial};
use crate::anim::{apply_root_motion, AdvancementDeltas, AnimEventState, AnimUserNotify, Animatable};
use crate::damage::{DamageInfo, DamageOriginator, DamageResult};
use crate::entity::{route_activation, EntityBase, Thinkable};
use crate::id::UniqueId;
use crate::message::{ScriptMsg, ScriptMsgKind};
use crate::physics_actor::{advance_body, Collidable, PhysicsActor, PhysicsState};
use crate::state_manager::StateManager;
use crate::transform::{DirtyFlags, VersionedCache};
use crate::type_tag::TypeTag;

/// Emitter started whenever a render actor takes damage
pub const HIT_EMITTER: &str = "hit";

/// Draw state owned by a render actor
#[derive(Clone, Debug)]
pub struct RenderState {
    pub model: Option<ModelId>,
    /// Local-space boxes of the model's parts; these become the detailed touch volume
    pub model_parts: Vec<Aabb>,
    /// Translucent actors draw in the sorted pass
    pub translucent: bool,
    /// Derived render state waiting to be rebuilt
    pub draw_flags: DirtyFlags,
    pub particles: AnimParticleManager,
    pub shadow: ShadowPolicy,
    pub anim_time: f32,
    /// Level of detail for this frame, 0 is the finest
    pub lod: u8,
    /// Camera distances at which each coarser lod starts
    pub lod_distances: Vec<f32>,
    /// Viewports this actor was prepared in during the current frame
    pub viewports_seen: u32,
    pub scene_prepared: bool,
    /// Frame the per-frame counters belong to
    seen_frame: u64,
    parts_cache: VersionedCache<Vec<Aabb>>,
    /// How many times derived render state was rebuilt
    pub rebuilds: u32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            model: None,
            model_parts: Vec::new(),
            translucent: false,
            draw_flags: DirtyFlags::ALL,
            particles: AnimParticleManager::new(),
            shadow: ShadowPolicy::default(),
            anim_time: 0.0,
            lod: 0,
            lod_distances: vec![15.0, 40.0],
            viewports_seen: 0,
            scene_prepared: false,
            seen_frame: 0,
            parts_cache: VersionedCache::new(),
            rebuilds: 0,
        }
    }
}

impl RenderState {
    pub fn new(model: ModelId) -> Self {
        Self {
            model: Some(model),
            ..Self::default()
        }
    }

    pub fn translucent(mut self) -> Self {
        self.translucent = true;
        self
    }

    pub fn with_parts(mut self, parts: Vec<Aabb>) -> Self {
        self.model_parts = parts;
        self.draw_flags |= DirtyFlags::MODEL;
        self
    }

    pub fn with_emitter(mut self, name: &str, order: ParticleOrder, duration: f32) -> Self {
        self.particles.add_emitter(name, order, duration);
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowPolicy) -> Self {
        self.shadow = shadow;
        self
    }

    /// Level of detail for a camera distance
    pub fn lod_for_distance(&self, distance: f32) -> u8 {
        let coarser = self.lod_distances.iter().filter(|&&d| distance >= d).count();
        u8::try_from(coarser).unwrap_or(u8::MAX)
    }

    /// Drop per-frame state
    pub fn reset_frame(&mut self) {
        self.viewports_seen = 0;
        self.scene_prepared = false;
    }

    /// Whether this frame's counters are from frame `frame`
    pub fn seen_in_frame(&self, frame: u64) -> bool {
        self.seen_frame == frame && self.viewports_seen > 0
    }
}

/// Render hooks called by the render pass
pub trait Renderable: Spatial {
    fn render(&self) -> &RenderState;
    fn render_mut(&mut self) -> &mut RenderState;

    /// Called once for every viewport this actor is visible in
    fn pre_render_in_viewport(&mut self, rm: &mut RenderManager<UniqueId>) {
        prepare_viewport(self, rm);
    }

    /// Called once per frame, after every `pre_render_in_viewport`
    fn pre_render_for_whole_scene(&mut self, rm: &mut RenderManager<UniqueId>) {
        prepare_scene(self, rm);
    }

    /// Submit opaque work and register sorted work
    fn render_unsorted_and_add_sorted(&mut self, mgr: &StateManager, rm: &mut RenderManager<UniqueId>) {
        if !self.render().translucent {
            submit_model(self, rm, RenderBucket::Unsorted);
            self.render_unsorted_model_data(rm);
        }
        if self.render_sort_layer(mgr).is_some() {
            self.add_to_special_sort(mgr, rm, SortFlags::NONE);
        }
    }

    /// Per-instance data for the opaque model
    fn render_unsorted_model_data(&mut self, rm: &mut RenderManager<UniqueId>) {
        if let Some(model) = self.render().model {
            let command = DrawCommand::new(self.id(), DrawKind::ModelData(model), rm.current_index())
                .with_lod(self.render().lod);
            rm.add_unsorted(command);
        }
    }

    /// Emit registered sorted work; called in sorted order
    fn render_sorted(&mut self, _mgr: &StateManager, rm: &mut RenderManager<UniqueId>) {
        if self.render().translucent {
            submit_model(self, rm, RenderBucket::Sorted);
        }
    }

    fn render_particles_sorted_with_actor_first(&mut self, rm: &mut RenderManager<UniqueId>) {
        submit_particles(self, rm, ParticleOrder::WithActorFirst);
    }

    fn render_particles_sorted_with_actor_last(&mut self, rm: &mut RenderManager<UniqueId>) {
        submit_particles(self, rm, ParticleOrder::WithActorLast);
    }

    /// Whether the shadow pass should draw this actor into shadow maps
    fn can_render_shadow(&self, mgr: &StateManager) -> bool {
        let shadow = &self.render().shadow;
        if !shadow.casts || !self.is_active() || self.render().model.is_none() {
            return false;
        }
        let distance = mgr
            .camera_position()
            .map_or(0.0, |camera| camera.distance(self.transform().position));
        shadow.allows(distance)
    }

    fn shadow_hit_response(&self, _mgr: &StateManager) -> ShadowHitResponse {
        match self.render().shadow.hit_response {
            ShadowHitResponse::Opaque if self.render().translucent => ShadowHitResponse::Translucent,
            response => response,
        }
    }

    /// The layer sorted work goes in; None when there is nothing to sort
    fn render_sort_layer(&self, _mgr: &StateManager) -> Option<SortLayer> {
        (self.render().translucent || self.render().particles.any_active()).then_some(SortLayer::World)
    }

    /// Tie-break between two actors on the same sort layer
    ///
    /// Returning true asks for this actor to draw before `other`. The render
    /// pass only asks in one orientation per pair.
    fn can_render_sort_with(
        &self,
        _mgr: &StateManager,
        _other: &dyn Renderable,
        _my_layer: SortLayer,
        _other_layer: SortLayer,
    ) -> bool {
        false
    }

    /// Register sorted work with special-sort flags
    fn add_to_special_sort(&mut self, mgr: &StateManager, rm: &mut RenderManager<UniqueId>, flags: SortFlags) {
        if let Some(layer) = self.render_sort_layer(mgr) {
            let depth = view_depth(self, rm);
            rm.add_to_special_sort(self.id(), layer, depth, flags);
        }
    }
}

/// Distance from the current viewport's camera along its view direction
pub fn view_depth<T: Renderable + ?Sized>(this: &T, rm: &RenderManager<UniqueId>) -> f32 {
    rm.current_viewport()
        .map_or(0.0, |viewport| viewport.camera.depth_of(this.transform().position))
}

/// Count the viewport and keep the finest lod any viewport asks for
pub fn prepare_viewport<T: Renderable + ?Sized>(this: &mut T, rm: &mut RenderManager<UniqueId>) {
    let distance = rm
        .current_viewport()
        .map_or(0.0, |viewport| viewport.camera.position.distance(this.transform().position));
    let frame = rm.frame();
    let render = this.render_mut();
    if render.seen_frame != frame {
        render.seen_frame = frame;
        render.reset_frame();
    }
    let lod = render.lod_for_distance(distance);
    render.lod = if render.viewports_seen == 0 { lod } else { render.lod.min(lod) };
    render.viewports_seen += 1;
}

/// Rebuild whatever derived render state the draw flags ask for
pub fn prepare_scene<T: Renderable + ?Sized>(this: &mut T, rm: &mut RenderManager<UniqueId>) {
    let frame = rm.frame();
    let name = this.name().to_string();
    let render = this.render_mut();
    if render.seen_frame != frame {
        trace!("'{}' prepared for the scene without a viewport", name);
    }
    if !render.draw_flags.is_empty() {
        if render.draw_flags.intersects(DirtyFlags::MODEL | DirtyFlags::TRANSFORM) {
            render.parts_cache.invalidate();
        }
        render.draw_flags = DirtyFlags::NONE;
        render.rebuilds += 1;
    }
    render.scene_prepared = true;
}

/// Push the model into `bucket` for the current viewport
pub fn submit_model<T: Renderable + ?Sized>(this: &T, rm: &mut RenderManager<UniqueId>, bucket: RenderBucket) {
    let Some(model) = this.render().model else {
        return;
    };
    let command = DrawCommand::new(this.id(), DrawKind::Model(model), rm.current_index()).with_lod(this.render().lod);
    match bucket {
        RenderBucket::Unsorted => rm.add_unsorted(command),
        RenderBucket::Sorted => rm.emit_sorted(command),
    }
}

fn submit_particles<T: Renderable + ?Sized>(this: &T, rm: &mut RenderManager<UniqueId>, order: ParticleOrder) {
    let viewport = rm.current_index();
    let commands: Vec<_> = this
        .render()
        .particles
        .active(order)
        .map(|(emitter, _)| DrawCommand::new(this.id(), DrawKind::Particles { emitter, order }, viewport))
        .collect();
    for command in commands {
        rm.emit_sorted(command);
    }
}

/// A physics body with a model
#[derive(Clone, Debug)]
pub struct RenderActor {
    pub body: PhysicsActor,
    pub render: RenderState,
}

impl RenderActor {
    pub fn new(base: ActorBase, physics: PhysicsState, render: RenderState) -> Self {
        Self {
            body: PhysicsActor::new(base, physics),
            render,
        }
    }

    /// A render actor the solver never sees
    pub fn scenery(base: ActorBase, render: RenderState) -> Self {
        Self::new(base, PhysicsState::without_primitive().immovable(), render)
    }
}

impl Thinkable for RenderActor {
    fn base(&self) -> &EntityBase {
        &self.body.actor.base.entity
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.body.actor.base.entity
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::RenderActor
    }

    fn pre_think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.body.pre_think(dt, mgr);
    }

    fn think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.body.actor.think(dt, mgr);
        advance_body(self, dt, mgr);
    }

    /// `Reset` restarts animation and particles; activation is routed as usual
    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        if msg.kind == ScriptMsgKind::Reset {
            self.render.particles.stop_all();
            self.render.anim_time = 0.0;
            self.render.draw_flags |= DirtyFlags::ALL;
            return;
        }
        route_activation(self, mgr, msg);
    }

    fn set_active(&mut self, mgr: &mut StateManager, active: bool) -> bool {
        let changed = self.body.set_active(mgr, active);
        if changed {
            self.render.reset_frame();
            if active {
                self.render.draw_flags |= DirtyFlags::ALL;
            } else {
                self.render.particles.stop_all();
            }
        }
        changed
    }

    fn finalize(&mut self, mgr: &mut StateManager) {
        self.render.particles.stop_all();
        self.render.parts_cache.invalidate();
        self.body.finalize(mgr);
    }
}

impl Spatial for RenderActor {
    fn actor(&self) -> &ActorBase {
        &self.body.actor.base
    }

    fn actor_mut(&mut self) -> &mut ActorBase {
        &mut self.body.actor.base
    }

    fn set_transform_dirty(&mut self) {
        self.body.set_transform_dirty();
        self.render.draw_flags |= DirtyFlags::TRANSFORM;
    }

    fn detailed_touch_bounds(&self) -> Vec<Aabb> {
        if self.render.model_parts.is_empty() {
            return self.body.detailed_touch_bounds();
        }
        let base = self.actor();
        self.render
            .parts_cache
            .get_or_update(base.transform_version(), || base.world_bounds_of(&self.render.model_parts))
    }

    fn touch(&mut self, mgr: &mut StateManager, other: UniqueId) {
        self.body.touch(mgr, other);
    }

    fn aim_position(&self, mgr: &StateManager, dt: f32) -> Vec3 {
        self.body.aim_position(mgr, dt)
    }

    fn notify_material_list_changed(&mut self) {
        self.body.notify_material_list_changed();
        self.render.draw_flags |= DirtyFlags::MATERIAL;
    }
}

impl Damageable for RenderActor {
    fn notify_damage_event(
        &mut self,
        mgr: &mut StateManager,
        source: UniqueId,
        info: &DamageInfo,
        result: &DamageResult,
        originator: DamageOriginator,
    ) {
        self.body.notify_damage_event(mgr, source, info, result, originator);
        if result.applied > 0.0 {
            self.render.particles.trigger(HIT_EMITTER);
        }
    }
}

impl Collidable for RenderActor {
    fn physics(&self) -> &PhysicsState {
        &self.body.physics
    }

    fn physics_mut(&mut self) -> &mut PhysicsState {
        &mut self.body.physics
    }

    fn collided_with(&mut self, mgr: &mut StateManager, partner: UniqueId, contacts: &CollisionInfoList) {
        self.body.collided_with(mgr, partner, contacts);
    }
}

impl Animatable for RenderActor {
    /// Physical effects first, then the visual-only ones
    fn do_user_anim_event(&mut self, mgr: &mut StateManager, notify: &AnimUserNotify, state: AnimEventState, time: f32) {
        self.body.do_user_anim_event(mgr, notify, state, time);
        if state != AnimEventState::Entering {
            return;
        }
        match notify {
            AnimUserNotify::Particle(name) => {
                if !self.render.particles.trigger(name) {
                    debug!("'{}' has no emitter named '{}'", self.name(), name);
                }
            }
            AnimUserNotify::Sound(sound) => trace!("'{}' plays '{}' at {:.2}", self.name(), sound, time),
            _ => {}
        }
    }

    fn on_animation_advancement(&mut self, deltas: &AdvancementDeltas) {
        if self.body.physics.movable {
            apply_root_motion(self, deltas);
        }
        self.render.anim_time += deltas.dt;
        self.render.particles.advance(deltas.dt);
    }
}

impl Renderable for RenderActor {
    fn render(&self) -> &RenderState {
        &self.render
    }

    fn render_mut(&mut self) -> &mut RenderState {
        &mut self.render
    }
}
