//! The object registry every hook receives
//!
//! Objects live in a slot map keyed by [`UniqueId`]. A hook runs with its
//! own object checked out of the registry, so the hook can hold `&mut self`
//! and `&mut StateManager` at the same time. While checked out, the object
//! is invisible to lookups ([`CoreError::Busy`]) but its type tag stays
//! readable.

use log::{debug, error, warn};
use slotmap::SlotMap;
use strata_math::{Frustum, SplinePath, Vec3};
use strata_physics::{CollisionSolver, SolverConfig, StaticCollider};
use strata_render::Viewport;

use crate::anim::AnimEvent;
use crate::damage::{DamageInfo, DamageOriginator, DamageResult};
use crate::error::CoreError;
use crate::id::{SplinePathId, UniqueId};
use crate::message::{MessageQueue, ScriptMsg};
use crate::object::Object;
use crate::transform::Transform;
use crate::type_tag::TypeTag;

/// Registry settings
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Delivery rounds per drain before leftover messages wait for the next one
    pub max_message_rounds: usize,
    pub solver: SolverConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_message_rounds: 8,
            solver: SolverConfig::default(),
        }
    }
}

struct Slot {
    tag: TypeTag,
    /// None while checked out by a running hook
    object: Option<Object>,
}

#[derive(Clone, Copy, Debug)]
enum ThrownNotice {
    Kill { owner: UniqueId, thrown: UniqueId, at: Transform },
    Finished { owner: UniqueId, thrown: UniqueId },
}

pub struct StateManager {
    slots: SlotMap<UniqueId, Slot>,
    /// Spawn order; hooks run in this order
    order: Vec<UniqueId>,
    messages: MessageQueue,
    thrown_notices: Vec<ThrownNotice>,
    anim_events: Vec<(UniqueId, AnimEvent)>,
    splines: SlotMap<SplinePathId, SplinePath>,
    solver: CollisionSolver,
    camera: Option<Viewport>,
    player: Option<UniqueId>,
    config: ManagerConfig,
    pub(crate) time: f64,
    pub(crate) tick: u64,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            messages: MessageQueue::new(),
            thrown_notices: Vec::new(),
            anim_events: Vec::new(),
            splines: SlotMap::with_key(),
            solver: CollisionSolver::with_config(config.solver.clone()),
            camera: None,
            player: None,
            config,
            time: 0.0,
            tick: 0,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Construct an object with its id already assigned
    pub fn spawn(&mut self, build: impl FnOnce(UniqueId) -> Object) -> UniqueId {
        let id = self.slots.insert_with_key(|id| {
            let object = build(id);
            Slot {
                tag: object.type_tag(),
                object: Some(object),
            }
        });
        self.order.push(id);
        if let Some(object) = self.object(id) {
            debug_assert_eq!(object.id(), id, "object built with a foreign id");
            debug!("spawned {} '{}' as {:?}", object.type_tag(), object.thinkable().name(), id);
        }
        id
    }

    /// Finalize and remove an inactive object
    pub fn destroy(&mut self, id: UniqueId) -> Result<Object, CoreError> {
        let object = self.get(id)?;
        if object.is_active() {
            error!("refusing to destroy active {} '{}' ({:?})", object.type_tag(), object.thinkable().name(), id);
            return Err(CoreError::DestroyedWhileActive(id));
        }

        let mut object = self.take(id)?;
        object.thinkable_mut().finalize(self);
        self.slots.remove(id);
        self.order.retain(|other| *other != id);
        if self.player == Some(id) {
            self.player = None;
        }
        debug!("destroyed {} '{}' ({:?})", object.type_tag(), object.thinkable().name(), id);
        Ok(object)
    }

    // --- Lookup ---

    pub fn get(&self, id: UniqueId) -> Result<&Object, CoreError> {
        let slot = self.slots.get(id).ok_or(CoreError::NotFound(id))?;
        slot.object.as_ref().ok_or(CoreError::Busy(id))
    }

    pub fn get_mut(&mut self, id: UniqueId) -> Result<&mut Object, CoreError> {
        let slot = self.slots.get_mut(id).ok_or(CoreError::NotFound(id))?;
        slot.object.as_mut().ok_or(CoreError::Busy(id))
    }

    /// The object, unless it is gone or checked out
    pub fn object(&self, id: UniqueId) -> Option<&Object> {
        self.get(id).ok()
    }

    pub fn object_mut(&mut self, id: UniqueId) -> Option<&mut Object> {
        self.get_mut(id).ok()
    }

    /// Type tag of a live object, including one that is checked out
    pub fn type_of(&self, id: UniqueId) -> Option<TypeTag> {
        self.slots.get(id).map(|slot| slot.tag)
    }

    pub fn contains(&self, id: UniqueId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every id in spawn order
    pub fn ids(&self) -> &[UniqueId] {
        &self.order
    }

    /// Active objects in spawn order; checked-out objects are skipped
    pub fn active_ids(&self) -> Vec<UniqueId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.object(*id).is_some_and(Object::is_active))
            .collect()
    }

    /// Ids whose layer is `tag` or specialises it
    pub fn ids_matching(&self, tag: TypeTag) -> Vec<UniqueId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.type_of(*id).is_some_and(|own| own.is_a(tag)))
            .collect()
    }

    /// Check an object out of the registry
    pub(crate) fn take(&mut self, id: UniqueId) -> Result<Object, CoreError> {
        let slot = self.slots.get_mut(id).ok_or(CoreError::NotFound(id))?;
        slot.object.take().ok_or(CoreError::Busy(id))
    }

    /// Return a checked-out object
    pub(crate) fn restore(&mut self, id: UniqueId, object: Object) {
        match self.slots.get_mut(id) {
            Some(slot) => slot.object = Some(object),
            None => error!("object {:?} returned to a slot that no longer exists", id),
        }
    }

    /// Run `f` with the object checked out
    pub fn with_object<R>(
        &mut self,
        id: UniqueId,
        f: impl FnOnce(&mut Object, &mut StateManager) -> R,
    ) -> Result<R, CoreError> {
        let mut object = self.take(id)?;
        let result = f(&mut object, self);
        self.restore(id, object);
        Ok(result)
    }

    // --- Activation and messages ---

    /// Returns whether the active state changed
    pub fn set_active(&mut self, id: UniqueId, active: bool) -> Result<bool, CoreError> {
        self.with_object(id, |object, mgr| object.thinkable_mut().set_active(mgr, active))
    }

    pub fn post_message(&mut self, target: UniqueId, msg: ScriptMsg) {
        self.messages.push(target, msg);
    }

    pub fn pending_messages(&self) -> usize {
        self.messages.len() + self.thrown_notices.len()
    }

    /// Deliver queued messages, including those posted while delivering
    ///
    /// Stops after `max_message_rounds` rounds; anything left waits for
    /// the next call. Returns how many messages were delivered.
    pub fn deliver_messages(&mut self) -> usize {
        let mut delivered = 0;
        for _ in 0..self.config.max_message_rounds {
            if self.messages.is_empty() && self.thrown_notices.is_empty() {
                return delivered;
            }
            for notice in std::mem::take(&mut self.thrown_notices) {
                self.deliver_thrown_notice(notice);
            }

            let mut deferred = Vec::new();
            for envelope in self.messages.drain() {
                let msg = envelope.msg;
                match self.with_object(envelope.target, |object, mgr| object.thinkable_mut().accept_script_msg(mgr, &msg)) {
                    Ok(()) => delivered += 1,
                    Err(CoreError::Busy(id)) => {
                        warn!("{:?} is busy; deferring {:?}", id, msg.kind);
                        deferred.push(envelope);
                    }
                    Err(err) => debug!("dropping {:?}: {}", msg.kind, err),
                }
            }
            for envelope in deferred {
                self.messages.push(envelope.target, envelope.msg);
            }
        }

        if !self.messages.is_empty() {
            warn!(
                "message delivery stopped after {} rounds with {} messages pending",
                self.config.max_message_rounds,
                self.messages.len()
            );
        }
        delivered
    }

    fn deliver_thrown_notice(&mut self, notice: ThrownNotice) {
        let owner = match notice {
            ThrownNotice::Kill { owner, .. } | ThrownNotice::Finished { owner, .. } => owner,
        };
        let result = self.with_object(owner, |object, mgr| {
            let Some(character) = object.character_mut() else {
                return false;
            };
            match notice {
                ThrownNotice::Kill { thrown, at, .. } => character.notify_thrown_object_kill(mgr, thrown, at),
                ThrownNotice::Finished { thrown, .. } => character.notify_thrown_object_finished(mgr, thrown),
            }
            true
        });
        match result {
            Ok(true) => {}
            Ok(false) => debug!("thrown-object owner {:?} is not a character", owner),
            Err(CoreError::Busy(_)) => self.thrown_notices.push(notice),
            Err(err) => debug!("dropping thrown-object notice: {}", err),
        }
    }

    /// Queue a kill report for the character that threw `thrown`
    pub fn notify_thrown_object_kill(&mut self, owner: UniqueId, thrown: UniqueId, at: Transform) {
        self.thrown_notices.push(ThrownNotice::Kill { owner, thrown, at });
    }

    /// Queue a finished report for the character that threw `thrown`
    pub fn notify_thrown_object_finished(&mut self, owner: UniqueId, thrown: UniqueId) {
        self.thrown_notices.push(ThrownNotice::Finished { owner, thrown });
    }

    /// Queue an animation event for delivery in the animation phase
    pub fn send_anim_event(&mut self, target: UniqueId, event: AnimEvent) {
        self.anim_events.push((target, event));
    }

    pub(crate) fn take_anim_events(&mut self) -> Vec<(UniqueId, AnimEvent)> {
        std::mem::take(&mut self.anim_events)
    }

    // --- Damage ---

    /// Run the damage pipeline on `target`
    pub fn apply_damage(&mut self, target: UniqueId, source: UniqueId, info: &DamageInfo) -> Result<DamageResult, CoreError> {
        self.with_object(target, |object, mgr| {
            object
                .damageable_mut()
                .map(|receiver| receiver.process_and_notify_damage(mgr, source, info))
                .ok_or(CoreError::WrongLayer {
                    id: target,
                    expected: TypeTag::Actor,
                })
        })?
    }

    /// Classify a damage source for reaction policy
    pub fn originator_of(&self, source: UniqueId) -> DamageOriginator {
        if self.player.is_some() && self.player == Some(source) {
            return DamageOriginator::Player;
        }
        match self.type_of(source) {
            Some(TypeTag::GameCharacter) => DamageOriginator::Enemy,
            _ => DamageOriginator::Environment,
        }
    }

    // --- World ---

    pub fn player(&self) -> Option<UniqueId> {
        self.player
    }

    pub fn set_player(&mut self, player: Option<UniqueId>) {
        self.player = player;
    }

    pub fn add_spline(&mut self, path: SplinePath) -> SplinePathId {
        self.splines.insert(path)
    }

    pub fn spline(&self, id: SplinePathId) -> Option<&SplinePath> {
        self.splines.get(id)
    }

    pub fn remove_spline(&mut self, id: SplinePathId) -> Result<SplinePath, CoreError> {
        self.splines.remove(id).ok_or(CoreError::UnknownSpline(id))
    }

    pub fn solver(&self) -> &CollisionSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut CollisionSolver {
        &mut self.solver
    }

    pub fn add_static_collider(&mut self, collider: StaticCollider) {
        self.solver.add_static_collider(collider);
    }

    pub fn gravity(&self) -> f32 {
        self.solver.config.gravity
    }

    /// The viewport visibility queries test against
    pub fn set_camera(&mut self, viewport: Viewport) {
        self.camera = Some(viewport);
    }

    pub fn camera(&self) -> Option<&Viewport> {
        self.camera.as_ref()
    }

    pub fn camera_frustum(&self) -> Option<Frustum> {
        self.camera.as_ref().map(Viewport::frustum)
    }

    pub fn camera_position(&self) -> Option<Vec3> {
        self.camera.as_ref().map(|viewport| viewport.camera.position)
    }

    /// Simulated seconds since the first tick
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}
