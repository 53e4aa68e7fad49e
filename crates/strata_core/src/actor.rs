//! Actor layer: spatial identity, visibility, touch and damage
//!
//! [`Spatial`] and [`Damageable`] carry the Actor behavior as default
//! methods over [`ActorBase`]. Higher layers implement the accessors and
//! override only the hooks they specialise.

use log::{debug, trace};
use strata_math::{Aabb, Containment, Vec3};
use strata_physics::PhysicsMaterial;

use crate::damage::{compute_damage, DamageInfo, DamageOriginator, DamageResult, DamageVulnerability, HealthInfo};
use crate::entity::{route_activation, EntityBase, Thinkable};
use crate::id::UniqueId;
use crate::message::{ScriptMsg, ScriptMsgKind};
use crate::state_manager::StateManager;
use crate::transform::{Transform, TransformState, VersionedCache};
use crate::type_tag::TypeTag;

/// Spatial and damage state shared by every actor layer
#[derive(Clone, Debug)]
pub struct ActorBase {
    pub entity: EntityBase,
    transform: TransformState,
    /// Local-space coarse volume; None never touches and is never on screen
    touch_extents: Option<Aabb>,
    /// Local-space sub-part volumes for the narrow touch test
    detailed_parts: Vec<Aabb>,
    /// Local-space hit volume; falls back to the touch volume
    damage_extents: Option<Aabb>,
    pub vulnerability: DamageVulnerability,
    pub material: PhysicsMaterial,
    touch_cache: VersionedCache<Option<Aabb>>,
    detailed_cache: VersionedCache<Vec<Aabb>>,
}

impl ActorBase {
    pub fn new(entity: EntityBase) -> Self {
        Self {
            entity,
            transform: TransformState::default(),
            touch_extents: Some(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))),
            detailed_parts: Vec::new(),
            damage_extents: None,
            vulnerability: DamageVulnerability::normal(),
            material: PhysicsMaterial::default(),
            touch_cache: VersionedCache::new(),
            detailed_cache: VersionedCache::new(),
        }
    }

    pub fn named(id: UniqueId, name: impl Into<String>) -> Self {
        Self::new(EntityBase::new(id, name))
    }

    pub fn activated(mut self) -> Self {
        self.entity = self.entity.activated();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = TransformState::new(transform);
        self
    }

    pub fn with_position(self, position: Vec3) -> Self {
        self.with_transform(Transform::from_position(position))
    }

    pub fn with_touch_extents(mut self, local: Option<Aabb>) -> Self {
        self.touch_extents = local;
        self
    }

    pub fn with_detailed_parts(mut self, parts: Vec<Aabb>) -> Self {
        self.detailed_parts = parts;
        self
    }

    pub fn with_damage_extents(mut self, local: Aabb) -> Self {
        self.damage_extents = Some(local);
        self
    }

    pub fn with_vulnerability(mut self, vulnerability: DamageVulnerability) -> Self {
        self.vulnerability = vulnerability;
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_target(mut self, target: UniqueId) -> Self {
        self.entity.targets.push(target);
        self
    }

    pub fn transform(&self) -> &Transform {
        self.transform.get()
    }

    pub fn transform_version(&self) -> u64 {
        self.transform.version()
    }

    pub(crate) fn put_transform(&mut self, transform: Transform) {
        self.transform.put(transform);
    }

    /// Advance the version token so cached bounds rebuild on next read
    pub fn invalidate(&mut self) {
        self.transform.mark_dirty();
    }

    /// Drop cached bounds without moving the version
    pub fn invalidate_caches(&self) {
        self.touch_cache.invalidate();
        self.detailed_cache.invalidate();
    }

    pub fn touch_bounds(&self) -> Option<Aabb> {
        self.touch_cache.get_or_update(self.transform.version(), || {
            self.touch_extents.map(|local| self.transform().transform_aabb(&local))
        })
    }

    pub fn detailed_bounds(&self) -> Vec<Aabb> {
        self.detailed_cache
            .get_or_update(self.transform.version(), || self.world_bounds_of(&self.detailed_parts))
    }

    pub fn damage_bounds(&self) -> Option<Aabb> {
        self.damage_extents
            .map(|local| self.transform().transform_aabb(&local))
    }

    /// Place local-space boxes at the current transform
    pub fn world_bounds_of(&self, local: &[Aabb]) -> Vec<Aabb> {
        local
            .iter()
            .map(|part| self.transform().transform_aabb(part))
            .collect()
    }
}

/// Spatial identity, visibility and touch
pub trait Spatial: Thinkable {
    fn actor(&self) -> &ActorBase;
    fn actor_mut(&mut self) -> &mut ActorBase;

    fn transform(&self) -> &Transform {
        self.actor().transform()
    }

    /// The only way to move an actor; always followed by `set_transform_dirty`
    fn set_transform(&mut self, transform: Transform) {
        self.actor_mut().put_transform(transform);
        self.set_transform_dirty();
    }

    fn translate(&mut self, delta: Vec3) {
        let mut transform = *self.transform();
        transform.position += delta;
        self.set_transform(transform);
    }

    fn set_transform_dirty(&mut self) {
        self.actor_mut().invalidate();
    }

    fn touch_bounds(&self) -> Option<Aabb> {
        self.actor().touch_bounds()
    }

    /// Per-part volumes; only worth asking for once the coarse bounds overlap
    fn detailed_touch_bounds(&self) -> Vec<Aabb> {
        self.actor().detailed_bounds()
    }

    fn damage_bounds(&self) -> Option<Aabb> {
        self.actor().damage_bounds().or_else(|| self.touch_bounds())
    }

    /// Coarse test first, then the detailed parts of both sides
    fn touches(&self, other: &dyn Spatial) -> bool {
        let (Some(mine), Some(theirs)) = (self.touch_bounds(), other.touch_bounds()) else {
            return false;
        };
        if !mine.intersects(&theirs) {
            return false;
        }

        let mut my_parts = self.detailed_touch_bounds();
        if my_parts.is_empty() {
            my_parts.push(mine);
        }
        let mut their_parts = other.detailed_touch_bounds();
        if their_parts.is_empty() {
            their_parts.push(theirs);
        }
        my_parts
            .iter()
            .any(|a| their_parts.iter().any(|b| a.intersects(b)))
    }

    /// Proximity notification, independent of the collision solver
    fn touch(&mut self, _mgr: &mut StateManager, _other: UniqueId) {}

    fn is_on_screen(&self, mgr: &StateManager) -> bool {
        let (Some(frustum), Some(bounds)) = (mgr.camera_frustum(), self.touch_bounds()) else {
            return false;
        };
        frustum.classify_aabb(&bounds).is_visible()
    }

    /// Coarse bounds and every detailed part fully inside the view
    fn is_completely_on_screen(&self, mgr: &StateManager) -> bool {
        if !self.is_on_screen(mgr) {
            return false;
        }
        let (Some(frustum), Some(bounds)) = (mgr.camera_frustum(), self.touch_bounds()) else {
            return false;
        };
        frustum.classify_aabb(&bounds) == Containment::Inside
            && self
                .detailed_touch_bounds()
                .iter()
                .all(|part| frustum.classify_aabb(part) == Containment::Inside)
    }

    /// Where attackers should aim
    fn aim_position(&self, _mgr: &StateManager, _dt: f32) -> Vec3 {
        self.damage_bounds()
            .map_or(self.transform().position, |b| b.center())
    }

    /// Where observers should look: top centre of the touch volume
    fn look_at_position(&self, _mgr: &StateManager) -> Vec3 {
        match self.touch_bounds() {
            Some(b) => Vec3::new(b.center().x, b.max.y, b.center().z),
            None => self.transform().position,
        }
    }

    /// How long a rider keeps this actor's motion after stepping off
    fn platform_rider_decay_time(&self) -> f32 {
        0.0
    }

    fn notify_material_list_changed(&mut self) {
        self.actor().invalidate_caches();
    }
}

/// Damage computation and reaction
pub trait Damageable: Spatial {
    /// None below the character layer
    fn health_info(&self) -> Option<&HealthInfo> {
        None
    }

    fn damage_vulnerability(&self) -> &DamageVulnerability {
        &self.actor().vulnerability
    }

    /// Store a computed result; part of the damage pipeline only
    fn commit_damage(&mut self, _result: &DamageResult) {}

    /// Compute, commit, then notify exactly once
    fn process_and_notify_damage(&mut self, mgr: &mut StateManager, source: UniqueId, info: &DamageInfo) -> DamageResult {
        let result = compute_damage(self.health_info(), self.damage_vulnerability(), info);
        self.commit_damage(&result);
        let originator = mgr.originator_of(source);
        self.notify_damage_event(mgr, source, info, &result, originator);
        result
    }

    fn notify_damage_event(
        &mut self,
        _mgr: &mut StateManager,
        source: UniqueId,
        info: &DamageInfo,
        result: &DamageResult,
        originator: DamageOriginator,
    ) {
        debug!(
            "'{}' took {:.1} {:?} damage from {:?} ({:?}), {:.1} left",
            self.name(),
            result.applied,
            info.kind,
            source,
            originator,
            result.remaining_health
        );
    }
}

/// A plain actor: a volume in the world that can act as a touch trigger
#[derive(Clone, Debug)]
pub struct Actor {
    pub base: ActorBase,
    /// Sent to the entity's targets whenever something touches this actor
    pub touch_message: Option<ScriptMsgKind>,
    /// Deactivate after the first touch
    pub trigger_once: bool,
    /// A one-shot trigger has fired and waits for `Reset` or `Activate`
    pub fired: bool,
}

impl Actor {
    pub fn new(base: ActorBase) -> Self {
        Self {
            base,
            touch_message: None,
            trigger_once: false,
            fired: false,
        }
    }

    pub fn trigger(base: ActorBase, message: ScriptMsgKind) -> Self {
        Self {
            touch_message: Some(message),
            ..Self::new(base)
        }
    }

    pub fn once(mut self) -> Self {
        self.trigger_once = true;
        self
    }
}

impl Thinkable for Actor {
    fn base(&self) -> &EntityBase {
        &self.base.entity
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base.entity
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Actor
    }

    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        if matches!(msg.kind, ScriptMsgKind::Reset | ScriptMsgKind::Activate) {
            self.fired = false;
        }
        route_activation(self, mgr, msg);
    }

    fn finalize(&mut self, _mgr: &mut StateManager) {
        self.base.invalidate_caches();
        trace!("actor '{}' finalized", self.base.entity.name);
    }
}

impl Spatial for Actor {
    fn actor(&self) -> &ActorBase {
        &self.base
    }

    fn actor_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn touch(&mut self, mgr: &mut StateManager, other: UniqueId) {
        let Some(kind) = self.touch_message else {
            return;
        };
        // The posted Deactivate lands after the touch pass, so later touchers
        // in the same pass must see the trigger as spent
        if self.trigger_once && self.fired {
            return;
        }
        trace!("trigger '{}' touched by {:?}", self.base.entity.name, other);
        self.base.entity.send_to_targets(mgr, kind);
        if self.trigger_once {
            self.fired = true;
            // Posted so the outermost layer's `set_active` handles it
            let id = self.base.entity.id;
            mgr.post_message(id, ScriptMsg::new(ScriptMsgKind::Deactivate, id));
        }
    }
}

impl Damageable for Actor {}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_at(position: Vec3) -> Actor {
        Actor::new(ActorBase::named(UniqueId::default(), "box").with_position(position))
    }

    #[test]
    fn test_touch_bounds_follow_transform() {
        let mut actor = actor_at(Vec3::ZERO);
        assert_eq!(actor.touch_bounds().map(|b| b.center()), Some(Vec3::ZERO));

        let version = actor.base.transform_version();
        actor.translate(Vec3::new(2.0, 0.0, 0.0));
        assert!(actor.base.transform_version() > version);
        assert_eq!(actor.touch_bounds().map(|b| b.center()), Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_touches_needs_detailed_overlap() {
        let parts = vec![
            Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(-0.3, 0.5, 0.5)),
            Aabb::new(Vec3::new(0.3, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)),
        ];
        let ring = Actor::new(ActorBase::named(UniqueId::default(), "ring").with_detailed_parts(parts));
        // Sits in the gap between the two parts
        let small = Actor::new(
            ActorBase::named(UniqueId::default(), "pin")
                .with_touch_extents(Some(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.1)))),
        );
        assert!(ring.touch_bounds().unwrap().intersects(&small.touch_bounds().unwrap()));
        assert!(!ring.touches(&small));
        assert!(!small.touches(&ring));

        let wide = actor_at(Vec3::new(0.6, 0.0, 0.0));
        assert!(ring.touches(&wide));
    }

    #[test]
    fn test_no_extents_never_touches() {
        let ghost = Actor::new(ActorBase::named(UniqueId::default(), "ghost").with_touch_extents(None));
        let other = actor_at(Vec3::ZERO);
        assert!(ghost.touch_bounds().is_none());
        assert!(!ghost.touches(&other));
        assert!(!other.touches(&ghost));
    }

    #[test]
    fn test_damage_bounds_fall_back_to_touch() {
        let actor = actor_at(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(actor.damage_bounds(), actor.touch_bounds());

        let actor = Actor::new(
            ActorBase::named(UniqueId::default(), "head")
                .with_damage_extents(Aabb::from_center_half_extents(Vec3::new(0.0, 2.0, 0.0), Vec3::splat(0.2))),
        );
        assert_eq!(actor.damage_bounds().map(|b| b.center()), Some(Vec3::new(0.0, 2.0, 0.0)));
    }
}
