//! Integration tests for the actor hierarchy
//!
//! These drive objects through the public state manager API:
//! 1. Scheduling order and activation
//! 2. Script message wiring between bare entities
//! 3. Damage, collision and touch passes
//! 4. Render collection and sorting

use std::cell::RefCell;
use std::rc::Rc;

use strata_core::{
    run_render_pass, sort_tie_break, Actor, ActorBase, AnimEvent, AnimUserNotify, Camera, Collidable,
    CollisionPrimitive, CoreError, Counter, DamageInfo, DamageOriginator, DamageResult, DamageVulnerability,
    Damageable, EntityBase, GameCharacter, HealthInfo, ModelId, Object, PhysicsActor, PhysicsMaterial, PhysicsState,
    Relay, RenderActor, RenderManager, RenderState, ScriptMsg, ScriptMsgKind, SortLayer, Spatial, SplinePath,
    StateManager, StaticCollider, Thinkable, Timer, TypeTag, UniqueId, Vec3, Viewport, HIT_EMITTER,
};
use strata_render::{ParticleOrder, RenderBucket};

const DT: f32 = 1.0 / 60.0;

// ==================== Helpers ====================

type Log = Rc<RefCell<Vec<String>>>;

/// Bare entity that writes every hook it sees into a shared log
struct Recorder {
    base: EntityBase,
    log: Log,
}

impl Recorder {
    fn spawn(mgr: &mut StateManager, name: &str, log: &Log) -> UniqueId {
        let log = Rc::clone(log);
        let name = name.to_string();
        mgr.spawn(move |id| {
            Object::Entity(Box::new(Recorder {
                base: EntityBase::new(id, name).activated(),
                log,
            }))
        })
    }
}

impl Thinkable for Recorder {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Entity
    }

    fn pre_think(&mut self, _dt: f32, _mgr: &mut StateManager) {
        self.log.borrow_mut().push(format!("pre_think {}", self.base.name));
    }

    fn think(&mut self, _dt: f32, _mgr: &mut StateManager) {
        self.log.borrow_mut().push(format!("think {}", self.base.name));
    }

    fn accept_script_msg(&mut self, _mgr: &mut StateManager, msg: &ScriptMsg) {
        self.log.borrow_mut().push(format!("{:?}", msg.kind));
    }

    fn finalize(&mut self, _mgr: &mut StateManager) {}
}

fn messages(log: &Log) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| !entry.starts_with("pre_think") && !entry.starts_with("think"))
        .cloned()
        .collect()
}

/// Damage receiver with health that counts damage notifications
struct Dummy {
    base: ActorBase,
    health: HealthInfo,
    notified: Vec<DamageResult>,
}

impl Dummy {
    fn with_health(health: f32, max_health: f32) -> Self {
        Self {
            base: ActorBase::named(UniqueId::default(), "dummy").activated(),
            health: HealthInfo {
                health,
                ..HealthInfo::new(max_health)
            },
            notified: Vec::new(),
        }
    }
}

impl Thinkable for Dummy {
    fn base(&self) -> &EntityBase {
        &self.base.entity
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base.entity
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Actor
    }

    fn finalize(&mut self, _mgr: &mut StateManager) {}
}

impl Spatial for Dummy {
    fn actor(&self) -> &ActorBase {
        &self.base
    }

    fn actor_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
}

impl Damageable for Dummy {
    fn health_info(&self) -> Option<&HealthInfo> {
        Some(&self.health)
    }

    fn commit_damage(&mut self, result: &DamageResult) {
        self.health.health = result.remaining_health;
    }

    fn notify_damage_event(
        &mut self,
        _mgr: &mut StateManager,
        _source: UniqueId,
        _info: &DamageInfo,
        result: &DamageResult,
        _originator: DamageOriginator,
    ) {
        self.notified.push(*result);
    }
}

fn grunt(mgr: &mut StateManager, name: &str, position: Vec3) -> UniqueId {
    let name = name.to_string();
    mgr.spawn(move |id| {
        Object::Character(GameCharacter::humanoid(
            ActorBase::named(id, name).activated().with_position(position),
            RenderState::new(ModelId(10)),
            100.0,
        ))
    })
}

fn character(mgr: &StateManager, id: UniqueId) -> &GameCharacter {
    mgr.object(id)
        .and_then(Object::character)
        .expect("object should be a character")
}

fn physics_actor(mgr: &StateManager, id: UniqueId) -> &PhysicsActor {
    match mgr.object(id) {
        Some(Object::Physics(body)) => body,
        _ => panic!("object should be a physics actor"),
    }
}

// ==================== Scheduling Tests ====================

/// Every PreThink of a tick runs before any Think
#[test]
fn test_all_pre_thinks_before_any_think() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    Recorder::spawn(&mut mgr, "a", &log);
    Recorder::spawn(&mut mgr, "b", &log);
    Recorder::spawn(&mut mgr, "c", &log);

    let report = mgr.update(DT);
    assert_eq!(report.pre_thinks, 3);
    assert_eq!(report.thinks, 3);

    let entries = log.borrow();
    let last_pre = entries.iter().rposition(|e| e.starts_with("pre_think"));
    let first_think = entries.iter().position(|e| e.starts_with("think"));
    assert_eq!(entries.len(), 6);
    assert!(last_pre < first_think, "PreThink must finish before Think: {:?}", entries);
}

/// Setting the current active state again changes nothing
#[test]
fn test_set_active_is_idempotent() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let id = Recorder::spawn(&mut mgr, "r", &log);

    assert_eq!(mgr.set_active(id, true), Ok(false));
    assert_eq!(mgr.set_active(id, false), Ok(true));
    assert_eq!(mgr.set_active(id, false), Ok(false));
    assert!(!mgr.object(id).is_some_and(Object::is_active));

    // Inactive objects skip both phases
    let report = mgr.update(DT);
    assert_eq!(report.pre_thinks, 0);
    assert!(log.borrow().is_empty());
}

/// An active object cannot be destroyed
#[test]
fn test_destroy_requires_deactivation() {
    let mut mgr = StateManager::new();
    let id = grunt(&mut mgr, "grunt", Vec3::ZERO);

    assert!(matches!(mgr.destroy(id), Err(CoreError::DestroyedWhileActive(other)) if other == id));
    assert!(mgr.contains(id));

    mgr.set_active(id, false).expect("set_active should reach the grunt");
    assert!(mgr.destroy(id).is_ok());
    assert!(!mgr.contains(id));
    assert!(matches!(mgr.destroy(id), Err(CoreError::NotFound(_))));
}

/// Layer queries use is-a semantics
#[test]
fn test_types_match_walks_up_the_hierarchy() {
    let mut mgr = StateManager::new();
    let id = grunt(&mut mgr, "grunt", Vec3::ZERO);
    let grunt = mgr.object(id).expect("grunt should exist").thinkable();

    assert!(grunt.types_match(TypeTag::GameCharacter));
    assert!(grunt.types_match(TypeTag::PhysicsActor));
    assert!(grunt.types_match(TypeTag::Entity));
    assert_eq!(mgr.ids_matching(TypeTag::RenderActor), vec![id]);
}

// ==================== Script Message Tests ====================

/// Relay forwards into a counter which reports its maximum once
#[test]
fn test_relay_feeds_counter_to_max() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let sink = Recorder::spawn(&mut mgr, "sink", &log);
    let counter = mgr.spawn(|id| Object::Entity(Box::new(Counter::new(id, "counter", 3).with_target(sink))));
    let relay = mgr.spawn(|id| Object::Entity(Box::new(Relay::new(id, "relay").with_target(counter))));

    for _ in 0..3 {
        mgr.post_message(relay, ScriptMsg::external(ScriptMsgKind::Increment));
    }
    mgr.deliver_messages();

    assert_eq!(messages(&log), vec!["MaxReached".to_string()]);
    assert_eq!(mgr.pending_messages(), 0);
}

/// A one-shot timer fires once and switches itself off
#[test]
fn test_timer_fires_once_then_deactivates() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let sink = Recorder::spawn(&mut mgr, "sink", &log);
    let timer = mgr.spawn(|id| Object::Entity(Box::new(Timer::new(id, "timer", 0.5).with_target(sink).running())));

    for _ in 0..4 {
        mgr.update(0.25);
    }

    assert_eq!(messages(&log), vec!["Action".to_string()]);
    assert!(!mgr.object(timer).is_some_and(Object::is_active));
}

/// Activation messages reach inactive objects
#[test]
fn test_activate_message_wakes_inactive_timer() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let sink = Recorder::spawn(&mut mgr, "sink", &log);
    let timer = mgr.spawn(|id| Object::Entity(Box::new(Timer::new(id, "timer", 0.1).with_target(sink))));

    mgr.update(0.25);
    assert!(messages(&log).is_empty());

    mgr.post_message(timer, ScriptMsg::external(ScriptMsgKind::Activate));
    mgr.deliver_messages();
    assert!(mgr.object(timer).is_some_and(Object::is_active));

    mgr.update(0.25);
    assert_eq!(messages(&log), vec!["Action".to_string()]);
}

/// A one-shot trigger sends its message and deactivates itself
#[test]
fn test_trigger_once_touch() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let sink = Recorder::spawn(&mut mgr, "sink", &log);
    let trigger = mgr.spawn(|id| {
        Object::Actor(
            Actor::trigger(
                ActorBase::named(id, "plate").activated().with_target(sink),
                ScriptMsgKind::Action,
            )
            .once(),
        )
    });
    mgr.spawn(|id| Object::Actor(Actor::new(ActorBase::named(id, "crate").activated().with_position(Vec3::new(0.5, 0.0, 0.0)))));

    let report = mgr.update(DT);
    assert_eq!(report.touches, 1);
    assert_eq!(messages(&log), vec!["Action".to_string()]);
    assert!(!mgr.object(trigger).is_some_and(Object::is_active));

    let report = mgr.update(DT);
    assert_eq!(report.touches, 0);
    assert_eq!(messages(&log).len(), 1);
}

/// Two actors touching a one-shot plate in the same tick fire it once
#[test]
fn test_trigger_once_with_two_touchers() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let sink = Recorder::spawn(&mut mgr, "sink", &log);
    let plate = mgr.spawn(|id| {
        Object::Actor(
            Actor::trigger(
                ActorBase::named(id, "plate").activated().with_target(sink),
                ScriptMsgKind::Action,
            )
            .once(),
        )
    });
    for (name, x) in [("left", -0.5), ("right", 0.5)] {
        mgr.spawn(move |id| Object::Actor(Actor::new(ActorBase::named(id, name).activated().with_position(Vec3::new(x, 0.0, 0.0)))));
    }

    mgr.update(DT);
    mgr.update(DT);

    assert_eq!(messages(&log), vec!["Action".to_string()]);
    assert!(!mgr.object(plate).is_some_and(Object::is_active));

    // Re-arming lets it fire again
    mgr.post_message(plate, ScriptMsg::new(ScriptMsgKind::Activate, sink));
    mgr.update(DT);
    assert_eq!(messages(&log).len(), 2);
}

// ==================== Damage Tests ====================

/// Full health takes a partial hit and is notified exactly once
#[test]
fn test_damage_from_full_health() {
    let mut mgr = StateManager::new();
    let mut dummy = Dummy::with_health(100.0, 100.0);

    let result = dummy.process_and_notify_damage(&mut mgr, UniqueId::default(), &DamageInfo::physical(30.0));

    assert_eq!(result.remaining_health, 70.0);
    assert!(!result.died);
    assert_eq!(dummy.notified, vec![result]);
    assert_eq!(dummy.health.health, 70.0);
}

/// Overkill clamps at zero and reports the death
#[test]
fn test_damage_overkill_clamps_and_dies() {
    let mut mgr = StateManager::new();
    let mut dummy = Dummy::with_health(10.0, 100.0);

    let result = dummy.process_and_notify_damage(&mut mgr, UniqueId::default(), &DamageInfo::physical(30.0));

    assert_eq!(result.remaining_health, 0.0);
    assert!(result.died);
    assert_eq!(dummy.notified.len(), 1);

    // Already dead: no second death
    let again = dummy.process_and_notify_damage(&mut mgr, UniqueId::default(), &DamageInfo::physical(30.0));
    assert!(!again.died);
    assert_eq!(dummy.notified.len(), 2);
}

/// Identical state and input always give identical results
#[test]
fn test_damage_is_deterministic() {
    let mut mgr = StateManager::new();
    let hit = DamageInfo::physical(12.5).with_knockback(Vec3::new(1.0, 0.0, 1.0), 4.0);

    let mut a = Dummy::with_health(50.0, 100.0);
    let mut b = Dummy::with_health(50.0, 100.0);
    a.base.vulnerability = DamageVulnerability::normal().with(strata_core::DamageKind::Physical, 1.5);
    b.base.vulnerability = a.base.vulnerability;

    let first = a.process_and_notify_damage(&mut mgr, UniqueId::default(), &hit);
    let second = b.process_and_notify_damage(&mut mgr, UniqueId::default(), &hit);
    assert_eq!(first, second);
}

/// A killed character stops its AI and switches off at the end of the tick
#[test]
fn test_character_death_through_manager() {
    let mut mgr = StateManager::new();
    let id = grunt(&mut mgr, "grunt", Vec3::ZERO);
    mgr.with_object(id, |object, mgr| {
        if let Some(c) = object.character_mut() {
            c.setup_ai_state_machine(mgr);
            c.setup_anim_state_machine(mgr);
        }
    })
    .expect("grunt should exist");

    let hit = mgr
        .apply_damage(id, UniqueId::default(), &DamageInfo::physical(30.0))
        .expect("grunt takes damage");
    assert_eq!(hit.remaining_health, 70.0);

    let kill = mgr
        .apply_damage(id, UniqueId::default(), &DamageInfo::physical(100.0))
        .expect("grunt takes damage");
    assert!(kill.died);
    mgr.deliver_messages();

    let grunt = character(&mgr, id);
    assert!(grunt.is_dead());
    assert_eq!(grunt.ai_state(), Some(strata_core::AiState::Dead));
    assert_eq!(grunt.anim_state(), Some(strata_core::AnimState::Death));
    assert!(!grunt.is_active());
}

/// Hitting a dead character does nothing
#[test]
fn test_dead_character_ignores_further_hits() {
    let mut mgr = StateManager::new();
    let id = mgr.spawn(|id| {
        Object::Character(GameCharacter::humanoid(
            ActorBase::named(id, "grunt").activated(),
            RenderState::new(ModelId(10)).with_emitter(HIT_EMITTER, ParticleOrder::WithActorLast, 0.5),
            20.0,
        ))
    });

    let kill = mgr
        .apply_damage(id, UniqueId::default(), &DamageInfo::physical(50.0))
        .expect("grunt takes damage");
    assert!(kill.died);
    mgr.with_object(id, |object, _| {
        if let Some(c) = object.character_mut() {
            c.render_actor.render.particles.stop_all();
            c.physics_mut().velocity = Vec3::ZERO;
        }
    })
    .expect("grunt should exist");

    let hit = DamageInfo::physical(10.0).with_knockback(Vec3::X, 4.0);
    let again = mgr.apply_damage(id, UniqueId::default(), &hit).expect("grunt takes damage");
    assert_eq!(again.applied, 0.0);
    assert!(!again.died);

    let grunt = character(&mgr, id);
    assert!(!grunt.render_actor.render.particles.any_active());
    assert_eq!(grunt.physics().velocity, Vec3::ZERO);
}

/// Only actors can be damaged
#[test]
fn test_damage_on_bare_entity_is_rejected() {
    let mut mgr = StateManager::new();
    let log = Log::default();
    let id = Recorder::spawn(&mut mgr, "r", &log);

    let result = mgr.apply_damage(id, UniqueId::default(), &DamageInfo::physical(1.0));
    assert!(matches!(result, Err(CoreError::WrongLayer { expected: TypeTag::Actor, .. })));
}

// ==================== Collision Tests ====================

/// A body without a primitive is never told about collisions
#[test]
fn test_null_primitive_never_collides() {
    let mut mgr = StateManager::new();
    mgr.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::STONE));

    let ghost = mgr.spawn(|id| {
        Object::Physics(PhysicsActor::new(
            ActorBase::named(id, "ghost").activated().with_position(Vec3::new(0.0, 0.4, 0.0)),
            PhysicsState::without_primitive().without_gravity(),
        ))
    });
    let ball = mgr.spawn(|id| {
        Object::Physics(PhysicsActor::new(
            ActorBase::named(id, "ball").activated().with_position(Vec3::new(0.0, 0.4, 0.0)),
            PhysicsState::new(CollisionPrimitive::sphere(0.5)),
        ))
    });

    for _ in 0..5 {
        mgr.update(DT);
    }

    assert_eq!(physics_actor(&mgr, ghost).physics.collisions, 0);
    assert!(!physics_actor(&mgr, ghost).physics.grounded);

    let ball = physics_actor(&mgr, ball);
    assert!(ball.physics.collisions > 0);
    assert!(ball.physics.grounded);
    assert!(ball.transform().position.y >= 0.49);
}

/// A thrown object that runs out of time reports back to its owner
#[test]
fn test_thrown_object_expires_and_owner_forgets_it() {
    let mut mgr = StateManager::new();
    let owner = grunt(&mut mgr, "thrower", Vec3::ZERO);

    let rock = mgr
        .with_object(owner, |object, mgr| {
            object
                .character_mut()
                .and_then(|c| c.throw_object(mgr, Vec3::new(0.0, 5.0, -10.0)))
        })
        .expect("thrower should exist")
        .expect("first throw should succeed");
    assert_eq!(character(&mgr, owner).character.thrown, vec![rock]);

    let ticks = (strata_core::THROWN_LIFETIME / 0.1).ceil() as usize + 2;
    for _ in 0..ticks {
        mgr.update(0.1);
    }

    assert!(!mgr.object(rock).is_some_and(Object::is_active));
    assert!(character(&mgr, owner).character.thrown.is_empty());
}

// ==================== Spatial Tests ====================

/// Completely on screen always implies on screen
#[test]
fn test_completely_on_screen_implies_on_screen() {
    let mut mgr = StateManager::new();
    mgr.set_camera(Viewport::new(0, Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO), 800, 600));

    let positions = [
        Vec3::ZERO,
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(4.2, 0.0, 0.0),
        Vec3::new(40.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 20.0),
    ];
    for position in positions {
        let actor = Actor::new(ActorBase::named(UniqueId::default(), "probe").with_position(position));
        if actor.is_completely_on_screen(&mgr) {
            assert!(actor.is_on_screen(&mgr), "inconsistent visibility at {:?}", position);
        }
    }

    let centred = Actor::new(ActorBase::named(UniqueId::default(), "probe"));
    assert!(centred.is_completely_on_screen(&mgr));
    let behind = Actor::new(ActorBase::named(UniqueId::default(), "probe").with_position(Vec3::new(0.0, 0.0, 20.0)));
    assert!(!behind.is_on_screen(&mgr));
    assert!(!behind.is_completely_on_screen(&mgr));
}

/// No camera means nothing is on screen
#[test]
fn test_nothing_on_screen_without_camera() {
    let mgr = StateManager::new();
    let actor = Actor::new(ActorBase::named(UniqueId::default(), "probe"));
    assert!(!actor.is_on_screen(&mgr));
    assert!(!actor.is_completely_on_screen(&mgr));
}

/// Clearing a spline path leaves no transform on it
#[test]
fn test_spline_cleared_by_removal() {
    let mut mgr = StateManager::new();
    let path = mgr.add_spline(SplinePath::new(vec![
        Vec3::ZERO,
        Vec3::new(5.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
    ]));
    let id = grunt(&mut mgr, "walker", Vec3::ZERO);

    let attached = mgr
        .with_object(id, |object, mgr| object.character_mut().is_some_and(|c| c.set_spline_path_id(mgr, path)))
        .expect("walker should exist");
    assert!(attached);

    mgr.update(0.5);
    let walker = character(&mgr, id);
    assert!(walker.transform().position.x > 0.0);
    assert!(walker.transform_on_spline(&mgr).is_some());

    mgr.remove_spline(path).expect("path should exist");
    assert!(character(&mgr, id).transform_on_spline(&mgr).is_none());

    mgr.update(0.5);
    assert!(!character(&mgr, id).is_path_following());
}

// ==================== Character Tests ====================

/// Rebuilding the state machines replaces them instead of stacking
#[test]
fn test_fsm_setup_does_not_leak() {
    let mut mgr = StateManager::new();
    let id = grunt(&mut mgr, "grunt", Vec3::ZERO);
    mgr.with_object(id, |object, mgr| {
        if let Some(c) = object.character_mut() {
            c.setup_ai_state_machine(mgr);
            c.setup_anim_state_machine(mgr);
        }
    })
    .expect("grunt should exist");

    for _ in 0..3 {
        mgr.post_message(id, ScriptMsg::external(ScriptMsgKind::Reset));
        mgr.deliver_messages();
    }

    let grunt = &character(&mgr, id).character;
    assert_eq!(grunt.machines_built, 8);
    assert_eq!(grunt.ai.as_ref().map(|ai| ai.generation()), Some(7));
    assert_eq!(grunt.anim.as_ref().map(|anim| anim.generation()), Some(8));
}

// ==================== Animation Tests ====================

fn walker(mgr: &mut StateManager, position: Vec3) -> UniqueId {
    mgr.spawn(move |id| {
        Object::Render(RenderActor::new(
            ActorBase::named(id, "walker").activated().with_position(position),
            PhysicsState::new(CollisionPrimitive::sphere(0.5))
                .with_mass(10.0)
                .with_footstep_impulse(50.0),
            RenderState::new(ModelId(5)).with_emitter("dust", ParticleOrder::WithActorFirst, 0.5),
        ))
    })
}

fn render_actor(mgr: &StateManager, id: UniqueId) -> &RenderActor {
    match mgr.object(id) {
        Some(Object::Render(actor)) => actor,
        _ => panic!("object should be a render actor"),
    }
}

fn dust_active(actor: &RenderActor) -> bool {
    actor
        .render
        .particles
        .active(ParticleOrder::WithActorFirst)
        .any(|(_, emitter)| emitter.name == "dust")
}

/// Footsteps push a grounded body; particle events start its emitter
#[test]
fn test_anim_events_reach_physics_then_render() {
    let mut mgr = StateManager::new();
    mgr.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::STONE));
    let id = walker(&mut mgr, Vec3::new(0.0, 0.4, 0.0));

    mgr.send_anim_event(id, AnimEvent::entering(AnimUserNotify::Footstep, 0.0));
    mgr.send_anim_event(id, AnimEvent::entering(AnimUserNotify::Particle("dust".to_string()), 0.0));
    let report = mgr.update(DT);

    assert_eq!(report.anim_events, 2);
    let walker = render_actor(&mgr, id);
    assert!(walker.physics().grounded);
    assert!((walker.physics().velocity.z + 5.0).abs() < 1e-4);
    assert!(dust_active(walker));
}

/// No footstep impulse while airborne
#[test]
fn test_airborne_footstep_has_no_impulse() {
    let mut mgr = StateManager::new();
    mgr.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::STONE));
    let id = walker(&mut mgr, Vec3::new(0.0, 5.0, 0.0));

    mgr.send_anim_event(id, AnimEvent::entering(AnimUserNotify::Footstep, 0.0));
    mgr.send_anim_event(id, AnimEvent::entering(AnimUserNotify::Particle("dust".to_string()), 0.0));
    let report = mgr.update(DT);

    assert_eq!(report.anim_events, 2);
    let walker = render_actor(&mgr, id);
    assert!(!walker.physics().grounded);
    assert_eq!(walker.physics().velocity.z, 0.0);
    assert!(dust_active(walker));
}

// ==================== Render Tests ====================

fn render_manager() -> RenderManager<UniqueId> {
    let mut rm = RenderManager::new();
    rm.add_viewport(Viewport::new(0, Camera::looking_at(Vec3::new(0.0, 1.0, 10.0), Vec3::new(0.0, 1.0, 0.0)), 800, 600));
    rm
}

fn spawn_sort_pair(mgr: &mut StateManager, character_first: bool) -> (UniqueId, UniqueId) {
    let spawn_lamp = |mgr: &mut StateManager| {
        mgr.spawn(|id| {
            Object::Render(RenderActor::scenery(
                ActorBase::named(id, "lamp").activated().with_position(Vec3::new(0.0, 0.0, -2.0)),
                RenderState::new(ModelId(1)).translucent(),
            ))
        })
    };
    let spawn_ghost = |mgr: &mut StateManager| {
        mgr.spawn(|id| {
            let mut ghost = GameCharacter::humanoid(
                ActorBase::named(id, "ghost").activated().with_position(Vec3::new(0.0, 0.0, 2.0)),
                RenderState::new(ModelId(2)).translucent(),
                50.0,
            );
            ghost.character.sort_layer = SortLayer::World;
            Object::Character(ghost)
        })
    };

    if character_first {
        let ghost = spawn_ghost(mgr);
        (ghost, spawn_lamp(mgr))
    } else {
        let lamp = spawn_lamp(mgr);
        (spawn_ghost(mgr), lamp)
    }
}

/// A character on a shared layer draws ahead of scenery whatever the spawn order
#[test]
fn test_render_sort_is_antisymmetric() {
    for character_first in [true, false] {
        let mut mgr = StateManager::new();
        let (ghost, lamp) = spawn_sort_pair(&mut mgr, character_first);
        let mut rm = render_manager();

        let stats = run_render_pass(&mut mgr, &mut rm);
        assert_eq!(stats.sort_entries, 2);

        let sorted: Vec<UniqueId> = rm.bucket(RenderBucket::Sorted).iter().map(|c| c.owner).collect();
        assert_eq!(sorted, vec![ghost, lamp], "character_first = {}", character_first);

        let entries = rm.sort_entries().to_vec();
        let ghost_entry = entries.iter().find(|e| e.owner == ghost).expect("ghost entry");
        let lamp_entry = entries.iter().find(|e| e.owner == lamp).expect("lamp entry");
        let forward = sort_tie_break(&mgr, ghost_entry, lamp_entry);
        let backward = sort_tie_break(&mgr, lamp_entry, ghost_entry);
        assert_eq!(forward, backward.map(std::cmp::Ordering::reverse));
    }
}

/// Opaque actors go to the unsorted bucket, which flushes first
#[test]
fn test_render_pass_buckets() {
    let mut mgr = StateManager::new();
    let wall = mgr.spawn(|id| {
        Object::Render(RenderActor::scenery(
            ActorBase::named(id, "wall").activated(),
            RenderState::new(ModelId(5)),
        ))
    });
    let glass = mgr.spawn(|id| {
        Object::Render(RenderActor::scenery(
            ActorBase::named(id, "glass").activated().with_position(Vec3::new(1.0, 0.0, 0.0)),
            RenderState::new(ModelId(6)).translucent(),
        ))
    });
    mgr.spawn(|id| {
        Object::Render(RenderActor::scenery(
            ActorBase::named(id, "hidden").activated().with_position(Vec3::new(0.0, 0.0, 50.0)),
            RenderState::new(ModelId(7)),
        ))
    });

    let mut rm = render_manager();
    run_render_pass(&mut mgr, &mut rm);

    assert!(rm.bucket(RenderBucket::Unsorted).iter().all(|c| c.owner == wall));
    assert_eq!(rm.bucket(RenderBucket::Sorted).len(), 1);

    let flushed = rm.flush();
    assert_eq!(flushed.first().map(|c| c.owner), Some(wall));
    assert_eq!(flushed.last().map(|c| c.owner), Some(glass));
}
