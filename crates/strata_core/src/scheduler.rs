//! The per-tick update
//!
//! One call to [`StateManager::update`] runs the phases in a fixed order:
//!
//! 1. PreThink for every object active at the start of the tick
//! 2. Think for those whose `do_think_logic` agrees
//! 3. Script message delivery
//! 4. Collision pass
//! 5. Touch pass
//! 6. Animation advancement and animation events
//! 7. Spline re-snap for path followers
//!
//! Messages posted after phase 3 are delivered at the end of the tick.

use log::trace;

use crate::anim::AdvancementDeltas;
use crate::collision_pass::{run_collision_pass, run_touch_pass};
use crate::id::UniqueId;
use crate::state_manager::StateManager;

/// What one tick did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub pre_thinks: usize,
    pub thinks: usize,
    pub messages: usize,
    pub contacts: usize,
    pub collision_notifications: usize,
    pub touches: usize,
    pub anim_events: usize,
}

impl StateManager {
    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) -> TickReport {
        self.tick += 1;
        self.time += f64::from(dt);
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let generation = self.active_ids();

        for &id in &generation {
            let ran = self.with_object(id, |object, mgr| {
                let entity = object.thinkable_mut();
                if !entity.is_active() {
                    return false;
                }
                entity.base_mut().advance_throttle(dt);
                entity.pre_think(dt, mgr);
                true
            });
            if ran == Ok(true) {
                report.pre_thinks += 1;
            }
        }

        for &id in &generation {
            let ran = self.with_object(id, |object, mgr| {
                let entity = object.thinkable_mut();
                if !entity.is_active() || !entity.do_think_logic(mgr) {
                    return false;
                }
                entity.think(dt, mgr);
                entity.base_mut().consume_throttle();
                true
            });
            if ran == Ok(true) {
                report.thinks += 1;
            }
        }

        report.messages += self.deliver_messages();

        let collisions = run_collision_pass(self);
        report.contacts = collisions.contacts;
        report.collision_notifications = collisions.notifications;

        report.touches = run_touch_pass(self);

        report.anim_events = self.advance_animation(dt);

        for id in self.active_ids() {
            let _ = self.with_object(id, |object, mgr| {
                if let Some(character) = object.character_mut() {
                    character.after_move_players(mgr, dt);
                }
            });
        }

        report.messages += self.deliver_messages();
        trace!("tick {}: {:?}", self.tick, report);
        report
    }

    /// Advance every animatable object, then deliver the events produced
    fn advance_animation(&mut self, dt: f32) -> usize {
        let deltas = AdvancementDeltas::new(dt);
        let mut events: Vec<(UniqueId, _)> = self.take_anim_events();

        for id in self.active_ids() {
            let produced = self.with_object(id, |object, _| {
                object
                    .animatable_mut()
                    .map(|animated| {
                        animated.on_animation_advancement(&deltas);
                        animated.take_anim_events()
                    })
                    .unwrap_or_default()
            });
            if let Ok(produced) = produced {
                events.extend(produced.into_iter().map(|event| (id, event)));
            }
        }

        let mut delivered = 0;
        for (target, event) in events {
            let handled = self.with_object(target, |object, mgr| {
                let active = object.is_active();
                match object.animatable_mut() {
                    Some(animated) if active => {
                        animated.do_user_anim_event(mgr, &event.notify, event.state, event.time);
                        true
                    }
                    _ => false,
                }
            });
            if handled == Ok(true) {
                delivered += 1;
            }
        }
        delivered
    }
}
