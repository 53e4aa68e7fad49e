//! Bare scripting entities
//!
//! These have no spatial presence. They exist to wire objects together
//! through script messages.

use log::debug;

use crate::entity::{route_activation, EntityBase, Thinkable};
use crate::id::UniqueId;
use crate::message::{ScriptMsg, ScriptMsgKind};
use crate::state_manager::StateManager;
use crate::type_tag::TypeTag;

/// Forwards every non-activation message it receives to its targets
pub struct Relay {
    base: EntityBase,
    pub forwarded: u32,
}

impl Relay {
    pub fn new(id: UniqueId, name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(id, name).activated(),
            forwarded: 0,
        }
    }

    pub fn with_target(mut self, target: UniqueId) -> Self {
        self.base.targets.push(target);
        self
    }
}

impl Thinkable for Relay {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Entity
    }

    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        if route_activation(self, mgr, msg) || !self.is_active() {
            return;
        }
        self.base.send_to_targets(mgr, msg.kind);
        self.forwarded += 1;
    }

    fn finalize(&mut self, _mgr: &mut StateManager) {
        debug!("relay '{}' finalized after forwarding {} messages", self.base.name, self.forwarded);
    }
}

/// Counts down while active and sends `Action` to its targets when it expires
pub struct Timer {
    base: EntityBase,
    pub duration: f32,
    remaining: f32,
    /// Restart instead of deactivating after firing
    pub auto_reset: bool,
    pub fired: u32,
}

impl Timer {
    pub fn new(id: UniqueId, name: impl Into<String>, duration: f32) -> Self {
        Self {
            base: EntityBase::new(id, name),
            duration,
            remaining: duration,
            auto_reset: false,
            fired: 0,
        }
    }

    pub fn with_target(mut self, target: UniqueId) -> Self {
        self.base.targets.push(target);
        self
    }

    pub fn repeating(mut self) -> Self {
        self.auto_reset = true;
        self
    }

    pub fn running(mut self) -> Self {
        self.base = self.base.activated();
        self
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl Thinkable for Timer {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Entity
    }

    fn think(&mut self, dt: f32, mgr: &mut StateManager) {
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return;
        }
        self.fired += 1;
        self.base.send_to_targets(mgr, ScriptMsgKind::Action);
        if self.auto_reset {
            self.remaining += self.duration;
        } else {
            self.remaining = 0.0;
            self.set_active(mgr, false);
        }
    }

    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        match msg.kind {
            ScriptMsgKind::Start => {
                self.remaining = self.duration;
                self.set_active(mgr, true);
            }
            ScriptMsgKind::Stop => {
                self.set_active(mgr, false);
            }
            ScriptMsgKind::Reset => self.remaining = self.duration,
            _ => {
                route_activation(self, mgr, msg);
            }
        }
    }

    fn finalize(&mut self, _mgr: &mut StateManager) {
        debug!("timer '{}' finalized, fired {} times", self.base.name, self.fired);
    }
}

/// Counts `Increment`/`Decrement` and sends `MaxReached` at its limit
pub struct Counter {
    base: EntityBase,
    count: u32,
    pub max: u32,
    pub auto_reset: bool,
}

impl Counter {
    pub fn new(id: UniqueId, name: impl Into<String>, max: u32) -> Self {
        Self {
            base: EntityBase::new(id, name).activated(),
            count: 0,
            max,
            auto_reset: false,
        }
    }

    pub fn with_target(mut self, target: UniqueId) -> Self {
        self.base.targets.push(target);
        self
    }

    pub fn auto_reset(mut self) -> Self {
        self.auto_reset = true;
        self
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Thinkable for Counter {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Entity
    }

    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        match msg.kind {
            ScriptMsgKind::Increment if self.is_active() => {
                self.count += 1;
                if self.count == self.max {
                    self.base.send_to_targets(mgr, ScriptMsgKind::MaxReached);
                    if self.auto_reset {
                        self.count = 0;
                    }
                }
            }
            ScriptMsgKind::Decrement if self.is_active() => {
                self.count = self.count.saturating_sub(1);
            }
            ScriptMsgKind::Reset => self.count = 0,
            _ => {
                route_activation(self, mgr, msg);
            }
        }
    }

    fn finalize(&mut self, _mgr: &mut StateManager) {
        debug!("counter '{}' finalized at {}/{}", self.base.name, self.count, self.max);
    }
}
