//! Entity layer: identity, activation and the two-phase tick
//!
//! Every object in the state manager implements [`Thinkable`]. The
//! scheduler runs `pre_think` for the whole active generation before any
//! `think`, so entities can stage intent in the first phase and commit in
//! the second.

use log::trace;

use crate::id::UniqueId;
use crate::message::{ScriptMsg, ScriptMsgKind};
use crate::state_manager::StateManager;
use crate::type_tag::TypeTag;

/// State every layer shares
#[derive(Clone, Debug)]
pub struct EntityBase {
    pub id: UniqueId,
    pub name: String,
    active: bool,
    /// Minimum time between thinks; None thinks every tick
    think_interval: Option<f32>,
    think_accumulator: f32,
    /// Objects that receive this entity's outgoing script messages
    pub targets: Vec<UniqueId>,
}

impl EntityBase {
    /// New entities start inactive
    pub fn new(id: UniqueId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: false,
            think_interval: None,
            think_accumulator: 0.0,
            targets: Vec::new(),
        }
    }

    /// Spawn already active
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn with_think_interval(mut self, seconds: f32) -> Self {
        self.think_interval = Some(seconds.max(0.0));
        self
    }

    pub fn with_target(mut self, target: UniqueId) -> Self {
        self.targets.push(target);
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the flag changed
    pub(crate) fn set_active_flag(&mut self, active: bool) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }

    pub fn think_interval(&self) -> Option<f32> {
        self.think_interval
    }

    pub fn advance_throttle(&mut self, dt: f32) {
        self.think_accumulator += dt;
    }

    pub fn throttle_ready(&self) -> bool {
        match self.think_interval {
            None => true,
            Some(interval) => self.think_accumulator >= interval,
        }
    }

    pub fn consume_throttle(&mut self) {
        match self.think_interval {
            Some(interval) if interval > 0.0 => {
                self.think_accumulator = (self.think_accumulator - interval).max(0.0);
            }
            _ => self.think_accumulator = 0.0,
        }
    }

    /// Post `kind` to every target
    pub fn send_to_targets(&self, mgr: &mut StateManager, kind: ScriptMsgKind) {
        for target in &self.targets {
            mgr.post_message(*target, ScriptMsg::new(kind, self.id));
        }
    }
}

/// The scheduling contract every object implements
pub trait Thinkable {
    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;
    fn type_tag(&self) -> TypeTag;

    fn id(&self) -> UniqueId {
        self.base().id
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn is_active(&self) -> bool {
        self.base().is_active()
    }

    /// True for this object's own layer and every layer it specialises
    fn types_match(&self, tag: TypeTag) -> bool {
        self.type_tag().is_a(tag)
    }

    fn pre_think(&mut self, _dt: f32, _mgr: &mut StateManager) {}

    fn think(&mut self, _dt: f32, _mgr: &mut StateManager) {}

    /// Delivery from the message bus; may run any number of times per tick
    fn accept_script_msg(&mut self, mgr: &mut StateManager, msg: &ScriptMsg) {
        route_activation(self, mgr, msg);
    }

    /// Setting the current state again is a no-op; returns whether it changed
    fn set_active(&mut self, _mgr: &mut StateManager, active: bool) -> bool {
        let changed = self.base_mut().set_active_flag(active);
        if changed {
            trace!("{} '{}' active = {}", self.type_tag(), self.name(), active);
        }
        changed
    }

    /// Whether `think` should run this tick
    fn do_think_logic(&self, _mgr: &StateManager) -> bool {
        self.is_active() && self.base().throttle_ready()
    }

    /// Layer cleanup run once by the state manager before removal
    fn finalize(&mut self, mgr: &mut StateManager);
}

/// Route `Activate`/`Deactivate` to `set_active`; returns false for other kinds
///
/// Layers that override `accept_script_msg` call this so activation still
/// reaches their own `set_active`.
pub fn route_activation<T: Thinkable + ?Sized>(this: &mut T, mgr: &mut StateManager, msg: &ScriptMsg) -> bool {
    match msg.kind {
        ScriptMsgKind::Activate => {
            this.set_active(mgr, true);
            true
        }
        ScriptMsgKind::Deactivate => {
            this.set_active(mgr, false);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle() {
        let mut base = EntityBase::new(UniqueId::default(), "slow").with_think_interval(0.5);
        assert!(!base.throttle_ready());
        base.advance_throttle(0.3);
        assert!(!base.throttle_ready());
        base.advance_throttle(0.3);
        assert!(base.throttle_ready());
        base.consume_throttle();
        assert!((0.0..0.2).contains(&base.think_accumulator));
        assert!(!base.throttle_ready());
    }

    #[test]
    fn test_unthrottled_is_always_ready() {
        let base = EntityBase::new(UniqueId::default(), "fast");
        assert!(base.throttle_ready());
        assert!(!base.is_active());
        assert!(base.clone().activated().is_active());
    }

    #[test]
    fn test_active_flag_reports_change() {
        let mut base = EntityBase::new(UniqueId::default(), "e");
        assert!(base.set_active_flag(true));
        assert!(!base.set_active_flag(true));
        assert!(base.set_active_flag(false));
    }
}
