//! Script messages and the queue that carries them between objects

use crate::id::UniqueId;

/// What a script message asks the receiver to do
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptMsgKind {
    Activate,
    Deactivate,
    Reset,
    Action,
    Increment,
    Decrement,
    MaxReached,
    Start,
    Stop,
    /// A path follower reached the end of its path
    Arrived,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptMsg {
    pub kind: ScriptMsgKind,
    /// Null when the message comes from outside the object graph
    pub sender: UniqueId,
}

impl ScriptMsg {
    pub fn new(kind: ScriptMsgKind, sender: UniqueId) -> Self {
        Self { kind, sender }
    }

    /// A message with no sending object
    pub fn external(kind: ScriptMsgKind) -> Self {
        Self::new(kind, UniqueId::default())
    }
}

/// A message waiting for delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub target: UniqueId,
    pub msg: ScriptMsg,
}

/// Messages queued for the next delivery round
#[derive(Debug, Default)]
pub struct MessageQueue {
    pending: Vec<Envelope>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: UniqueId, msg: ScriptMsg) {
        self.pending.push(Envelope { target, msg });
    }

    /// Take every pending message, in posting order
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
