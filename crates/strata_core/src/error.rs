//! Errors reported by the state manager

use thiserror::Error;

use crate::id::{SplinePathId, UniqueId};
use crate::type_tag::TypeTag;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("no object with id {0:?}")]
    NotFound(UniqueId),

    /// The object is checked out by a hook that is still running
    #[error("object {0:?} is busy in a running hook")]
    Busy(UniqueId),

    #[error("object {0:?} must be deactivated before it is destroyed")]
    DestroyedWhileActive(UniqueId),

    #[error("object {id:?} is not a {expected}")]
    WrongLayer { id: UniqueId, expected: TypeTag },

    #[error("no spline path with id {0:?}")]
    UnknownSpline(SplinePathId),
}
