//! Sort layers and special-sort flags for translucent draw work

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Renderer-assigned ordering bucket for sorted (translucent) work
///
/// Layers draw in declaration order. Within one layer entries draw back to
/// front unless the owners resolve the order themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SortLayer {
    Background,
    #[default]
    World,
    /// Flat stand-ins for distant characters
    Imposter,
    Character,
    Effects,
    Overlay,
}

bitflags! {
    /// Options for entries registered through special sort
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SortFlags: u8 {
        const NONE = 0;
        /// The entry is an imposter and may be reordered against other imposters
        const IMPOSTER = 1 << 0;
        /// Draw after everything else in the same layer
        const ALWAYS_ON_TOP = 1 << 1;
        /// Keep registration order instead of depth order within the layer
        const NO_DEPTH_SORT = 1 << 2;
    }
}
