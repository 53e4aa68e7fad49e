//! Render submission for Strata actors
//!
//! Nothing here talks to a GPU. Actors describe what they want drawn and the
//! [`RenderManager`] collects it into buckets for one frame:
//!
//! - [`camera::Camera`] - Position, orientation and projection, producing a frustum
//! - [`viewport::Viewport`] - One camera rendered into a region of the target
//! - [`manager::RenderManager`] - Draw builder with a fixed Unsorted then Sorted flush
//! - [`sort`] - Sort layers and special-sort flags for translucent work
//! - [`particles`] - Particle emitters drawn before or after their actor
//! - [`shadow`] - Shadow casting policy
//!
//! The manager is generic over the owner key so it never needs to know what
//! kind of object submitted a command.

pub mod camera;
pub mod command;
pub mod manager;
pub mod particles;
pub mod shadow;
pub mod sort;
pub mod viewport;

pub use camera::Camera;
pub use command::{DrawCommand, DrawKind, ModelId, RenderBucket};
pub use manager::{RenderManager, RenderStats, SortedEntry};
pub use particles::{AnimParticleManager, ParticleEmitter, ParticleOrder};
pub use shadow::{ShadowHitResponse, ShadowPolicy};
pub use sort::{SortFlags, SortLayer};
pub use viewport::Viewport;
