//! Math library for the Strata actor runtime
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector
//! - [`Quat`] - Unit quaternion rotation
//!
//! ## Volumes
//!
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Plane`] - Infinite plane (normal + distance)
//! - [`Frustum`] - Six-plane camera volume with containment queries
//!
//! ## Paths
//!
//! - [`SplinePath`] - Catmull-Rom path sampled by parametric t

mod vec3;
mod quat;
pub mod aabb;
pub mod plane;
pub mod frustum;
pub mod spline;

pub use vec3::Vec3;
pub use quat::Quat;
pub use aabb::Aabb;
pub use plane::Plane;
pub use frustum::{Containment, Frustum};
pub use spline::{SplinePath, SplineSample};
