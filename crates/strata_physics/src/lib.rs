//! Collision support for Strata actors
//!
//! This crate provides the collision side of the actor runtime:
//! - Collision primitives owned by physics actors
//! - Narrow-phase tests between spheres, boxes and planes
//! - Layer/mask filtering
//! - Per-actor resolution responses and contact lists
//! - The solver that finds contacts and computes separations
//!
//! The solver is generic over the owner key so it never needs to know
//! what kind of object owns a primitive.

pub mod collision;
pub mod info;
pub mod material;
pub mod primitive;
pub mod response;
pub mod solver;

// Re-export commonly used types
pub use collision::{aabb_vs_aabb, aabb_vs_plane, collide, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, CollisionFilter, CollisionLayer, Contact};
pub use info::{CollisionInfo, CollisionInfoList};
pub use material::{PhysicsMaterial, SurfaceKind};
pub use primitive::{Collider, CollisionPrimitive, PrimitiveShape, Sphere};
pub use response::CollisionResponse;
pub use solver::{CollisionSolver, ContactPair, Partner, Separation, SolverBody, SolverConfig, StaticCollider};
