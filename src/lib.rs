//! Strata - actor runtime
//!
//! Application layer over the actor hierarchy: configuration, the fixed-step
//! simulation driver, render collection and scene construction.

pub mod config;
pub mod scene;
pub mod systems;
