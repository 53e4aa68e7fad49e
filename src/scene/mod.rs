//! Scene construction utilities
//!
//! This module provides a declarative API for populating a state manager.

mod scene_builder;

pub use scene_builder::{demo_scene, models, Scene, SceneBuilder};
