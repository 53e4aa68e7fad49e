//! Application systems
//!
//! Modular systems extracted from main.rs for better organization and testability.

mod render;
mod simulation;

pub use render::{FrameSummary, RenderError, RenderSystem};
pub use simulation::{SimulationResult, SimulationSystem};
