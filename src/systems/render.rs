//! Render collection system
//!
//! Owns the render manager and its viewports:
//! - Viewport layout from config
//! - Camera follow
//! - Frame collection and flush

use strata_core::{run_render_pass, Camera, RenderManager, StateManager, UniqueId, Vec3, Viewport};
use strata_render::{DrawCommand, DrawKind, RenderBucket};

use crate::config::RenderConfig;

/// Render error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Configuration asked for zero viewports
    NoViewports,
    /// A viewport index outside the configured layout
    BadViewport(usize),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::NoViewports => write!(f, "No viewports configured"),
            RenderError::BadViewport(index) => write!(f, "No viewport {}", index),
        }
    }
}

impl std::error::Error for RenderError {}

/// What one collected frame contained
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub frame: u64,
    pub models: usize,
    pub model_data: usize,
    pub particles: usize,
    pub sorted: usize,
}

impl FrameSummary {
    fn from_commands(frame: u64, commands: &[DrawCommand<UniqueId>], sorted: usize) -> Self {
        let mut summary = Self {
            frame,
            sorted,
            ..Self::default()
        };
        for command in commands {
            match command.kind {
                DrawKind::Model(_) => summary.models += 1,
                DrawKind::ModelData(_) => summary.model_data += 1,
                DrawKind::Particles { .. } => summary.particles += 1,
            }
        }
        summary
    }
}

/// Collects draw commands each frame
pub struct RenderSystem {
    manager: RenderManager<UniqueId>,
    config: RenderConfig,
}

impl RenderSystem {
    /// Create render system with viewports laid out side by side
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        if config.viewports == 0 {
            return Err(RenderError::NoViewports);
        }

        let mut manager = RenderManager::new();
        let width = (config.width / config.viewports as u32).max(1);
        for index in 0..config.viewports {
            let camera = Camera::new().with_projection(config.fov.to_radians(), config.near, config.far);
            manager.add_viewport(Viewport::new(index, camera, width, config.height));
        }
        log::info!("Render system: {} viewport(s) of {}x{}", config.viewports, width, config.height);

        Ok(Self { manager, config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Point a viewport's camera from `eye` toward `target`
    pub fn look_at(&mut self, index: usize, eye: Vec3, target: Vec3) -> Result<(), RenderError> {
        let config = &self.config;
        let viewport = self
            .manager
            .viewport_mut(index)
            .ok_or(RenderError::BadViewport(index))?;
        viewport.camera = Camera::looking_at(eye, target).with_projection(config.fov.to_radians(), config.near, config.far);
        Ok(())
    }

    /// Follow `target` from behind and above with the primary camera
    ///
    /// The state manager's visibility camera tracks the primary viewport.
    pub fn follow(&mut self, state: &mut StateManager, target: UniqueId) -> Result<(), RenderError> {
        let Some(position) = state
            .object(target)
            .and_then(|object| object.spatial())
            .map(|actor| actor.transform().position)
        else {
            return Ok(());
        };
        self.look_at(0, position + Vec3::new(0.0, 4.0, 8.0), position + Vec3::new(0.0, 1.0, 0.0))?;
        if let Some(primary) = self.manager.viewports().first() {
            state.set_camera(primary.clone());
        }
        Ok(())
    }

    /// Collect and flush one frame
    pub fn render_frame(&mut self, state: &mut StateManager) -> FrameSummary {
        let stats = run_render_pass(state, &mut self.manager);
        let sorted = self.manager.bucket(RenderBucket::Sorted).len();
        let commands = self.manager.flush();
        log::trace!("frame {}: {} commands", stats.frame, commands.len());
        FrameSummary::from_commands(stats.frame, &commands, sorted)
    }
}
