//! Game simulation system
//!
//! Turns frame time into fixed ticks of the state manager:
//! - Frame time capping
//! - Fixed-step accumulation
//! - Tick report aggregation

use strata_core::{StateManager, TickReport};

use crate::config::SimulationConfig;

/// Result of a simulation update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationResult {
    /// Fixed ticks run this frame
    pub ticks: u32,
    /// Script messages delivered across those ticks
    pub messages: usize,
    /// Contacts found across those ticks
    pub contacts: usize,
    /// The last tick's report, if any tick ran
    pub last: Option<TickReport>,
}

/// Drives the state manager at a fixed tick rate
pub struct SimulationSystem {
    fixed_dt: f32,
    max_frame_time: f32,
    accumulator: f32,
    total_ticks: u64,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            fixed_dt: config.fixed_dt(),
            // NaN and negative caps both become zero
            max_frame_time: config.max_frame_time.max(0.0),
            accumulator: 0.0,
            total_ticks: 0,
        }
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Fraction of a tick left in the accumulator, for interpolation
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulator / self.fixed_dt
    }

    /// Run as many fixed ticks as `frame_time` pays for
    pub fn update(&mut self, manager: &mut StateManager, frame_time: f32) -> SimulationResult {
        // Cap frame time to prevent a spiral of death after a stall
        self.accumulator += frame_time.clamp(0.0, self.max_frame_time);

        let mut result = SimulationResult::default();
        while self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            let report = self.step(manager);
            result.ticks += 1;
            result.messages += report.messages;
            result.contacts += report.contacts;
            result.last = Some(report);
        }
        result
    }

    /// Run exactly one fixed tick
    pub fn step(&mut self, manager: &mut StateManager) -> TickReport {
        self.total_ticks += 1;
        manager.update(self.fixed_dt)
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
