//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`STRATA_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use strata_core::ManagerConfig;
use strata_physics::SolverConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tick loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Collision solver configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Render collection configuration
    #[serde(default)]
    pub render: RenderConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`STRATA_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // STRATA_SIMULATION__TICK_RATE=30 -> simulation.tick_rate = 30
        figment = figment.merge(Env::prefixed("STRATA_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// State manager settings derived from this configuration
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            max_message_rounds: self.simulation.max_message_rounds,
            solver: self.physics.to_solver_config(),
        }
    }
}

/// Fixed-step tick loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Ticks per simulated second
    pub tick_rate: u32,
    /// Longest frame the accumulator will absorb, in seconds
    pub max_frame_time: f32,
    /// Script message delivery rounds per drain
    pub max_message_rounds: usize,
    /// Ticks the headless driver runs before exiting
    pub ticks: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_frame_time: 0.25,
            max_message_rounds: 8,
            ticks: 600,
        }
    }
}

impl SimulationConfig {
    /// Length of one tick in seconds
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// Collision solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Gravity (negative = downward)
    pub gravity: f32,
    /// Penetration left unresolved
    pub skin_width: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let solver = SolverConfig::default();
        Self {
            gravity: solver.gravity,
            skin_width: solver.skin_width,
        }
    }
}

impl PhysicsConfig {
    pub fn to_solver_config(&self) -> SolverConfig {
        SolverConfig {
            gravity: self.gravity,
            skin_width: self.skin_width,
        }
    }
}

/// Render collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Number of viewports (split screen)
    pub viewports: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov: 45.0,
            near: 0.1,
            far: 500.0,
            viewports: 1,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.simulation.tick_rate, 60);
        assert_eq!(config.physics.gravity, -20.0);
        assert_eq!(config.render.viewports, 1);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("tick_rate"));
        assert!(toml.contains("gravity"));
        assert!(toml.contains("log_level"));
    }

    #[test]
    fn test_fixed_dt_never_divides_by_zero() {
        let sim = SimulationConfig {
            tick_rate: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(sim.fixed_dt(), 1.0);
        assert!((SimulationConfig::default().fixed_dt() - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn test_manager_config_carries_solver_settings() {
        let mut config = AppConfig::default();
        config.physics.gravity = -9.8;
        config.simulation.max_message_rounds = 3;
        let manager = config.manager_config();
        assert_eq!(manager.max_message_rounds, 3);
        assert_eq!(manager.solver.gravity, -9.8);
    }
}
