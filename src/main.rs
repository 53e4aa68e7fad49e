//! Strata - actor runtime
//!
//! Runs the demo arena headless at a fixed tick rate and logs what the
//! simulation and render collection did.

use strata::config::AppConfig;
use strata::scene::{demo_scene, Scene};
use strata::systems::{RenderError, RenderSystem, SimulationSystem};
use strata_core::{Object, UniqueId, Vec3};

/// Walking speed of the scripted player
const PLAYER_SPEED: f32 = 2.0;

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    scene: Scene,
    simulation: SimulationSystem,
    render: RenderSystem,
    player: Option<UniqueId>,
}

impl App {
    fn new(config: AppConfig) -> Result<Self, RenderError> {
        let scene = demo_scene(config.manager_config());
        let player = scene.manager.player();
        let simulation = SimulationSystem::new(&config.simulation);
        let render = RenderSystem::new(config.render.clone())?;

        log::info!(
            "Loaded demo scene with {} objects, {} static colliders",
            scene.object_count(),
            scene.manager.solver().static_colliders().len()
        );

        Ok(Self {
            config,
            scene,
            simulation,
            render,
            player,
        })
    }

    /// Walk the player toward the arena centre until it gets there
    fn drive_player(&mut self) {
        let Some(player) = self.player else {
            return;
        };
        let Some(body) = self.scene.manager.object_mut(player).and_then(Object::collidable_mut) else {
            return;
        };
        let to_centre = (Vec3::ZERO - body.transform().position).horizontal();
        let physics = body.physics_mut();
        if to_centre.length() > 2.0 {
            let direction = to_centre.normalized();
            physics.velocity.x = direction.x * PLAYER_SPEED;
            physics.velocity.z = direction.z * PLAYER_SPEED;
        } else {
            physics.velocity.x = 0.0;
            physics.velocity.z = 0.0;
        }
    }

    fn run(&mut self) -> Result<(), RenderError> {
        let ticks = self.config.simulation.ticks;
        let rate = u64::from(self.config.simulation.tick_rate.max(1));
        let mut messages = 0;
        let mut contacts = 0;
        let mut drawn = 0;

        for tick in 1..=ticks {
            self.drive_player();
            let report = self.simulation.step(&mut self.scene.manager);
            messages += report.messages;
            contacts += report.contacts;

            if let Some(player) = self.player {
                self.render.follow(&mut self.scene.manager, player)?;
            }
            let frame = self.render.render_frame(&mut self.scene.manager);
            drawn += frame.models;

            if tick % rate == 0 {
                log::info!(
                    "t={:.1}s: {} active, {} messages, {} contacts, {} models drawn",
                    self.scene.manager.time(),
                    self.scene.manager.active_ids().len(),
                    messages,
                    contacts,
                    drawn
                );
            }
        }

        log::info!(
            "Finished {} ticks ({:.1}s simulated)",
            self.simulation.total_ticks(),
            self.scene.manager.time()
        );
        Ok(())
    }
}

fn main() {
    let config = AppConfig::load();
    let log_level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    log::info!("Starting Strata");

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let result = App::new(config).and_then(|mut app| app.run());
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
