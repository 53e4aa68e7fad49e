//! Character state machines
//!
//! Two small machines drive a game character: [`AiStateMachine`] decides
//! what the character is doing, [`AnimStateMachine`] decides what it looks
//! like it is doing. Both are rebuilt from scratch when a character sets
//! them up again; each instance carries the generation it was built in.

use serde::{Deserialize, Serialize};

use crate::anim::{AnimEvent, AnimUserNotify};

/// Tunables shared by both machines
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmProperties {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Distance at which a target is noticed
    pub sight_range: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
    /// Seconds between attacks
    pub attack_interval: f32,
    pub stagger_time: f32,
    /// Length of the hit reaction animation
    pub hit_time: f32,
    /// Seconds between footsteps at playback rate 1.0
    pub step_period: f32,
}

impl Default for FsmProperties {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            sight_range: 12.0,
            attack_range: 1.5,
            attack_damage: 10.0,
            attack_interval: 1.0,
            stagger_time: 0.4,
            hit_time: 0.3,
            step_period: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AiState {
    #[default]
    Idle,
    /// Following a spline path
    Patrol,
    Chase,
    Attack,
    Stagger,
    Dead,
}

/// What the AI can see this tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AiInputs {
    /// Distance to the target, None when there is no target
    pub target_distance: Option<f32>,
    /// Whether a spline path is attached
    pub on_path: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AiStateMachine {
    state: AiState,
    time_in_state: f32,
    generation: u32,
}

impl AiStateMachine {
    pub fn new(generation: u32, initial: AiState) -> Self {
        Self {
            state: initial,
            time_in_state: 0.0,
            generation,
        }
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Enter `next`; returns false if already there or dead
    pub fn transition(&mut self, next: AiState) -> bool {
        if self.state == next || self.state == AiState::Dead {
            return false;
        }
        self.state = next;
        self.time_in_state = 0.0;
        true
    }

    pub fn stagger(&mut self) -> bool {
        self.transition(AiState::Stagger)
    }

    pub fn kill(&mut self) -> bool {
        self.transition(AiState::Dead)
    }

    /// Advance and evaluate transitions; returns the state entered, if any
    pub fn update(&mut self, dt: f32, inputs: &AiInputs, props: &FsmProperties) -> Option<AiState> {
        self.time_in_state += dt;
        let resting = if inputs.on_path { AiState::Patrol } else { AiState::Idle };
        let sees = |range: f32| inputs.target_distance.is_some_and(|d| d <= range);

        let next = match self.state {
            AiState::Dead => None,
            AiState::Stagger if self.time_in_state >= props.stagger_time => Some(resting),
            AiState::Stagger => None,
            AiState::Idle | AiState::Patrol if sees(props.sight_range) => Some(AiState::Chase),
            AiState::Idle | AiState::Patrol => Some(resting),
            AiState::Chase if sees(props.attack_range) => Some(AiState::Attack),
            // A little hysteresis so the target can't flicker at the edge
            AiState::Chase if !sees(props.sight_range * 1.5) => Some(resting),
            AiState::Chase => None,
            AiState::Attack if !sees(props.attack_range * 1.2) => Some(AiState::Chase),
            AiState::Attack => None,
        };

        next.filter(|&state| self.transition(state))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimState {
    #[default]
    Idle,
    Walk,
    Run,
    Hit,
    Death,
}

impl AnimState {
    fn is_locomotion(self) -> bool {
        matches!(self, AnimState::Idle | AnimState::Walk | AnimState::Run)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimStateMachine {
    state: AnimState,
    /// Scales animation time against real time
    pub playback_rate: f32,
    time: f32,
    step_accumulator: f32,
    generation: u32,
}

impl AnimStateMachine {
    pub fn new(generation: u32) -> Self {
        Self {
            state: AnimState::Idle,
            playback_rate: 1.0,
            time: 0.0,
            step_accumulator: 0.0,
            generation,
        }
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    /// Time into the current animation, in animation seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Switch animation, restarting it; death is final
    pub fn play(&mut self, state: AnimState) {
        if self.state == state || self.state == AnimState::Death {
            return;
        }
        self.state = state;
        self.time = 0.0;
        self.step_accumulator = 0.0;
    }

    /// Pick the locomotion clip for `speed` and match its stride
    ///
    /// Reactions (hit, death) are left alone.
    pub fn sync_to_speed(&mut self, props: &FsmProperties, speed: f32) {
        if !self.state.is_locomotion() {
            return;
        }
        let (clip, reference) = if speed < 0.1 {
            (AnimState::Idle, 0.0)
        } else if speed < (props.walk_speed + props.run_speed) * 0.5 {
            (AnimState::Walk, props.walk_speed)
        } else {
            (AnimState::Run, props.run_speed)
        };
        self.play(clip);
        self.playback_rate = if reference > 0.0 {
            (speed / reference).clamp(0.25, 3.0)
        } else {
            1.0
        };
    }

    /// Advance playback and collect the events passed over
    pub fn advance(&mut self, dt: f32, props: &FsmProperties) -> Vec<AnimEvent> {
        let step = dt * self.playback_rate;
        self.time += step;

        let mut events = Vec::new();
        match self.state {
            AnimState::Walk | AnimState::Run if props.step_period > 0.0 => {
                self.step_accumulator += step;
                while self.step_accumulator >= props.step_period {
                    self.step_accumulator -= props.step_period;
                    events.push(AnimEvent::entering(AnimUserNotify::Footstep, self.time));
                }
            }
            AnimState::Hit if self.time >= props.hit_time => self.play(AnimState::Idle),
            _ => {}
        }
        events
    }
}
