//! Traffic lights and the per-intersection signal controller
//!
//! Each intersection owns one light per direction of travel. The controller
//! either cycles the lights automatically or leaves them to an external
//! caller, depending on its [`SignalMode`].

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use super::types::{Direction, Turn, DEFAULT_CYCLE_DURATION};

/// State of a single traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Red,
    Yellow,
    Green,
    GreenArrow,
}

impl SignalState {
    pub fn allows_straight(self) -> bool {
        matches!(self, SignalState::Green | SignalState::GreenArrow)
    }

    pub fn allows_left(self) -> bool {
        self == SignalState::GreenArrow
    }

    /// Right turns are allowed on anything but red
    pub fn allows_right(self) -> bool {
        self != SignalState::Red
    }

    pub fn permits(self, turn: Turn) -> bool {
        match turn {
            Turn::Straight => self.allows_straight(),
            Turn::Left => self.allows_left(),
            Turn::Right => self.allows_right(),
        }
    }
}

/// Who drives the lights of an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    /// Two-phase cycle runs every tick and overwrites any external setting
    #[default]
    Automatic,
    /// Lights only change through explicit calls
    Manual,
}

/// A traffic light controlling one direction of travel
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficLight {
    pub direction: Direction,
    pub state: SignalState,
    /// Informational countdown, decremented once per controller update
    pub timer: u32,
}

impl TrafficLight {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: SignalState::Red,
            timer: 0,
        }
    }

    /// Set a new state. A `duration` of 0 means indefinite.
    pub fn set_state(&mut self, state: SignalState, duration: u32) {
        self.state = state;
        self.timer = duration;
    }

    fn count_down(&mut self) {
        self.timer = self.timer.saturating_sub(1);
    }
}

/// Coordinates the four lights of one intersection
#[derive(Debug, Clone)]
pub struct SignalController {
    lights: BTreeMap<Direction, TrafficLight>,
    mode: SignalMode,
    /// Phases of the automatic cycle; each phase lists the directions given green
    phases: Vec<[Direction; 2]>,
    phase: usize,
    phase_timer: u32,
    cycle_duration: u32,
}

impl Default for SignalController {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_DURATION)
    }
}

impl SignalController {
    pub fn new(cycle_duration: u32) -> Self {
        Self {
            lights: Direction::CLOCKWISE
                .iter()
                .map(|&direction| (direction, TrafficLight::new(direction)))
                .collect(),
            mode: SignalMode::Automatic,
            phases: vec![
                [Direction::North, Direction::South],
                [Direction::East, Direction::West],
            ],
            phase: 0,
            phase_timer: 0,
            cycle_duration: cycle_duration.max(1),
        }
    }

    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SignalMode) {
        self.mode = mode;
    }

    pub fn cycle_duration(&self) -> u32 {
        self.cycle_duration
    }

    /// Directions currently granted green by the automatic cycle
    pub fn active_phase(&self) -> [Direction; 2] {
        self.phases[self.phase]
    }

    pub fn light(&self, direction: Direction) -> &TrafficLight {
        &self.lights[&direction]
    }

    pub fn state(&self, direction: Direction) -> SignalState {
        self.lights[&direction].state
    }

    pub fn states(&self) -> BTreeMap<Direction, SignalState> {
        self.lights
            .iter()
            .map(|(&direction, light)| (direction, light.state))
            .collect()
    }

    /// Whether a car travelling `heading` may make `turn` right now
    pub fn permits(&self, heading: Direction, turn: Turn) -> bool {
        self.state(heading).permits(turn)
    }

    /// Overwrite one light. In automatic mode this only lasts until the
    /// next cycle update.
    pub fn set_light_state(&mut self, direction: Direction, state: SignalState) {
        self.set_light_state_for(direction, state, 0);
    }

    pub fn set_light_state_for(&mut self, direction: Direction, state: SignalState, duration: u32) {
        if let Some(light) = self.lights.get_mut(&direction) {
            light.set_state(state, duration);
        }
    }

    /// Advance the automatic cycle by one tick: all lights go red, then the
    /// active phase goes green. There is no yellow interval.
    pub fn update_automatic_cycle(&mut self) {
        self.phase_timer += 1;
        if self.phase_timer >= self.cycle_duration {
            self.phase_timer = 0;
            self.phase = (self.phase + 1) % self.phases.len();
            debug!("Signal phase switched to {:?}", self.phases[self.phase]);
        }

        for light in self.lights.values_mut() {
            light.set_state(SignalState::Red, 0);
        }
        for direction in self.phases[self.phase] {
            if let Some(light) = self.lights.get_mut(&direction) {
                light.set_state(SignalState::Green, 0);
            }
        }
    }

    /// Per-tick update: automatic cycle (unless manual) then light countdowns
    pub fn update(&mut self) {
        if self.mode == SignalMode::Automatic {
            self.update_automatic_cycle();
        }
        for light in self.lights.values_mut() {
            light.count_down();
        }
    }
}
