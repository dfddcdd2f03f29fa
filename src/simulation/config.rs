//! Simulation configuration

use super::types::{DEFAULT_CYCLE_DURATION, MAX_CAR_SPEED};

/// Tunable parameters for a [`SimWorld`](super::SimWorld)
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub grid_rows: i32,
    pub grid_cols: i32,
    /// Ticks per phase of the automatic signal cycle
    pub cycle_duration: u32,
    /// Road cells a car may cover in one tick (1..=MAX_CAR_SPEED)
    pub max_cells_per_tick: u32,
    /// Seed for the per-tick shuffle; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_rows: 20,
            grid_cols: 20,
            cycle_duration: DEFAULT_CYCLE_DURATION,
            max_cells_per_tick: 1,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_grid(mut self, rows: i32, cols: i32) -> Self {
        self.grid_rows = rows;
        self.grid_cols = cols;
        self
    }

    pub fn with_cycle_duration(mut self, ticks: u32) -> Self {
        self.cycle_duration = ticks;
        self
    }

    pub(crate) fn cells_per_tick(&self) -> u32 {
        self.max_cells_per_tick.clamp(1, MAX_CAR_SPEED)
    }
}
