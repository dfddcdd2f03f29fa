//! Read-only observation of the simulation
//!
//! Everything here is an owned copy, so callers (an external signal
//! controller, a reporting shell) can keep or serialize it freely.

use serde::Serialize;
use std::collections::BTreeMap;

use super::signal::{SignalMode, SignalState};
use super::types::{CarId, Cell, Direction};

/// Snapshot of one intersection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionState {
    pub name: String,
    pub mode: SignalMode,
    pub signals: BTreeMap<Direction, SignalState>,
    pub car_positions: Vec<Cell>,
    pub cars_count: usize,
}

/// Snapshot of the whole world after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimState {
    pub tick: u64,
    pub total_cars: usize,
    /// Keyed by intersection name
    pub intersections: BTreeMap<String, IntersectionState>,
    pub car_wait_times: BTreeMap<CarId, u32>,
    pub average_wait_time: f64,
}

impl SimState {
    pub fn max_wait_time(&self) -> u32 {
        self.car_wait_times.values().copied().max().unwrap_or(0)
    }
}
