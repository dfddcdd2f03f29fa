//! Car state for the traffic simulation
//!
//! A car is a plain token: the world decides where it may go and the
//! containers (lanes and intersections) record where it currently is.

use super::types::{CarId, Cell, Direction, Turn, MAX_CAR_SPEED};

/// A car in the traffic simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimCar {
    pub id: CarId,
    pub cell: Cell,
    pub heading: Direction,
    /// What the car does at its next intersection
    pub turn: Turn,
    /// Lane index on the road the car is on (kept while crossing an intersection)
    pub lane: usize,
    /// Maximum cells per tick, capped at [`MAX_CAR_SPEED`]
    pub max_speed: u32,
    /// Ticks since the last successful move
    pub wait_time: u32,
}

impl SimCar {
    pub fn new(id: CarId, cell: Cell, heading: Direction, turn: Turn) -> Self {
        Self {
            id,
            cell,
            heading,
            turn,
            lane: 0,
            max_speed: MAX_CAR_SPEED,
            wait_time: 0,
        }
    }

    pub fn with_max_speed(mut self, max_speed: u32) -> Self {
        self.max_speed = max_speed.clamp(1, MAX_CAR_SPEED);
        self
    }

    /// The cell `distance` steps ahead along the current heading
    pub fn next_cell(&self, distance: i32) -> Cell {
        self.cell.step(self.heading, distance)
    }

    pub(crate) fn record_move(&mut self) {
        self.wait_time = 0;
    }

    pub(crate) fn record_wait(&mut self) {
        self.wait_time += 1;
    }
}

impl std::fmt::Display for SimCar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Car({:?}) at {} facing {}",
            self.id.0 .0,
            self.cell,
            self.heading.name()
        )
    }
}
