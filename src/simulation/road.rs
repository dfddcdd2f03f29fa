//! Roads and lanes for the traffic simulation
//!
//! A road is a straight run of grid cells split into parallel lanes. The
//! partition into lanes happens once at construction and never changes;
//! only the occupants move.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

use super::car::SimCar;
use super::types::{CarId, Cell, Direction, RoadId};

/// A single lane of traffic
#[derive(Debug, Clone)]
pub struct SimLane {
    pub name: String,
    pub direction: Direction,
    cells: BTreeSet<Cell>,
    /// Cars on this lane keyed by the cell they occupy
    occupants: BTreeMap<Cell, CarId>,
}

impl SimLane {
    fn new(name: String, direction: Direction, cells: BTreeSet<Cell>) -> Self {
        Self {
            name,
            direction,
            cells,
            occupants: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn car_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn covers(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn cars(&self) -> impl Iterator<Item = CarId> + '_ {
        self.occupants.values().copied()
    }

    pub fn contains_car(&self, car_id: CarId) -> bool {
        self.occupants.values().any(|&id| id == car_id)
    }

    /// Accepts the car only if the lane has room and the car already sits
    /// on a free cell of this lane
    pub fn add_car(&mut self, car: &SimCar) -> bool {
        if self.occupants.len() >= self.capacity() || !self.is_position_free(car.cell) {
            return false;
        }
        self.occupants.insert(car.cell, car.id);
        true
    }

    pub fn remove_car(&mut self, car_id: CarId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|_, id| *id != car_id);
        self.occupants.len() != before
    }

    pub fn car_at(&self, cell: Cell) -> Option<CarId> {
        self.occupants.get(&cell).copied()
    }

    pub fn is_position_free(&self, cell: Cell) -> bool {
        self.covers(cell) && !self.occupants.contains_key(&cell)
    }
}

/// A road segment made of parallel lanes sharing one direction
#[derive(Debug, Clone)]
pub struct SimRoad {
    pub id: RoadId,
    pub name: String,
    pub start: Cell,
    pub end: Cell,
    pub direction: Direction,
    lanes: Vec<SimLane>,
}

impl SimRoad {
    /// Build a road between `start` and `end` (inclusive).
    ///
    /// Vertical roads stack additional lanes eastwards by column offset,
    /// horizontal roads southwards by row offset.
    pub fn new(
        id: RoadId,
        name: impl Into<String>,
        start: Cell,
        end: Cell,
        direction: Direction,
        lane_count: usize,
    ) -> Result<Self> {
        let name = name.into();
        if lane_count == 0 {
            anyhow::bail!("Road {name} needs at least one lane");
        }
        if direction.is_vertical() && start.col != end.col {
            anyhow::bail!("Vertical road {name} must start and end in the same column");
        }
        if !direction.is_vertical() && start.row != end.row {
            anyhow::bail!("Horizontal road {name} must start and end in the same row");
        }

        let lanes = (0..lane_count)
            .map(|lane_num| {
                let offset = lane_num as i32;
                let cells: BTreeSet<Cell> = if direction.is_vertical() {
                    (start.row.min(end.row)..=start.row.max(end.row))
                        .map(|row| Cell::new(row, start.col + offset))
                        .collect()
                } else {
                    (start.col.min(end.col)..=start.col.max(end.col))
                        .map(|col| Cell::new(start.row + offset, col))
                        .collect()
                };
                SimLane::new(format!("{name}_lane_{lane_num}"), direction, cells)
            })
            .collect();

        Ok(Self {
            id,
            name,
            start,
            end,
            direction,
            lanes,
        })
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane(&self, lane_num: usize) -> Option<&SimLane> {
        self.lanes.get(lane_num)
    }

    pub fn lanes(&self) -> &[SimLane] {
        &self.lanes
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.lanes.iter().flat_map(SimLane::cells)
    }

    pub fn covers(&self, cell: Cell) -> bool {
        self.lane_of(cell).is_some()
    }

    /// Index of the lane covering `cell`
    pub fn lane_of(&self, cell: Cell) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.covers(cell))
    }

    /// Place a car on a specific lane, updating its lane index on success
    pub fn add_car(&mut self, car: &mut SimCar, lane_num: usize) -> bool {
        let Some(lane) = self.lanes.get_mut(lane_num) else {
            return false;
        };
        if !lane.add_car(car) {
            return false;
        }
        car.lane = lane_num;
        true
    }

    /// Detach a car from whichever lane holds it. No-op if absent.
    pub fn remove_car(&mut self, car_id: CarId) -> bool {
        self.lanes.iter_mut().any(|lane| lane.remove_car(car_id))
    }

    pub fn contains_car(&self, car_id: CarId) -> bool {
        self.lanes.iter().any(|lane| lane.contains_car(car_id))
    }

    /// Move a car already on this road to another of its cells
    pub fn relocate(&mut self, car: &mut SimCar, to: Cell) -> bool {
        let Some(lane_num) = self.lane_of(to) else {
            return false;
        };
        if !self.lanes[lane_num].is_position_free(to) || !self.remove_car(car.id) {
            return false;
        }
        car.cell = to;
        self.add_car(car, lane_num)
    }

    pub fn cars(&self) -> impl Iterator<Item = CarId> + '_ {
        self.lanes.iter().flat_map(SimLane::cars)
    }

    pub fn car_count(&self) -> usize {
        self.lanes.iter().map(SimLane::car_count).sum()
    }

    pub fn car_at(&self, cell: Cell) -> Option<CarId> {
        self.lanes.iter().find_map(|lane| lane.car_at(cell))
    }

    /// True when the cell belongs to this road and nobody is on it
    pub fn is_position_free(&self, cell: Cell) -> bool {
        self.lanes
            .iter()
            .find(|lane| lane.covers(cell))
            .is_some_and(|lane| lane.is_position_free(cell))
    }
}

impl std::fmt::Display for SimRoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Road({}) {}->{} {} ({} cars)",
            self.name,
            self.start,
            self.end,
            self.direction.name(),
            self.car_count()
        )
    }
}
