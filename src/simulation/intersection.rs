//! Intersection logic for the traffic simulation
//!
//! An intersection is a square block of cells where up to four roads meet.
//! It owns the signal controller and tracks every car currently crossing it.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

use super::car::SimCar;
use super::road::SimRoad;
use super::signal::SignalController;
use super::types::{CarId, Cell, Direction, IntersectionId, RoadId, Turn};

/// A car crossing an intersection.
///
/// The heading the car entered with lives here rather than on the car, so
/// it disappears together with the car's membership of the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transit {
    pub car: CarId,
    pub cell: Cell,
    pub entry: Direction,
}

/// What a crossing car should attempt this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitStep {
    /// Leave the intersection onto `road` at `target`, now heading `exit`
    HandOff {
        road: RoadId,
        exit: Direction,
        target: Cell,
    },
    /// Move one cell further inside the intersection
    Advance(Cell),
    /// No legal cell to move to
    Stuck,
}

/// An intersection in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimIntersection {
    pub id: IntersectionId,
    pub name: String,
    pub center: Cell,
    /// Side length in cells
    pub size: i32,
    cells: BTreeSet<Cell>,
    pub controller: SignalController,
    connected_roads: BTreeMap<Direction, RoadId>,
    active: Vec<Transit>,
}

impl SimIntersection {
    pub fn new(
        id: IntersectionId,
        name: impl Into<String>,
        center: Cell,
        size: i32,
        controller: SignalController,
    ) -> Result<Self> {
        let name = name.into();
        if size <= 0 || size % 2 == 0 {
            anyhow::bail!("Intersection {name} needs a positive odd size, got {size}");
        }
        let half = size / 2;
        let cells = (center.row - half..=center.row + half)
            .flat_map(|row| (center.col - half..=center.col + half).map(move |col| Cell::new(row, col)))
            .collect();

        Ok(Self {
            id,
            name,
            center,
            size,
            cells,
            controller,
            connected_roads: BTreeMap::new(),
            active: Vec::new(),
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn covers(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub(crate) fn connect_road(&mut self, side: Direction, road: RoadId) {
        self.connected_roads.insert(side, road);
    }

    pub fn connected_road(&self, side: Direction) -> Option<RoadId> {
        self.connected_roads.get(&side).copied()
    }

    pub fn connected_roads(&self) -> &BTreeMap<Direction, RoadId> {
        &self.connected_roads
    }

    pub fn transits(&self) -> &[Transit] {
        &self.active
    }

    pub fn transit(&self, car_id: CarId) -> Option<&Transit> {
        self.active.iter().find(|transit| transit.car == car_id)
    }

    pub fn contains_car(&self, car_id: CarId) -> bool {
        self.transit(car_id).is_some()
    }

    pub fn car_count(&self) -> usize {
        self.active.len()
    }

    pub fn car_at(&self, cell: Cell) -> Option<CarId> {
        self.active
            .iter()
            .find(|transit| transit.cell == cell)
            .map(|transit| transit.car)
    }

    pub fn is_position_free(&self, cell: Cell) -> bool {
        self.covers(cell) && self.car_at(cell).is_none()
    }

    /// Signal allows the car's turn from `heading` and `target` is a free cell here
    pub fn can_enter(&self, car: &SimCar, heading: Direction, target: Cell) -> bool {
        self.controller.permits(heading, car.turn) && self.is_position_free(target)
    }

    /// Register a car that now stands on `cell`, recording its entry heading
    pub(crate) fn admit(&mut self, car_id: CarId, cell: Cell, entry: Direction) -> bool {
        if !self.is_position_free(cell) || self.contains_car(car_id) {
            return false;
        }
        self.active.push(Transit {
            car: car_id,
            cell,
            entry,
        });
        true
    }

    pub(crate) fn release(&mut self, car_id: CarId) -> Option<Transit> {
        let index = self.active.iter().position(|transit| transit.car == car_id)?;
        Some(self.active.remove(index))
    }

    pub(crate) fn relocate(&mut self, car_id: CarId, to: Cell) -> bool {
        if !self.is_position_free(to) {
            return false;
        }
        match self.active.iter_mut().find(|transit| transit.car == car_id) {
            Some(transit) => {
                transit.cell = to;
                true
            }
            None => false,
        }
    }

    pub fn exit_direction(&self, entry: Direction, turn: Turn) -> Direction {
        turn.exit_direction(entry)
    }

    /// Whether `cell` lies on the exit edge of the block, judged against the center
    pub fn reached_exit(&self, cell: Cell, exit: Direction) -> bool {
        let half = self.size / 2;
        match exit {
            Direction::North => cell.row <= self.center.row - half,
            Direction::South => cell.row >= self.center.row + half,
            Direction::East => cell.col >= self.center.col + half,
            Direction::West => cell.col <= self.center.col - half,
        }
    }

    /// Decide the next move of a crossing car.
    ///
    /// The car keeps its entry heading until its cross-axis coordinate lines
    /// up with a lane of the exit road, then heads for the exit edge.
    pub fn plan_step(&self, transit: &Transit, turn: Turn, exit_road: Option<&SimRoad>) -> TransitStep {
        let exit = turn.exit_direction(transit.entry);
        let beyond = transit.cell.step(exit, 1);

        if let Some(road) = exit_road {
            if self.reached_exit(transit.cell, exit) && road.covers(beyond) {
                return TransitStep::HandOff {
                    road: road.id,
                    exit,
                    target: beyond,
                };
            }
        }

        let aligned = exit_road.map_or(true, |road| {
            road.cells()
                .any(|cell| cell.cross_axis(exit) == transit.cell.cross_axis(exit))
        });
        let next = if aligned {
            beyond
        } else {
            transit.cell.step(transit.entry, 1)
        };

        if self.covers(next) {
            TransitStep::Advance(next)
        } else {
            TransitStep::Stuck
        }
    }
}

impl std::fmt::Display for SimIntersection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Intersection({}) at {} ({} cars)",
            self.name,
            self.center,
            self.car_count()
        )
    }
}
