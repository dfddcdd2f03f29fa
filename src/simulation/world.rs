//! Main simulation world that ties everything together
//!
//! `SimWorld` is the arena owning every road, intersection and car. All
//! cross references are ids looked up here, and all mutation goes through
//! either [`SimWorld::tick`] or the explicit external mutators.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use std::collections::BTreeMap;

use super::car::SimCar;
use super::config::SimConfig;
use super::intersection::{SimIntersection, TransitStep};
use super::ordering::{SeededShuffle, TickOrder};
use super::road::SimRoad;
use super::signal::{SignalController, SignalMode, SignalState};
use super::state::{IntersectionState, SimState};
use super::types::{CarId, Cell, Direction, IntersectionId, RoadId, SimId};

/// Where a car currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Road(RoadId),
    Intersection(IntersectionId),
}

/// The main simulation world
pub struct SimWorld {
    config: SimConfig,

    /// All roads
    roads: BTreeMap<RoadId, SimRoad>,

    /// All intersections
    intersections: BTreeMap<IntersectionId, SimIntersection>,

    /// All cars, in registration order
    cars: IndexMap<CarId, SimCar>,

    /// Next ID to assign to roads and intersections
    next_id: usize,

    /// Lowest car id not yet handed out by `next_car_id`
    next_car: usize,

    /// Completed ticks
    tick_count: u64,

    /// Per-tick processing order of cars
    order: Box<dyn TickOrder>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Self {
        let order: Box<dyn TickOrder> = match config.seed {
            Some(seed) => Box::new(SeededShuffle::new(seed)),
            None => Box::new(SeededShuffle::from_entropy()),
        };
        Self::with_order(config, order)
    }

    /// Create a world whose per-tick car order comes from `order`
    pub fn with_order(config: SimConfig, order: Box<dyn TickOrder>) -> Self {
        Self {
            config,
            roads: BTreeMap::new(),
            intersections: BTreeMap::new(),
            cars: IndexMap::new(),
            next_id: 0,
            next_car: 0,
            tick_count: 0,
            order,
        }
    }

    pub fn set_tick_order(&mut self, order: Box<dyn TickOrder>) {
        self.order = order;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Topology ────────────────────────────────────────────────

    /// Whether a cell lies inside the grid
    pub fn is_valid_position(&self, cell: Cell) -> bool {
        (0..self.config.grid_rows).contains(&cell.row) && (0..self.config.grid_cols).contains(&cell.col)
    }

    fn check_cells_available(&self, what: &str, cells: &[Cell]) -> Result<()> {
        for &cell in cells {
            if !self.is_valid_position(cell) {
                anyhow::bail!("{what} cell {cell} lies outside the grid");
            }
            if let Some(road) = self.road_at(cell) {
                anyhow::bail!("{what} cell {cell} overlaps road {}", self.roads[&road].name);
            }
            if let Some(intersection) = self.intersection_at(cell) {
                anyhow::bail!(
                    "{what} cell {cell} overlaps intersection {}",
                    self.intersections[&intersection].name
                );
            }
        }
        Ok(())
    }

    /// Add a road between two cells (inclusive)
    pub fn add_road(
        &mut self,
        name: &str,
        start: Cell,
        end: Cell,
        direction: Direction,
        lane_count: usize,
    ) -> Result<RoadId> {
        if self.road_by_name(name).is_some() {
            anyhow::bail!("Road {name} already exists");
        }
        let road = SimRoad::new(RoadId(SimId(self.next_id)), name, start, end, direction, lane_count)?;
        let cells: Vec<Cell> = road.cells().collect();
        self.check_cells_available(&format!("Road {name}"), &cells)?;

        let id = RoadId(self.next_sim_id());
        debug_assert_eq!(id, road.id);
        self.roads.insert(id, road);
        Ok(id)
    }

    /// Add a square intersection centered on `center`
    pub fn add_intersection(&mut self, name: &str, center: Cell, size: i32) -> Result<IntersectionId> {
        if self.intersection_by_name(name).is_some() {
            anyhow::bail!("Intersection {name} already exists");
        }
        let intersection = SimIntersection::new(
            IntersectionId(SimId(self.next_id)),
            name,
            center,
            size,
            SignalController::new(self.config.cycle_duration),
        )?;
        let cells: Vec<Cell> = intersection.cells().collect();
        self.check_cells_available(&format!("Intersection {name}"), &cells)?;

        let id = IntersectionId(self.next_sim_id());
        debug_assert_eq!(id, intersection.id);
        self.intersections.insert(id, intersection);
        Ok(id)
    }

    /// Attach a road to one side of an intersection. The road must have a
    /// cell directly outside that side of the block.
    pub fn connect_road(&mut self, intersection_id: IntersectionId, side: Direction, road_id: RoadId) -> Result<()> {
        let road = self.roads.get(&road_id).context("Road not found")?;
        let intersection = self
            .intersections
            .get_mut(&intersection_id)
            .context("Intersection not found")?;

        let touches = road.cells().any(|cell| {
            let inside = cell.step(side.opposite(), 1);
            intersection.covers(inside) && intersection.reached_exit(inside, side)
        });
        if !touches {
            anyhow::bail!(
                "Road {} does not touch the {} side of intersection {}",
                road.name,
                side.name(),
                intersection.name
            );
        }

        intersection.connect_road(side, road_id);
        Ok(())
    }

    pub fn road(&self, id: RoadId) -> Option<&SimRoad> {
        self.roads.get(&id)
    }

    pub fn roads(&self) -> impl Iterator<Item = &SimRoad> {
        self.roads.values()
    }

    pub fn road_by_name(&self, name: &str) -> Option<RoadId> {
        self.roads.values().find(|road| road.name == name).map(|road| road.id)
    }

    pub fn intersection(&self, id: IntersectionId) -> Option<&SimIntersection> {
        self.intersections.get(&id)
    }

    pub fn intersections(&self) -> impl Iterator<Item = &SimIntersection> {
        self.intersections.values()
    }

    pub fn intersection_by_name(&self, name: &str) -> Option<IntersectionId> {
        self.intersections
            .values()
            .find(|intersection| intersection.name == name)
            .map(|intersection| intersection.id)
    }

    fn road_at(&self, cell: Cell) -> Option<RoadId> {
        self.roads.values().find(|road| road.covers(cell)).map(|road| road.id)
    }

    fn intersection_at(&self, cell: Cell) -> Option<IntersectionId> {
        self.intersections
            .values()
            .find(|intersection| intersection.covers(cell))
            .map(|intersection| intersection.id)
    }

    // ── Cars ────────────────────────────────────────────────────

    /// An id no registered car uses
    pub fn next_car_id(&mut self) -> CarId {
        while self.cars.contains_key(&CarId::new(self.next_car)) {
            self.next_car += 1;
        }
        let id = CarId::new(self.next_car);
        self.next_car += 1;
        id
    }

    pub fn car(&self, id: CarId) -> Option<&SimCar> {
        self.cars.get(&id)
    }

    /// All cars in registration order
    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.cars.values()
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    /// Register a car on a lane of a road. The car must already stand on a
    /// free cell of that lane. Returns false for unknown roads or lanes, a
    /// full lane, a cell outside the lane, or a car id already in use.
    pub fn add_car(&mut self, mut car: SimCar, road_id: RoadId, lane: usize) -> bool {
        if self.cars.contains_key(&car.id) {
            return false;
        }
        let Some(road) = self.roads.get_mut(&road_id) else {
            return false;
        };
        if !road.add_car(&mut car, lane) {
            trace!("Rejected {car} on road {} lane {lane}", road.name);
            return false;
        }
        debug!("Added {car} to road {} lane {lane}", road.name);
        self.cars.insert(car.id, car);
        true
    }

    /// Take a car out of the simulation, wherever it is. Idempotent.
    pub fn remove_car(&mut self, car_id: CarId) -> Option<SimCar> {
        let car = self.cars.shift_remove(&car_id)?;
        for road in self.roads.values_mut() {
            road.remove_car(car_id);
        }
        for intersection in self.intersections.values_mut() {
            intersection.release(car_id);
        }
        debug!("Removed {car}");
        Some(car)
    }

    /// Which road or intersection holds the car. Roads are searched first.
    pub fn find_location(&self, car_id: CarId) -> Option<Location> {
        if let Some(road) = self.roads.values().find(|road| road.contains_car(car_id)) {
            return Some(Location::Road(road.id));
        }
        self.intersections
            .values()
            .find(|intersection| intersection.contains_car(car_id))
            .map(|intersection| Location::Intersection(intersection.id))
    }

    /// The car standing on `cell`, on a road or inside an intersection
    pub fn car_at(&self, cell: Cell) -> Option<CarId> {
        self.roads
            .values()
            .find_map(|road| road.car_at(cell))
            .or_else(|| self.intersections.values().find_map(|intersection| intersection.car_at(cell)))
    }

    /// True when no car stands on `cell`
    pub fn is_position_free(&self, cell: Cell) -> bool {
        self.car_at(cell).is_none()
    }

    // ── Signals ─────────────────────────────────────────────────

    /// Overwrite one light of an intersection. Returns false for an unknown
    /// intersection.
    pub fn set_signal(&mut self, intersection_id: IntersectionId, direction: Direction, state: SignalState) -> bool {
        self.set_signal_for(intersection_id, direction, state, 0)
    }

    /// Like [`set_signal`](Self::set_signal) but also starts the light's countdown
    pub fn set_signal_for(
        &mut self,
        intersection_id: IntersectionId,
        direction: Direction,
        state: SignalState,
        duration: u32,
    ) -> bool {
        match self.intersections.get_mut(&intersection_id) {
            Some(intersection) => {
                intersection.controller.set_light_state_for(direction, state, duration);
                true
            }
            None => false,
        }
    }

    pub fn set_signal_mode(&mut self, intersection_id: IntersectionId, mode: SignalMode) -> bool {
        match self.intersections.get_mut(&intersection_id) {
            Some(intersection) => {
                intersection.controller.set_mode(mode);
                true
            }
            None => false,
        }
    }

    // ── Tick ────────────────────────────────────────────────────

    /// Advance the simulation by one step.
    ///
    /// All signals are updated before any car moves, then every car gets
    /// exactly one move attempt in an order chosen by the tick order.
    pub fn tick(&mut self) {
        self.tick_count += 1;

        for intersection in self.intersections.values_mut() {
            intersection.controller.update();
        }

        let mut order: Vec<CarId> = self.cars.keys().copied().collect();
        self.order.arrange(&mut order);
        debug_assert_eq!(order.len(), self.cars.len());

        for car_id in order {
            let moved = self.move_car(car_id);
            if let Some(car) = self.cars.get_mut(&car_id) {
                if moved {
                    car.record_move();
                } else {
                    car.record_wait();
                }
            }
        }

        trace!("Tick {} complete with {} cars", self.tick_count, self.cars.len());
    }

    fn move_car(&mut self, car_id: CarId) -> bool {
        match self.find_location(car_id) {
            Some(Location::Road(road_id)) => self.move_car_on_road(car_id, road_id),
            Some(Location::Intersection(intersection_id)) => self.move_car_in_intersection(car_id, intersection_id),
            None => panic!("{car_id:?} is registered but is neither on a road nor in an intersection"),
        }
    }

    fn move_car_on_road(&mut self, car_id: CarId, road_id: RoadId) -> bool {
        let Some(car) = self.cars.get(&car_id) else {
            return false;
        };
        let steps = car.max_speed.min(self.config.cells_per_tick());
        let mut current = road_id;
        let mut moved = false;

        for _ in 0..steps {
            let Some(next) = self.cars.get(&car_id).map(|car| car.next_cell(1)) else {
                return moved;
            };

            if let Some(intersection_id) = self.intersection_at(next) {
                // Entering ends the move for this tick
                return self.enter_intersection(car_id, current, intersection_id, next) || moved;
            }

            let target = self
                .road_at(next)
                .filter(|other| self.roads.get(other).is_some_and(|road| road.is_position_free(next)));
            let (Some(other), Some(car)) = (target, self.cars.get_mut(&car_id)) else {
                trace!("{car_id:?} blocked at {next}");
                break;
            };
            let Some(road) = self.roads.get_mut(&other) else {
                break;
            };

            if other == current {
                if !road.relocate(car, next) {
                    break;
                }
            } else {
                // Continue onto an adjoining road
                let Some(lane) = road.lane_of(next) else {
                    break;
                };
                let from = car.cell;
                car.cell = next;
                if !road.add_car(car, lane) {
                    car.cell = from;
                    break;
                }
                if let Some(previous) = self.roads.get_mut(&current) {
                    previous.remove_car(car_id);
                }
                debug!("{car} continued onto road {other:?}");
                current = other;
            }
            moved = true;
        }

        moved
    }

    fn enter_intersection(
        &mut self,
        car_id: CarId,
        road_id: RoadId,
        intersection_id: IntersectionId,
        target: Cell,
    ) -> bool {
        let (Some(car), Some(intersection)) = (self.cars.get_mut(&car_id), self.intersections.get_mut(&intersection_id))
        else {
            return false;
        };

        let heading = car.heading;
        if !intersection.can_enter(car, heading, target) {
            trace!(
                "{car} held at intersection {} ({:?} light)",
                intersection.name,
                intersection.controller.state(heading)
            );
            return false;
        }
        if !intersection.admit(car_id, target, heading) {
            return false;
        }
        if let Some(road) = self.roads.get_mut(&road_id) {
            road.remove_car(car_id);
        }
        car.cell = target;
        debug!("{car} entered intersection {}", intersection.name);
        true
    }

    fn move_car_in_intersection(&mut self, car_id: CarId, intersection_id: IntersectionId) -> bool {
        let (Some(car), Some(intersection)) = (self.cars.get(&car_id), self.intersections.get(&intersection_id)) else {
            return false;
        };
        let Some(transit) = intersection.transit(car_id).copied() else {
            return false;
        };
        let exit = intersection.exit_direction(transit.entry, car.turn);
        let exit_road = intersection.connected_road(exit).and_then(|road_id| self.roads.get(&road_id));
        let step = intersection.plan_step(&transit, car.turn, exit_road);

        match step {
            TransitStep::HandOff { road, exit, target } => {
                let (Some(car), Some(road), Some(intersection)) = (
                    self.cars.get_mut(&car_id),
                    self.roads.get_mut(&road),
                    self.intersections.get_mut(&intersection_id),
                ) else {
                    return false;
                };
                let Some(lane) = road.lane_of(target).filter(|_| road.is_position_free(target)) else {
                    trace!("{car} waiting to leave intersection {}", intersection.name);
                    return false;
                };

                let (from, heading) = (car.cell, car.heading);
                car.cell = target;
                car.heading = exit;
                if !road.add_car(car, lane) {
                    car.cell = from;
                    car.heading = heading;
                    return false;
                }
                intersection.release(car_id);
                debug!("{car} left intersection {} onto road {}", intersection.name, road.name);
                true
            }
            TransitStep::Advance(next) => {
                let (Some(car), Some(intersection)) =
                    (self.cars.get_mut(&car_id), self.intersections.get_mut(&intersection_id))
                else {
                    return false;
                };
                if !intersection.relocate(car_id, next) {
                    return false;
                }
                car.cell = next;
                true
            }
            TransitStep::Stuck => {
                if exit_road.is_none() && car.wait_time == 0 {
                    warn!(
                        "{car} cannot leave intersection {}: no road connected on the {} side",
                        intersection.name,
                        exit.name()
                    );
                }
                false
            }
        }
    }

    // ── Observation ─────────────────────────────────────────────

    /// Owned snapshot of the current state
    pub fn state(&self) -> SimState {
        let intersections = self
            .intersections
            .values()
            .map(|intersection| {
                let state = IntersectionState {
                    name: intersection.name.clone(),
                    mode: intersection.controller.mode(),
                    signals: intersection.controller.states(),
                    car_positions: intersection.transits().iter().map(|transit| transit.cell).collect(),
                    cars_count: intersection.car_count(),
                };
                (intersection.name.clone(), state)
            })
            .collect();

        let car_wait_times: BTreeMap<CarId, u32> = self.cars.values().map(|car| (car.id, car.wait_time)).collect();
        let average_wait_time = if self.cars.is_empty() {
            0.0
        } else {
            car_wait_times.values().map(|&wait| f64::from(wait)).sum::<f64>() / self.cars.len() as f64
        };

        SimState {
            tick: self.tick_count,
            total_cars: self.cars.len(),
            intersections,
            car_wait_times,
            average_wait_time,
        }
    }

    /// Draw the grid as text: `.` empty, `|`/`-` road, `#` intersection,
    /// and an arrow for each car showing its heading
    pub fn render_map(&self) -> String {
        let rows = self.config.grid_rows.max(0) as usize;
        let cols = self.config.grid_cols.max(0) as usize;
        let mut grid = vec![vec!['.'; cols]; rows];

        let mut paint = |cell: Cell, glyph: char| {
            if self.is_valid_position(cell) {
                grid[cell.row as usize][cell.col as usize] = glyph;
            }
        };

        for road in self.roads.values() {
            let glyph = if road.direction.is_vertical() { '|' } else { '-' };
            for cell in road.cells() {
                paint(cell, glyph);
            }
        }
        for intersection in self.intersections.values() {
            for cell in intersection.cells() {
                paint(cell, '#');
            }
        }
        for car in self.cars.values() {
            let glyph = match car.heading {
                Direction::North => '^',
                Direction::East => '>',
                Direction::South => 'v',
                Direction::West => '<',
            };
            paint(car.cell, glyph);
        }

        let mut out = String::with_capacity(rows * (cols + 1));
        for row in grid {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for SimWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SimWorld(tick={}, cars={}, roads={}, intersections={})",
            self.tick_count,
            self.cars.len(),
            self.roads.len(),
            self.intersections.len()
        )
    }
}
