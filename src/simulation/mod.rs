//! Grid traffic simulation engine
//!
//! Cars move cell by cell along lanes of straight roads and cross
//! signal-controlled intersections. The engine only advances when
//! [`SimWorld::tick`] is called; an external controller observes it through
//! [`SimWorld::state`] and drives lights with [`SimWorld::set_signal`].

mod car;
mod config;
mod intersection;
mod ordering;
mod road;
mod scenario;
mod signal;
mod state;
mod types;
mod world;

pub use car::SimCar;
pub use config::SimConfig;
pub use intersection::{SimIntersection, Transit, TransitStep};
pub use ordering::{RegistrationOrder, ScriptedOrder, SeededShuffle, TickOrder};
pub use road::{SimLane, SimRoad};
pub use scenario::{ARM_LANES, ARM_LENGTH, EAST_ROAD, MAIN_INTERSECTION, NORTH_ROAD, SOUTH_ROAD, WEST_ROAD};
pub use signal::{SignalController, SignalMode, SignalState, TrafficLight};
pub use state::{IntersectionState, SimState};
pub use types::{
    CarId, Cell, Direction, IntersectionId, RoadId, SimId, Turn, DEFAULT_CYCLE_DURATION,
    DEFAULT_INTERSECTION_SIZE, MAX_CAR_SPEED,
};
pub use world::{Location, SimWorld};
