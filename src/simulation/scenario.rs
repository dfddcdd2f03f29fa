//! Ready-made topologies
//!
//! The four-way layout is the reference network used by the headless
//! runner and most tests.

use anyhow::Result;

use super::car::SimCar;
use super::types::{CarId, Cell, Direction, IntersectionId, Turn, DEFAULT_INTERSECTION_SIZE};
use super::world::SimWorld;

/// Cells per lane of each arm of the four-way layout
pub const ARM_LENGTH: i32 = 6;

/// Lanes per road of the four-way layout
pub const ARM_LANES: usize = 2;

pub const MAIN_INTERSECTION: &str = "main_intersection";
pub const NORTH_ROAD: &str = "north_road";
pub const SOUTH_ROAD: &str = "south_road";
pub const EAST_ROAD: &str = "east_road";
pub const WEST_ROAD: &str = "west_road";

impl SimWorld {
    /// Create a 3x3 intersection at `center` with a two-lane road on each
    /// side. Lane 0 of every road lines up with the center row or column.
    pub fn create_simple_four_way_intersection(&mut self, center: Cell) -> Result<IntersectionId> {
        let intersection = self.add_intersection(MAIN_INTERSECTION, center, DEFAULT_INTERSECTION_SIZE)?;
        let near = DEFAULT_INTERSECTION_SIZE / 2 + 1;
        let far = near + ARM_LENGTH - 1;
        let (row, col) = (center.row, center.col);

        // Each road is named after its side and carries traffic towards the block
        let north = self.add_road(
            NORTH_ROAD,
            Cell::new(row - far, col),
            Cell::new(row - near, col),
            Direction::South,
            ARM_LANES,
        )?;
        let south = self.add_road(
            SOUTH_ROAD,
            Cell::new(row + near, col),
            Cell::new(row + far, col),
            Direction::North,
            ARM_LANES,
        )?;
        let east = self.add_road(
            EAST_ROAD,
            Cell::new(row, col + near),
            Cell::new(row, col + far),
            Direction::West,
            ARM_LANES,
        )?;
        let west = self.add_road(
            WEST_ROAD,
            Cell::new(row, col - far),
            Cell::new(row, col - near),
            Direction::East,
            ARM_LANES,
        )?;

        self.connect_road(intersection, Direction::North, north)?;
        self.connect_road(intersection, Direction::South, south)?;
        self.connect_road(intersection, Direction::East, east)?;
        self.connect_road(intersection, Direction::West, west)?;

        Ok(intersection)
    }

    /// Place one car on each arm, mixing turn intents. Returns the ids of
    /// the cars that were accepted.
    pub fn add_sample_cars(&mut self, center: Cell) -> Vec<CarId> {
        let (row, col) = (center.row, center.col);
        let samples = [
            (NORTH_ROAD, 0, Cell::new(row - 6, col), Direction::South, Turn::Straight),
            (NORTH_ROAD, 1, Cell::new(row - 4, col + 1), Direction::South, Turn::Left),
            (EAST_ROAD, 0, Cell::new(row, col + 2), Direction::West, Turn::Straight),
            (WEST_ROAD, 0, Cell::new(row, col - 2), Direction::East, Turn::Right),
            (SOUTH_ROAD, 0, Cell::new(row + 4, col), Direction::North, Turn::Straight),
        ];

        let mut added = Vec::new();
        for (road_name, lane, cell, heading, turn) in samples {
            let Some(road) = self.road_by_name(road_name) else {
                continue;
            };
            let id = self.next_car_id();
            let car = SimCar::new(id, cell, heading, turn);
            if self.add_car(car, road, lane) {
                added.push(id);
            }
        }
        added
    }
}
