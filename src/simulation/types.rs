//! Core types for the traffic simulation
//!
//! Grid coordinates, directions and the identifiers used to reference
//! entities stored in the world arena.

use serde::Serialize;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimId(pub usize);

/// A wrapper type for intersection IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IntersectionId(pub SimId);

/// A wrapper type for road IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoadId(pub SimId);

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CarId(pub SimId);

impl CarId {
    pub fn new(raw: usize) -> Self {
        Self(SimId(raw))
    }
}

/// Maximum number of cells a car may ever cover in one tick
pub const MAX_CAR_SPEED: u32 = 2;

/// Side length of the intersections built by the four-way scenario
pub const DEFAULT_INTERSECTION_SIZE: i32 = 3;

/// Ticks each phase of the automatic signal cycle stays active
pub const DEFAULT_CYCLE_DURATION: u32 = 30;

/// A single grid coordinate. Rows grow southwards, columns eastwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The cell `distance` steps away in `direction`
    pub fn step(self, direction: Direction, distance: i32) -> Cell {
        let (dr, dc) = direction.offset();
        Cell {
            row: self.row + dr * distance,
            col: self.col + dc * distance,
        }
    }

    /// Coordinate perpendicular to travel in `direction`
    /// (the column for vertical travel, the row for horizontal travel)
    pub fn cross_axis(self, direction: Direction) -> i32 {
        if direction.is_vertical() {
            self.col
        } else {
            self.row
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal directions for cars and roads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// The four directions in clockwise order. Turns are derived by
    /// walking this cycle forwards (right) or backwards (left).
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    fn rotate(self, quarter_turns: usize) -> Direction {
        Self::CLOCKWISE[(self.index() + quarter_turns) % 4]
    }

    pub fn clockwise(self) -> Direction {
        self.rotate(1)
    }

    pub fn counter_clockwise(self) -> Direction {
        self.rotate(3)
    }

    pub fn opposite(self) -> Direction {
        self.rotate(2)
    }

    /// (row delta, column delta) of one step in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

/// Intended movement of a car at its next intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Straight,
    Left,
    Right,
}

impl Turn {
    /// Direction a car leaves an intersection given the heading it entered with
    pub fn exit_direction(self, entry: Direction) -> Direction {
        match self {
            Turn::Straight => entry,
            Turn::Right => entry.clockwise(),
            Turn::Left => entry.counter_clockwise(),
        }
    }
}
