//! Lane partitioning and occupancy on roads

use grid_traffic::simulation::{CarId, Cell, Direction, RoadId, SimCar, SimId, SimRoad, Turn};

fn road(direction: Direction, start: Cell, end: Cell, lanes: usize) -> SimRoad {
    SimRoad::new(RoadId(SimId(0)), "test_road", start, end, direction, lanes).expect("valid road")
}

fn car(id: usize, cell: Cell) -> SimCar {
    SimCar::new(CarId::new(id), cell, Direction::South, Turn::Straight)
}

#[test]
fn test_vertical_road_stacks_lanes_by_column() {
    let road = road(Direction::South, Cell::new(8, 10), Cell::new(4, 10), 2);
    assert_eq!(road.lane_count(), 2);

    let lane0: Vec<Cell> = road.lane(0).unwrap().cells().collect();
    let lane1: Vec<Cell> = road.lane(1).unwrap().cells().collect();
    assert_eq!(lane0.len(), 5);
    assert!(lane0.iter().all(|cell| cell.col == 10));
    assert!(lane1.iter().all(|cell| cell.col == 11));
    assert_eq!(road.lane_of(Cell::new(6, 11)), Some(1));
    assert_eq!(road.lane_of(Cell::new(9, 10)), None);
}

#[test]
fn test_horizontal_road_stacks_lanes_by_row() {
    let road = road(Direction::West, Cell::new(10, 12), Cell::new(10, 16), 3);
    assert_eq!(road.lane(0).unwrap().capacity(), 5);
    assert!(road.lane(2).unwrap().cells().all(|cell| cell.row == 12));
    assert!(road.covers(Cell::new(11, 14)));
    assert!(!road.covers(Cell::new(13, 14)));
}

#[test]
fn test_misaligned_or_laneless_roads_are_rejected() {
    assert!(SimRoad::new(RoadId(SimId(0)), "bent", Cell::new(0, 0), Cell::new(5, 1), Direction::North, 1).is_err());
    assert!(SimRoad::new(RoadId(SimId(0)), "slanted", Cell::new(0, 0), Cell::new(1, 5), Direction::East, 1).is_err());
    assert!(SimRoad::new(RoadId(SimId(0)), "empty", Cell::new(0, 0), Cell::new(0, 5), Direction::East, 0).is_err());
}

#[test]
fn test_add_car_requires_cell_in_lane() {
    let mut road = road(Direction::South, Cell::new(4, 10), Cell::new(8, 10), 2);

    let mut wrong_lane = car(1, Cell::new(5, 11));
    assert!(!road.add_car(&mut wrong_lane, 0));

    let mut right_lane = car(2, Cell::new(5, 11));
    assert!(road.add_car(&mut right_lane, 1));
    assert_eq!(right_lane.lane, 1);

    let mut unknown_lane = car(3, Cell::new(5, 10));
    assert!(!road.add_car(&mut unknown_lane, 7));
}

#[test]
fn test_lane_holds_one_car_per_cell() {
    let mut road = road(Direction::South, Cell::new(0, 0), Cell::new(1, 0), 1);

    assert!(road.add_car(&mut car(1, Cell::new(0, 0)), 0));
    assert!(!road.add_car(&mut car(2, Cell::new(0, 0)), 0));
    assert!(road.add_car(&mut car(3, Cell::new(1, 0)), 0));

    let lane = road.lane(0).unwrap();
    assert_eq!(lane.car_count(), lane.capacity());
    assert!(!road.is_position_free(Cell::new(0, 0)));
}

#[test]
fn test_remove_car_is_a_noop_when_absent() {
    let mut road = road(Direction::South, Cell::new(4, 10), Cell::new(8, 10), 1);
    let mut first = car(1, Cell::new(4, 10));
    assert!(road.add_car(&mut first, 0));

    assert!(!road.remove_car(CarId::new(99)));
    assert!(road.contains_car(first.id));

    assert!(road.remove_car(first.id));
    assert!(!road.remove_car(first.id));
    assert!(road.is_position_free(Cell::new(4, 10)));
    assert_eq!(road.car_count(), 0);
}

#[test]
fn test_position_queries() {
    let mut road = road(Direction::East, Cell::new(3, 0), Cell::new(3, 4), 1);
    let mut first = car(1, Cell::new(3, 2));
    assert!(road.add_car(&mut first, 0));

    assert_eq!(road.car_at(Cell::new(3, 2)), Some(first.id));
    assert_eq!(road.car_at(Cell::new(3, 3)), None);
    assert!(road.is_position_free(Cell::new(3, 3)));
    // Cells off the road are never free on it
    assert!(!road.is_position_free(Cell::new(4, 3)));
}

#[test]
fn test_relocate_moves_car_within_road() {
    let mut road = road(Direction::South, Cell::new(4, 10), Cell::new(8, 10), 2);
    let mut first = car(1, Cell::new(4, 10));
    let mut second = car(2, Cell::new(6, 10));
    assert!(road.add_car(&mut first, 0));
    assert!(road.add_car(&mut second, 0));

    assert!(road.relocate(&mut first, Cell::new(5, 10)));
    assert_eq!(first.cell, Cell::new(5, 10));
    assert_eq!(road.car_at(Cell::new(5, 10)), Some(first.id));
    assert!(road.is_position_free(Cell::new(4, 10)));

    // Occupied target
    assert!(!road.relocate(&mut first, Cell::new(6, 10)));
    assert_eq!(first.cell, Cell::new(5, 10));

    // Off-road target
    assert!(!road.relocate(&mut first, Cell::new(9, 10)));
    assert!(road.contains_car(first.id));
}
