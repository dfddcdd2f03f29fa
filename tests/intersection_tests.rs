//! Intersection geometry, entry rules and the turn table

use grid_traffic::simulation::{
    CarId, Cell, Direction, IntersectionId, RoadId, SignalController, SignalState, SimCar, SimId,
    SimIntersection, SimRoad, Transit, TransitStep, Turn,
};

fn intersection() -> SimIntersection {
    SimIntersection::new(
        IntersectionId(SimId(0)),
        "test_intersection",
        Cell::new(10, 10),
        3,
        SignalController::new(30),
    )
    .expect("valid intersection")
}

fn car(turn: Turn) -> SimCar {
    SimCar::new(CarId::new(1), Cell::new(8, 10), Direction::South, turn)
}

#[test]
fn test_region_is_a_square_around_the_center() {
    let intersection = intersection();
    let cells: Vec<Cell> = intersection.cells().collect();
    assert_eq!(cells.len(), 9);
    assert!(intersection.covers(Cell::new(9, 9)));
    assert!(intersection.covers(Cell::new(11, 11)));
    assert!(!intersection.covers(Cell::new(8, 10)));
}

#[test]
fn test_even_or_empty_sizes_are_rejected() {
    for size in [0, 2, -3] {
        let result = SimIntersection::new(
            IntersectionId(SimId(0)),
            "bad",
            Cell::new(5, 5),
            size,
            SignalController::default(),
        );
        assert!(result.is_err(), "size {size} should be rejected");
    }
}

#[test]
fn test_turn_table() {
    assert_eq!(Turn::Right.exit_direction(Direction::North), Direction::East);
    assert_eq!(Turn::Left.exit_direction(Direction::North), Direction::West);
    for direction in Direction::CLOCKWISE {
        assert_eq!(Turn::Straight.exit_direction(direction), direction);
        assert_eq!(
            Turn::Left.exit_direction(Turn::Right.exit_direction(direction)),
            direction
        );
    }
    assert_eq!(Turn::Right.exit_direction(Direction::West), Direction::North);
    assert_eq!(Turn::Left.exit_direction(Direction::East), Direction::North);
}

#[test]
fn test_entry_follows_signal_permissions() {
    let mut intersection = intersection();
    let target = Cell::new(9, 10);

    intersection.controller.set_light_state(Direction::South, SignalState::Red);
    assert!(!intersection.can_enter(&car(Turn::Straight), Direction::South, target));
    assert!(!intersection.can_enter(&car(Turn::Right), Direction::South, target));

    intersection.controller.set_light_state(Direction::South, SignalState::Yellow);
    assert!(!intersection.can_enter(&car(Turn::Straight), Direction::South, target));
    assert!(intersection.can_enter(&car(Turn::Right), Direction::South, target));

    intersection.controller.set_light_state(Direction::South, SignalState::Green);
    assert!(intersection.can_enter(&car(Turn::Straight), Direction::South, target));
    assert!(!intersection.can_enter(&car(Turn::Left), Direction::South, target));

    intersection.controller.set_light_state(Direction::South, SignalState::GreenArrow);
    assert!(intersection.can_enter(&car(Turn::Left), Direction::South, target));

    // Only the light for the car's own heading matters
    intersection.controller.set_light_state(Direction::East, SignalState::Red);
    assert!(intersection.can_enter(&car(Turn::Straight), Direction::South, target));
}

#[test]
fn test_entry_requires_a_free_cell_inside() {
    let mut intersection = intersection();
    intersection.controller.set_light_state(Direction::South, SignalState::Green);

    assert!(!intersection.can_enter(&car(Turn::Straight), Direction::South, Cell::new(8, 10)));
    assert!(intersection.can_enter(&car(Turn::Straight), Direction::South, Cell::new(9, 10)));

    // Outside the region
    assert!(!intersection.can_enter(&car(Turn::Straight), Direction::South, Cell::new(12, 10)));
}

#[test]
fn test_exit_boundary_compares_against_center() {
    let intersection = intersection();
    assert!(intersection.reached_exit(Cell::new(9, 10), Direction::North));
    assert!(!intersection.reached_exit(Cell::new(10, 10), Direction::North));
    assert!(intersection.reached_exit(Cell::new(11, 9), Direction::South));
    assert!(intersection.reached_exit(Cell::new(10, 11), Direction::East));
    assert!(intersection.reached_exit(Cell::new(9, 9), Direction::West));
    assert!(!intersection.reached_exit(Cell::new(9, 10), Direction::West));
}

#[test]
fn test_straight_transit_steps_towards_exit_road() {
    let intersection = intersection();
    let south_road = SimRoad::new(
        RoadId(SimId(5)),
        "south_road",
        Cell::new(12, 10),
        Cell::new(16, 10),
        Direction::North,
        2,
    )
    .unwrap();

    let mut transit = Transit {
        car: CarId::new(1),
        cell: Cell::new(9, 10),
        entry: Direction::South,
    };
    assert_eq!(
        intersection.plan_step(&transit, Turn::Straight, Some(&south_road)),
        TransitStep::Advance(Cell::new(10, 10))
    );

    transit.cell = Cell::new(11, 10);
    assert_eq!(
        intersection.plan_step(&transit, Turn::Straight, Some(&south_road)),
        TransitStep::HandOff {
            road: south_road.id,
            exit: Direction::South,
            target: Cell::new(12, 10),
        }
    );
}

#[test]
fn test_turning_transit_keeps_heading_until_aligned() {
    let intersection = intersection();
    let west_road = SimRoad::new(
        RoadId(SimId(7)),
        "west_road",
        Cell::new(10, 4),
        Cell::new(10, 8),
        Direction::East,
        2,
    )
    .unwrap();

    // Southbound right turn exits west; row 9 is not a west road lane yet
    let transit = Transit {
        car: CarId::new(1),
        cell: Cell::new(9, 10),
        entry: Direction::South,
    };
    assert_eq!(
        intersection.plan_step(&transit, Turn::Right, Some(&west_road)),
        TransitStep::Advance(Cell::new(10, 10))
    );

    let aligned = Transit {
        cell: Cell::new(10, 10),
        ..transit
    };
    assert_eq!(
        intersection.plan_step(&aligned, Turn::Right, Some(&west_road)),
        TransitStep::Advance(Cell::new(10, 9))
    );

    let at_edge = Transit {
        cell: Cell::new(10, 9),
        ..transit
    };
    assert_eq!(
        intersection.plan_step(&at_edge, Turn::Right, Some(&west_road)),
        TransitStep::HandOff {
            road: west_road.id,
            exit: Direction::West,
            target: Cell::new(10, 8),
        }
    );
}

#[test]
fn test_transit_without_exit_road_gets_stuck_at_edge() {
    let intersection = intersection();
    let transit = Transit {
        car: CarId::new(1),
        cell: Cell::new(11, 10),
        entry: Direction::South,
    };
    assert_eq!(
        intersection.plan_step(&transit, Turn::Straight, None),
        TransitStep::Stuck
    );
}
