//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::collections::HashSet;

use grid_traffic::simulation::{
    CarId, Cell, Direction, IntersectionId, RegistrationOrder, SimCar, SimConfig, SimWorld, Turn,
};

pub const CENTER: Cell = Cell::new(10, 10);

/// The reference four-way layout, processing cars in registration order
pub fn four_way_world() -> (SimWorld, IntersectionId) {
    let mut world = SimWorld::with_order(SimConfig::default(), Box::new(RegistrationOrder));
    let intersection = world
        .create_simple_four_way_intersection(CENTER)
        .expect("four-way layout should build");
    (world, intersection)
}

pub fn place_car(
    world: &mut SimWorld,
    road_name: &str,
    lane: usize,
    cell: Cell,
    heading: Direction,
    turn: Turn,
) -> CarId {
    let road = world.road_by_name(road_name).expect("road should exist");
    let id = world.next_car_id();
    assert!(
        world.add_car(SimCar::new(id, cell, heading, turn), road, lane),
        "car should fit on {road_name} lane {lane} at {cell}"
    );
    id
}

/// No two cars share a cell and every car sits in exactly one container
/// that covers its cell
pub fn assert_world_invariants(world: &SimWorld) {
    let mut seen = HashSet::new();
    for car in world.cars() {
        assert!(seen.insert(car.cell), "two cars share cell {}", car.cell);

        let on_roads: Vec<_> = world.roads().filter(|road| road.contains_car(car.id)).collect();
        let in_intersections: Vec<_> = world
            .intersections()
            .filter(|intersection| intersection.contains_car(car.id))
            .collect();
        assert_eq!(
            on_roads.len() + in_intersections.len(),
            1,
            "{car} must be in exactly one container"
        );

        if let Some(road) = on_roads.first() {
            assert_eq!(road.car_at(car.cell), Some(car.id), "{car} not recorded at its cell");
        }
        if let Some(intersection) = in_intersections.first() {
            assert_eq!(intersection.car_at(car.cell), Some(car.id), "{car} not recorded at its cell");
        }
    }
}
