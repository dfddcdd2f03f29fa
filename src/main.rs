use anyhow::Result;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use grid_traffic::simulation::{
    Cell, Direction, IntersectionId, SignalMode, SignalState, SimCar, SimConfig, SimWorld, Turn, EAST_ROAD,
    NORTH_ROAD, SOUTH_ROAD, WEST_ROAD,
};

#[derive(Parser)]
#[command(name = "grid_traffic")]
#[command(about = "Headless grid traffic simulation with a four-way signalized intersection")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "60")]
    ticks: u32,

    /// Log a summary and map every this many ticks
    #[arg(long, default_value = "10")]
    report_every: u32,

    /// Seed for car ordering and spawning; omit for a random run
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks per phase of the automatic signal cycle
    #[arg(long, default_value = "30")]
    cycle_duration: u32,

    /// Grid side length in cells
    #[arg(long, default_value = "20")]
    grid_size: i32,

    /// Drive the lights from this runner instead of the automatic cycle
    #[arg(long)]
    manual_signals: bool,

    /// Chance per tick of spawning an extra car
    #[arg(long, default_value = "0.3")]
    spawn_rate: f64,

    /// Print the final state as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = SimConfig::default()
        .with_grid(cli.grid_size, cli.grid_size)
        .with_cycle_duration(cli.cycle_duration);
    config.seed = cli.seed;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };

    let center = Cell::new(cli.grid_size / 2, cli.grid_size / 2);
    let mut world = SimWorld::new(config);
    let intersection = world.create_simple_four_way_intersection(center)?;
    let added = world.add_sample_cars(center);
    if cli.manual_signals {
        world.set_signal_mode(intersection, SignalMode::Manual);
    }

    info!("Running traffic simulation in headless mode...");
    info!("Ticks: {}, cars: {}, seed: {:?}", cli.ticks, added.len(), cli.seed);
    report(&world);

    for tick in 1..=cli.ticks {
        if cli.manual_signals {
            drive_signals(&mut world, intersection, tick, cli.cycle_duration);
        }
        world.tick();

        if rng.random_bool(cli.spawn_rate.clamp(0.0, 1.0)) {
            spawn_random_car(&mut world, &mut rng);
        }
        if cli.report_every > 0 && tick % cli.report_every == 0 {
            report(&world);
        }
    }

    let state = world.state();
    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", state.tick);
    info!("Active cars: {}", state.total_cars);
    info!("Average wait time: {:.2}", state.average_wait_time);
    info!("Longest wait: {}", state.max_wait_time());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    Ok(())
}

fn report(world: &SimWorld) {
    let state = world.state();
    info!(
        "--- Tick {}: {} cars, avg wait {:.1} ---",
        state.tick, state.total_cars, state.average_wait_time
    );
    for (name, intersection) in &state.intersections {
        info!(
            "  {}: {} cars inside, lights {:?}",
            name, intersection.cars_count, intersection.signals
        );
    }
    for car in world.cars() {
        info!(
            "  {} wants {:?}, wait {} at {:?}",
            car,
            car.turn,
            car.wait_time,
            world.find_location(car.id)
        );
    }
    info!("\n{}", world.render_map());
}

/// Stand-in for an external controller: alternate axes with a short yellow
fn drive_signals(world: &mut SimWorld, intersection: IntersectionId, tick: u32, cycle_duration: u32) {
    let period = cycle_duration.max(2);
    let phase = (tick - 1) / period;
    let in_phase = (tick - 1) % period;
    let (green, red) = if phase % 2 == 0 {
        ([Direction::North, Direction::South], [Direction::East, Direction::West])
    } else {
        ([Direction::East, Direction::West], [Direction::North, Direction::South])
    };
    let state = if in_phase + 1 == period {
        SignalState::Yellow
    } else {
        SignalState::GreenArrow
    };

    for direction in green {
        world.set_signal_for(intersection, direction, state, period - in_phase);
    }
    for direction in red {
        world.set_signal(intersection, direction, SignalState::Red);
    }
}

fn spawn_random_car(world: &mut SimWorld, rng: &mut StdRng) {
    let arms = [
        (NORTH_ROAD, Direction::South),
        (SOUTH_ROAD, Direction::North),
        (EAST_ROAD, Direction::West),
        (WEST_ROAD, Direction::East),
    ];
    let Some(&(road_name, heading)) = arms.choose(rng) else {
        return;
    };
    let Some(road_id) = world.road_by_name(road_name) else {
        return;
    };
    let Some(lane) = world.road(road_id).and_then(|road| road.lane(0)) else {
        return;
    };

    let free: Vec<Cell> = lane.cells().filter(|&cell| world.is_position_free(cell)).collect();
    let Some(&cell) = free.choose(rng) else {
        return;
    };
    let turn = *[Turn::Straight, Turn::Left, Turn::Right]
        .choose(rng)
        .unwrap_or(&Turn::Straight);

    let id = world.next_car_id();
    if world.add_car(SimCar::new(id, cell, heading, turn), road_id, 0) {
        info!("  -> Added new car {:?} at {}", id.0 .0, cell);
    }
}
