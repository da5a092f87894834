use anyhow::{Context, Result};
use bms::{config, persistence, report::SimulationReport, simulation::TickRegistry, telemetry};
use bms::domain::{Building, RoomState};
use config::Config;
use telemetry::init_tracing;
use tracing::{debug, info, warn};

/// Every room's state, in building/floor/room order.
fn room_states(buildings: &[Building]) -> Vec<RoomState> {
    buildings
        .iter()
        .flat_map(|building| building.floors())
        .flat_map(|floor| floor.rooms())
        .map(|room| room.borrow().evaluate_room_state())
        .collect()
}

fn log_state_changes(buildings: &[Building], previous: &[RoomState], minute: u64) {
    let rooms = buildings.iter().flat_map(|building| {
        building.floors().iter().flat_map(move |floor| {
            floor
                .rooms()
                .iter()
                .map(move |room| (building.name(), floor.floor_number(), room))
        })
    });

    for ((building, floor, room), before) in rooms.zip(previous) {
        let room = room.borrow();
        let after = room.evaluate_room_state();
        if after != *before {
            info!(
                minute,
                building,
                floor,
                room = room.room_number(),
                from = %before,
                to = %after,
                "room state changed"
            );
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;
    let sim = &cfg.simulation;

    let mut registry = TickRegistry::new();
    let buildings = persistence::load_buildings(&sim.save_file, &mut registry)
        .with_context(|| format!("failed to load {}", sim.save_file.display()))?;

    if buildings.is_empty() {
        warn!(path = %sim.save_file.display(), "save file holds no buildings");
    }
    info!(
        buildings = buildings.len(),
        timed_items = registry.len(),
        ticks = sim.ticks,
        "starting simulation"
    );

    let mut states = room_states(&buildings);
    for _ in 0..sim.ticks {
        registry.tick();
        log_state_changes(&buildings, &states, registry.elapsed_minutes());
        states = room_states(&buildings);
    }
    debug!(?registry, "simulation finished");

    if sim.report {
        let report = SimulationReport::capture(&buildings, registry.elapsed_minutes());
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(output) = &sim.output_file {
        persistence::save_buildings(output, &buildings)
            .with_context(|| format!("failed to save {}", output.display()))?;
    }

    info!(minutes = registry.elapsed_minutes(), "simulation complete");
    Ok(())
}
