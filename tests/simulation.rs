//! Tick-driven scenarios across the building model.

use std::rc::Rc;

use bms::domain::{Building, Floor, Room, RoomState, RoomType, Sensor, SharedRoom};
use bms::hazard::{HazardEvaluator, WeightingBasedHazardEvaluator};
use bms::recommender::recommend_study_room;
use bms::simulation::TickRegistry;

fn make_floor(registry: &mut TickRegistry) -> Floor {
    let mut floor = Floor::new(1, 10.0, 10.0);
    floor.add_room(Room::new(1, RoomType::Office, 20.0)).unwrap();
    floor.add_room(Room::new(2, RoomType::Study, 15.6)).unwrap();
    floor.add_room(Room::new(3, RoomType::Laboratory, 27.0)).unwrap();
    floor.add_room(Room::new(4, RoomType::Office, 20.0)).unwrap();
    floor.room_by_number(4).unwrap().borrow_mut().set_fire_drill(true);
    floor.create_maintenance_schedule(&[1, 3, 2, 4], registry).unwrap();
    floor
}

fn active_room(floor: &Floor) -> i32 {
    floor
        .maintenance_schedule()
        .unwrap()
        .borrow()
        .current_room()
        .unwrap()
        .borrow()
        .room_number()
}

fn elapsed(floor: &Floor) -> u32 {
    floor
        .maintenance_schedule()
        .unwrap()
        .borrow()
        .time_elapsed_current_room()
}

fn tick_n(registry: &mut TickRegistry, minutes: u32) {
    for _ in 0..minutes {
        registry.tick();
    }
}

#[test]
fn test_maintenance_rotation_through_floor() {
    let mut registry = TickRegistry::new();
    let floor = make_floor(&mut registry);

    tick_n(&mut registry, 12);
    assert_eq!(active_room(&floor), 1);
    assert_eq!(elapsed(&floor), 12);

    // Dwell time reached: hand over, then count the minute against room 3.
    registry.tick();
    assert_eq!(active_room(&floor), 3);
    assert_eq!(elapsed(&floor), 1);
    assert!(!floor.room_by_number(1).unwrap().borrow().maintenance_ongoing());

    tick_n(&mut registry, 19);
    assert_eq!(active_room(&floor), 2);
    assert_eq!(elapsed(&floor), 1);

    tick_n(&mut registry, 7);
    assert_eq!(active_room(&floor), 4);
    assert_eq!(elapsed(&floor), 1);
    assert_eq!(
        floor.room_by_number(4).unwrap().borrow().evaluate_room_state(),
        RoomState::Evacuate
    );

    // Room 4 is evacuating, so the rotation is frozen.
    tick_n(&mut registry, 40);
    assert_eq!(active_room(&floor), 4);
    assert_eq!(elapsed(&floor), 1);

    floor.maintenance_schedule().unwrap().borrow_mut().skip_current_maintenance();
    assert_eq!(active_room(&floor), 1);
    assert_eq!(elapsed(&floor), 0);
}

#[test]
fn test_replaced_schedule_stops_ticking() {
    let mut registry = TickRegistry::new();
    let mut floor = make_floor(&mut registry);
    let old = Rc::downgrade(floor.maintenance_schedule().unwrap());

    floor.create_maintenance_schedule(&[2, 3], &mut registry).unwrap();
    assert!(old.upgrade().is_none());

    tick_n(&mut registry, 3);
    assert_eq!(elapsed(&floor), 3);
    assert_eq!(active_room(&floor), 2);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.live_count(), 1);
}

#[test]
fn test_fire_reading_evacuates_and_freezes_maintenance() {
    let mut registry = TickRegistry::new();
    let mut floor = Floor::new(1, 10.0, 10.0);
    let lab = floor.add_room(Room::new(1, RoomType::Laboratory, 10.0)).unwrap();
    floor.add_room(Room::new(2, RoomType::Study, 10.0)).unwrap();
    lab.borrow_mut()
        .add_sensor(registry.register_sensor(Sensor::temperature(vec![22, 70, 70, 22]).unwrap()))
        .unwrap();
    floor.create_maintenance_schedule(&[1, 2], &mut registry).unwrap();

    assert_eq!(lab.borrow().evaluate_room_state(), RoomState::Maintenance);

    registry.tick();
    assert_eq!(lab.borrow().evaluate_room_state(), RoomState::Evacuate);
    registry.tick();
    assert_eq!(elapsed(&floor), 0);

    registry.tick();
    assert_eq!(lab.borrow().evaluate_room_state(), RoomState::Maintenance);
    assert_eq!(elapsed(&floor), 1);
}

#[test]
fn test_rule_based_scenarios() {
    let mut registry = TickRegistry::new();
    let mut room = Room::new(1, RoomType::Office, 20.0);
    room.add_sensor(registry.register_sensor(Sensor::temperature(vec![20, 68]).unwrap()))
        .unwrap();
    room.add_sensor(registry.register_sensor(Sensor::noise(vec![67], 3).unwrap()))
        .unwrap();
    room.set_hazard_evaluator(HazardEvaluator::rule_based(room.sensors()));
    assert_eq!(room.hazard_level(), Some(41));

    room.add_sensor(registry.register_sensor(Sensor::occupancy(vec![14], 3, 20).unwrap()))
        .unwrap();
    assert_eq!(room.hazard_level(), None);
    room.set_hazard_evaluator(HazardEvaluator::rule_based(room.sensors()));
    assert_eq!(room.hazard_level(), Some(28));

    // The temperature sensor moves to 68 and dominates.
    registry.tick();
    assert_eq!(room.hazard_level(), Some(100));
    assert_eq!(room.evaluate_room_state(), RoomState::Evacuate);
}

#[test]
fn test_weighting_based_scenario() {
    let temperature = Sensor::temperature(vec![68]).unwrap().into_shared();
    let co2 = Sensor::carbon_dioxide(vec![420], 1, 500, 100).unwrap().into_shared();
    let noise = Sensor::noise(vec![67], 3).unwrap().into_shared();
    let occupancy = Sensor::occupancy(vec![14], 3, 20).unwrap().into_shared();

    let sensors = [(temperature, 25), (co2, 25), (noise, 35), (occupancy, 15)];
    let evaluator = WeightingBasedHazardEvaluator::new(&sensors)
    .unwrap();
    assert_eq!(HazardEvaluator::WeightingBased(evaluator).evaluate_hazard_level(), 64);
}

#[test]
fn test_recommendation_avoids_maintenance() {
    let mut registry = TickRegistry::new();
    let mut ground = Floor::new(1, 10.0, 10.0);
    let quiet: SharedRoom = ground.add_room(Room::new(101, RoomType::Study, 10.0)).unwrap();
    let busy: SharedRoom = ground.add_room(Room::new(102, RoomType::Study, 10.0)).unwrap();
    quiet
        .borrow_mut()
        .add_sensor(registry.register_sensor(Sensor::noise(vec![40], 1).unwrap()))
        .unwrap();
    busy.borrow_mut()
        .add_sensor(registry.register_sensor(Sensor::noise(vec![60], 1).unwrap()))
        .unwrap();
    ground.create_maintenance_schedule(&[101, 102], &mut registry).unwrap();

    let mut building = Building::new("Library");
    building.add_floor(ground).unwrap();

    // Room 101 is under maintenance, leaving only the noisier room.
    assert_eq!(recommend_study_room(&building).unwrap().borrow().room_number(), 102);

    building
        .floor_by_number(1)
        .unwrap()
        .maintenance_schedule()
        .unwrap()
        .borrow_mut()
        .skip_current_maintenance();
    assert_eq!(recommend_study_room(&building).unwrap().borrow().room_number(), 101);
}
