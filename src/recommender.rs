//! Study-room recommendation.
//!
//! Walks a building from the ground floor upward looking for the most
//! comfortable open study room, climbing only while each floor improves on
//! the one below.

use crate::domain::{Building, Floor, Room, RoomState, RoomType, SharedRoom};

/// Mean comfort level of a room's sensors; 0 for a room without sensors.
pub fn average_comfort_level(room: &Room) -> f64 {
    let sensors = room.sensors();
    if sensors.is_empty() {
        return 0.0;
    }
    let total: u32 = sensors
        .iter()
        .map(|sensor| u32::from(sensor.borrow().comfort_level()))
        .sum();
    f64::from(total) / sensors.len() as f64
}

/// Recommend the open study room with the best comfort.
pub fn recommend_study_room(building: &Building) -> Option<SharedRoom> {
    if building.floors().iter().all(|floor| floor.rooms().is_empty()) {
        return None;
    }

    let mut best: Option<(SharedRoom, f64)> = None;
    for floor in building.floors() {
        let Some((room, score)) = best_on_floor(floor) else {
            break;
        };
        match &best {
            Some((_, previous)) if score <= *previous => break,
            _ => best = Some((room, score)),
        }
    }
    best.map(|(room, _)| room)
}

/// First eligible room with the highest comfort on a floor.
fn best_on_floor(floor: &Floor) -> Option<(SharedRoom, f64)> {
    let mut best: Option<(SharedRoom, f64)> = None;
    for shared in floor.rooms() {
        let room = shared.borrow();
        if room.room_type() != RoomType::Study || room.evaluate_room_state() != RoomState::Open {
            continue;
        }
        let score = average_comfort_level(&room);
        if best.as_ref().map_or(true, |(_, top)| score > *top) {
            best = Some((shared.clone(), score));
        }
    }
    best
}
