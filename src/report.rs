//! Serialisable snapshot of a simulated model.

use std::rc::Rc;

use serde::Serialize;

use crate::domain::{Building, Floor, Room, RoomState, RoomType};
use crate::hazard::EvaluatorKind;
use crate::recommender::{average_comfort_level, recommend_study_room};

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub elapsed_minutes: u64,
    pub buildings: Vec<BuildingReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingReport {
    pub name: String,
    pub recommended_study_room: Option<RoomLocation>,
    pub floors: Vec<FloorReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomLocation {
    pub floor_number: i32,
    pub room_number: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloorReport {
    pub floor_number: i32,
    pub maintenance: Option<MaintenanceReport>,
    pub rooms: Vec<RoomReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceReport {
    pub current_room: Option<i32>,
    pub elapsed_minutes: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomReport {
    pub room_number: i32,
    pub room_type: RoomType,
    pub state: RoomState,
    pub hazard_evaluator: Option<EvaluatorKind>,
    pub hazard_level: Option<u8>,
    pub average_comfort: f64,
}

impl SimulationReport {
    pub fn capture(buildings: &[Building], elapsed_minutes: u64) -> Self {
        Self {
            elapsed_minutes,
            buildings: buildings.iter().map(BuildingReport::capture).collect(),
        }
    }
}

impl BuildingReport {
    fn capture(building: &Building) -> Self {
        let recommended_study_room = recommend_study_room(building).and_then(|room| {
            building.floors().iter().find_map(|floor| {
                floor
                    .rooms()
                    .iter()
                    .any(|candidate| Rc::ptr_eq(candidate, &room))
                    .then(|| RoomLocation {
                        floor_number: floor.floor_number(),
                        room_number: room.borrow().room_number(),
                    })
            })
        });

        Self {
            name: building.name().to_owned(),
            recommended_study_room,
            floors: building.floors().iter().map(FloorReport::capture).collect(),
        }
    }
}

impl FloorReport {
    fn capture(floor: &Floor) -> Self {
        let maintenance = floor.maintenance_schedule().map(|schedule| {
            let schedule = schedule.borrow();
            MaintenanceReport {
                current_room: schedule
                    .current_room()
                    .map(|room| room.borrow().room_number()),
                elapsed_minutes: schedule.time_elapsed_current_room(),
            }
        });

        Self {
            floor_number: floor.floor_number(),
            maintenance,
            rooms: floor
                .rooms()
                .iter()
                .map(|room| RoomReport::capture(&room.borrow()))
                .collect(),
        }
    }
}

impl RoomReport {
    fn capture(room: &Room) -> Self {
        Self {
            room_number: room.room_number(),
            room_type: room.room_type(),
            state: room.evaluate_room_state(),
            hazard_evaluator: room.hazard_evaluator().map(|evaluator| evaluator.kind()),
            hazard_level: room.hazard_level(),
            average_comfort: average_comfort_level(room),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sensor;
    use crate::hazard::HazardEvaluator;
    use crate::simulation::TickRegistry;

    fn make_building(registry: &mut TickRegistry) -> Building {
        let mut floor = Floor::new(1, 10.0, 10.0);
        let study = floor.add_room(Room::new(101, RoomType::Study, 20.0)).unwrap();
        floor.add_room(Room::new(102, RoomType::Office, 20.0)).unwrap();
        {
            let mut study = study.borrow_mut();
            study
                .add_sensor(registry.register_sensor(Sensor::temperature(vec![23]).unwrap()))
                .unwrap();
            let evaluator = HazardEvaluator::rule_based(study.sensors());
            study.set_hazard_evaluator(evaluator);
        }
        floor.create_maintenance_schedule(&[102, 101], registry).unwrap();

        let mut building = Building::new("Library");
        building.add_floor(floor).unwrap();
        building
    }

    #[test]
    fn test_capture_snapshot() {
        let mut registry = TickRegistry::new();
        let building = make_building(&mut registry);
        registry.tick();

        let report = SimulationReport::capture(std::slice::from_ref(&building), registry.elapsed_minutes());
        assert_eq!(report.elapsed_minutes, 1);

        let building = &report.buildings[0];
        assert_eq!(
            building.recommended_study_room,
            Some(RoomLocation {
                floor_number: 1,
                room_number: 101
            })
        );
        let floor = &building.floors[0];
        let maintenance = floor.maintenance.as_ref().unwrap();
        assert_eq!(maintenance.current_room, Some(102));
        assert_eq!(maintenance.elapsed_minutes, 1);

        assert_eq!(floor.rooms[0].state, RoomState::Open);
        assert_eq!(floor.rooms[0].hazard_level, Some(0));
        assert_eq!(floor.rooms[0].average_comfort, 100.0);
        assert_eq!(floor.rooms[1].state, RoomState::Maintenance);
        assert_eq!(floor.rooms[1].hazard_evaluator, None);
    }

    #[test]
    fn test_serialises_to_json() {
        let mut registry = TickRegistry::new();
        let building = make_building(&mut registry);
        let report = SimulationReport::capture(std::slice::from_ref(&building), 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["buildings"][0]["name"], "Library");
        assert_eq!(json["buildings"][0]["floors"][0]["rooms"][0]["room_type"], "STUDY");
        assert_eq!(json["buildings"][0]["floors"][0]["rooms"][1]["state"], "MAINTENANCE");
        assert_eq!(json["buildings"][0]["floors"][0]["rooms"][0]["hazard_evaluator"], "RuleBased");
    }
}
