use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::{round_to_cents, SensorKind, SharedSensor};
use crate::error::BmsError;
use crate::hazard::HazardEvaluator;

/// A room shared between its floor and the floor's maintenance schedule.
pub type SharedRoom = Rc<RefCell<Room>>;

/// Purpose of a room; drives maintenance duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Study,
    Office,
    Laboratory,
}

impl RoomType {
    /// Multiplier applied to the base maintenance time of a room.
    pub fn maintenance_multiplier(&self) -> f64 {
        match self {
            RoomType::Study => 1.0,
            RoomType::Office => 1.5,
            RoomType::Laboratory => 2.0,
        }
    }
}

/// Operational mode of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomState {
    Open,
    Evacuate,
    Maintenance,
    /// Part of the state vocabulary; room state resolution never yields it.
    Error,
}

/// A room on a floor.
#[derive(Debug)]
pub struct Room {
    room_number: i32,
    room_type: RoomType,
    area: f64,
    fire_drill: bool,
    maintenance: bool,
    sensors: Vec<SharedSensor>,
    hazard_evaluator: Option<HazardEvaluator>,
}

impl Room {
    /// Minimum area of any room, in square metres.
    pub const MIN_AREA: f64 = 5.0;

    pub fn new(room_number: i32, room_type: RoomType, area: f64) -> Self {
        Self {
            room_number,
            room_type,
            area: round_to_cents(area),
            fire_drill: false,
            maintenance: false,
            sensors: Vec::new(),
            hazard_evaluator: None,
        }
    }

    pub fn room_number(&self) -> i32 {
        self.room_number
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn fire_drill_ongoing(&self) -> bool {
        self.fire_drill
    }

    pub fn maintenance_ongoing(&self) -> bool {
        self.maintenance
    }

    pub fn set_fire_drill(&mut self, fire_drill: bool) {
        self.fire_drill = fire_drill;
    }

    pub fn set_maintenance(&mut self, maintenance: bool) {
        self.maintenance = maintenance;
    }

    /// Sensors in kind order.
    pub fn sensors(&self) -> &[SharedSensor] {
        &self.sensors
    }

    pub fn sensor(&self, kind: SensorKind) -> Option<&SharedSensor> {
        self.sensors.iter().find(|s| s.borrow().kind() == kind)
    }

    /// Add a sensor, keeping kind order.
    ///
    /// Any hazard evaluator is dropped since it no longer covers every sensor
    /// in the room.
    pub fn add_sensor(&mut self, sensor: SharedSensor) -> Result<(), BmsError> {
        let kind = sensor.borrow().kind();
        if self.sensor(kind).is_some() {
            return Err(BmsError::DuplicateSensor(kind));
        }
        let position = self
            .sensors
            .partition_point(|existing| existing.borrow().kind() < kind);
        self.sensors.insert(position, sensor);
        self.hazard_evaluator = None;
        Ok(())
    }

    pub fn hazard_evaluator(&self) -> Option<&HazardEvaluator> {
        self.hazard_evaluator.as_ref()
    }

    pub fn set_hazard_evaluator(&mut self, evaluator: HazardEvaluator) {
        self.hazard_evaluator = Some(evaluator);
    }

    pub fn clear_hazard_evaluator(&mut self) {
        self.hazard_evaluator = None;
    }

    /// Hazard level from the room's evaluator, if one is configured.
    pub fn hazard_level(&self) -> Option<u8> {
        self.hazard_evaluator
            .as_ref()
            .map(HazardEvaluator::evaluate_hazard_level)
    }

    /// Resolve the room's state: a fire reading or a fire drill evacuates,
    /// then maintenance, otherwise open.
    pub fn evaluate_room_state(&self) -> RoomState {
        let on_fire = self
            .sensor(SensorKind::Temperature)
            .is_some_and(|s| s.borrow().hazard_level() == 100);

        if on_fire || self.fire_drill {
            RoomState::Evacuate
        } else if self.maintenance {
            RoomState::Maintenance
        } else {
            RoomState::Open
        }
    }

    /// Encoded room header followed by one record per sensor.
    pub fn encode(&self) -> String {
        let mut header = format!(
            "{}:{}:{:.2}:{}",
            self.room_number,
            self.room_type,
            self.area,
            self.sensors.len()
        );
        if let Some(evaluator) = &self.hazard_evaluator {
            header.push_str(&format!(":{}", evaluator.kind()));
        }

        let mut lines = vec![header];
        for sensor in &self.sensors {
            let sensor = sensor.borrow();
            let mut record = sensor.encode();
            if let Some(HazardEvaluator::WeightingBased(weighting)) = &self.hazard_evaluator {
                if let Some(weight) = weighting.weight_for(sensor.kind()) {
                    record.push_str(&format!("@{weight}"));
                }
            }
            lines.push(record);
        }
        lines.join("\n")
    }

    pub fn into_shared(self) -> SharedRoom {
        Rc::new(RefCell::new(self))
    }
}

impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        self.room_number == other.room_number
            && self.room_type == other.room_type
            && (self.area - other.area).abs() <= 0.001
            && self.sensors == other.sensors
            && self.hazard_evaluator == other.hazard_evaluator
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Room #{}: type={}, area={:.2}m^2, sensors={}",
            self.room_number,
            self.room_type,
            self.area,
            self.sensors.len()
        )
    }
}
