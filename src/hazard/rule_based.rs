use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::domain::{Sensor, SensorKind, SharedSensor};

use super::HazardEvaluation;

/// Rule-driven hazard evaluation over every sensor in a room.
///
/// Rules, in order:
/// 1. No sensors: hazard 0.
/// 2. One sensor: that sensor's hazard.
/// 3. Any non-occupancy sensor at 100: hazard 100.
/// 4. Otherwise the mean hazard of the non-occupancy sensors, scaled by the
///    occupancy sensor's hazard as a fraction when one is present.
///
/// The room owns the sensors; the evaluator only keeps weak handles, and a
/// sensor dropped since construction no longer counts.
#[derive(Debug, Clone)]
pub struct RuleBasedHazardEvaluator {
    sensors: Vec<Weak<RefCell<Sensor>>>,
}

impl RuleBasedHazardEvaluator {
    pub fn new(sensors: &[SharedSensor]) -> Self {
        Self {
            sensors: sensors.iter().map(Rc::downgrade).collect(),
        }
    }

    /// Sensors still alive, in construction order.
    pub fn sensors(&self) -> Vec<SharedSensor> {
        self.sensors.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn sensor_kinds(&self) -> Vec<SensorKind> {
        self.sensors().iter().map(|s| s.borrow().kind()).collect()
    }
}

impl HazardEvaluation for RuleBasedHazardEvaluator {
    fn evaluate_hazard_level(&self) -> u8 {
        match self.sensors().as_slice() {
            [] => 0,
            [only] => only.borrow().hazard_level(),
            sensors => {
                let mut occupancy_factor = 1.0;
                let mut total = 0u32;
                let mut count = 0u32;

                for sensor in sensors {
                    let sensor = sensor.borrow();
                    let level = sensor.hazard_level();
                    if sensor.kind() == SensorKind::Occupancy {
                        occupancy_factor = f64::from(level) / 100.0;
                    } else if level == 100 {
                        return 100;
                    } else {
                        total += u32::from(level);
                        count += 1;
                    }
                }

                // Only reachable when every sensor is an occupancy sensor.
                if count == 0 {
                    return 0;
                }

                (f64::from(total) / f64::from(count) * occupancy_factor).round() as u8
            }
        }
    }
}
