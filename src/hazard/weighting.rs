use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::domain::{Sensor, SensorKind, SharedSensor};
use crate::error::BmsError;

use super::HazardEvaluation;

const TOTAL_WEIGHT: i32 = 100;

#[derive(Debug, Clone)]
struct WeightedSensor {
    sensor: Weak<RefCell<Sensor>>,
    weight: u8,
}

/// Weighted mean of sensor hazards.
///
/// Weights are percentages keyed by sensor kind and must sum to exactly 100.
/// Sensors are held weakly; one dropped by its room contributes nothing.
#[derive(Debug, Clone)]
pub struct WeightingBasedHazardEvaluator {
    weightings: BTreeMap<SensorKind, WeightedSensor>,
}

impl WeightingBasedHazardEvaluator {
    pub fn new(weightings: &[(SharedSensor, i32)]) -> Result<Self, BmsError> {
        let mut by_kind = BTreeMap::new();
        let mut total = 0;

        for (sensor, weight) in weightings {
            let weight = *weight;
            let kind = sensor.borrow().kind();
            if !(0..=TOTAL_WEIGHT).contains(&weight) {
                return Err(BmsError::invalid(format!(
                    "weight {weight} for {kind} outside 0..={TOTAL_WEIGHT}"
                )));
            }
            if by_kind.contains_key(&kind) {
                return Err(BmsError::invalid(format!("{kind} weighted more than once")));
            }
            total += weight;
            by_kind.insert(
                kind,
                WeightedSensor {
                    sensor: Rc::downgrade(sensor),
                    weight: weight as u8,
                },
            );
        }

        if total != TOTAL_WEIGHT {
            return Err(BmsError::invalid(format!(
                "weights sum to {total}, expected {TOTAL_WEIGHT}"
            )));
        }

        Ok(Self {
            weightings: by_kind,
        })
    }

    pub fn weight_for(&self, kind: SensorKind) -> Option<u8> {
        self.weightings.get(&kind).map(|w| w.weight)
    }

    /// Weights in sensor kind order.
    pub fn weightings(&self) -> impl Iterator<Item = (SensorKind, u8)> + '_ {
        self.weightings.iter().map(|(kind, w)| (*kind, w.weight))
    }

    /// Weighted sensors still alive, in sensor kind order.
    pub fn sensors(&self) -> Vec<SharedSensor> {
        self.weightings
            .values()
            .filter_map(|w| w.sensor.upgrade())
            .collect()
    }
}

impl HazardEvaluation for WeightingBasedHazardEvaluator {
    fn evaluate_hazard_level(&self) -> u8 {
        let weighted: f64 = self
            .weightings
            .values()
            .filter_map(|w| w.sensor.upgrade().map(|sensor| (sensor, w.weight)))
            .map(|(sensor, weight)| {
                f64::from(sensor.borrow().hazard_level()) * f64::from(weight) / 100.0
            })
            .sum();
        weighted.round() as u8
    }
}
