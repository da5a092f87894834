//! Room hazard evaluation strategies.
//!
//! A room carries at most one evaluator. Both strategies hold weak handles to
//! the room's sensors and read their current hazard level, so an evaluator
//! always reflects the latest tick.

mod rule_based;
mod weighting;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::{SensorKind, SharedSensor};

pub use rule_based::RuleBasedHazardEvaluator;
pub use weighting::WeightingBasedHazardEvaluator;

/// Common seam for hazard strategies.
pub trait HazardEvaluation {
    /// Overall room hazard, 0 (safe) to 100 (maximal).
    fn evaluate_hazard_level(&self) -> u8;
}

/// Encoded evaluator tag as it appears on a room record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum EvaluatorKind {
    RuleBased,
    WeightingBased,
}

/// The evaluator attached to a room.
#[derive(Debug, Clone)]
pub enum HazardEvaluator {
    RuleBased(RuleBasedHazardEvaluator),
    WeightingBased(WeightingBasedHazardEvaluator),
}

impl HazardEvaluator {
    pub fn rule_based(sensors: &[SharedSensor]) -> Self {
        HazardEvaluator::RuleBased(RuleBasedHazardEvaluator::new(sensors))
    }

    pub fn kind(&self) -> EvaluatorKind {
        match self {
            HazardEvaluator::RuleBased(_) => EvaluatorKind::RuleBased,
            HazardEvaluator::WeightingBased(_) => EvaluatorKind::WeightingBased,
        }
    }

    pub fn evaluate_hazard_level(&self) -> u8 {
        match self {
            HazardEvaluator::RuleBased(evaluator) => evaluator.evaluate_hazard_level(),
            HazardEvaluator::WeightingBased(evaluator) => evaluator.evaluate_hazard_level(),
        }
    }

    /// Weight assigned to a sensor kind; only weighting evaluators have any.
    pub fn weight_for(&self, kind: SensorKind) -> Option<u8> {
        match self {
            HazardEvaluator::RuleBased(_) => None,
            HazardEvaluator::WeightingBased(evaluator) => evaluator.weight_for(kind),
        }
    }
}

impl PartialEq for HazardEvaluator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HazardEvaluator::RuleBased(a), HazardEvaluator::RuleBased(b)) => {
                a.sensor_kinds() == b.sensor_kinds()
            }
            (HazardEvaluator::WeightingBased(a), HazardEvaluator::WeightingBased(b)) => {
                a.weightings().eq(b.weightings())
            }
            _ => false,
        }
    }
}

impl fmt::Display for HazardEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}
