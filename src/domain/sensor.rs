//! # Timed Sensors
//!
//! Every sensor replays a fixed, non-empty sequence of integer readings. The
//! sequence advances one step every `update_frequency` simulated minutes and
//! wraps back to the first reading after the last one.
//!
//! Four kinds exist, each mapping its current reading onto a 0-100 hazard
//! score and a 0-100 comfort score:
//!
//! | Kind | Hazard | Comfort |
//! |------|--------|---------|
//! | Temperature | 100 at or above 68°, else 0 | 100 inside 20-26°, -20 per degree outside |
//! | Carbon dioxide | 0 / 25 / 50 / 100 banded at 1000, 2000, 5000 ppm | linear falloff inside ideal ± variation |
//! | Noise | relative loudness `2^((dB-70)/10)` as a percentage | inverse of relative loudness |
//! | Occupancy | occupancy as a percentage of capacity | free capacity as a percentage |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use strum::{Display, EnumIter, EnumString};

use crate::error::BmsError;
use crate::simulation::TimedItem;

/// A sensor owned by its room. Hazard evaluators and the tick registry only
/// hold weak handles to it.
pub type SharedSensor = Rc<RefCell<Sensor>>;

/// Closed set of sensor kinds.
///
/// The derived ordering is the deterministic order in which a room keeps its
/// sensors (alphabetical by encoded name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
pub enum SensorKind {
    #[strum(serialize = "CarbonDioxideSensor")]
    CarbonDioxide,
    #[strum(serialize = "NoiseSensor")]
    Noise,
    #[strum(serialize = "OccupancySensor")]
    Occupancy,
    #[strum(serialize = "TemperatureSensor")]
    Temperature,
}

/// Readings at or above this temperature are treated as a fire.
pub const TEMPERATURE_FIRE_THRESHOLD: i32 = 68;
const TEMPERATURE_COMFORT_MIN: i32 = 20;
const TEMPERATURE_COMFORT_MAX: i32 = 26;
const NOISE_REFERENCE_DB: f64 = 70.0;

/// Cyclic reading sequence shared by all sensor kinds.
#[derive(Debug, Clone)]
pub struct SensorTimeline {
    readings: Vec<i32>,
    update_frequency: u32,
    time_elapsed: u64,
    current_index: usize,
}

impl SensorTimeline {
    pub const MIN_UPDATE_FREQUENCY: i32 = 1;
    pub const MAX_UPDATE_FREQUENCY: i32 = 5;

    /// Create a timeline positioned at the first reading.
    pub fn new(readings: Vec<i32>, update_frequency: i32) -> Result<Self, BmsError> {
        if readings.is_empty() {
            return Err(BmsError::invalid("sensor readings must not be empty"));
        }
        if let Some(negative) = readings.iter().find(|r| **r < 0) {
            return Err(BmsError::invalid(format!(
                "sensor reading {negative} is negative"
            )));
        }
        if !(Self::MIN_UPDATE_FREQUENCY..=Self::MAX_UPDATE_FREQUENCY).contains(&update_frequency) {
            return Err(BmsError::invalid(format!(
                "update frequency {update_frequency} outside {}..={}",
                Self::MIN_UPDATE_FREQUENCY,
                Self::MAX_UPDATE_FREQUENCY
            )));
        }

        Ok(Self {
            readings,
            update_frequency: update_frequency as u32,
            time_elapsed: 0,
            current_index: 0,
        })
    }

    pub fn current_reading(&self) -> i32 {
        self.readings[self.current_index]
    }

    pub fn readings(&self) -> &[i32] {
        &self.readings
    }

    pub fn update_frequency(&self) -> u32 {
        self.update_frequency
    }

    pub fn time_elapsed(&self) -> u64 {
        self.time_elapsed
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Advance by one simulated minute, stepping the reading index whenever
    /// the elapsed time is a multiple of the update frequency.
    pub fn elapse_one_minute(&mut self) {
        self.time_elapsed += 1;
        if self.time_elapsed % u64::from(self.update_frequency) == 0 {
            self.current_index = (self.current_index + 1) % self.readings.len();
        }
    }
}

impl PartialEq for SensorTimeline {
    fn eq(&self, other: &Self) -> bool {
        self.readings == other.readings && self.update_frequency == other.update_frequency
    }
}

/// Kind-specific sensor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorVariant {
    CarbonDioxide { ideal_value: i32, variation_limit: i32 },
    Noise,
    Occupancy { capacity: i32 },
    Temperature,
}

impl SensorVariant {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorVariant::CarbonDioxide { .. } => SensorKind::CarbonDioxide,
            SensorVariant::Noise => SensorKind::Noise,
            SensorVariant::Occupancy { .. } => SensorKind::Occupancy,
            SensorVariant::Temperature => SensorKind::Temperature,
        }
    }
}

/// A timed environmental sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    timeline: SensorTimeline,
    variant: SensorVariant,
}

impl Sensor {
    /// Carbon dioxide sensor measuring ppm against an ideal value.
    pub fn carbon_dioxide(
        readings: Vec<i32>,
        update_frequency: i32,
        ideal_value: i32,
        variation_limit: i32,
    ) -> Result<Self, BmsError> {
        let timeline = SensorTimeline::new(readings, update_frequency)?;
        if ideal_value <= 0 || variation_limit <= 0 || ideal_value - variation_limit < 0 {
            return Err(BmsError::invalid(format!(
                "carbon dioxide ideal value {ideal_value} and variation limit {variation_limit} must be positive with ideal >= variation"
            )));
        }
        Ok(Self {
            timeline,
            variant: SensorVariant::CarbonDioxide {
                ideal_value,
                variation_limit,
            },
        })
    }

    /// Noise sensor measuring decibels.
    pub fn noise(readings: Vec<i32>, update_frequency: i32) -> Result<Self, BmsError> {
        Ok(Self {
            timeline: SensorTimeline::new(readings, update_frequency)?,
            variant: SensorVariant::Noise,
        })
    }

    /// Occupancy sensor counting people against a room capacity.
    pub fn occupancy(
        readings: Vec<i32>,
        update_frequency: i32,
        capacity: i32,
    ) -> Result<Self, BmsError> {
        let timeline = SensorTimeline::new(readings, update_frequency)?;
        if capacity < 0 {
            return Err(BmsError::invalid(format!(
                "occupancy capacity {capacity} is negative"
            )));
        }
        Ok(Self {
            timeline,
            variant: SensorVariant::Occupancy { capacity },
        })
    }

    /// Temperature sensor in degrees; always updates every minute.
    pub fn temperature(readings: Vec<i32>) -> Result<Self, BmsError> {
        Ok(Self {
            timeline: SensorTimeline::new(readings, 1)?,
            variant: SensorVariant::Temperature,
        })
    }

    pub fn kind(&self) -> SensorKind {
        self.variant.kind()
    }

    pub fn variant(&self) -> &SensorVariant {
        &self.variant
    }

    pub fn timeline(&self) -> &SensorTimeline {
        &self.timeline
    }

    pub fn current_reading(&self) -> i32 {
        self.timeline.current_reading()
    }

    pub fn update_frequency(&self) -> u32 {
        self.timeline.update_frequency()
    }

    /// Relative loudness of the current reading against 70dB.
    pub fn relative_loudness(&self) -> f64 {
        2f64.powf((f64::from(self.current_reading()) - NOISE_REFERENCE_DB) / 10.0)
    }

    /// Hazard score of the current reading, 0 (safe) to 100 (maximal).
    pub fn hazard_level(&self) -> u8 {
        let reading = self.current_reading();
        match self.variant {
            SensorVariant::Temperature => {
                if reading >= TEMPERATURE_FIRE_THRESHOLD {
                    100
                } else {
                    0
                }
            }
            SensorVariant::CarbonDioxide { .. } => match reading {
                0..=999 => 0,
                1000..=1999 => 25,
                2000..=4999 => 50,
                _ => 100,
            },
            SensorVariant::Noise => (self.relative_loudness() * 100.0).floor().min(100.0) as u8,
            SensorVariant::Occupancy { capacity } => {
                if capacity == 0 {
                    // Any occupant of a zero-capacity room is over capacity.
                    return if reading > 0 { 100 } else { 0 };
                }
                let percent = (f64::from(reading) / f64::from(capacity) * 100.0).round();
                percent.min(100.0) as u8
            }
        }
    }

    /// Comfort score of the current reading, 0 (uncomfortable) to 100.
    pub fn comfort_level(&self) -> u8 {
        let reading = self.current_reading();
        match self.variant {
            SensorVariant::Temperature => {
                let distance = if reading < TEMPERATURE_COMFORT_MIN {
                    TEMPERATURE_COMFORT_MIN - reading
                } else if reading > TEMPERATURE_COMFORT_MAX {
                    reading - TEMPERATURE_COMFORT_MAX
                } else {
                    0
                };
                (100 - 20 * distance.min(5)) as u8
            }
            SensorVariant::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => {
                let deviation = (reading - ideal_value).abs();
                if deviation > variation_limit {
                    return 0;
                }
                ((1.0 - f64::from(deviation) / f64::from(variation_limit)) * 100.0).round() as u8
            }
            SensorVariant::Noise => (100.0 - self.relative_loudness() * 100.0).max(0.0).trunc() as u8,
            SensorVariant::Occupancy { capacity } => {
                if capacity == 0 || reading > capacity {
                    return 0;
                }
                (f64::from(capacity - reading) / f64::from(capacity) * 100.0).round() as u8
            }
        }
    }

    /// Encoded save-file record, without any evaluator weighting suffix.
    pub fn encode(&self) -> String {
        let readings = self.timeline.readings().iter().join(",");
        let kind = self.kind();
        let frequency = self.update_frequency();
        match self.variant {
            SensorVariant::Temperature => format!("{kind}:{readings}"),
            SensorVariant::Noise => format!("{kind}:{readings}:{frequency}"),
            SensorVariant::Occupancy { capacity } => {
                format!("{kind}:{readings}:{frequency}:{capacity}")
            }
            SensorVariant::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => format!("{kind}:{readings}:{frequency}:{ideal_value}:{variation_limit}"),
        }
    }

    /// Move this sensor into shared ownership without registering it for ticks.
    pub fn into_shared(self) -> SharedSensor {
        Rc::new(RefCell::new(self))
    }
}

impl TimedItem for Sensor {
    fn elapse_one_minute(&mut self) {
        self.timeline.elapse_one_minute();
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimedSensor: freq={}, readings={}, type={}",
            self.update_frequency(),
            self.timeline.readings().iter().join(","),
            self.kind()
        )?;
        match self.variant {
            SensorVariant::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => write!(f, ", idealPPM={ideal_value}, varLimit={variation_limit}"),
            SensorVariant::Occupancy { capacity } => write!(f, ", capacity={capacity}"),
            SensorVariant::Noise | SensorVariant::Temperature => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_timeline_starts_at_first_reading() {
        let timeline = SensorTimeline::new(vec![5, 6, 7], 2).unwrap();
        assert_eq!(timeline.current_reading(), 5);
        assert_eq!(timeline.time_elapsed(), 0);
        assert_eq!(timeline.current_index(), 0);
    }

    #[test]
    fn test_timeline_advances_on_cadence_and_wraps() {
        let mut timeline = SensorTimeline::new(vec![1, 2, 3], 2).unwrap();
        let mut seen = Vec::new();
        for _ in 0..7 {
            timeline.elapse_one_minute();
            seen.push(timeline.current_reading());
        }
        assert_eq!(seen, vec![1, 2, 2, 3, 3, 1, 1]);
    }

    #[rstest]
    #[case::empty(vec![], 1)]
    #[case::negative_reading(vec![4, -1], 1)]
    #[case::frequency_zero(vec![4], 0)]
    #[case::frequency_six(vec![4], 6)]
    fn test_timeline_rejects_bad_configuration(#[case] readings: Vec<i32>, #[case] frequency: i32) {
        assert!(matches!(
            SensorTimeline::new(readings, frequency),
            Err(BmsError::InvalidConfiguration(_))
        ));
    }

    #[rstest]
    #[case::zero_ideal(0, 10)]
    #[case::zero_variation(500, 0)]
    #[case::variation_above_ideal(100, 150)]
    fn test_carbon_dioxide_rejects_bad_limits(#[case] ideal: i32, #[case] variation: i32) {
        assert!(Sensor::carbon_dioxide(vec![400], 1, ideal, variation).is_err());
    }

    #[test]
    fn test_occupancy_rejects_negative_capacity() {
        assert!(Sensor::occupancy(vec![1], 1, -1).is_err());
        assert!(Sensor::occupancy(vec![1], 1, 0).is_ok());
    }

    #[rstest]
    #[case(vec![67], 0)]
    #[case(vec![68], 100)]
    #[case(vec![90], 100)]
    fn test_temperature_hazard(#[case] readings: Vec<i32>, #[case] expected: u8) {
        assert_eq!(Sensor::temperature(readings).unwrap().hazard_level(), expected);
    }

    #[rstest]
    #[case(420, 0)]
    #[case(999, 0)]
    #[case(1000, 25)]
    #[case(1999, 25)]
    #[case(2000, 50)]
    #[case(4999, 50)]
    #[case(5000, 100)]
    fn test_carbon_dioxide_hazard_bands(#[case] reading: i32, #[case] expected: u8) {
        let sensor = Sensor::carbon_dioxide(vec![reading], 2, 500, 100).unwrap();
        assert_eq!(sensor.hazard_level(), expected);
    }

    #[test]
    fn test_noise_hazard_uses_relative_loudness() {
        assert_eq!(Sensor::noise(vec![67], 3).unwrap().hazard_level(), 81);
        assert_eq!(Sensor::noise(vec![70], 3).unwrap().hazard_level(), 100);
        assert_eq!(Sensor::noise(vec![82], 3).unwrap().hazard_level(), 100);
        assert_eq!(Sensor::noise(vec![55], 3).unwrap().hazard_level(), 35);
    }

    #[test]
    fn test_occupancy_hazard() {
        assert_eq!(Sensor::occupancy(vec![14], 3, 20).unwrap().hazard_level(), 70);
        assert_eq!(Sensor::occupancy(vec![25], 3, 20).unwrap().hazard_level(), 100);
        assert_eq!(Sensor::occupancy(vec![0], 3, 0).unwrap().hazard_level(), 0);
        assert_eq!(Sensor::occupancy(vec![3], 3, 0).unwrap().hazard_level(), 100);
    }

    #[rstest]
    #[case(23, 100)]
    #[case(27, 80)]
    #[case(18, 60)]
    #[case(14, 0)]
    #[case(31, 0)]
    fn test_temperature_comfort(#[case] reading: i32, #[case] expected: u8) {
        let sensor = Sensor::temperature(vec![reading, 68, 30]).unwrap();
        assert_eq!(sensor.comfort_level(), expected);
    }

    #[test]
    fn test_comfort_levels_per_kind() {
        assert_eq!(Sensor::noise(vec![82, 2, 3], 3).unwrap().comfort_level(), 0);
        assert_eq!(Sensor::noise(vec![67, 2, 3], 3).unwrap().comfort_level(), 18);
        assert_eq!(Sensor::occupancy(vec![14, 1, 3], 3, 20).unwrap().comfort_level(), 30);
        assert_eq!(Sensor::occupancy(vec![17, 1, 3], 3, 15).unwrap().comfort_level(), 0);
        let co2 = Sensor::carbon_dioxide(vec![420, 1001, 2001, 5000], 2, 500, 100).unwrap();
        assert_eq!(co2.comfort_level(), 20);
    }

    #[test]
    fn test_encode_records() {
        assert_eq!(
            Sensor::temperature(vec![23, 68, 30]).unwrap().encode(),
            "TemperatureSensor:23,68,30"
        );
        assert_eq!(
            Sensor::noise(vec![82, 2, 3], 3).unwrap().encode(),
            "NoiseSensor:82,2,3:3"
        );
        assert_eq!(
            Sensor::occupancy(vec![14, 1, 3], 3, 20).unwrap().encode(),
            "OccupancySensor:14,1,3:3:20"
        );
        assert_eq!(
            Sensor::carbon_dioxide(vec![420, 1001, 2001, 5000], 2, 500, 100)
                .unwrap()
                .encode(),
            "CarbonDioxideSensor:420,1001,2001,5000:2:500:100"
        );
    }

    #[test]
    fn test_display() {
        let sensor = Sensor::occupancy(vec![14, 1], 3, 20).unwrap();
        assert_eq!(
            sensor.to_string(),
            "TimedSensor: freq=3, readings=14,1, type=OccupancySensor, capacity=20"
        );
    }

    #[test]
    fn test_kind_ordering_is_alphabetical_by_name() {
        use strum::IntoEnumIterator;
        let names: Vec<String> = SensorKind::iter().map(|k| k.to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_equality_ignores_position() {
        let mut a = Sensor::noise(vec![50, 60], 1).unwrap();
        let b = Sensor::noise(vec![50, 60], 1).unwrap();
        a.elapse_one_minute();
        assert_eq!(a, b);
        assert_ne!(a, Sensor::noise(vec![50, 60], 2).unwrap());
    }

    proptest! {
        #[test]
        fn prop_index_follows_cadence(
            readings in prop::collection::vec(0i32..10_000, 1..12),
            frequency in 1i32..=5,
            minutes in 0u64..500,
        ) {
            let mut timeline = SensorTimeline::new(readings.clone(), frequency).unwrap();
            for _ in 0..minutes {
                timeline.elapse_one_minute();
            }
            let expected = (minutes / frequency as u64) as usize % readings.len();
            prop_assert_eq!(timeline.current_index(), expected);
            prop_assert_eq!(timeline.current_reading(), readings[expected]);
        }

        #[test]
        fn prop_scores_stay_in_range(reading in 0i32..100_000, capacity in 0i32..500) {
            let sensors = [
                Sensor::temperature(vec![reading]).unwrap(),
                Sensor::noise(vec![reading], 1).unwrap(),
                Sensor::occupancy(vec![reading], 1, capacity).unwrap(),
                Sensor::carbon_dioxide(vec![reading], 1, 700, 150).unwrap(),
            ];
            for sensor in &sensors {
                prop_assert!(sensor.hazard_level() <= 100);
                prop_assert!(sensor.comfort_level() <= 100);
            }
        }
    }
}
