use std::str::FromStr;

use tracing::debug;

use crate::domain::{Building, Floor, Room, RoomType, Sensor, SensorKind};
use crate::hazard::{EvaluatorKind, HazardEvaluator, WeightingBasedHazardEvaluator};
use crate::simulation::TickRegistry;

use super::FormatError;

/// A decoded sensor record and the weight it carried, if any.
struct SensorRecord {
    sensor: Sensor,
    weight: Option<i32>,
}

/// Decode every building in `lines`, registering timed items with a fresh
/// registry that is handed back alongside the model.
pub(super) fn decode(lines: &[String]) -> Result<(Vec<Building>, TickRegistry), FormatError> {
    if let Some(blank) = lines.iter().position(|line| line.is_empty()) {
        return Err(FormatError::new(blank + 1, "blank line"));
    }

    let mut decoder = Decoder {
        lines,
        position: 0,
        registry: TickRegistry::new(),
    };
    let mut buildings = Vec::new();
    while decoder.position < lines.len() {
        buildings.push(decoder.building()?);
    }
    debug!(
        buildings = buildings.len(),
        timed_items = decoder.registry.len(),
        "decoded save file"
    );
    Ok((buildings, decoder.registry))
}

struct Decoder<'a> {
    lines: &'a [String],
    position: usize,
    registry: TickRegistry,
}

impl<'a> Decoder<'a> {
    /// Next line and its 1-based number.
    fn next_line(&mut self, expected: &str) -> Result<(usize, &'a str), FormatError> {
        let line = self.lines.get(self.position).ok_or_else(|| {
            FormatError::new(
                self.lines.len() + 1,
                format!("unexpected end of file, expected {expected}"),
            )
        })?;
        self.position += 1;
        Ok((self.position, line.as_str()))
    }

    fn building(&mut self) -> Result<Building, FormatError> {
        let (_, name) = self.next_line("building name")?;
        let (count_line, count) = self.next_line("floor count")?;
        let floor_count: usize = parse_count(count_line, count, "floor count")?;

        let mut building = Building::new(name);
        for _ in 0..floor_count {
            let (floor_line, floor) = self.floor()?;
            building
                .add_floor(floor)
                .map_err(|e| FormatError::from_domain(floor_line, e))?;
        }
        Ok(building)
    }

    fn floor(&mut self) -> Result<(usize, Floor), FormatError> {
        let (line_no, line) = self.next_line("floor record")?;
        let fields = split_fields(line_no, line, 3..=4, "floor record")?;

        let floor_number: i32 = parse_number(line_no, fields[0], "floor number")?;
        let width = parse_dimension(line_no, fields[1], "floor width")?;
        let length = parse_dimension(line_no, fields[2], "floor length")?;
        let room_count = parse_count(line_no, fields[3], "room count")?;
        let maintenance_order = fields
            .get(4)
            .map(|order| parse_order(line_no, order))
            .transpose()?;

        let mut floor = Floor::new(floor_number, width, length);
        for _ in 0..room_count {
            let (room_line, room) = self.room()?;
            floor
                .add_room(room)
                .map_err(|e| FormatError::from_domain(room_line, e))?;
        }

        if let Some(order) = maintenance_order {
            floor
                .create_maintenance_schedule(&order, &mut self.registry)
                .map_err(|e| FormatError::from_domain(line_no, e))?;
        }
        Ok((line_no, floor))
    }

    fn room(&mut self) -> Result<(usize, Room), FormatError> {
        let (line_no, line) = self.next_line("room record")?;
        let fields = split_fields(line_no, line, 3..=4, "room record")?;

        let room_number: i32 = parse_number(line_no, fields[0], "room number")?;
        let room_type = RoomType::from_str(fields[1])
            .map_err(|_| FormatError::new(line_no, format!("unknown room type {:?}", fields[1])))?;
        let area = parse_dimension(line_no, fields[2], "room area")?;
        let sensor_count = parse_count(line_no, fields[3], "sensor count")?;
        let evaluator_kind = fields
            .get(4)
            .map(|tag| {
                EvaluatorKind::from_str(tag).map_err(|_| {
                    FormatError::new(line_no, format!("unknown hazard evaluator {tag:?}"))
                })
            })
            .transpose()?;

        let mut room = Room::new(room_number, room_type, area);
        let mut weightings = Vec::new();
        for _ in 0..sensor_count {
            let (sensor_line, record) = self.sensor()?;
            let sensor = self.registry.register_sensor(record.sensor);
            room.add_sensor(sensor.clone())
                .map_err(|e| FormatError::from_domain(sensor_line, e))?;
            if let Some(weight) = record.weight {
                weightings.push((sensor, weight));
            }
        }

        match evaluator_kind {
            Some(EvaluatorKind::RuleBased) => {
                room.set_hazard_evaluator(HazardEvaluator::rule_based(room.sensors()));
            }
            Some(EvaluatorKind::WeightingBased) => {
                let evaluator = WeightingBasedHazardEvaluator::new(&weightings)
                    .map_err(|e| FormatError::from_domain(line_no, e))?;
                room.set_hazard_evaluator(HazardEvaluator::WeightingBased(evaluator));
            }
            None if !weightings.is_empty() => {
                debug!(
                    line = line_no,
                    room = room_number,
                    "ignoring sensor weights on a room without a weighting evaluator"
                );
            }
            None => {}
        }
        Ok((line_no, room))
    }

    fn sensor(&mut self) -> Result<(usize, SensorRecord), FormatError> {
        let (line_no, line) = self.next_line("sensor record")?;
        let (kind_field, _) = line.split_once(':').unwrap_or((line, ""));
        let kind = SensorKind::from_str(kind_field).map_err(|_| {
            FormatError::new(line_no, format!("unknown sensor type {kind_field:?}"))
        })?;

        let colons = match kind {
            SensorKind::Temperature => 1,
            SensorKind::Noise => 2,
            SensorKind::Occupancy => 3,
            SensorKind::CarbonDioxide => 4,
        };
        let mut fields = split_fields(line_no, line, colons..=colons, "sensor record")?;

        // Only the final field may carry a weight.
        let last = fields.len() - 1;
        let weight = match fields[last].split_once('@') {
            Some((value, weight)) => {
                fields[last] = value;
                Some(parse_number(line_no, weight, "sensor weight")?)
            }
            None => None,
        };

        let readings = parse_readings(line_no, fields[1])?;
        let sensor = match kind {
            SensorKind::Temperature => Sensor::temperature(readings),
            SensorKind::Noise => {
                Sensor::noise(readings, parse_number(line_no, fields[2], "update frequency")?)
            }
            SensorKind::Occupancy => Sensor::occupancy(
                readings,
                parse_number(line_no, fields[2], "update frequency")?,
                parse_number(line_no, fields[3], "capacity")?,
            ),
            SensorKind::CarbonDioxide => Sensor::carbon_dioxide(
                readings,
                parse_number(line_no, fields[2], "update frequency")?,
                parse_number(line_no, fields[3], "ideal value")?,
                parse_number(line_no, fields[4], "variation limit")?,
            ),
        }
        .map_err(|e| FormatError::from_domain(line_no, e))?;

        Ok((line_no, SensorRecord { sensor, weight }))
    }
}

/// Split a record on ':' after checking its colon count.
fn split_fields<'l>(
    line_no: usize,
    line: &'l str,
    colons: std::ops::RangeInclusive<usize>,
    record: &str,
) -> Result<Vec<&'l str>, FormatError> {
    let found = line.matches(':').count();
    if !colons.contains(&found) {
        return Err(FormatError::new(
            line_no,
            format!(
                "{record} has {found} ':' separators, expected {}..={}",
                colons.start(),
                colons.end()
            ),
        ));
    }
    let fields: Vec<&str> = line.split(':').collect();
    if let Some(empty) = fields.iter().position(|field| field.is_empty()) {
        return Err(FormatError::new(
            line_no,
            format!("{record} field {} is empty", empty + 1),
        ));
    }
    Ok(fields)
}

fn parse_number<T: FromStr>(line_no: usize, field: &str, what: &str) -> Result<T, FormatError> {
    field
        .parse()
        .map_err(|_| FormatError::new(line_no, format!("invalid {what} {field:?}")))
}

fn parse_count(line_no: usize, field: &str, what: &str) -> Result<usize, FormatError> {
    let count: i64 = parse_number(line_no, field, what)?;
    usize::try_from(count)
        .map_err(|_| FormatError::new(line_no, format!("{what} {count} is negative")))
}

fn parse_dimension(line_no: usize, field: &str, what: &str) -> Result<f64, FormatError> {
    let value: f64 = parse_number(line_no, field, what)?;
    if !value.is_finite() {
        return Err(FormatError::new(line_no, format!("{what} {field:?} is not finite")));
    }
    Ok(value)
}

fn parse_readings(line_no: usize, field: &str) -> Result<Vec<i32>, FormatError> {
    field
        .split(',')
        .map(|reading| parse_number(line_no, reading, "sensor reading"))
        .collect()
}

fn parse_order(line_no: usize, field: &str) -> Result<Vec<i32>, FormatError> {
    field
        .split(',')
        .map(|room| parse_number(line_no, room, "maintenance room number"))
        .collect()
}
