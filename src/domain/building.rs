use std::fmt;

use crate::domain::{Floor, RoomType};
use crate::error::BmsError;

/// A named building made of stacked floors.
#[derive(Debug, PartialEq)]
pub struct Building {
    name: String,
    floors: Vec<Floor>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            floors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Floors in insertion order, which is bottom to top.
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor_by_number(&self, floor_number: i32) -> Option<&Floor> {
        self.floors.iter().find(|f| f.floor_number() == floor_number)
    }

    pub fn floor_by_number_mut(&mut self, floor_number: i32) -> Option<&mut Floor> {
        self.floors
            .iter_mut()
            .find(|f| f.floor_number() == floor_number)
    }

    /// Add a floor on top of the building.
    ///
    /// Floor 1 needs no support; any higher floor must sit on the floor
    /// numbered directly below it, which must be at least as large.
    pub fn add_floor(&mut self, floor: Floor) -> Result<(), BmsError> {
        let number = floor.floor_number();
        if number < 1 {
            return Err(BmsError::invalid(format!(
                "floor number {number} must be at least 1"
            )));
        }
        if floor.width() < Floor::MIN_WIDTH || floor.length() < Floor::MIN_LENGTH {
            return Err(BmsError::invalid(format!(
                "floor {number} dimensions {:.2}m x {:.2}m below the minimum of {:.2}m x {:.2}m",
                floor.width(),
                floor.length(),
                Floor::MIN_WIDTH,
                Floor::MIN_LENGTH
            )));
        }
        if self.floor_by_number(number).is_some() {
            return Err(BmsError::DuplicateFloor(number));
        }
        if number > 1 {
            let below = self
                .floor_by_number(number - 1)
                .ok_or(BmsError::NoFloorBelow(number))?;
            if below.calculate_area() < floor.calculate_area() {
                return Err(BmsError::InsufficientFloorSupport {
                    floor_number: number,
                    area: floor.calculate_area(),
                    below_area: below.calculate_area(),
                });
            }
        }

        self.floors.push(floor);
        Ok(())
    }

    /// Start a fire drill on every floor, optionally limited to one room type.
    pub fn fire_drill(&self, room_type: Option<RoomType>) -> Result<(), BmsError> {
        if self.floors.is_empty() {
            return Err(BmsError::FireDrill(format!(
                "building {} has no floors",
                self.name
            )));
        }
        if self.floors.iter().all(|floor| floor.rooms().is_empty()) {
            return Err(BmsError::FireDrill(format!(
                "building {} has no rooms",
                self.name
            )));
        }
        for floor in &self.floors {
            floor.fire_drill(room_type);
        }
        Ok(())
    }

    pub fn cancel_fire_drill(&self) {
        for floor in &self.floors {
            floor.cancel_fire_drill();
        }
    }

    /// Name line, floor count line, then each floor's records.
    pub fn encode(&self) -> String {
        let mut lines = vec![self.name.clone(), self.floors.len().to_string()];
        lines.extend(self.floors.iter().map(Floor::encode));
        lines.join("\n")
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Building: name=\"{}\", floors={}",
            self.name,
            self.floors.len()
        )
    }
}
