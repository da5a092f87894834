use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::domain::{round_to_cents, Room, RoomType, SharedRoom};
use crate::error::BmsError;
use crate::simulation::{MaintenanceSchedule, SharedSchedule, TickRegistry};

/// A floor of a building, holding rooms and an optional maintenance schedule.
#[derive(Debug)]
pub struct Floor {
    floor_number: i32,
    width: f64,
    length: f64,
    rooms: Vec<SharedRoom>,
    maintenance_schedule: Option<SharedSchedule>,
}

impl Floor {
    pub const MIN_WIDTH: f64 = 5.0;
    pub const MIN_LENGTH: f64 = 5.0;

    pub fn new(floor_number: i32, width: f64, length: f64) -> Self {
        Self {
            floor_number,
            width: round_to_cents(width),
            length: round_to_cents(length),
            rooms: Vec::new(),
            maintenance_schedule: None,
        }
    }

    pub fn floor_number(&self) -> i32 {
        self.floor_number
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn calculate_area(&self) -> f64 {
        self.width * self.length
    }

    /// Total area taken up by rooms.
    pub fn occupied_area(&self) -> f64 {
        self.rooms.iter().map(|room| room.borrow().area()).sum()
    }

    /// Rooms in insertion order.
    pub fn rooms(&self) -> &[SharedRoom] {
        &self.rooms
    }

    pub fn room_by_number(&self, room_number: i32) -> Option<SharedRoom> {
        self.rooms
            .iter()
            .find(|room| room.borrow().room_number() == room_number)
            .cloned()
    }

    /// Add a room, returning the shared handle the floor now holds.
    pub fn add_room(&mut self, room: Room) -> Result<SharedRoom, BmsError> {
        if room.area() < Room::MIN_AREA {
            return Err(BmsError::invalid(format!(
                "room {} area {:.2}m^2 is below the minimum of {:.2}m^2",
                room.room_number(),
                room.area(),
                Room::MIN_AREA
            )));
        }
        if self.room_by_number(room.room_number()).is_some() {
            return Err(BmsError::DuplicateRoom(room.room_number()));
        }
        let occupied_area = self.occupied_area();
        if occupied_area + room.area() > self.calculate_area() {
            return Err(BmsError::InsufficientSpace {
                floor_area: self.calculate_area(),
                occupied_area,
                room_area: room.area(),
            });
        }

        let room = room.into_shared();
        self.rooms.push(Rc::clone(&room));
        Ok(room)
    }

    /// Resize the floor; rooms must still fit.
    pub fn change_dimensions(&mut self, width: f64, length: f64) -> Result<(), BmsError> {
        let (width, length) = (round_to_cents(width), round_to_cents(length));
        if width < Self::MIN_WIDTH || length < Self::MIN_LENGTH {
            return Err(BmsError::invalid(format!(
                "floor dimensions {width:.2}m x {length:.2}m below the minimum of {:.2}m x {:.2}m",
                Self::MIN_WIDTH,
                Self::MIN_LENGTH
            )));
        }
        let occupied_area = self.occupied_area();
        if width * length < occupied_area {
            return Err(BmsError::FloorTooSmall {
                requested_area: width * length,
                occupied_area,
            });
        }
        self.width = width;
        self.length = length;
        Ok(())
    }

    /// Start a fire drill in every room, or only rooms of `room_type`.
    pub fn fire_drill(&self, room_type: Option<RoomType>) {
        for room in &self.rooms {
            let mut room = room.borrow_mut();
            if room_type.map_or(true, |wanted| room.room_type() == wanted) {
                room.set_fire_drill(true);
            }
        }
    }

    pub fn cancel_fire_drill(&self) {
        for room in &self.rooms {
            room.borrow_mut().set_fire_drill(false);
        }
    }

    pub fn maintenance_schedule(&self) -> Option<&SharedSchedule> {
        self.maintenance_schedule.as_ref()
    }

    /// Replace the floor's maintenance schedule with one visiting `room_order`.
    ///
    /// Every room on the floor loses its maintenance flag before the first
    /// room of the new order gains it. The new schedule is registered with
    /// `registry`; the old one is dropped and stops receiving ticks.
    pub fn create_maintenance_schedule(
        &mut self,
        room_order: &[i32],
        registry: &mut TickRegistry,
    ) -> Result<(), BmsError> {
        let rooms = room_order
            .iter()
            .map(|number| {
                self.room_by_number(*number).ok_or_else(|| {
                    BmsError::invalid(format!(
                        "room {number} in maintenance order is not on floor {}",
                        self.floor_number
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        MaintenanceSchedule::check_order(&rooms)?;

        for room in &self.rooms {
            room.borrow_mut().set_maintenance(false);
        }
        let schedule = Rc::new(RefCell::new(MaintenanceSchedule::new(rooms)?));
        registry.register(&schedule);
        self.maintenance_schedule = Some(schedule);

        debug!(
            floor = self.floor_number,
            order = ?room_order,
            "maintenance schedule created"
        );
        Ok(())
    }

    /// Encoded floor header followed by every room.
    pub fn encode(&self) -> String {
        let mut header = format!(
            "{}:{:.2}:{:.2}:{}",
            self.floor_number,
            self.width,
            self.length,
            self.rooms.len()
        );
        if let Some(schedule) = &self.maintenance_schedule {
            header.push(':');
            header.push_str(&schedule.borrow().encode());
        }

        std::iter::once(header)
            .chain(self.rooms.iter().map(|room| room.borrow().encode()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for Floor {
    fn eq(&self, other: &Self) -> bool {
        let schedule_order = |floor: &Floor| {
            floor
                .maintenance_schedule
                .as_ref()
                .map(|schedule| schedule.borrow().room_numbers())
        };

        self.floor_number == other.floor_number
            && (self.width - other.width).abs() <= 0.001
            && (self.length - other.length).abs() <= 0.001
            && self.rooms == other.rooms
            && schedule_order(self) == schedule_order(other)
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Floor #{}: width={:.2}m, length={:.2}m, rooms={}",
            self.floor_number,
            self.width,
            self.length,
            self.rooms.len()
        )
    }
}
