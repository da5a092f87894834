//! # Maintenance Rotation
//!
//! A floor's maintenance schedule walks a cyclic list of rooms. Exactly one
//! room is under maintenance at a time; it stays there for a duration derived
//! from its area and type, then the next room in the list takes over.
//!
//! A room that is being evacuated freezes the rotation until the evacuation
//! ends.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::domain::{Room, RoomState, SharedRoom};
use crate::error::BmsError;

use super::TimedItem;

/// A schedule shared between its floor and the tick registry.
pub type SharedSchedule = Rc<RefCell<MaintenanceSchedule>>;

const BASE_MAINTENANCE_MINUTES: f64 = 5.0;
const MINUTES_PER_EXTRA_SQUARE_METRE: f64 = 0.2;

#[derive(Debug)]
pub struct MaintenanceSchedule {
    room_order: Vec<SharedRoom>,
    time_elapsed: u32,
}

impl MaintenanceSchedule {
    /// Start a schedule with the first room of `room_order` under maintenance.
    pub fn new(room_order: Vec<SharedRoom>) -> Result<Self, BmsError> {
        Self::check_order(&room_order)?;
        room_order[0].borrow_mut().set_maintenance(true);
        Ok(Self {
            room_order,
            time_elapsed: 0,
        })
    }

    /// An order must be non-empty and never visit the same room twice in a
    /// row, including from the last entry back to the first.
    pub fn check_order(room_order: &[SharedRoom]) -> Result<(), BmsError> {
        if room_order.is_empty() {
            return Err(BmsError::invalid("maintenance order must not be empty"));
        }
        if room_order.len() == 1 {
            return Ok(());
        }
        for (position, room) in room_order.iter().enumerate() {
            let next = &room_order[(position + 1) % room_order.len()];
            if Rc::ptr_eq(room, next) {
                return Err(BmsError::invalid(format!(
                    "room {} appears twice in a row in the maintenance order",
                    room.borrow().room_number()
                )));
            }
        }
        Ok(())
    }

    /// Minutes a room stays under maintenance.
    pub fn maintenance_time(room: &Room) -> u32 {
        let base = if room.area() <= Room::MIN_AREA {
            BASE_MAINTENANCE_MINUTES
        } else {
            BASE_MAINTENANCE_MINUTES + (room.area() - Room::MIN_AREA) * MINUTES_PER_EXTRA_SQUARE_METRE
        };
        (base * room.room_type().maintenance_multiplier()).round() as u32
    }

    pub fn room_order(&self) -> &[SharedRoom] {
        &self.room_order
    }

    /// Room numbers in schedule order.
    pub fn room_numbers(&self) -> Vec<i32> {
        self.room_order
            .iter()
            .map(|room| room.borrow().room_number())
            .collect()
    }

    pub fn current_room(&self) -> Option<SharedRoom> {
        self.current_position()
            .map(|position| Rc::clone(&self.room_order[position]))
    }

    pub fn time_elapsed_current_room(&self) -> u32 {
        self.time_elapsed
    }

    /// Hand maintenance to the next room immediately.
    pub fn skip_current_maintenance(&mut self) {
        match self.current_position() {
            Some(position) => self.advance_from(position),
            None => warn!("no room under maintenance, nothing to skip"),
        }
    }

    /// Comma-separated room numbers, as stored on a floor record.
    pub fn encode(&self) -> String {
        self.room_numbers().iter().join(",")
    }

    /// The active room is the first flagged entry of the order. A room listed
    /// more than once always resolves to its first position.
    fn current_position(&self) -> Option<usize> {
        self.room_order
            .iter()
            .position(|room| room.borrow().maintenance_ongoing())
    }

    fn advance_from(&mut self, position: usize) {
        let next = (position + 1) % self.room_order.len();
        self.room_order[position].borrow_mut().set_maintenance(false);
        self.room_order[next].borrow_mut().set_maintenance(true);
        self.time_elapsed = 0;
        debug!(
            from = self.room_order[position].borrow().room_number(),
            to = self.room_order[next].borrow().room_number(),
            "maintenance moved to next room"
        );
    }
}

impl TimedItem for MaintenanceSchedule {
    fn elapse_one_minute(&mut self) {
        let Some(position) = self.current_position() else {
            return;
        };

        let required = {
            let room = self.room_order[position].borrow();
            if room.evaluate_room_state() == RoomState::Evacuate {
                return;
            }
            Self::maintenance_time(&room)
        };

        if self.time_elapsed == required {
            self.advance_from(position);
        }
        self.time_elapsed += 1;
    }
}

impl fmt::Display for MaintenanceSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_room() {
            Some(room) => write!(
                f,
                "MaintenanceSchedule: currentRoom=#{}, currentElapsed={}",
                room.borrow().room_number(),
                self.time_elapsed
            ),
            None => write!(
                f,
                "MaintenanceSchedule: currentRoom=none, currentElapsed={}",
                self.time_elapsed
            ),
        }
    }
}
