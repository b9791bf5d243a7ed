use thiserror::Error;

use crate::models::{AppointmentId, SlotKey};

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Slot for {key} is already booked under appointment {existing}")]
    AlreadyBooked {
        key: SlotKey,
        existing: AppointmentId,
    },

    #[error("No slot exists for {key}")]
    UnknownSlot { key: SlotKey },

    #[error("Duplicate slot for {key}")]
    DuplicateSlot { key: SlotKey },

    #[error("Invalid schedule month {month} of {year}")]
    InvalidMonth { year: i32, month: u32 },
}
