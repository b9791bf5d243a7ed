// libs/calendar-cell/src/services/hours.rs
use chrono::{NaiveDateTime, NaiveTime};

/// The clinic's bookable window. Slots may start anywhere inside the
/// window, bounds included; a carried-in appointment must fit inside it
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(8, 30, 0).expect("valid clinic open time"),
            close: NaiveTime::from_hms_opt(21, 0, 0).expect("valid clinic close time"),
        }
    }
}

impl BusinessHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn allows_slot_start(&self, start: NaiveTime) -> bool {
        start >= self.open && start <= self.close
    }

    pub fn allows_appointment(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start.time() >= self.open && end.time() <= self.close
    }
}
