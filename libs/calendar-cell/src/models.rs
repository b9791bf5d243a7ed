// libs/calendar-cell/src/models.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// IDENTIFIERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub i64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Licensure state code, normalized to trimmed upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(String);

impl StateCode {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==============================================================================
// CALENDAR MODELS
// ==============================================================================

/// Identity of a slot within the store. One provider can hold at most one
/// slot per start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub provider_id: ProviderId,
    pub start: NaiveDateTime,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider {} at {}", self.provider_id, self.start)
    }
}

/// One bookable unit of provider time for one state's licensure.
///
/// All timestamps are naive clinic-local values; the source data carries no
/// zone. `date` always equals `start.date()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub provider_id: ProviderId,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub state: StateCode,
    pub appointment_id: Option<AppointmentId>,
}

impl Slot {
    pub fn open(
        provider_id: ProviderId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        state: StateCode,
    ) -> Self {
        Self {
            provider_id,
            date: start.date(),
            start,
            end,
            state,
            appointment_id: None,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            provider_id: self.provider_id,
            start: self.start,
        }
    }

    pub fn is_open(&self) -> bool {
        self.appointment_id.is_none()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

// ==============================================================================
// POPULATION INPUT MODELS
// ==============================================================================

/// One recurring weekly availability row after the provider-state join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyShift {
    pub provider_id: ProviderId,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub state: StateCode,
}

/// A pre-existing booked appointment carried into the calendar at
/// population time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingAppointment {
    pub appointment_id: AppointmentId,
    pub provider_id: ProviderId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
