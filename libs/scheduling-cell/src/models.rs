// libs/scheduling-cell/src/models.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use calendar_cell::{AppointmentId, ProviderId, Slot, StateCode};

// ==============================================================================
// PATIENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub i64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health program a registration belongs to. Anything other than the two
/// named programs is carried through as-is so analytics can still group it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Program {
    MentalHealth,
    Sud,
    Other(String),
}

impl Program {
    /// Case-insensitive parse of the raw PROGRAM value. Empty input is not
    /// a program; callers reject the record.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("MENTAL HEALTH") {
            Some(Self::MentalHealth)
        } else if trimmed.eq_ignore_ascii_case("SUD") {
            Some(Self::Sud)
        } else {
            Some(Self::Other(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MentalHealth => write!(f, "Mental Health"),
            Self::Sud => write!(f, "SUD"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A new-patient registration record. Immutable for the duration of a run;
/// consumed once (booked or left unscheduled).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: PatientId,
    pub state: StateCode,
    pub registration_timestamp: NaiveDateTime,
    pub program: Program,
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

/// The durable record of one successful booking, handed to the
/// appointment sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: AppointmentId,
    pub provider_id: ProviderId,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub duration_minutes: i64,
}

/// Per-booking event handed to the analytics sink for time-to-first-
/// appointment reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub patient_id: PatientId,
    pub registration_timestamp: NaiveDateTime,
    pub program: Program,
    pub appointment_start_time: NaiveDateTime,
}

/// Monotonic appointment id allocator, shared across all bookings in a
/// run. Seeded from the appointment store's current maximum id at run
/// start; an empty store seeds at 0, so the first allocated id is 1. Ids
/// are never reused.
#[derive(Debug, Clone)]
pub struct AppointmentIdAllocator {
    next: i64,
}

impl AppointmentIdAllocator {
    pub fn seeded(max_existing: Option<AppointmentId>) -> Self {
        Self {
            next: max_existing.map_or(0, |id| id.0) + 1,
        }
    }

    pub fn next(&mut self) -> AppointmentId {
        let id = AppointmentId(self.next);
        self.next += 1;
        id
    }
}

// ==============================================================================
// BOOKING OUTCOMES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOutcome {
    Booked(Booking),
    Unscheduled(UnscheduledReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub appointment_id: AppointmentId,
    /// Snapshot of the slot as it was bound.
    pub slot: Slot,
    /// False when the appointment sink rejected the write after the slot
    /// was already bound. The calendar keeps the booking either way; the
    /// run summary counts the failure and the patient stays in the
    /// pending set so a re-run can reconcile.
    pub persisted: bool,
}

/// Why a patient was left unscheduled. Capacity exhaustion is the normal
/// outcome of a full day, not an error; it stays distinguishable from a
/// state with no licensed providers at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnscheduledReason {
    NoProvidersInState,
    NoSlotsAvailable,
    CapacityExhausted,
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProvidersInState => write!(f, "no provider is licensed in the patient's state"),
            Self::NoSlotsAvailable => write!(f, "no open slots after the registration time"),
            Self::CapacityExhausted => write!(f, "every candidate provider was at the daily cap"),
        }
    }
}

// ==============================================================================
// RUN SUMMARY
// ==============================================================================

/// Per-run switches. A fresh value is built for every run; there is no
/// process-wide flag to reset between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the patient-source removal step after the run. Appointments
    /// still append to the sink.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledPatient {
    pub patient_id: PatientId,
    pub reason: UnscheduledReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub booked_count: usize,
    /// Unscheduled patients in processing order.
    pub unscheduled: Vec<UnscheduledPatient>,
    /// Bookings whose sink write failed after the slot was bound.
    pub sink_failures: usize,
}

impl RunSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            booked_count: 0,
            unscheduled: Vec::new(),
            sink_failures: 0,
        }
    }

    pub fn unscheduled_count(&self) -> usize {
        self.unscheduled.len()
    }

    pub fn unscheduled_patient_ids(&self) -> Vec<PatientId> {
        self.unscheduled.iter().map(|u| u.patient_id).collect()
    }

    pub fn total_patients(&self) -> usize {
        self.booked_count + self.unscheduled.len()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} summary", self.run_id)?;
        writeln!(
            f,
            "  Scheduled: {} of {} new patients",
            self.booked_count,
            self.total_patients()
        )?;
        writeln!(f, "  Unscheduled: {}", self.unscheduled.len())?;
        for entry in &self.unscheduled {
            writeln!(f, "    patient {}: {}", entry.patient_id, entry.reason)?;
        }
        write!(f, "  Sink failures: {}", self.sink_failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_parse() {
        assert_eq!(Program::parse("SUD"), Some(Program::Sud));
        assert_eq!(Program::parse("sud"), Some(Program::Sud));
        assert_eq!(Program::parse(" Mental Health "), Some(Program::MentalHealth));
        assert_eq!(Program::parse("MENTAL HEALTH"), Some(Program::MentalHealth));
        assert_eq!(
            Program::parse("Wellness"),
            Some(Program::Other("Wellness".to_string()))
        );
        assert_eq!(Program::parse("   "), None);
        assert_eq!(Program::parse(""), None);
    }

    #[test]
    fn test_allocator_seeds_after_existing_max() {
        let mut ids = AppointmentIdAllocator::seeded(Some(AppointmentId(291760)));
        assert_eq!(ids.next(), AppointmentId(291761));
        assert_eq!(ids.next(), AppointmentId(291762));
    }

    #[test]
    fn test_allocator_empty_store_starts_at_one() {
        let mut ids = AppointmentIdAllocator::seeded(None);
        assert_eq!(ids.next(), AppointmentId(1));
    }

    #[test]
    fn test_run_summary_derives_unscheduled_ids() {
        let mut summary = RunSummary::new(Uuid::new_v4());
        summary.booked_count = 2;
        summary.unscheduled.push(UnscheduledPatient {
            patient_id: PatientId(7),
            reason: UnscheduledReason::CapacityExhausted,
        });

        assert_eq!(summary.unscheduled_count(), 1);
        assert_eq!(summary.unscheduled_patient_ids(), vec![PatientId(7)]);
        assert_eq!(summary.total_patients(), 3);
    }
}
