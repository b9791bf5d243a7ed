// libs/scheduling-cell/src/traits.rs
//
// Collaborator contracts at the edge of the scheduling engine. The engine
// owns the booking decision; everything durable (calendar intake, patient
// intake and removal, appointment persistence, analytics) happens behind
// these traits so a run can be driven against files in production and
// in-memory fakes in tests.
use std::collections::BTreeSet;

use anyhow::Result;

use calendar_cell::{AppointmentId, CalendarStore};

use crate::models::{Appointment, BookingEvent, Patient, PatientId};

/// A populated calendar plus the number of records rejected while
/// building it.
#[derive(Debug)]
pub struct CalendarIntake {
    pub store: CalendarStore,
    pub anomalies: usize,
}

/// The pending new-patient set plus the number of rows rejected while
/// reading it.
#[derive(Debug)]
pub struct PatientIntake {
    pub patients: Vec<Patient>,
    pub anomalies: usize,
}

/// Supplies the fully-populated slot store for a run: provider
/// availability merged with pre-existing appointments already bound.
pub trait CalendarSource {
    fn load_calendar(&self) -> Result<CalendarIntake>;
}

/// The pending new-patient registration set.
pub trait PatientSource {
    fn pending_patients(&self) -> Result<PatientIntake>;

    /// Remove exactly the given patient ids from the pending set. Removal
    /// is idempotent: ids not present are ignored, not errors. Returns the
    /// number of patients actually removed.
    fn remove(&mut self, booked: &BTreeSet<PatientId>) -> Result<usize>;
}

/// Durable storage for appointments created by the engine.
pub trait AppointmentSink {
    /// Highest appointment id currently stored, `None` for an empty
    /// store. Queried once at run start to seed the id allocator.
    fn max_appointment_id(&self) -> Result<Option<AppointmentId>>;

    fn record(&mut self, appointment: &Appointment) -> Result<()>;
}

/// Purely observational per-booking feed; the engine never consumes a
/// return value from it.
pub trait AnalyticsSink {
    fn record_booking(&mut self, event: &BookingEvent);
}
