use calendar_cell::{CalendarStore, Slot};

use crate::models::Patient;

/// Produces the ordered candidate slot sequence for one patient.
#[derive(Debug, Default)]
pub struct SlotFinder;

impl SlotFinder {
    pub fn new() -> Self {
        Self
    }

    /// All open slots licensed for the patient's state that start strictly
    /// after their registration time, earliest `(date, start, provider)`
    /// first. Deliberately no capacity filtering here: capacity is a
    /// property of the booking attempt, not of calendar state, and is
    /// re-checked at the moment of booking. An empty result is a normal
    /// outcome, not an error.
    pub fn find_candidates(&self, patient: &Patient, store: &CalendarStore) -> Vec<Slot> {
        store.available_slots(&patient.state, patient.registration_timestamp)
    }
}
