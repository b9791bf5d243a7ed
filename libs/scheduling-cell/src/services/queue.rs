use crate::models::Patient;

/// Orders a batch of new patients into the processing sequence: first
/// registered, first served.
#[derive(Debug, Default)]
pub struct PatientQueue;

impl PatientQueue {
    pub fn new() -> Self {
        Self
    }

    /// Sort by `(registration_timestamp, patient_id)` ascending. The id as
    /// secondary key makes the order total and deterministic even when
    /// registration timestamps collide. Pure; no side effects.
    pub fn order(&self, mut patients: Vec<Patient>) -> Vec<Patient> {
        patients.sort_by_key(|patient| (patient.registration_timestamp, patient.patient_id));
        patients
    }
}
