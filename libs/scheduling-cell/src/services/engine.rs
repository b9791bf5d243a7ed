// libs/scheduling-cell/src/services/engine.rs
use tracing::{debug, error, info, warn};

use calendar_cell::CalendarError;

use crate::models::{Appointment, Booking, BookingEvent, BookingOutcome, Patient, UnscheduledReason};
use crate::services::context::RunContext;
use crate::services::finder::SlotFinder;

/// Books one patient into the earliest available slot: greedy,
/// non-backtracking, first-fit. A booking decision is never revisited to
/// benefit a later patient, and an unscheduled patient is not retried
/// within the run.
#[derive(Debug, Default)]
pub struct BookingEngine {
    finder: SlotFinder,
}

impl BookingEngine {
    pub fn new() -> Self {
        Self {
            finder: SlotFinder::new(),
        }
    }

    pub fn book(&self, ctx: &mut RunContext<'_>, patient: &Patient) -> BookingOutcome {
        let candidates = self.finder.find_candidates(patient, ctx.store);
        if candidates.is_empty() {
            let reason = if ctx.store.has_providers_in_state(&patient.state) {
                UnscheduledReason::NoSlotsAvailable
            } else {
                UnscheduledReason::NoProvidersInState
            };
            debug!("No candidate slots for patient {}: {}", patient.patient_id, reason);
            return BookingOutcome::Unscheduled(reason);
        }

        let mut skipped_for_capacity = false;
        for slot in candidates {
            // Capacity is re-checked per attempt; the candidate snapshot
            // cannot know how many bookings happened since it was taken.
            if !ctx.tracker.has_capacity(slot.provider_id, slot.date) {
                debug!(
                    "Provider {} is at the daily cap for {}, trying the next candidate",
                    slot.provider_id, slot.date
                );
                skipped_for_capacity = true;
                continue;
            }

            let appointment_id = ctx.ids.next();
            match ctx.store.bind(&slot.key(), appointment_id) {
                Ok(()) => {
                    ctx.tracker.record_booking(slot.provider_id, slot.date);

                    let appointment = Appointment {
                        appointment_id,
                        provider_id: slot.provider_id,
                        date: slot.date,
                        start: slot.start,
                        duration_minutes: slot.duration_minutes(),
                    };
                    let persisted = match ctx.appointments.record(&appointment) {
                        Ok(()) => true,
                        Err(err) => {
                            error!(
                                "Appointment sink rejected appointment {} for patient {}: {:#}",
                                appointment_id, patient.patient_id, err
                            );
                            false
                        }
                    };
                    ctx.analytics.record_booking(&BookingEvent {
                        patient_id: patient.patient_id,
                        registration_timestamp: patient.registration_timestamp,
                        program: patient.program.clone(),
                        appointment_start_time: slot.start,
                    });

                    info!(
                        "Booked patient {} with provider {} at {} (appointment {})",
                        patient.patient_id, slot.provider_id, slot.start, appointment_id
                    );
                    return BookingOutcome::Booked(Booking {
                        appointment_id,
                        slot,
                        persisted,
                    });
                }
                // Claimed since the snapshot was read; never retry the
                // same slot.
                Err(CalendarError::AlreadyBooked { key, .. }) => {
                    debug!("Slot {} was claimed mid-search, trying the next candidate", key);
                    continue;
                }
                Err(err) => {
                    // Candidates come from this store, so an unknown key
                    // means the snapshot and store disagree. Skip it.
                    warn!("Bind failed for {}: {}", slot.key(), err);
                    continue;
                }
            }
        }

        let reason = if skipped_for_capacity {
            UnscheduledReason::CapacityExhausted
        } else {
            UnscheduledReason::NoSlotsAvailable
        };
        info!("Patient {} exhausted all candidates: {}", patient.patient_id, reason);
        BookingOutcome::Unscheduled(reason)
    }
}
