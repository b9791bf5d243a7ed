// libs/scheduling-cell/src/services/run.rs
use std::collections::BTreeSet;

use tracing::info;

use crate::error::SchedulingError;
use crate::models::{BookingOutcome, Patient, PatientId, RunSummary, UnscheduledPatient};
use crate::services::context::RunContext;
use crate::services::engine::BookingEngine;
use crate::services::queue::PatientQueue;
use crate::traits::PatientSource;

/// Top-level driver: orders the batch, books one patient at a time, and
/// settles the pending registration set afterwards.
#[derive(Debug, Default)]
pub struct SchedulingRun {
    queue: PatientQueue,
    engine: BookingEngine,
}

impl SchedulingRun {
    pub fn new() -> Self {
        Self {
            queue: PatientQueue::new(),
            engine: BookingEngine::new(),
        }
    }

    /// Process the whole batch in queue order. Patients are handled
    /// strictly one at a time: each booking is fully visible in the
    /// calendar and the capacity tracker before the next patient's search
    /// begins, which is what keeps FIFO fairness intact. Per-patient
    /// failures never abort the run; only the final removal step can.
    pub fn run(
        &self,
        patients: Vec<Patient>,
        ctx: &mut RunContext<'_>,
        patient_source: &mut dyn PatientSource,
    ) -> Result<RunSummary, SchedulingError> {
        info!("Run {}: scheduling {} new patients", ctx.run_id, patients.len());

        let ordered = self.queue.order(patients);
        let mut summary = RunSummary::new(ctx.run_id);
        let mut removable: BTreeSet<PatientId> = BTreeSet::new();

        for patient in &ordered {
            match self.engine.book(ctx, patient) {
                BookingOutcome::Booked(booking) => {
                    summary.booked_count += 1;
                    if booking.persisted {
                        removable.insert(patient.patient_id);
                    } else {
                        // The slot stays bound, but the patient stays in
                        // the pending set so a re-run can reconcile the
                        // missed sink write.
                        summary.sink_failures += 1;
                    }
                }
                BookingOutcome::Unscheduled(reason) => {
                    info!("Patient {} left unscheduled: {}", patient.patient_id, reason);
                    summary.unscheduled.push(UnscheduledPatient {
                        patient_id: patient.patient_id,
                        reason,
                    });
                }
            }
        }

        if ctx.options.dry_run {
            info!(
                "Run {}: dry run, leaving {} booked patients in the pending set",
                ctx.run_id,
                removable.len()
            );
        } else {
            let count = removable.len();
            let removed = patient_source
                .remove(&removable)
                .map_err(|source| SchedulingError::RemovalFailed { count, source })?;
            info!(
                "Removed {} scheduled patients from the pending registration set",
                removed
            );
        }

        info!(
            "Run {} complete: {} booked, {} unscheduled, {} sink failures",
            ctx.run_id,
            summary.booked_count,
            summary.unscheduled.len(),
            summary.sink_failures
        );
        Ok(summary)
    }
}
