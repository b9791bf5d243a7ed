use tracing::debug;
use uuid::Uuid;

use calendar_cell::CalendarStore;

use crate::error::SchedulingError;
use crate::models::{AppointmentIdAllocator, RunOptions};
use crate::services::capacity::CapacityTracker;
use crate::traits::{AnalyticsSink, AppointmentSink};

/// Everything one run mutates, behind a single exclusive borrow.
///
/// A fresh context is created per run and passed explicitly to the engine
/// and the driver; there is no shared instance to reset between runs. The
/// exclusive borrow is also what makes a booking attempt transactional:
/// while an attempt holds the context, no other attempt can observe the
/// calendar and the capacity tracker between the bind and the counter
/// increment. A future concurrent driver would put the whole context
/// behind one mutex and keep the same guarantee.
pub struct RunContext<'a> {
    pub run_id: Uuid,
    pub store: &'a mut CalendarStore,
    pub tracker: &'a mut CapacityTracker,
    pub appointments: &'a mut dyn AppointmentSink,
    pub analytics: &'a mut dyn AnalyticsSink,
    pub ids: AppointmentIdAllocator,
    pub options: RunOptions,
}

impl<'a> RunContext<'a> {
    /// Build the context for one run, seeding the appointment id
    /// allocator from the sink's current maximum id.
    pub fn new(
        store: &'a mut CalendarStore,
        tracker: &'a mut CapacityTracker,
        appointments: &'a mut dyn AppointmentSink,
        analytics: &'a mut dyn AnalyticsSink,
        options: RunOptions,
    ) -> Result<Self, SchedulingError> {
        let max_existing = appointments
            .max_appointment_id()
            .map_err(|source| SchedulingError::IdSeedFailed { source })?;
        let run_id = Uuid::new_v4();
        debug!(
            "Run {}: appointment ids start after {:?}",
            run_id, max_existing
        );

        Ok(Self {
            run_id,
            store,
            tracker,
            appointments,
            analytics,
            ids: AppointmentIdAllocator::seeded(max_existing),
            options,
        })
    }
}
