// libs/calendar-cell/src/services/populator.rs
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::CalendarError;
use crate::models::{ExistingAppointment, Slot, WeeklyShift};
use crate::services::hours::BusinessHours;
use crate::services::store::CalendarStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationReport {
    pub slots_created: usize,
    pub pre_booked: usize,
    pub anomalies: usize,
}

/// Expands weekly shift templates into dated slots for one target month and
/// carries pre-existing appointments into the store by binding every slot
/// they overlap.
pub struct CalendarPopulator {
    hours: BusinessHours,
}

impl CalendarPopulator {
    pub fn new(hours: BusinessHours) -> Self {
        Self { hours }
    }

    pub fn populate(
        &self,
        shifts: &[WeeklyShift],
        existing: &[ExistingAppointment],
        year: i32,
        month: u32,
    ) -> Result<(CalendarStore, PopulationReport), CalendarError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidMonth { year, month })?;

        let mut store = CalendarStore::new();
        let mut report = PopulationReport::default();

        // Step 1: one dated slot per template row per matching day of the month.
        for shift in shifts {
            if shift.end_time <= shift.start_time {
                warn!(
                    "Shift for provider {} on {:?} ends at or before its start ({} -> {})",
                    shift.provider_id, shift.weekday, shift.start_time, shift.end_time
                );
                report.anomalies += 1;
                continue;
            }
            if !self.hours.allows_slot_start(shift.start_time) {
                debug!(
                    "Dropping shift for provider {} starting {} outside business hours",
                    shift.provider_id, shift.start_time
                );
                continue;
            }

            for date in days_of_month(year, month).filter(|d| d.weekday() == shift.weekday) {
                let slot = Slot::open(
                    shift.provider_id,
                    date.and_time(shift.start_time),
                    date.and_time(shift.end_time),
                    shift.state.clone(),
                );
                match store.insert(slot) {
                    Ok(()) => report.slots_created += 1,
                    Err(CalendarError::DuplicateSlot { key }) => {
                        warn!("Skipping duplicate template slot for {}", key);
                        report.anomalies += 1;
                    }
                    Err(other) => return Err(other),
                }
            }
        }

        // Step 2: bind every slot a pre-existing appointment overlaps.
        let mut out_of_hours = 0;
        for appointment in existing {
            if appointment.end <= appointment.start {
                warn!(
                    "Appointment {} for provider {} ends at or before its start ({} -> {})",
                    appointment.appointment_id,
                    appointment.provider_id,
                    appointment.start,
                    appointment.end
                );
                report.anomalies += 1;
                continue;
            }
            if !self.hours.allows_appointment(appointment.start, appointment.end) {
                debug!(
                    "Ignoring appointment {} outside business hours ({} -> {})",
                    appointment.appointment_id, appointment.start, appointment.end
                );
                out_of_hours += 1;
                continue;
            }

            let covered =
                store.keys_in_span(appointment.provider_id, appointment.start, appointment.end);
            for key in covered {
                match store.bind(&key, appointment.appointment_id) {
                    Ok(()) => report.pre_booked += 1,
                    Err(CalendarError::AlreadyBooked {
                        key,
                        existing: holder,
                    }) => {
                        warn!(
                            "Slot {} already carries appointment {}, cannot also carry {}",
                            key, holder, appointment.appointment_id
                        );
                        report.anomalies += 1;
                    }
                    Err(other) => return Err(other),
                }
            }
        }

        if out_of_hours > 0 {
            info!(
                "Ignored {} pre-existing appointments outside business hours",
                out_of_hours
            );
        }
        info!(
            "Populated calendar for {}-{:02}: {} slots, {} pre-booked, {} anomalies",
            year, month, report.slots_created, report.pre_booked, report.anomalies
        );

        Ok((store, report))
    }
}

fn days_of_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    (1..=31).filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
}
