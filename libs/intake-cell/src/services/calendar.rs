// libs/intake-cell/src/services/calendar.rs
use std::fs::File;
use std::path::PathBuf;

use tracing::info;

use calendar_cell::{BusinessHours, CalendarPopulator};
use scheduling_cell::{CalendarIntake, CalendarSource};

use crate::error::IntakeError;
use crate::models::Dataset;
use crate::services::catalog::DataCatalog;
use crate::services::patients::file_label;
use crate::services::reader;

/// Builds a run's calendar from the schedule, provider-state and
/// appointment CSVs for one target month.
pub struct CsvCalendarSource {
    schedule_path: PathBuf,
    states_path: PathBuf,
    appointments_path: PathBuf,
    year: i32,
    month: u32,
    hours: BusinessHours,
}

impl CsvCalendarSource {
    pub fn from_catalog(
        catalog: &DataCatalog,
        year: i32,
        month: u32,
    ) -> Result<Self, IntakeError> {
        Ok(Self {
            schedule_path: catalog.path(Dataset::ProviderSchedule)?.to_path_buf(),
            states_path: catalog.path(Dataset::ProviderStates)?.to_path_buf(),
            appointments_path: catalog.path(Dataset::Appointments)?.to_path_buf(),
            year,
            month,
            hours: BusinessHours::default(),
        })
    }
}

impl CalendarSource for CsvCalendarSource {
    fn load_calendar(&self) -> anyhow::Result<CalendarIntake> {
        let schedule = File::open(&self.schedule_path).map_err(|source| IntakeError::FileOpen {
            path: self.schedule_path.clone(),
            source,
        })?;
        let states = File::open(&self.states_path).map_err(|source| IntakeError::FileOpen {
            path: self.states_path.clone(),
            source,
        })?;
        let (shifts, shift_anomalies) = reader::read_weekly_shifts(
            schedule,
            &file_label(&self.schedule_path),
            states,
            &file_label(&self.states_path),
        )?;

        let appointments =
            File::open(&self.appointments_path).map_err(|source| IntakeError::FileOpen {
                path: self.appointments_path.clone(),
                source,
            })?;
        let (existing, appointment_anomalies) =
            reader::read_appointments(appointments, &file_label(&self.appointments_path))?;

        let populator = CalendarPopulator::new(self.hours);
        let (store, report) = populator.populate(&shifts, &existing, self.year, self.month)?;

        info!(
            "Calendar for {}-{:02} ready: {} slots open, {} pre-booked",
            self.year,
            self.month,
            store.len() - store.bound_count(),
            store.bound_count()
        );
        Ok(CalendarIntake {
            store,
            anomalies: shift_anomalies + appointment_anomalies + report.anomalies,
        })
    }
}
