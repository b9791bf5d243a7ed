// libs/intake-cell/src/services/appointments.rs
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use csv::WriterBuilder;
use tracing::debug;

use calendar_cell::AppointmentId;
use scheduling_cell::{Appointment, AppointmentSink};

use crate::error::IntakeError;
use crate::services::patients::file_label;
use crate::services::reader;

/// Appointment history backed by the upstream CSV export. New bookings
/// append in the canonical column order:
/// APPOINTMENTID, APPOINTMENTDATE, APPOINTMENTSTARTTIME,
/// APPOINTMENTDURATION, PROVIDERID.
pub struct CsvAppointmentStore {
    path: PathBuf,
}

impl CsvAppointmentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AppointmentSink for CsvAppointmentStore {
    fn max_appointment_id(&self) -> anyhow::Result<Option<AppointmentId>> {
        let file = File::open(&self.path).map_err(|source| IntakeError::FileOpen {
            path: self.path.clone(),
            source,
        })?;
        Ok(reader::max_appointment_id(file, &file_label(&self.path))?)
    }

    fn record(&mut self, appointment: &Appointment) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| IntakeError::FileOpen {
                path: self.path.clone(),
                source,
            })?;

        // A hand-edited export may lack a trailing newline; appending
        // straight after would glue the new row onto the last one.
        let len = file
            .metadata()
            .map_err(|source| IntakeError::FileWrite {
                path: self.path.clone(),
                source,
            })?
            .len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))
                .and_then(|_| file.read_exact(&mut last))
                .map_err(|source| IntakeError::FileWrite {
                    path: self.path.clone(),
                    source,
                })?;
            if last[0] != b'\n' {
                file.write_all(b"\n").map_err(|source| IntakeError::FileWrite {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(&[
                appointment.appointment_id.to_string(),
                appointment.date.format("%Y-%m-%d").to_string(),
                appointment.start.format("%I:%M %p").to_string(),
                appointment.duration_minutes.to_string(),
                appointment.provider_id.to_string(),
            ])
            .map_err(|source| IntakeError::Csv {
                file: file_label(&self.path),
                source,
            })?;
        writer.flush().map_err(|source| IntakeError::FileWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            "Appended appointment {} to {}",
            appointment.appointment_id,
            self.path.display()
        );
        Ok(())
    }
}
