// libs/intake-cell/src/services/patients.rs
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Reader, StringRecord, Writer};
use tracing::info;

use scheduling_cell::{PatientId, PatientIntake, PatientSource};

use crate::error::IntakeError;
use crate::services::reader;

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Pending new-patient registrations backed by the upstream CSV export.
///
/// `remove` rewrites the file in place, keeping the raw field values of
/// every surviving row untouched. Rows whose PATIENTID does not parse are
/// kept too; they were anomalies on the read path and stay visible in the
/// file rather than being silently dropped by a rewrite.
pub struct CsvPatientSource {
    path: PathBuf,
}

impl CsvPatientSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PatientSource for CsvPatientSource {
    fn pending_patients(&self) -> anyhow::Result<PatientIntake> {
        let file = File::open(&self.path).map_err(|source| IntakeError::FileOpen {
            path: self.path.clone(),
            source,
        })?;
        let (patients, anomalies) = reader::read_patients(file, &file_label(&self.path))?;
        Ok(PatientIntake {
            patients,
            anomalies,
        })
    }

    fn remove(&mut self, booked: &BTreeSet<PatientId>) -> anyhow::Result<usize> {
        if booked.is_empty() {
            return Ok(0);
        }
        let label = file_label(&self.path);

        let file = File::open(&self.path).map_err(|source| IntakeError::FileOpen {
            path: self.path.clone(),
            source,
        })?;
        let mut csv_reader = Reader::from_reader(file);
        let headers = csv_reader
            .headers()
            .map_err(|source| IntakeError::Csv {
                file: label.clone(),
                source,
            })?
            .clone();
        let Some(id_index) = headers.iter().position(|h| h.trim() == "PATIENTID") else {
            return Err(IntakeError::MissingColumns {
                file: label,
                columns: vec!["PATIENTID".to_string()],
            }
            .into());
        };

        let mut kept: Vec<StringRecord> = Vec::new();
        let mut removed = 0usize;
        for record in csv_reader.records() {
            let record = record.map_err(|source| IntakeError::Csv {
                file: label.clone(),
                source,
            })?;
            let is_booked = record
                .get(id_index)
                .and_then(|cell| cell.trim().parse::<i64>().ok())
                .map_or(false, |id| booked.contains(&PatientId(id)));
            if is_booked {
                removed += 1;
            } else {
                kept.push(record);
            }
        }
        drop(csv_reader);

        let out = File::create(&self.path).map_err(|source| IntakeError::FileWrite {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = Writer::from_writer(out);
        writer
            .write_record(&headers)
            .map_err(|source| IntakeError::Csv {
                file: label.clone(),
                source,
            })?;
        for record in &kept {
            writer.write_record(record).map_err(|source| IntakeError::Csv {
                file: label.clone(),
                source,
            })?;
        }
        writer.flush().map_err(|source| IntakeError::FileWrite {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "{}: removed {} scheduled patients, {} rows remain",
            label,
            removed,
            kept.len()
        );
        Ok(removed)
    }
}
