#![allow(dead_code)]

use std::collections::BTreeSet;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};

use calendar_cell::{AppointmentId, CalendarStore, ProviderId, Slot, StateCode};
use scheduling_cell::{
    AnalyticsSink, Appointment, AppointmentSink, BookingEvent, Patient, PatientId, PatientIntake,
    PatientSource, Program,
};

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn patient(id: i64, state: &str, registered: NaiveDateTime) -> Patient {
    Patient {
        patient_id: PatientId(id),
        state: StateCode::new(state),
        registration_timestamp: registered,
        program: Program::Sud,
    }
}

pub fn slot(provider: i64, start: NaiveDateTime, state: &str) -> Slot {
    Slot::open(
        ProviderId(provider),
        start,
        start + chrono::Duration::minutes(30),
        StateCode::new(state),
    )
}

pub fn store_with(slots: Vec<Slot>) -> CalendarStore {
    let mut store = CalendarStore::new();
    for s in slots {
        store.insert(s).unwrap();
    }
    store
}

/// In-memory appointment sink. Fails the next `failures_remaining`
/// writes, then records normally.
#[derive(Debug, Default)]
pub struct RecordingAppointmentSink {
    pub max_id: Option<AppointmentId>,
    pub recorded: Vec<Appointment>,
    pub failures_remaining: usize,
}

impl RecordingAppointmentSink {
    pub fn with_max(max_id: Option<AppointmentId>) -> Self {
        Self {
            max_id,
            ..Self::default()
        }
    }
}

impl AppointmentSink for RecordingAppointmentSink {
    fn max_appointment_id(&self) -> Result<Option<AppointmentId>> {
        Ok(self.max_id)
    }

    fn record(&mut self, appointment: &Appointment) -> Result<()> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(anyhow!("appointment store offline"));
        }
        self.recorded.push(appointment.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingAnalyticsSink {
    pub events: Vec<BookingEvent>,
}

impl AnalyticsSink for RecordingAnalyticsSink {
    fn record_booking(&mut self, event: &BookingEvent) {
        self.events.push(event.clone());
    }
}

/// Patient source over a plain vector; `remove` retains unbooked
/// patients, so removing an absent id is naturally a no-op.
#[derive(Debug, Default)]
pub struct InMemoryPatientSource {
    pub patients: Vec<Patient>,
    pub remove_calls: usize,
}

impl InMemoryPatientSource {
    pub fn with_patients(patients: Vec<Patient>) -> Self {
        Self {
            patients,
            remove_calls: 0,
        }
    }

    pub fn pending_ids(&self) -> Vec<i64> {
        self.patients.iter().map(|p| p.patient_id.0).collect()
    }
}

impl PatientSource for InMemoryPatientSource {
    fn pending_patients(&self) -> Result<PatientIntake> {
        Ok(PatientIntake {
            patients: self.patients.clone(),
            anomalies: 0,
        })
    }

    fn remove(&mut self, booked: &BTreeSet<PatientId>) -> Result<usize> {
        self.remove_calls += 1;
        let before = self.patients.len();
        self.patients.retain(|p| !booked.contains(&p.patient_id));
        Ok(before - self.patients.len())
    }
}

/// Patient source whose removal always fails, for error-path tests.
#[derive(Debug, Default)]
pub struct BrokenPatientSource;

impl PatientSource for BrokenPatientSource {
    fn pending_patients(&self) -> Result<PatientIntake> {
        Ok(PatientIntake {
            patients: Vec::new(),
            anomalies: 0,
        })
    }

    fn remove(&mut self, _booked: &BTreeSet<PatientId>) -> Result<usize> {
        Err(anyhow!("patient table locked"))
    }
}
