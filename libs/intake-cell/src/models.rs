// libs/intake-cell/src/models.rs
use std::fmt;

use serde::Deserialize;

/// Logical datasets the pipeline consumes. The pattern map resolves each
/// one to a concrete CSV file in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dataset {
    NewPatients,
    ProviderSchedule,
    ProviderStates,
    Appointments,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::NewPatients,
        Dataset::ProviderSchedule,
        Dataset::ProviderStates,
        Dataset::Appointments,
    ];

    /// Dataset name as it appears in pattern map values.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewPatients => "new_patient_df",
            Self::ProviderSchedule => "provider_schedule_df",
            Self::ProviderStates => "provider_state_df",
            Self::Appointments => "appointment_df",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Raw rows keep every field as text so one bad value rejects one row
// with a precise warning instead of failing the whole deserialization.

#[derive(Debug, Deserialize)]
pub struct RawPatientRow {
    #[serde(rename = "PATIENTID")]
    pub patient_id: String,
    #[serde(rename = "STATE")]
    pub state: String,
    #[serde(rename = "REGISTRATIONDATE")]
    pub registration_date: String,
    #[serde(rename = "PROGRAM")]
    pub program: String,
}

#[derive(Debug, Deserialize)]
pub struct RawScheduleRow {
    #[serde(rename = "PROVIDERID")]
    pub provider_id: String,
    #[serde(rename = "DAYOFWEEK")]
    pub day_of_week: String,
    #[serde(rename = "SLOTSTARTTIME")]
    pub slot_start_time: String,
    #[serde(rename = "SLOTENDTIME")]
    pub slot_end_time: String,
}

#[derive(Debug, Deserialize)]
pub struct RawProviderStateRow {
    #[serde(rename = "PROVIDERID")]
    pub provider_id: String,
    #[serde(rename = "STATE")]
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct RawAppointmentRow {
    #[serde(rename = "APPOINTMENTID")]
    pub appointment_id: String,
    #[serde(rename = "APPOINTMENTDATE")]
    pub appointment_date: String,
    #[serde(rename = "APPOINTMENTSTARTTIME")]
    pub appointment_start_time: String,
    #[serde(rename = "APPOINTMENTDURATION")]
    pub appointment_duration: String,
    #[serde(rename = "PROVIDERID")]
    pub provider_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_names_round_trip() {
        for dataset in Dataset::ALL {
            assert_eq!(Dataset::from_name(dataset.name()), Some(dataset));
        }
        assert_eq!(Dataset::from_name("nonsense_df"), None);
    }
}
