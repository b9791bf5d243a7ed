// libs/intake-cell/src/services/reader.rs
//
// Row-level CSV parsing. Every reader follows the same shape: verify the
// required columns exist, then parse row by row, rejecting bad rows with
// a warning that carries the file label and line number while the rest of
// the file continues to load. Line numbers are 1-based and include the
// header row, so data row N is line N + 1.
use std::collections::BTreeMap;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use csv::Reader;
use tracing::{info, warn};

use calendar_cell::{AppointmentId, ExistingAppointment, ProviderId, StateCode, WeeklyShift};
use scheduling_cell::{Patient, PatientId, Program};

use crate::error::IntakeError;
use crate::models::{RawAppointmentRow, RawPatientRow, RawProviderStateRow, RawScheduleRow};

pub(crate) fn require_columns(
    reader: &mut Reader<impl Read>,
    required: &[&str],
    file: &str,
) -> Result<(), IntakeError> {
    let headers = reader.headers().map_err(|source| IntakeError::Csv {
        file: file.to_string(),
        source,
    })?;
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|header| header.trim() == **column))
        .map(|column| column.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IntakeError::MissingColumns {
            file: file.to_string(),
            columns: missing,
        })
    }
}

/// Registration timestamps come in date-only and date-plus-time forms.
/// Date-only registrations land at midnight.
fn parse_registration(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Schedule exports number weekdays 1 = Monday through 7 = Sunday.
fn weekday_from_number(raw: u32) -> Option<Weekday> {
    match raw {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn read_patients(
    input: impl Read,
    file: &str,
) -> Result<(Vec<Patient>, usize), IntakeError> {
    let mut reader = Reader::from_reader(input);
    require_columns(
        &mut reader,
        &["PATIENTID", "STATE", "REGISTRATIONDATE", "PROGRAM"],
        file,
    )?;

    let mut patients = Vec::new();
    let mut anomalies = 0usize;
    for (index, row) in reader.deserialize::<RawPatientRow>().enumerate() {
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(err) => {
                warn!("{} line {}: unreadable row: {}", file, line, err);
                anomalies += 1;
                continue;
            }
        };

        let Ok(patient_id) = raw.patient_id.trim().parse::<i64>() else {
            warn!("{} line {}: bad PATIENTID '{}'", file, line, raw.patient_id);
            anomalies += 1;
            continue;
        };
        let state = StateCode::new(&raw.state);
        if state.is_empty() {
            warn!("{} line {}: empty STATE for patient {}", file, line, patient_id);
            anomalies += 1;
            continue;
        }
        let Some(registration_timestamp) = parse_registration(&raw.registration_date) else {
            warn!(
                "{} line {}: bad REGISTRATIONDATE '{}' for patient {}",
                file, line, raw.registration_date, patient_id
            );
            anomalies += 1;
            continue;
        };
        let Some(program) = Program::parse(&raw.program) else {
            warn!("{} line {}: empty PROGRAM for patient {}", file, line, patient_id);
            anomalies += 1;
            continue;
        };

        patients.push(Patient {
            patient_id: PatientId(patient_id),
            state,
            registration_timestamp,
            program,
        });
    }

    info!(
        "{}: loaded {} new patients, rejected {}",
        file,
        patients.len(),
        anomalies
    );
    Ok((patients, anomalies))
}

/// Reads the provider schedule joined against provider states.
///
/// The state table is a multimap: a provider licensed in two states gets
/// every schedule row once per state, matching the upstream left join.
/// Schedule rows whose provider has no state row are rejected.
pub fn read_weekly_shifts(
    schedule: impl Read,
    schedule_file: &str,
    states: impl Read,
    states_file: &str,
) -> Result<(Vec<WeeklyShift>, usize), IntakeError> {
    let mut anomalies = 0usize;

    let mut states_reader = Reader::from_reader(states);
    require_columns(&mut states_reader, &["PROVIDERID", "STATE"], states_file)?;
    let mut states_by_provider: BTreeMap<ProviderId, Vec<StateCode>> = BTreeMap::new();
    for (index, row) in states_reader.deserialize::<RawProviderStateRow>().enumerate() {
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(err) => {
                warn!("{} line {}: unreadable row: {}", states_file, line, err);
                anomalies += 1;
                continue;
            }
        };
        let Ok(provider_id) = raw.provider_id.trim().parse::<i64>() else {
            warn!("{} line {}: bad PROVIDERID '{}'", states_file, line, raw.provider_id);
            anomalies += 1;
            continue;
        };
        let state = StateCode::new(&raw.state);
        if state.is_empty() {
            warn!("{} line {}: empty STATE for provider {}", states_file, line, provider_id);
            anomalies += 1;
            continue;
        }
        states_by_provider
            .entry(ProviderId(provider_id))
            .or_default()
            .push(state);
    }

    let mut schedule_reader = Reader::from_reader(schedule);
    require_columns(
        &mut schedule_reader,
        &["PROVIDERID", "DAYOFWEEK", "SLOTSTARTTIME", "SLOTENDTIME"],
        schedule_file,
    )?;

    let mut shifts = Vec::new();
    for (index, row) in schedule_reader.deserialize::<RawScheduleRow>().enumerate() {
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(err) => {
                warn!("{} line {}: unreadable row: {}", schedule_file, line, err);
                anomalies += 1;
                continue;
            }
        };
        let Ok(provider_id) = raw.provider_id.trim().parse::<i64>() else {
            warn!("{} line {}: bad PROVIDERID '{}'", schedule_file, line, raw.provider_id);
            anomalies += 1;
            continue;
        };
        let weekday = raw
            .day_of_week
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(weekday_from_number);
        let Some(weekday) = weekday else {
            warn!(
                "{} line {}: bad DAYOFWEEK '{}' for provider {} (expected 1-7)",
                schedule_file, line, raw.day_of_week, provider_id
            );
            anomalies += 1;
            continue;
        };
        let Ok(start_time) = NaiveTime::parse_from_str(raw.slot_start_time.trim(), "%H:%M") else {
            warn!(
                "{} line {}: bad SLOTSTARTTIME '{}' for provider {}",
                schedule_file, line, raw.slot_start_time, provider_id
            );
            anomalies += 1;
            continue;
        };
        let Ok(end_time) = NaiveTime::parse_from_str(raw.slot_end_time.trim(), "%H:%M") else {
            warn!(
                "{} line {}: bad SLOTENDTIME '{}' for provider {}",
                schedule_file, line, raw.slot_end_time, provider_id
            );
            anomalies += 1;
            continue;
        };
        if end_time <= start_time {
            warn!(
                "{} line {}: slot ends at or before it starts ({} to {}) for provider {}",
                schedule_file, line, start_time, end_time, provider_id
            );
            anomalies += 1;
            continue;
        }

        let provider_id = ProviderId(provider_id);
        let Some(provider_states) = states_by_provider.get(&provider_id) else {
            warn!(
                "{} line {}: provider {} has no state row, dropping the schedule row",
                schedule_file, line, provider_id
            );
            anomalies += 1;
            continue;
        };
        for state in provider_states {
            shifts.push(WeeklyShift {
                provider_id,
                weekday,
                start_time,
                end_time,
                state: state.clone(),
            });
        }
    }

    info!(
        "{}: loaded {} weekly shifts across {} providers, rejected {} rows",
        schedule_file,
        shifts.len(),
        states_by_provider.len(),
        anomalies
    );
    Ok((shifts, anomalies))
}

pub fn read_appointments(
    input: impl Read,
    file: &str,
) -> Result<(Vec<ExistingAppointment>, usize), IntakeError> {
    let mut reader = Reader::from_reader(input);
    require_columns(
        &mut reader,
        &[
            "APPOINTMENTID",
            "APPOINTMENTDATE",
            "APPOINTMENTSTARTTIME",
            "APPOINTMENTDURATION",
            "PROVIDERID",
        ],
        file,
    )?;

    let mut appointments = Vec::new();
    let mut anomalies = 0usize;
    for (index, row) in reader.deserialize::<RawAppointmentRow>().enumerate() {
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(err) => {
                warn!("{} line {}: unreadable row: {}", file, line, err);
                anomalies += 1;
                continue;
            }
        };
        let Ok(appointment_id) = raw.appointment_id.trim().parse::<i64>() else {
            warn!("{} line {}: bad APPOINTMENTID '{}'", file, line, raw.appointment_id);
            anomalies += 1;
            continue;
        };
        let Ok(provider_id) = raw.provider_id.trim().parse::<i64>() else {
            warn!("{} line {}: bad PROVIDERID '{}'", file, line, raw.provider_id);
            anomalies += 1;
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(raw.appointment_date.trim(), "%Y-%m-%d") else {
            warn!(
                "{} line {}: bad APPOINTMENTDATE '{}'",
                file, line, raw.appointment_date
            );
            anomalies += 1;
            continue;
        };
        let Ok(start_time) =
            NaiveTime::parse_from_str(raw.appointment_start_time.trim(), "%I:%M %p")
        else {
            warn!(
                "{} line {}: bad APPOINTMENTSTARTTIME '{}'",
                file, line, raw.appointment_start_time
            );
            anomalies += 1;
            continue;
        };
        let duration = raw.appointment_duration.trim().parse::<i64>();
        let Ok(duration_minutes) = duration else {
            warn!(
                "{} line {}: bad APPOINTMENTDURATION '{}'",
                file, line, raw.appointment_duration
            );
            anomalies += 1;
            continue;
        };
        if duration_minutes <= 0 {
            warn!(
                "{} line {}: non-positive APPOINTMENTDURATION {}",
                file, line, duration_minutes
            );
            anomalies += 1;
            continue;
        }

        let start = date.and_time(start_time);
        appointments.push(ExistingAppointment {
            appointment_id: AppointmentId(appointment_id),
            provider_id: ProviderId(provider_id),
            start,
            end: start + chrono::Duration::minutes(duration_minutes),
        });
    }

    info!(
        "{}: loaded {} existing appointments, rejected {}",
        file,
        appointments.len(),
        anomalies
    );
    Ok((appointments, anomalies))
}

/// Scan for the highest APPOINTMENTID without parsing whole rows. Rows
/// whose id cell does not parse are skipped here; full-row validation
/// happens on the appointment read path.
pub fn max_appointment_id(
    input: impl Read,
    file: &str,
) -> Result<Option<AppointmentId>, IntakeError> {
    let mut reader = Reader::from_reader(input);
    let headers = reader.headers().map_err(|source| IntakeError::Csv {
        file: file.to_string(),
        source,
    })?;
    let Some(id_index) = headers.iter().position(|h| h.trim() == "APPOINTMENTID") else {
        return Err(IntakeError::MissingColumns {
            file: file.to_string(),
            columns: vec!["APPOINTMENTID".to_string()],
        });
    };

    let mut max_id: Option<i64> = None;
    for record in reader.records() {
        let record = record.map_err(|source| IntakeError::Csv {
            file: file.to_string(),
            source,
        })?;
        if let Some(id) = record.get(id_index).and_then(|cell| cell.trim().parse::<i64>().ok()) {
            max_id = Some(max_id.map_or(id, |current| current.max(id)));
        }
    }
    Ok(max_id.map(AppointmentId))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_accepts_date_only_and_date_time() {
        assert_eq!(
            parse_registration("2025-01-04"),
            Some(
                NaiveDate::from_ymd_opt(2025, 1, 4)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            parse_registration("2025-01-04 13:45"),
            Some(
                NaiveDate::from_ymd_opt(2025, 1, 4)
                    .unwrap()
                    .and_hms_opt(13, 45, 0)
                    .unwrap()
            )
        );
        assert_eq!(parse_registration("04/01/2025"), None);
    }

    #[test]
    fn test_weekday_numbering_starts_monday() {
        assert_eq!(weekday_from_number(1), Some(Weekday::Mon));
        assert_eq!(weekday_from_number(5), Some(Weekday::Fri));
        assert_eq!(weekday_from_number(7), Some(Weekday::Sun));
        assert_eq!(weekday_from_number(0), None);
        assert_eq!(weekday_from_number(8), None);
    }

    #[test]
    fn test_bad_patient_rows_are_counted_not_fatal() {
        let csv = "\
PATIENTID,STATE,REGISTRATIONDATE,PROGRAM
9001,CT,2025-01-04,SUD
oops,CT,2025-01-04,SUD
9002,,2025-01-04,SUD
9003,NY,not-a-date,SUD
9004,NY,2025-01-05,
9005,ny,2025-01-05 09:15,Mental Health
";
        let (patients, anomalies) = read_patients(csv.as_bytes(), "new_patients.csv").unwrap();
        assert_eq!(anomalies, 4);
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].patient_id, PatientId(9001));
        assert_eq!(patients[1].patient_id, PatientId(9005));
        assert_eq!(patients[1].state, StateCode::new("NY"));
        assert_eq!(patients[1].program, Program::MentalHealth);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "PATIENTID,STATE,PROGRAM\n9001,CT,SUD\n";
        let err = read_patients(csv.as_bytes(), "new_patients.csv").unwrap_err();
        assert!(matches!(
            err,
            IntakeError::MissingColumns { ref columns, .. } if columns == &["REGISTRATIONDATE"]
        ));
    }

    #[test]
    fn test_schedule_join_duplicates_shifts_per_state() {
        let schedule = "\
PROVIDERID,DAYOFWEEK,SLOTSTARTTIME,SLOTENDTIME
101,5,09:00,09:30
202,1,10:00,10:30
303,2,11:00,11:30
";
        let states = "\
PROVIDERID,STATE
101,CT
101,NY
202,NJ
";
        let (shifts, anomalies) =
            read_weekly_shifts(schedule.as_bytes(), "schedule.csv", states.as_bytes(), "states.csv")
                .unwrap();
        // 101 gets its Friday shift in both licensed states; 303 has no
        // state row and is dropped.
        assert_eq!(shifts.len(), 3);
        assert_eq!(anomalies, 1);
        let states_for_101: Vec<&str> = shifts
            .iter()
            .filter(|s| s.provider_id == ProviderId(101))
            .map(|s| s.state.as_str())
            .collect();
        assert_eq!(states_for_101, vec!["CT", "NY"]);
    }

    #[test]
    fn test_inverted_shift_times_are_rejected() {
        let schedule = "\
PROVIDERID,DAYOFWEEK,SLOTSTARTTIME,SLOTENDTIME
101,5,10:00,09:30
";
        let states = "PROVIDERID,STATE\n101,CT\n";
        let (shifts, anomalies) =
            read_weekly_shifts(schedule.as_bytes(), "schedule.csv", states.as_bytes(), "states.csv")
                .unwrap();
        assert!(shifts.is_empty());
        assert_eq!(anomalies, 1);
    }

    #[test]
    fn test_appointments_parse_twelve_hour_times() {
        let csv = "\
APPOINTMENTID,APPOINTMENTDATE,APPOINTMENTSTARTTIME,APPOINTMENTDURATION,PROVIDERID
291760,2025-01-03,02:30 PM,30,101
291759,2025-01-03,09:00 AM,60,101
bad,2025-01-03,09:00 AM,30,101
291758,2025-01-03,9 o'clock,30,101
";
        let (appointments, anomalies) =
            read_appointments(csv.as_bytes(), "appointments.csv").unwrap();
        assert_eq!(appointments.len(), 2);
        assert_eq!(anomalies, 2);
        assert_eq!(
            appointments[0].start,
            NaiveDate::from_ymd_opt(2025, 1, 3)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
        // 60-minute appointment spans two slot widths.
        assert_eq!(
            appointments[1].end - appointments[1].start,
            chrono::Duration::minutes(60)
        );
    }

    #[test]
    fn test_max_appointment_id_skips_bad_cells() {
        let csv = "\
APPOINTMENTID,APPOINTMENTDATE,APPOINTMENTSTARTTIME,APPOINTMENTDURATION,PROVIDERID
291760,2025-01-03,02:30 PM,30,101
junk,2025-01-03,02:30 PM,30,101
291755,2025-01-04,03:30 PM,30,101
";
        let max = max_appointment_id(csv.as_bytes(), "appointments.csv").unwrap();
        assert_eq!(max, Some(AppointmentId(291760)));
    }

    #[test]
    fn test_max_appointment_id_empty_file() {
        let csv = "APPOINTMENTID,APPOINTMENTDATE,APPOINTMENTSTARTTIME,APPOINTMENTDURATION,PROVIDERID\n";
        let max = max_appointment_id(csv.as_bytes(), "appointments.csv").unwrap();
        assert_eq!(max, None);
    }
}
