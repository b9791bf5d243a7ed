/// End-to-End Pipeline Test Suite
///
/// Runs the whole scheduling pipeline the way the batch binary does,
/// against a scratch data directory shaped like the production export:
/// catalog resolution, calendar population, FIFO booking, CSV
/// settlement and the TTFA report.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use analytics_cell::{TtfaCollector, TtfaReport};
use intake_cell::{
    CsvAppointmentStore, CsvCalendarSource, CsvPatientSource, DataCatalog, Dataset,
};
use scheduling_cell::{
    CalendarSource, CapacityTracker, PatientSource, RunContext, RunOptions, RunSummary,
    SchedulingRun,
};

const PATTERN_MAP: &str = r#"{
    "new_patient": "new_patient_df",
    "provider_schedule": "provider_schedule_df",
    "provider_state": "provider_state_df",
    "appointment": "appointment_df"
}"#;

// Provider 101 works Friday mornings in Connecticut, provider 202 works
// Monday mornings in New York. January 2025 starts on a Wednesday.
const SCHEDULE: &str = "\
PROVIDERID,DAYOFWEEK,SLOTSTARTTIME,SLOTENDTIME
101,5,09:00,09:30
101,5,09:30,10:00
202,1,10:00,10:30
";

const STATES: &str = "PROVIDERID,STATE\n101,CT\n202,NY\n";

// The hour-long pre-existing appointment takes both of 101's slots on
// the first Friday.
const APPOINTMENTS: &str = "\
APPOINTMENTID,APPOINTMENTDATE,APPOINTMENTSTARTTIME,APPOINTMENTDURATION,PROVIDERID
500,2025-01-03,09:00 AM,60,101
";

const PATIENTS: &str = "\
PATIENTID,STATE,REGISTRATIONDATE,PROGRAM
9001,CT,2025-01-01,SUD
9002,CT,2025-01-01 10:00,MENTAL HEALTH
9003,TX,2025-01-02,SUD
";

/// Scratch data directory holding one month of export files.
struct PipelineFixture {
    dir: TempDir,
}

impl PipelineFixture {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("pattern_map.json"), PATTERN_MAP)?;
        fs::write(dir.path().join("provider_schedule_jan.csv"), SCHEDULE)?;
        fs::write(dir.path().join("provider_states_jan.csv"), STATES)?;
        fs::write(dir.path().join("appointments_jan.csv"), APPOINTMENTS)?;
        fs::write(dir.path().join("new_patients_jan.csv"), PATIENTS)?;
        Ok(Self { dir })
    }

    fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    fn pattern_map(&self) -> PathBuf {
        self.dir.path().join("pattern_map.json")
    }

    fn file(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.path().join(name))?)
    }
}

struct PipelineOutcome {
    summary: RunSummary,
    report: TtfaReport,
    appointments_csv: String,
    patients_csv: String,
}

/// One full pipeline pass, wired exactly like the batch binary.
fn run_pipeline(fixture: &PipelineFixture, dry_run: bool) -> Result<PipelineOutcome> {
    let catalog = DataCatalog::load(fixture.data_dir(), &fixture.pattern_map())?;

    let calendar_source = CsvCalendarSource::from_catalog(&catalog, 2025, 1)?;
    let calendar = calendar_source.load_calendar()?;

    let mut patient_source = CsvPatientSource::new(catalog.path(Dataset::NewPatients)?);
    let patient_intake = patient_source.pending_patients()?;

    let mut appointments = CsvAppointmentStore::new(catalog.path(Dataset::Appointments)?);
    let mut analytics = TtfaCollector::new();
    let mut store = calendar.store;
    let mut tracker = CapacityTracker::new();

    let mut ctx = RunContext::new(
        &mut store,
        &mut tracker,
        &mut appointments,
        &mut analytics,
        RunOptions { dry_run },
    )?;
    let summary = SchedulingRun::new().run(patient_intake.patients, &mut ctx, &mut patient_source)?;
    drop(ctx);

    Ok(PipelineOutcome {
        summary,
        report: analytics.report(),
        appointments_csv: fixture.file("appointments_jan.csv")?,
        patients_csv: fixture.file("new_patients_jan.csv")?,
    })
}

/// Entry point for pipeline tests
fn main() -> Result<()> {
    let fixture = PipelineFixture::new()?;
    let outcome = run_pipeline(&fixture, false)?;

    println!("{}", outcome.summary);
    println!("{}", outcome.report);

    if outcome.summary.booked_count != 2 || outcome.summary.unscheduled_count() != 1 {
        eprintln!("pipeline produced an unexpected outcome");
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calendar_cell::StateCode;
    use chrono::NaiveDate;
    use scheduling_cell::{PatientId, UnscheduledReason};

    #[test]
    fn test_full_pipeline_books_appends_and_settles() {
        let fixture = PipelineFixture::new().unwrap();
        let outcome = run_pipeline(&fixture, false).unwrap();

        // Both Connecticut patients land on the first Friday with open
        // slots; the Texas patient has no licensed provider.
        assert_eq!(outcome.summary.booked_count, 2);
        assert_eq!(outcome.summary.sink_failures, 0);
        assert_eq!(
            outcome.summary.unscheduled_patient_ids(),
            vec![PatientId(9003)]
        );
        assert_eq!(
            outcome.summary.unscheduled[0].reason,
            UnscheduledReason::NoProvidersInState
        );

        // Ids continue after the existing maximum, rows append in the
        // canonical column order.
        let lines: Vec<&str> = outcome.appointments_csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "501,2025-01-10,09:00 AM,30,101");
        assert_eq!(lines[3], "502,2025-01-10,09:30 AM,30,101");

        // The pending set keeps only the unscheduled patient, raw row
        // intact.
        assert_eq!(
            outcome.patients_csv,
            "PATIENTID,STATE,REGISTRATIONDATE,PROGRAM\n9003,TX,2025-01-02,SUD\n"
        );
    }

    #[test]
    fn test_prebooked_slots_never_reach_new_patients() {
        let fixture = PipelineFixture::new().unwrap();

        let catalog = DataCatalog::load(fixture.data_dir(), &fixture.pattern_map()).unwrap();
        let source = CsvCalendarSource::from_catalog(&catalog, 2025, 1).unwrap();
        let calendar = source.load_calendar().unwrap();

        // Five Fridays of two slots plus four Mondays of one.
        assert_eq!(calendar.store.len(), 14);
        assert_eq!(calendar.store.bound_count(), 2);

        let jan1 = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let open = calendar.store.available_slots(&StateCode::new("CT"), jan1);
        assert!(open.iter().all(|slot| slot.start.date() != NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()));
    }

    #[test]
    fn test_dry_run_appends_but_keeps_registrations() {
        let fixture = PipelineFixture::new().unwrap();
        let outcome = run_pipeline(&fixture, true).unwrap();

        assert_eq!(outcome.summary.booked_count, 2);
        assert_eq!(outcome.appointments_csv.lines().count(), 4);
        // Nothing was removed from the pending set.
        assert_eq!(outcome.patients_csv, PATIENTS);
    }

    #[test]
    fn test_second_run_over_settled_files_is_stable() {
        let fixture = PipelineFixture::new().unwrap();
        let first = run_pipeline(&fixture, false).unwrap();
        assert_eq!(first.summary.booked_count, 2);

        // The second pass reloads the rewritten files: the appended
        // appointments pre-bind their slots and only the Texas patient
        // is still pending.
        let second = run_pipeline(&fixture, false).unwrap();
        assert_eq!(second.summary.booked_count, 0);
        assert_eq!(
            second.summary.unscheduled_patient_ids(),
            vec![PatientId(9003)]
        );
        assert_eq!(second.appointments_csv, first.appointments_csv);
        assert_eq!(second.patients_csv, first.patients_csv);
    }

    #[test]
    fn test_ttfa_report_groups_by_program() {
        let fixture = PipelineFixture::new().unwrap();
        let outcome = run_pipeline(&fixture, false).unwrap();

        let combined = outcome.report.combined.unwrap();
        assert_eq!(combined.bookings, 2);
        // 9001 waited 225h (Jan 1 00:00 to Jan 10 09:00), 9002 waited
        // 215.5h (Jan 1 10:00 to Jan 10 09:30).
        assert!((combined.mean_hours - 220.25).abs() < 1e-9);
        assert!((combined.median_hours - 220.25).abs() < 1e-9);

        let names: Vec<&str> = outcome
            .report
            .groups
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["Mental Health", "SUD"]);
        assert!((outcome.report.groups[0].1.mean_hours - 215.5).abs() < 1e-9);
        assert!((outcome.report.groups[1].1.mean_hours - 225.0).abs() < 1e-9);
    }
}
