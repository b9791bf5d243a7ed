use anyhow::{bail, Context};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analytics_cell::TtfaCollector;
use intake_cell::{CsvAppointmentStore, CsvCalendarSource, CsvPatientSource, DataCatalog, Dataset};
use scheduling_cell::{
    CalendarSource, CapacityTracker, PatientSource, RunContext, RunOptions, SchedulingRun,
};
use shared_config::AppConfig;

fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting the new-patient scheduler");

    // Load configuration
    let config = AppConfig::from_env();
    if !config.is_configured() {
        bail!(
            "data directory {} does not exist; set SCHEDULER_DATA_DIR",
            config.data_dir.display()
        );
    }

    let catalog = DataCatalog::load(&config.data_dir, &config.pattern_map_path)
        .context("could not build the data catalog")?;

    // Calendar for the target month, with pre-existing bookings carried in.
    let calendar_source =
        CsvCalendarSource::from_catalog(&catalog, config.schedule_year, config.schedule_month)?;
    let calendar = calendar_source
        .load_calendar()
        .context("could not populate the calendar")?;
    if calendar.anomalies > 0 {
        warn!("{} calendar records were rejected during intake", calendar.anomalies);
    }

    // Pending registrations.
    let mut patient_source = CsvPatientSource::new(catalog.path(Dataset::NewPatients)?);
    let patient_intake = patient_source
        .pending_patients()
        .context("could not read the new-patient registrations")?;
    if patient_intake.anomalies > 0 {
        warn!(
            "{} new-patient rows were rejected during intake",
            patient_intake.anomalies
        );
    }

    let mut appointments = CsvAppointmentStore::new(catalog.path(Dataset::Appointments)?);
    let mut analytics = TtfaCollector::new();
    let mut store = calendar.store;
    let mut tracker = CapacityTracker::new();

    if config.dry_run {
        info!("Dry run: booked patients will stay in the pending registration set");
    }
    let mut ctx = RunContext::new(
        &mut store,
        &mut tracker,
        &mut appointments,
        &mut analytics,
        RunOptions {
            dry_run: config.dry_run,
        },
    )?;

    let summary = SchedulingRun::new()
        .run(patient_intake.patients, &mut ctx, &mut patient_source)
        .context("scheduling run failed")?;
    drop(ctx);

    println!("{summary}");
    println!("{}", analytics.report());
    Ok(())
}
