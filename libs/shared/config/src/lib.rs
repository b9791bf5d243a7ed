use std::env;
use std::path::PathBuf;

use chrono::{Datelike, Local};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub pattern_map_path: PathBuf,
    pub schedule_year: i32,
    pub schedule_month: u32,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env::var("SCHEDULER_DATA_DIR").unwrap_or_else(|_| {
            warn!("SCHEDULER_DATA_DIR not set, using default 'data'");
            "data".to_string()
        }));

        let pattern_map_path = env::var("SCHEDULER_PATTERN_MAP")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("pattern_map.json"));

        let today = Local::now();
        let schedule_year = env::var("SCHEDULE_YEAR")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(year) => Some(year),
                Err(_) => {
                    warn!("SCHEDULE_YEAR is not a valid year: {}", raw);
                    None
                }
            })
            .unwrap_or_else(|| {
                warn!("SCHEDULE_YEAR not set, using current year {}", today.year());
                today.year()
            });
        let schedule_month = env::var("SCHEDULE_MONTH")
            .ok()
            .and_then(|raw| match raw.parse::<u32>() {
                Ok(month) if (1..=12).contains(&month) => Some(month),
                _ => {
                    warn!("SCHEDULE_MONTH is not a valid month: {}", raw);
                    None
                }
            })
            .unwrap_or_else(|| {
                warn!(
                    "SCHEDULE_MONTH not set, using current month {}",
                    today.month()
                );
                today.month()
            });

        let dry_run = env::var("SCHEDULER_DRY_RUN")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "True"))
            .unwrap_or(false);

        let config = Self {
            data_dir,
            pattern_map_path,
            schedule_year,
            schedule_month,
            dry_run,
        };

        if !config.is_configured() {
            warn!(
                "Data directory {} does not exist yet",
                config.data_dir.display()
            );
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.data_dir.is_dir()
    }
}
