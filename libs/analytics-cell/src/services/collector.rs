// libs/analytics-cell/src/services/collector.rs
use std::collections::BTreeMap;

use tracing::{debug, info};

use scheduling_cell::{AnalyticsSink, BookingEvent};

use crate::models::{TtfaReport, TtfaStats};

/// Accumulates booking events over a run and reports time to first
/// appointment: appointment start minus registration, in fractional
/// hours, as mean and median for the combined population and per
/// program.
#[derive(Debug, Default)]
pub struct TtfaCollector {
    events: Vec<BookingEvent>,
}

impl TtfaCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn report(&self) -> TtfaReport {
        if self.events.is_empty() {
            info!("No bookings collected, nothing to report");
            return TtfaReport::default();
        }

        let combined = stats(self.events.iter().map(ttfa_hours).collect());

        let mut by_program: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for event in &self.events {
            by_program
                .entry(event.program.to_string())
                .or_default()
                .push(ttfa_hours(event));
        }
        let groups = by_program
            .into_iter()
            .map(|(name, hours)| (name, stats(hours)))
            .collect();

        info!(
            "TTFA over {} bookings: mean {:.2}h, median {:.2}h",
            combined.bookings, combined.mean_hours, combined.median_hours
        );
        TtfaReport {
            combined: Some(combined),
            groups,
        }
    }
}

impl AnalyticsSink for TtfaCollector {
    fn record_booking(&mut self, event: &BookingEvent) {
        debug!(
            "Recording booking for patient {} ({} registered, seen {})",
            event.patient_id, event.registration_timestamp, event.appointment_start_time
        );
        self.events.push(event.clone());
    }
}

fn ttfa_hours(event: &BookingEvent) -> f64 {
    let wait = event.appointment_start_time - event.registration_timestamp;
    wait.num_seconds() as f64 / 3600.0
}

fn stats(mut hours: Vec<f64>) -> TtfaStats {
    hours.sort_by(|a, b| a.total_cmp(b));
    let n = hours.len();
    let mean = hours.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        hours[n / 2]
    } else {
        (hours[n / 2 - 1] + hours[n / 2]) / 2.0
    };
    TtfaStats {
        bookings: n,
        mean_hours: mean,
        median_hours: median,
    }
}
