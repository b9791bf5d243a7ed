// libs/analytics-cell/src/models.rs
use std::fmt;

/// Mean and median time to first appointment for one population, in
/// fractional hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtfaStats {
    pub bookings: usize,
    pub mean_hours: f64,
    pub median_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TtfaReport {
    /// Stats over every booking, `None` when the run booked nothing.
    pub combined: Option<TtfaStats>,
    /// Per-program stats keyed by program display name, in name order.
    pub groups: Vec<(String, TtfaStats)>,
}

impl fmt::Display for TtfaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(combined) = &self.combined else {
            return write!(f, "Time to first appointment: no bookings");
        };

        write!(f, "Time to first appointment (hours)")?;
        stats_line(f, "Combined", combined)?;
        for (name, stats) in &self.groups {
            stats_line(f, name, stats)?;
        }
        Ok(())
    }
}

fn stats_line(f: &mut fmt::Formatter<'_>, name: &str, stats: &TtfaStats) -> fmt::Result {
    write!(
        f,
        "\n  {:<16} n={:<5} mean={:>8.2}  median={:>8.2}",
        name, stats.bookings, stats.mean_hours, stats.median_hours
    )
}
