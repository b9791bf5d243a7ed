use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use calendar_cell::ProviderId;

/// Maximum bookings a provider may accrue per calendar day within one run.
pub const DAILY_BOOKING_CAP: u32 = 5;

/// Counts the bookings made during this run per (provider, date).
///
/// The counter deliberately tracks run bookings only; appointments that
/// existed in the calendar before the run do not count against the cap.
/// Entries are created lazily on first booking, so an unseen pair and a
/// zero count are distinct states internally even though `has_capacity`
/// treats both as "nothing booked yet".
#[derive(Debug, Default, Clone)]
pub struct CapacityTracker {
    bookings: BTreeMap<(ProviderId, NaiveDate), u32>,
}

impl CapacityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the pair's current count is below the daily cap.
    pub fn has_capacity(&self, provider_id: ProviderId, date: NaiveDate) -> bool {
        self.count(provider_id, date).unwrap_or(0) < DAILY_BOOKING_CAP
    }

    /// Record one successful booking. Called exactly once per booking,
    /// strictly after the calendar bind succeeds.
    pub fn record_booking(&mut self, provider_id: ProviderId, date: NaiveDate) {
        let count = self.bookings.entry((provider_id, date)).or_insert(0);
        *count += 1;
        debug!(
            "Provider {} now has {} run bookings on {}",
            provider_id, count, date
        );
    }

    /// Bookings recorded for the pair during this run; `None` for a pair
    /// that has never been booked, never conflated with a zero count.
    pub fn count(&self, provider_id: ProviderId, date: NaiveDate) -> Option<u32> {
        self.bookings.get(&(provider_id, date)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_unseen_pair_has_capacity_and_no_count() {
        let tracker = CapacityTracker::new();
        assert!(tracker.has_capacity(ProviderId(101), day(10)));
        assert_eq!(tracker.count(ProviderId(101), day(10)), None);
    }

    #[test]
    fn test_capacity_closes_at_the_cap() {
        let mut tracker = CapacityTracker::new();
        for booked in 1..=DAILY_BOOKING_CAP {
            assert!(tracker.has_capacity(ProviderId(101), day(10)));
            tracker.record_booking(ProviderId(101), day(10));
            assert_eq!(tracker.count(ProviderId(101), day(10)), Some(booked));
        }

        assert!(
            !tracker.has_capacity(ProviderId(101), day(10)),
            "Fifth booking reaches the cap"
        );
    }

    #[test]
    fn test_pairs_are_independent() {
        let mut tracker = CapacityTracker::new();
        for _ in 0..DAILY_BOOKING_CAP {
            tracker.record_booking(ProviderId(101), day(10));
        }

        // A full day for one provider blocks neither the provider's other
        // days nor other providers on the same day.
        assert!(!tracker.has_capacity(ProviderId(101), day(10)));
        assert!(tracker.has_capacity(ProviderId(101), day(11)));
        assert!(tracker.has_capacity(ProviderId(202), day(10)));
        assert_eq!(tracker.count(ProviderId(202), day(10)), None);
    }
}
