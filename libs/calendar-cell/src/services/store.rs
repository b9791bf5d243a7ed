// libs/calendar-cell/src/services/store.rs
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::CalendarError;
use crate::models::{AppointmentId, ProviderId, Slot, SlotKey, StateCode};

/// In-memory calendar of every provider slot for one run.
///
/// Slots are keyed by `(start, provider_id)`, so iteration yields the
/// booking tie-break order directly: earliest date and time first, lower
/// provider id first among equal start times. Slot identity is unique per
/// `(provider_id, start)`; `insert` rejects a second slot with the same
/// identity.
#[derive(Debug, Default, Clone)]
pub struct CalendarStore {
    slots: BTreeMap<(NaiveDateTime, ProviderId), Slot>,
    states: BTreeSet<StateCode>,
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly created slot. Population-time only.
    pub fn insert(&mut self, slot: Slot) -> Result<(), CalendarError> {
        let map_key = (slot.start, slot.provider_id);
        if self.slots.contains_key(&map_key) {
            return Err(CalendarError::DuplicateSlot { key: slot.key() });
        }
        self.states.insert(slot.state.clone());
        self.slots.insert(map_key, slot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently bound to an appointment.
    pub fn bound_count(&self) -> usize {
        self.slots.values().filter(|slot| !slot.is_open()).count()
    }

    pub fn get(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(&(key.start, key.provider_id))
    }

    /// Whether any slot, open or booked, exists for the given state. Lets
    /// the run summary tell "every provider is full" apart from "no
    /// provider is licensed there".
    pub fn has_providers_in_state(&self, state: &StateCode) -> bool {
        self.states.contains(state)
    }

    /// All open slots for `state` starting strictly after `after`, ordered
    /// by `(date, start, provider_id)` ascending. Returns owned snapshot
    /// records; they can go stale once bindings happen.
    pub fn available_slots(&self, state: &StateCode, after: NaiveDateTime) -> Vec<Slot> {
        // Keys strictly after `after`, whatever the provider id.
        let from = Bound::Excluded((after, ProviderId(i64::MAX)));
        self.slots
            .range((from, Bound::Unbounded))
            .map(|(_, slot)| slot)
            .filter(|slot| slot.is_open() && slot.state == *state)
            .cloned()
            .collect()
    }

    /// Atomic compare-and-set from unbooked to booked. Fails with
    /// `AlreadyBooked` when the slot was claimed since the caller's
    /// snapshot was read; that is the recoverable skip-and-continue case.
    pub fn bind(
        &mut self,
        key: &SlotKey,
        appointment_id: AppointmentId,
    ) -> Result<(), CalendarError> {
        let slot = self
            .slots
            .get_mut(&(key.start, key.provider_id))
            .ok_or(CalendarError::UnknownSlot { key: *key })?;

        match slot.appointment_id {
            None => {
                slot.appointment_id = Some(appointment_id);
                debug!("Bound {} to appointment {}", key, appointment_id);
                Ok(())
            }
            Some(existing) => Err(CalendarError::AlreadyBooked {
                key: *key,
                existing,
            }),
        }
    }

    /// Keys of all slots for `provider_id` whose start lies in
    /// `[from, to)`. Used when merging pre-existing appointments that span
    /// several slots.
    pub fn keys_in_span(
        &self,
        provider_id: ProviderId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Vec<SlotKey> {
        self.slots
            .range((from, ProviderId(i64::MIN))..(to, ProviderId(i64::MIN)))
            .map(|(_, slot)| slot)
            .filter(|slot| slot.provider_id == provider_id)
            .map(Slot::key)
            .collect()
    }

    /// Slots in `(date, start, provider_id)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }
}
