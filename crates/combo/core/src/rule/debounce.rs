use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::types::{ActionId, Timestamp};

/// Minimum re-fire interval of a rule entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Debounce {
    pub interval_ms: u32,
    /// Keep a separate window per anchor instead of one shared window.
    pub per_anchor: bool,
}

impl Debounce {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            per_anchor: false,
        }
    }

    /// Storage key for a fire under `anchor`.
    pub(crate) fn key(&self, anchor: ActionId) -> Option<ActionId> {
        self.per_anchor.then_some(anchor)
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    global: Option<Timestamp>,
    per_anchor: ArrayVec<(ActionId, Timestamp), { EngineConfig::MAX_ANCHORS }>,
}

impl Slot {
    fn last_fire(&self, key: Option<ActionId>) -> Option<Timestamp> {
        match key {
            None => self.global,
            Some(anchor) => self
                .per_anchor
                .iter()
                .find(|(a, _)| *a == anchor)
                .map(|&(_, at)| at),
        }
    }

    fn stamp(&mut self, key: Option<ActionId>, now: Timestamp) {
        let Some(anchor) = key else {
            self.global = Some(now);
            return;
        };
        if let Some(entry) = self.per_anchor.iter_mut().find(|(a, _)| *a == anchor) {
            entry.1 = now;
            return;
        }
        if self.per_anchor.is_full() {
            // Evict the stalest window.
            if let Some(oldest) = (0..self.per_anchor.len()).min_by_key(|&i| self.per_anchor[i].1) {
                self.per_anchor.swap_remove(oldest);
            }
        }
        self.per_anchor.push((anchor, now));
    }
}

/// Last-fire timestamps keyed by entry index and optional anchor.
#[derive(Clone, Debug, Default)]
pub(crate) struct DebounceStore {
    slots: ArrayVec<Slot, { EngineConfig::MAX_RULE_ENTRIES }>,
}

impl DebounceStore {
    pub(crate) fn with_entries(count: usize) -> Self {
        let mut slots = ArrayVec::new();
        for _ in 0..count.min(EngineConfig::MAX_RULE_ENTRIES) {
            slots.push(Slot::default());
        }
        Self { slots }
    }

    /// True while `now` is inside the window opened by the last fire for this key.
    pub(crate) fn is_active(
        &self,
        entry: usize,
        key: Option<ActionId>,
        interval_ms: u32,
        now: Timestamp,
    ) -> bool {
        self.slots
            .get(entry)
            .and_then(|slot| slot.last_fire(key))
            .is_some_and(|at| now.since(at) < u64::from(interval_ms))
    }

    pub(crate) fn stamp(&mut self, entry: usize, key: Option<ActionId>, now: Timestamp) {
        if let Some(slot) = self.slots.get_mut(entry) {
            slot.stamp(key, now);
        }
    }

    pub(crate) fn last_fire(&self, entry: usize, key: Option<ActionId>) -> Option<Timestamp> {
        self.slots.get(entry).and_then(|slot| slot.last_fire(key))
    }

    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Timestamp = Timestamp(10_000);

    #[test]
    fn window_closes_exactly_at_interval() {
        let mut store = DebounceStore::with_entries(2);
        assert!(!store.is_active(0, None, 3000, T0));

        store.stamp(0, None, T0);
        assert!(store.is_active(0, None, 3000, T0));
        assert!(store.is_active(0, None, 3000, T0.add_millis(2999)));
        assert!(!store.is_active(0, None, 3000, T0.add_millis(3000)));
        assert!(!store.is_active(1, None, 3000, T0), "entries are independent");
    }

    #[test]
    fn per_anchor_windows_are_independent() {
        let mut store = DebounceStore::with_entries(1);
        store.stamp(0, Some(ActionId(100)), T0);
        assert!(store.is_active(0, Some(ActionId(100)), 3000, T0));
        assert!(!store.is_active(0, Some(ActionId(101)), 3000, T0));
        assert!(!store.is_active(0, None, 3000, T0));
    }

    #[test]
    fn full_anchor_table_evicts_oldest() {
        let mut store = DebounceStore::with_entries(1);
        for i in 0..EngineConfig::MAX_ANCHORS as u32 {
            store.stamp(0, Some(ActionId(i + 1)), T0.add_millis(u64::from(i)));
        }
        store.stamp(0, Some(ActionId(99)), T0.add_millis(100));
        assert_eq!(store.last_fire(0, Some(ActionId(1))), None);
        assert_eq!(store.last_fire(0, Some(ActionId(99))), Some(T0.add_millis(100)));
        assert!(store.last_fire(0, Some(ActionId(2))).is_some());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut store = DebounceStore::with_entries(1);
        store.stamp(0, None, T0);
        store.clear();
        assert!(!store.is_active(0, None, 3000, T0));
    }
}
