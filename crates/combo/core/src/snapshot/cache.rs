use std::cell::Cell;

use crate::types::Tick;

/// Lazily built per-tick value.
///
/// A value is valid only while its stamp equals the snapshot's current tick;
/// every read checks the stamp and rebuilds on mismatch.
#[derive(Debug)]
pub(crate) struct TickCache<T: Copy> {
    slot: Cell<Option<(Tick, T)>>,
}

impl<T: Copy> TickCache<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slot: Cell::new(None),
        }
    }

    pub(crate) fn get_or_build(&self, tick: Tick, build: impl FnOnce() -> T) -> T {
        if let Some((stamp, value)) = self.slot.get() {
            if stamp == tick {
                return value;
            }
        }
        let value = build();
        self.slot.set(Some((tick, value)));
        value
    }

    pub(crate) fn invalidate(&self) {
        self.slot.set(None);
    }

    #[cfg(test)]
    pub(crate) fn stamp(&self) -> Option<Tick> {
        self.slot.get().map(|(stamp, _)| stamp)
    }
}

impl<T: Copy> Default for TickCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
