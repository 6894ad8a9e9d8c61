//! Per-tick update gating.
//!
//! Before each snapshot refresh the gate decides whether the tick is worth
//! the work. Host states that suspend play skip outright; out of combat only
//! every Nth tick refreshes. Entering combat resets the counter so the first
//! tick after leaving combat refreshes immediately.
use std::fmt;

use combo_core::{CombatFlags, HostFlags, Observer};

/// Why a tick skipped its snapshot refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum UpdateSkipReason {
    NotLoggedIn,
    Loading,
    Cutscene,
    InConversation,
    InSanctuary,
    ThrottledNonCombat,
}

impl fmt::Display for UpdateSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &'static str = self.into();
        f.write_str(label)
    }
}

#[derive(Clone, Debug)]
pub struct UpdateGate {
    interval: u32,
    counter: u32,
}

impl UpdateGate {
    pub fn new(non_combat_interval: u32) -> Self {
        Self {
            interval: non_combat_interval.max(1),
            counter: 0,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// # Errors
    ///
    /// Returns the first matching skip reason.
    pub fn check(&mut self, observer: &dyn Observer) -> Result<(), UpdateSkipReason> {
        if observer.local_player().is_none() {
            return Err(UpdateSkipReason::NotLoggedIn);
        }

        let host = observer.host_flags();
        if host.contains(HostFlags::BETWEEN_AREAS) {
            return Err(UpdateSkipReason::Loading);
        }
        if host.contains(HostFlags::WATCHING_CUTSCENE) {
            return Err(UpdateSkipReason::Cutscene);
        }
        if host.contains(HostFlags::OCCUPIED_IN_EVENT) {
            return Err(UpdateSkipReason::InConversation);
        }
        if host.contains(HostFlags::IN_SANCTUARY) {
            return Err(UpdateSkipReason::InSanctuary);
        }

        if observer.combat_flags().contains(CombatFlags::IN_COMBAT) {
            self.counter = 0;
            return Ok(());
        }

        let due = self.counter % self.interval == 0;
        self.counter = self.counter.wrapping_add(1);
        if due {
            Ok(())
        } else {
            Err(UpdateSkipReason::ThrottledNonCombat)
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

impl Default for UpdateGate {
    fn default() -> Self {
        Self::new(crate::RuntimeConfig::DEFAULT_NON_COMBAT_INTERVAL)
    }
}
