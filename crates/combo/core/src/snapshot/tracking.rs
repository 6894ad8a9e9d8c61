use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::observer::Observer;
use crate::types::{ActionId, StatusId};

/// Maps an applying action to the statuses it leaves on the target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebuffMapping {
    action: ActionId,
    statuses: ArrayVec<StatusId, { EngineConfig::MAX_STATUSES_PER_DEBUFF }>,
}

impl DebuffMapping {
    /// # Errors
    ///
    /// Rejects the reserved action id and more than
    /// [`EngineConfig::MAX_STATUSES_PER_DEBUFF`] statuses.
    pub fn new(action: ActionId, statuses: &[StatusId]) -> Result<Self, ProfileError> {
        if action.is_none() {
            return Err(ProfileError::ReservedAction);
        }
        let statuses = ArrayVec::try_from(statuses).map_err(|_| {
            ProfileError::capacity(
                CapacityKind::DebuffStatuses,
                EngineConfig::MAX_STATUSES_PER_DEBUFF,
            )
        })?;
        Ok(Self { action, statuses })
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn statuses(&self) -> &[StatusId] {
        &self.statuses
    }
}

/// Configured cooldowns with their readiness for the current tick.
#[derive(Clone, Debug, Default)]
pub(crate) struct TrackedCooldowns {
    actions: ArrayVec<ActionId, { EngineConfig::MAX_TRACKED_COOLDOWNS }>,
    ready: [bool; EngineConfig::MAX_TRACKED_COOLDOWNS],
}

impl TrackedCooldowns {
    pub(crate) fn configure(
        &mut self,
        actions: ArrayVec<ActionId, { EngineConfig::MAX_TRACKED_COOLDOWNS }>,
        observer: &dyn Observer,
    ) {
        self.actions = actions;
        self.refresh(observer);
    }

    pub(crate) fn refresh(&mut self, observer: &dyn Observer) {
        self.ready = [false; EngineConfig::MAX_TRACKED_COOLDOWNS];
        for (slot, &action) in self.ready.iter_mut().zip(&self.actions) {
            *slot = observer.is_action_ready(action);
        }
    }

    /// `Some(ready)` when `action` is tracked.
    pub(crate) fn lookup(&self, action: ActionId) -> Option<bool> {
        self.actions
            .iter()
            .position(|&a| a == action)
            .map(|i| self.ready[i])
    }

    pub(crate) fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    pub(crate) fn clear(&mut self) {
        self.actions.clear();
        self.ready = [false; EngineConfig::MAX_TRACKED_COOLDOWNS];
    }
}

/// Collects `items` into a fixed-capacity vector, rejecting overflow as a whole.
pub(crate) fn collect_bounded<T: Clone, const CAP: usize>(
    items: &[T],
    kind: CapacityKind,
) -> Result<ArrayVec<T, CAP>, ProfileError> {
    if items.len() > CAP {
        return Err(ProfileError::capacity(kind, CAP));
    }
    Ok(items.iter().cloned().collect())
}
