//! Scripted combat openers.
//!
//! An [`Opener`] is a plain list of steps. Once armed, the
//! [`OpenerExecutor`] offers the next step for any anchor press in combat and
//! advances only on confirmed matching use. It deactivates when the last step
//! is consumed or when the safety timeout elapses, whichever comes first.
use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::types::{ActionId, Lane, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenerStep {
    pub action: ActionId,
    pub lane: Lane,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opener {
    name: &'static str,
    steps: ArrayVec<OpenerStep, { EngineConfig::MAX_OPENER_STEPS }>,
    overflowed: bool,
}

impl Opener {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: ArrayVec::new(),
            overflowed: false,
        }
    }

    #[must_use]
    pub fn primary(self, action: ActionId) -> Self {
        self.push(action, Lane::Primary)
    }

    #[must_use]
    pub fn secondary(self, action: ActionId) -> Self {
        self.push(action, Lane::Secondary)
    }

    fn push(mut self, action: ActionId, lane: Lane) -> Self {
        if self.steps.try_push(OpenerStep { action, lane }).is_err() {
            self.overflowed = true;
        }
        self
    }

    /// # Errors
    ///
    /// Rejects openers longer than [`EngineConfig::MAX_OPENER_STEPS`].
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.overflowed {
            return Err(ProfileError::capacity(
                CapacityKind::OpenerSteps,
                EngineConfig::MAX_OPENER_STEPS,
            ));
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn steps(&self) -> &[OpenerStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Drives one installed [`Opener`].
#[derive(Clone, Debug, Default)]
pub struct OpenerExecutor {
    opener: Option<Opener>,
    cursor: usize,
    started_at: Option<Timestamp>,
    timeout_ms: u32,
}

impl OpenerExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the installed opener and deactivates.
    pub fn install(&mut self, opener: Option<Opener>) {
        self.opener = opener;
        self.reset();
    }

    pub fn opener(&self) -> Option<&Opener> {
        self.opener.as_ref()
    }

    /// Arms the opener from its first step. Returns false when nothing is installed.
    pub fn start(&mut self, now: Timestamp, timeout_ms: u32) -> bool {
        if self.opener.as_ref().is_none_or(Opener::is_empty) {
            return false;
        }
        self.cursor = 0;
        self.started_at = Some(now);
        self.timeout_ms = timeout_ms;
        true
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.started_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Deactivates once the safety timeout has elapsed. Returns true if this call expired it.
    pub fn expire(&mut self, now: Timestamp) -> bool {
        match self.started_at {
            Some(start) if now.since(start) >= u64::from(self.timeout_ms) => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    pub fn next_step(&self) -> Option<OpenerStep> {
        if !self.is_active() {
            return None;
        }
        self.opener.as_ref()?.steps.get(self.cursor).copied()
    }

    /// Advances on a confirmed use of the current step. Returns true when it advanced.
    ///
    /// A confirmation arriving after the safety timeout only expires the opener.
    pub fn on_action_used(&mut self, success: bool, action: ActionId, now: Timestamp) -> bool {
        if self.expire(now) {
            return false;
        }
        if !success || self.next_step().is_none_or(|step| step.action != action) {
            return false;
        }
        self.cursor += 1;
        if self.next_step().is_none() {
            self.started_at = None;
        }
        true
    }

    /// `(consumed, total)` while active.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if !self.is_active() {
            return None;
        }
        self.opener.as_ref().map(|o| (self.cursor, o.len()))
    }
}
