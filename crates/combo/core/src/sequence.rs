//! Confirm-then-advance step machines.
//!
//! A [`Sequence`] never predicts. Its cursor moves only when the host confirms
//! that the action at the cursor was actually used. A missed or mis-ordered
//! invocation leaves the sequence stalled at its current step.
//!
//! ```text
//!   at start ──match──▶ mid-sequence ──match──▶ … ──▶ complete
//!      ▲                                                  │
//!      └──────────────────── reset() ─────────────────────┘
//! ```
use arrayvec::ArrayVec;

use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::snapshot::WorldSnapshot;
use crate::types::{ActionId, Lane};

/// What happens after a step is confirmed.
#[derive(Clone, Debug, Default)]
pub enum Advance {
    #[default]
    Immediate,
    Guaranteed,
    /// Continue only while the condition holds; otherwise abort the sequence.
    Conditional(Condition),
    /// End the sequence regardless of remaining steps.
    Terminal,
}

#[derive(Clone, Debug)]
pub struct SequenceStep {
    pub action: ActionId,
    pub lane: Lane,
    pub advance: Advance,
}

impl SequenceStep {
    pub fn primary(action: ActionId) -> Self {
        Self {
            action,
            lane: Lane::Primary,
            advance: Advance::Immediate,
        }
    }

    pub fn secondary(action: ActionId) -> Self {
        Self {
            action,
            lane: Lane::Secondary,
            advance: Advance::Immediate,
        }
    }

    #[must_use]
    pub fn then(mut self, advance: Advance) -> Self {
        self.advance = advance;
        self
    }
}

/// Result of a confirmed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceTransition {
    /// The confirmed step was the first one.
    pub from_start: bool,
    /// The sequence is complete after this step.
    pub completed: bool,
}

/// Ordered steps with a single cursor.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    steps: ArrayVec<SequenceStep, { EngineConfig::MAX_SEQUENCE_STEPS }>,
    cursor: usize,
    /// Set when [`step`](Self::step) dropped a step; reported by validation.
    overflowed: bool,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Rejects an empty step list and more than
    /// [`EngineConfig::MAX_SEQUENCE_STEPS`] steps.
    pub fn from_steps(steps: impl IntoIterator<Item = SequenceStep>) -> Result<Self, ProfileError> {
        let mut sequence = Self::new();
        for step in steps {
            sequence.push(step)?;
        }
        if sequence.is_empty() {
            return Err(ProfileError::EmptySequence);
        }
        Ok(sequence)
    }

    /// Two primary-lane steps: `first` guaranteed to lead into `second`, which ends the sequence.
    pub fn two_step_guaranteed(first: ActionId, second: ActionId) -> Self {
        let mut steps = ArrayVec::new();
        steps.push(SequenceStep::primary(first).then(Advance::Guaranteed));
        steps.push(SequenceStep::primary(second).then(Advance::Terminal));
        Self {
            steps,
            cursor: 0,
            overflowed: false,
        }
    }

    /// # Errors
    ///
    /// Returns a capacity error once [`EngineConfig::MAX_SEQUENCE_STEPS`] is reached.
    pub fn push(&mut self, step: SequenceStep) -> Result<(), ProfileError> {
        self.steps.try_push(step).map_err(|_| {
            ProfileError::capacity(
                CapacityKind::SequenceSteps,
                EngineConfig::MAX_SEQUENCE_STEPS,
            )
        })
    }

    /// Chaining form of [`push`](Self::push). A step past capacity is dropped
    /// and the sequence is rejected when its rule is built.
    #[must_use]
    pub fn step(mut self, step: SequenceStep) -> Self {
        if self.steps.try_push(step).is_err() {
            self.overflowed = true;
        }
        self
    }

    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_at_start(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Mid-sequence: started but not finished.
    pub fn is_in_progress(&self) -> bool {
        !self.is_at_start() && !self.is_complete()
    }

    pub fn try_peek_next(&self) -> Option<&SequenceStep> {
        self.steps.get(self.cursor)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn validate(&self) -> Result<(), ProfileError> {
        if self.overflowed {
            return Err(ProfileError::capacity(
                CapacityKind::SequenceSteps,
                EngineConfig::MAX_SEQUENCE_STEPS,
            ));
        }
        if self.steps.is_empty() {
            return Err(ProfileError::EmptySequence);
        }
        Ok(())
    }

    /// Feeds back one confirmed (or failed) action use.
    ///
    /// Failures, completed sequences, and actions that do not match the step
    /// at the cursor are no-ops and return `None`.
    pub fn on_action_used(
        &mut self,
        success: bool,
        used: ActionId,
        snapshot: &WorldSnapshot,
    ) -> Option<SequenceTransition> {
        if !success || self.is_complete() {
            return None;
        }
        let step = self.steps.get(self.cursor)?;
        if step.action != used {
            return None;
        }
        let from_start = self.cursor == 0;
        self.cursor = match &step.advance {
            Advance::Immediate | Advance::Guaranteed => self.cursor + 1,
            Advance::Conditional(condition) => {
                if condition.evaluate(snapshot, None) {
                    self.cursor + 1
                } else {
                    self.steps.len()
                }
            }
            Advance::Terminal => self.steps.len(),
        };
        Some(SequenceTransition {
            from_start,
            completed: self.is_complete(),
        })
    }
}
