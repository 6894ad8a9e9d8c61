//! Per-anchor rule evaluation.
//!
//! A [`Rule`] owns an ordered list of [`CompiledAction`] entries and the
//! debounce timestamps for them. Evaluation walks the entries in their fixed
//! order and the first eligible entry wins; when nothing matches the pressed
//! anchor comes back unchanged on the primary lane.
//!
//! Direct entries stamp their debounce window when offered. Sequence entries
//! only start the window once their first step is confirmed used, so a
//! sequence that never actually started can be offered again.
mod debounce;
mod entry;

pub use debounce::Debounce;
pub use entry::{AnchorBranch, CompiledAction, EntryBody};

use arrayvec::ArrayVec;

use self::debounce::DebounceStore;
use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::snapshot::WorldSnapshot;
use crate::types::{ActionId, Lane, Timestamp};

/// Action and lane chosen by one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suggestion {
    pub action: ActionId,
    pub lane: Lane,
}

impl Suggestion {
    pub const fn new(action: ActionId, lane: Lane) -> Self {
        Self { action, lane }
    }

    /// The unchanged anchor on the primary lane.
    pub const fn identity(anchor: ActionId) -> Self {
        Self::new(anchor, Lane::Primary)
    }
}

/// How a rule orders its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryOrder {
    /// Registration order is priority.
    #[default]
    Insertion,
    /// Stable sort by [`CompiledAction::priority`] once at build time.
    Priority,
}

#[derive(Clone, Debug)]
pub struct Rule {
    anchors: ArrayVec<ActionId, { EngineConfig::MAX_ANCHORS }>,
    entries: ArrayVec<CompiledAction, { EngineConfig::MAX_RULE_ENTRIES }>,
    debounce: DebounceStore,
}

impl Rule {
    pub fn builder(anchor: ActionId) -> RuleBuilder {
        RuleBuilder::new(anchor)
    }

    /// Anchor the rule was built for.
    pub fn anchor(&self) -> ActionId {
        self.anchors.first().copied().unwrap_or(ActionId::NONE)
    }

    /// Every anchor this rule answers for.
    pub fn anchors(&self) -> &[ActionId] {
        &self.anchors
    }

    pub fn entries(&self) -> &[CompiledAction] {
        &self.entries
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Primary-lane evaluation: first eligible entry wins, identity otherwise.
    ///
    /// Direct entries on the secondary lane are left to
    /// [`evaluate_secondary`](Self::evaluate_secondary).
    pub fn evaluate(&mut self, snapshot: &WorldSnapshot, anchor: ActionId, now: Timestamp) -> Suggestion {
        let Self {
            entries, debounce, ..
        } = self;

        for (index, entry) in entries.iter_mut().enumerate() {
            let CompiledAction {
                condition,
                body,
                debounce: window,
                offered_anchor,
                ..
            } = entry;
            let window = *window;

            if let EntryBody::Direct { action, lane } = *body {
                if lane.is_secondary() {
                    continue;
                }
                if let Some(window) = window
                    && debounce.is_active(index, window.key(anchor), window.interval_ms, now)
                {
                    continue;
                }
                if !condition.evaluate(snapshot, Some(anchor)) {
                    continue;
                }
                if let Some(window) = window {
                    debounce.stamp(index, window.key(anchor), now);
                }
                return Suggestion::new(action, lane);
            }

            let Some(sequence) = body.sequence_for(anchor) else {
                continue;
            };
            let idle = sequence.is_at_start() || sequence.is_complete();
            if idle
                && let Some(window) = window
                && debounce.is_active(index, window.key(anchor), window.interval_ms, now)
            {
                continue;
            }
            if !condition.evaluate(snapshot, Some(anchor)) {
                continue;
            }
            let Some(sequence) = body.offer_sequence(anchor) else {
                continue;
            };
            if sequence.is_complete() {
                sequence.reset();
            }
            let Some(step) = sequence.try_peek_next() else {
                continue;
            };
            *offered_anchor = Some(anchor);
            return Suggestion::new(step.action, step.lane);
        }

        Suggestion::identity(anchor)
    }

    /// Secondary-lane pass: at most one ready secondary action.
    ///
    /// Candidates are direct secondary entries and sequences whose next step
    /// is on the secondary lane. Readiness is checked here on top of the
    /// entry's condition.
    pub fn evaluate_secondary(
        &mut self,
        snapshot: &WorldSnapshot,
        anchor: ActionId,
        now: Timestamp,
    ) -> Option<Suggestion> {
        let Self {
            entries, debounce, ..
        } = self;

        for (index, entry) in entries.iter_mut().enumerate() {
            let CompiledAction {
                condition,
                body,
                debounce: window,
                offered_anchor,
                ..
            } = entry;
            let window = *window;
            let blocked = |idle: bool| {
                idle && window
                    .is_some_and(|w| debounce.is_active(index, w.key(anchor), w.interval_ms, now))
            };

            if let EntryBody::Direct { action, lane } = *body {
                if lane.is_primary()
                    || blocked(true)
                    || !condition.evaluate(snapshot, Some(anchor))
                    || !snapshot.is_action_ready(action)
                {
                    continue;
                }
                if let Some(window) = window {
                    debounce.stamp(index, window.key(anchor), now);
                }
                return Some(Suggestion::new(action, lane));
            }

            let Some(sequence) = body.sequence_for(anchor) else {
                continue;
            };
            let idle = sequence.is_at_start() || sequence.is_complete();
            let next = if sequence.is_complete() {
                sequence.steps().first()
            } else {
                sequence.try_peek_next()
            };
            let Some(step) = next.filter(|step| step.lane.is_secondary()) else {
                continue;
            };
            let action = step.action;
            if blocked(idle)
                || !condition.evaluate(snapshot, Some(anchor))
                || !snapshot.is_action_ready(action)
            {
                continue;
            }
            if let Some(sequence) = body.offer_sequence(anchor)
                && sequence.is_complete()
            {
                sequence.reset();
            }
            *offered_anchor = Some(anchor);
            return Some(Suggestion::new(action, Lane::Secondary));
        }
        None
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    /// Routes a confirmed (or failed) action use to every owned sequence.
    ///
    /// A sequence entry's debounce window opens when its first step is
    /// confirmed.
    pub fn on_action_used(
        &mut self,
        success: bool,
        action: ActionId,
        snapshot: &WorldSnapshot,
        now: Timestamp,
    ) {
        let fallback = self.anchor();
        let Self {
            entries, debounce, ..
        } = self;

        for (index, entry) in entries.iter_mut().enumerate() {
            let Some(sequence) = entry.body.feedback_sequence() else {
                continue;
            };
            let Some(transition) = sequence.on_action_used(success, action, snapshot) else {
                continue;
            };
            if transition.from_start
                && let Some(window) = entry.debounce
            {
                let anchor = entry.offered_anchor.unwrap_or(fallback);
                debounce.stamp(index, window.key(anchor), now);
            }
        }
    }

    /// Rewinds every sequence and forgets all debounce windows.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.reset();
        }
        self.debounce.clear();
    }

    /// Last debounce stamp of entry `index`, for diagnostics.
    pub fn last_fire(&self, index: usize, key: Option<ActionId>) -> Option<Timestamp> {
        self.debounce.last_fire(index, key)
    }
}

/// Validating builder for [`Rule`].
#[derive(Debug)]
#[must_use]
pub struct RuleBuilder {
    anchors: ArrayVec<ActionId, { EngineConfig::MAX_ANCHORS }>,
    entries: ArrayVec<CompiledAction, { EngineConfig::MAX_RULE_ENTRIES }>,
    order: EntryOrder,
    error: Option<ProfileError>,
}

impl RuleBuilder {
    fn new(anchor: ActionId) -> Self {
        Self {
            anchors: ArrayVec::new(),
            entries: ArrayVec::new(),
            order: EntryOrder::Insertion,
            error: None,
        }
        .also_anchor(anchor)
    }

    /// Registers another anchor served by the same entries.
    pub fn also_anchor(mut self, anchor: ActionId) -> Self {
        if anchor.is_none() {
            self.error.get_or_insert(ProfileError::ReservedAction);
        } else if self.anchors.contains(&anchor) {
            self.error.get_or_insert(ProfileError::DuplicateAnchor { anchor });
        } else if self.anchors.try_push(anchor).is_err() {
            self.error
                .get_or_insert(ProfileError::capacity(CapacityKind::Anchors, EngineConfig::MAX_ANCHORS));
        }
        self
    }

    pub fn entry(mut self, entry: CompiledAction) -> Self {
        if let Err(err) = entry.validate() {
            self.error.get_or_insert(err);
        } else if self.entries.try_push(entry).is_err() {
            self.error.get_or_insert(ProfileError::capacity(
                CapacityKind::RuleEntries,
                EngineConfig::MAX_RULE_ENTRIES,
            ));
        }
        self
    }

    pub fn order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    /// # Errors
    ///
    /// Returns the first error recorded while adding anchors or entries.
    pub fn build(self) -> Result<Rule, ProfileError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut entries = self.entries;
        if self.order == EntryOrder::Priority {
            entries.sort_by_key(|entry| entry.priority);
        }
        let debounce = DebounceStore::with_entries(entries.len());
        Ok(Rule {
            anchors: self.anchors,
            entries,
            debounce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::observer::{FixtureObserver, PlayerState, WorldFixture};
    use crate::sequence::{Advance, Sequence, SequenceStep};
    use crate::types::ObjectId;

    const ANCHOR: ActionId = ActionId(100);

    fn snapshot() -> WorldSnapshot {
        let world = WorldFixture {
            player: Some(PlayerState {
                id: ObjectId(1),
                level: 90,
                alive: true,
                ..PlayerState::default()
            }),
            ..WorldFixture::default()
        }
        .in_combat();
        let mut snapshot = WorldSnapshot::new(FixtureObserver::new(world));
        snapshot.update();
        snapshot
    }

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn no_match_returns_the_anchor_on_primary() {
        let s = snapshot();
        let mut rule = Rule::builder(ANCHOR)
            .entry(CompiledAction::primary(ActionId(5)).when(Condition::Never))
            .build()
            .unwrap();
        assert_eq!(rule.evaluate(&s, ANCHOR, at(0)), Suggestion::identity(ANCHOR));

        let mut empty = Rule::builder(ANCHOR).build().unwrap();
        assert_eq!(empty.evaluate(&s, ANCHOR, at(0)), Suggestion::new(ANCHOR, Lane::Primary));
    }

    #[test]
    fn debounced_entry_reopens_at_interval() {
        let s = snapshot();
        let mut rule = Rule::builder(ANCHOR)
            .entry(CompiledAction::primary(ActionId(5)).debounce_ms(3000))
            .build()
            .unwrap();
        let fired = Suggestion::new(ActionId(5), Lane::Primary);

        assert_eq!(rule.evaluate(&s, ANCHOR, at(1000)), fired);
        assert_eq!(rule.evaluate(&s, ANCHOR, at(1001)).action, ANCHOR);
        assert_eq!(rule.evaluate(&s, ANCHOR, at(3999)).action, ANCHOR);
        assert_eq!(rule.evaluate(&s, ANCHOR, at(4000)), fired);
    }

    #[test]
    fn per_anchor_debounce_keeps_separate_windows() {
        let s = snapshot();
        let other = ActionId(101);
        let mut rule = Rule::builder(ANCHOR)
            .also_anchor(other)
            .entry(CompiledAction::primary(ActionId(5)).debounce_ms(3000).per_anchor())
            .build()
            .unwrap();
        assert_eq!(rule.evaluate(&s, ANCHOR, at(0)).action, ActionId(5));
        assert_eq!(rule.evaluate(&s, ANCHOR, at(10)).action, ANCHOR);
        assert_eq!(rule.evaluate(&s, other, at(10)).action, ActionId(5));
    }

    #[test]
    fn priority_order_can_diverge_from_insertion() {
        let s = snapshot();
        let builder = || {
            Rule::builder(ANCHOR)
                .entry(CompiledAction::primary(ActionId(1)).priority(20))
                .entry(CompiledAction::primary(ActionId(2)).priority(10))
                .entry(CompiledAction::primary(ActionId(3)).priority(10))
        };
        let mut insertion = builder().build().unwrap();
        assert_eq!(insertion.evaluate(&s, ANCHOR, at(0)).action, ActionId(1));

        let mut priority = builder().order(EntryOrder::Priority).build().unwrap();
        assert_eq!(priority.evaluate(&s, ANCHOR, at(0)).action, ActionId(2));
        let order: Vec<_> = priority
            .entries()
            .iter()
            .map(|e| match e.body() {
                EntryBody::Direct { action, .. } => *action,
                _ => ActionId::NONE,
            })
            .collect();
        assert_eq!(order, vec![ActionId(2), ActionId(3), ActionId(1)]);
    }

    #[test]
    fn sequence_debounce_starts_on_confirmed_first_step() {
        let s = snapshot();
        let mut rule = Rule::builder(ANCHOR)
            .entry(
                CompiledAction::sequence(Sequence::two_step_guaranteed(ActionId(7561), ActionId(125)))
                    .debounce_ms(3000),
            )
            .build()
            .unwrap();

        // offered repeatedly until it actually starts
        assert_eq!(rule.evaluate(&s, ANCHOR, at(0)).action, ActionId(7561));
        assert_eq!(rule.evaluate(&s, ANCHOR, at(100)).action, ActionId(7561));

        rule.on_action_used(true, ActionId(7561), &s, at(200));
        assert_eq!(rule.evaluate(&s, ANCHOR, at(300)).action, ActionId(125), "mid-sequence ignores debounce");

        rule.on_action_used(true, ActionId(125), &s, at(400));
        assert_eq!(rule.evaluate(&s, ANCHOR, at(500)).action, ANCHOR);
        assert_eq!(rule.evaluate(&s, ANCHOR, at(3200)).action, ActionId(7561));
    }

    #[test]
    fn completed_sequence_restarts_when_condition_refires() {
        let s = snapshot();
        let mut rule = Rule::builder(ANCHOR)
            .entry(CompiledAction::sequence(
                Sequence::from_steps([SequenceStep::primary(ActionId(9)).then(Advance::Terminal)]).unwrap(),
            ))
            .build()
            .unwrap();
        assert_eq!(rule.evaluate(&s, ANCHOR, at(0)).action, ActionId(9));
        rule.on_action_used(true, ActionId(9), &s, at(0));
        assert_eq!(rule.evaluate(&s, ANCHOR, at(1)).action, ActionId(9));
    }

    #[test]
    fn branch_entry_follows_the_pressed_anchor() {
        let s = snapshot();
        let aoe = ActionId(200);
        let branch = AnchorBranch::st_aoe(
            ANCHOR,
            Sequence::two_step_guaranteed(ActionId(1), ActionId(2)),
            aoe,
            Sequence::two_step_guaranteed(ActionId(1), ActionId(3)),
        )
        .unwrap();
        let mut rule = Rule::builder(ANCHOR)
            .also_anchor(aoe)
            .entry(CompiledAction::branch(branch))
            .build()
            .unwrap();

        assert_eq!(rule.evaluate(&s, aoe, at(0)).action, ActionId(1));
        rule.on_action_used(true, ActionId(1), &s, at(0));
        assert_eq!(rule.evaluate(&s, aoe, at(1)).action, ActionId(3));
        assert_eq!(rule.evaluate(&s, ANCHOR, at(1)).action, ActionId(1), "single-target arm untouched");
    }

    #[test]
    fn secondary_pass_requires_readiness() {
        let s = snapshot();
        let observer_cd = ActionId(3571);
        let mut rule = Rule::builder(ANCHOR)
            .entry(CompiledAction::secondary(observer_cd))
            .entry(CompiledAction::primary(ActionId(5)).when(Condition::Never))
            .build()
            .unwrap();

        assert_eq!(rule.evaluate(&s, ANCHOR, at(0)), Suggestion::identity(ANCHOR));
        assert_eq!(
            rule.evaluate_secondary(&s, ANCHOR, at(0)),
            Some(Suggestion::new(observer_cd, Lane::Secondary))
        );

        let mut s = s;
        s.mark_action_used(observer_cd);
        assert_eq!(rule.evaluate_secondary(&s, ANCHOR, at(0)), None);
    }

    #[test]
    fn builder_rejects_bad_configuration() {
        let too_many = (1..=33).fold(Rule::builder(ANCHOR), |b, i| b.entry(CompiledAction::primary(ActionId(i))));
        assert_eq!(
            too_many.build().unwrap_err(),
            ProfileError::capacity(CapacityKind::RuleEntries, 32)
        );
        assert_eq!(
            Rule::builder(ANCHOR).also_anchor(ANCHOR).build().unwrap_err(),
            ProfileError::DuplicateAnchor { anchor: ANCHOR }
        );
        assert_eq!(
            Rule::builder(ANCHOR)
                .entry(CompiledAction::sequence(Sequence::new()))
                .build()
                .unwrap_err(),
            ProfileError::EmptySequence
        );
    }

    #[test]
    fn reset_rewinds_sequences_and_debounce() {
        let s = snapshot();
        let mut rule = Rule::builder(ANCHOR)
            .entry(CompiledAction::primary(ActionId(5)).debounce_ms(3000))
            .build()
            .unwrap();
        rule.evaluate(&s, ANCHOR, at(0));
        assert!(rule.last_fire(0, None).is_some());
        rule.reset();
        assert_eq!(rule.last_fire(0, None), None);
        assert_eq!(rule.evaluate(&s, ANCHOR, at(1)).action, ActionId(5));
    }
}
