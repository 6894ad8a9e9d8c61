use arrayvec::ArrayVec;

use super::debounce::Debounce;
use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::sequence::Sequence;
use crate::types::{ActionId, Lane};

/// What a rule entry produces once its condition passes.
#[derive(Clone, Debug)]
pub enum EntryBody {
    Direct { action: ActionId, lane: Lane },
    Sequence(Sequence),
    Branch(AnchorBranch),
}

impl EntryBody {
    /// Sequence this body would drive for `anchor`, without recording the choice.
    pub(crate) fn sequence_for(&self, anchor: ActionId) -> Option<&Sequence> {
        match self {
            Self::Direct { .. } => None,
            Self::Sequence(sequence) => Some(sequence),
            Self::Branch(branch) => branch.select(anchor).and_then(|arm| branch.arm(arm)),
        }
    }

    /// Like [`sequence_for`](Self::sequence_for), remembering a branch's choice
    /// so confirmed use is routed back to the same sequence.
    pub(crate) fn offer_sequence(&mut self, anchor: ActionId) -> Option<&mut Sequence> {
        match self {
            Self::Direct { .. } => None,
            Self::Sequence(sequence) => Some(sequence),
            Self::Branch(branch) => {
                let arm = branch.select(anchor)?;
                branch.offered = Some(arm);
                branch.arm_mut(arm)
            }
        }
    }

    /// Sequence that receives action-use feedback.
    pub(crate) fn feedback_sequence(&mut self) -> Option<&mut Sequence> {
        match self {
            Self::Direct { .. } => None,
            Self::Sequence(sequence) => Some(sequence),
            Self::Branch(branch) => {
                let arm = branch.offered?;
                branch.arm_mut(arm)
            }
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Direct { .. } => {}
            Self::Sequence(sequence) => sequence.reset(),
            Self::Branch(branch) => branch.reset(),
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        match self {
            Self::Direct { action, .. } if action.is_none() => Err(ProfileError::ReservedAction),
            Self::Direct { .. } => Ok(()),
            Self::Sequence(sequence) => sequence.validate(),
            Self::Branch(branch) => branch.validate(),
        }
    }
}

/// One condition-gated entry of a [`Rule`](super::Rule).
#[derive(Clone, Debug)]
pub struct CompiledAction {
    pub(crate) condition: Condition,
    pub(crate) priority: i32,
    pub(crate) body: EntryBody,
    pub(crate) debounce: Option<Debounce>,
    /// Anchor under which this entry's sequence was last offered.
    pub(crate) offered_anchor: Option<ActionId>,
}

impl CompiledAction {
    fn with_body(body: EntryBody) -> Self {
        Self {
            condition: Condition::Always,
            priority: 0,
            body,
            debounce: None,
            offered_anchor: None,
        }
    }

    pub fn direct(action: ActionId, lane: Lane) -> Self {
        Self::with_body(EntryBody::Direct { action, lane })
    }

    pub fn primary(action: ActionId) -> Self {
        Self::direct(action, Lane::Primary)
    }

    pub fn secondary(action: ActionId) -> Self {
        Self::direct(action, Lane::Secondary)
    }

    pub fn sequence(sequence: Sequence) -> Self {
        Self::with_body(EntryBody::Sequence(sequence))
    }

    pub fn branch(branch: AnchorBranch) -> Self {
        Self::with_body(EntryBody::Branch(branch))
    }

    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Ordering key used by [`EntryOrder::Priority`](super::EntryOrder::Priority); lower runs first.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn debounce_ms(mut self, interval_ms: u32) -> Self {
        let per_anchor = self.debounce.is_some_and(|d| d.per_anchor);
        self.debounce = Some(Debounce {
            interval_ms,
            per_anchor,
        });
        self
    }

    /// Keys the debounce window by anchor. No effect without [`debounce_ms`](Self::debounce_ms).
    #[must_use]
    pub fn per_anchor(mut self) -> Self {
        if let Some(debounce) = self.debounce.as_mut() {
            debounce.per_anchor = true;
        }
        self
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn body(&self) -> &EntryBody {
        &self.body
    }

    pub fn debounce(&self) -> Option<Debounce> {
        self.debounce
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.body, EntryBody::Direct { .. })
    }

    pub(crate) fn reset(&mut self) {
        self.body.reset();
        self.offered_anchor = None;
    }

    pub(crate) fn validate(&self) -> Result<(), ProfileError> {
        self.body.validate()
    }
}

/// Index of the sequence a branch picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BranchArm {
    Keyed(usize),
    Default,
}

/// Sequences selected by the pressed anchor, with an optional fallback.
#[derive(Clone, Debug, Default)]
pub struct AnchorBranch {
    arms: ArrayVec<(ActionId, Sequence), { EngineConfig::MAX_BRANCHES }>,
    default: Option<Sequence>,
    offered: Option<BranchArm>,
}

impl AnchorBranch {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Rejects an anchor that already has a sequence and more than
    /// [`EngineConfig::MAX_BRANCHES`] keyed sequences.
    pub fn on(mut self, anchor: ActionId, sequence: Sequence) -> Result<Self, ProfileError> {
        if self.arms.iter().any(|(a, _)| *a == anchor) {
            return Err(ProfileError::DuplicateAnchor { anchor });
        }
        self.arms
            .try_push((anchor, sequence))
            .map_err(|_| ProfileError::capacity(CapacityKind::Branches, EngineConfig::MAX_BRANCHES))?;
        Ok(self)
    }

    #[must_use]
    pub fn otherwise(mut self, sequence: Sequence) -> Self {
        self.default = Some(sequence);
        self
    }

    /// Single-target / area pairing.
    ///
    /// # Errors
    ///
    /// Fails when both anchors are the same action.
    pub fn st_aoe(
        st_anchor: ActionId,
        st_sequence: Sequence,
        aoe_anchor: ActionId,
        aoe_sequence: Sequence,
    ) -> Result<Self, ProfileError> {
        Self::new()
            .on(st_anchor, st_sequence)?
            .on(aoe_anchor, aoe_sequence)
    }

    pub fn anchors(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.arms.iter().map(|(anchor, _)| *anchor)
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn select(&self, anchor: ActionId) -> Option<BranchArm> {
        match self.arms.iter().position(|(a, _)| *a == anchor) {
            Some(index) => Some(BranchArm::Keyed(index)),
            None => self.default.as_ref().map(|_| BranchArm::Default),
        }
    }

    fn arm(&self, arm: BranchArm) -> Option<&Sequence> {
        match arm {
            BranchArm::Keyed(index) => self.arms.get(index).map(|(_, s)| s),
            BranchArm::Default => self.default.as_ref(),
        }
    }

    fn arm_mut(&mut self, arm: BranchArm) -> Option<&mut Sequence> {
        match arm {
            BranchArm::Keyed(index) => self.arms.get_mut(index).map(|(_, s)| s),
            BranchArm::Default => self.default.as_mut(),
        }
    }

    fn reset(&mut self) {
        for (_, sequence) in &mut self.arms {
            sequence.reset();
        }
        if let Some(sequence) = self.default.as_mut() {
            sequence.reset();
        }
        self.offered = None;
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.arms.is_empty() && self.default.is_none() {
            return Err(ProfileError::EmptyBranch);
        }
        self.arms
            .iter()
            .map(|(_, s)| s)
            .chain(self.default.as_ref())
            .try_for_each(Sequence::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceStep;

    fn seq(first: u32) -> Sequence {
        Sequence::from_steps([SequenceStep::primary(ActionId(first))]).unwrap()
    }

    #[test]
    fn branch_prefers_keyed_arm_then_default() {
        let branch = AnchorBranch::st_aoe(ActionId(1), seq(10), ActionId(2), seq(20))
            .unwrap()
            .otherwise(seq(30));
        let body = EntryBody::Branch(branch);
        let first = |anchor| body.sequence_for(ActionId(anchor)).and_then(|s| s.try_peek_next()).map(|s| s.action);
        assert_eq!(first(1), Some(ActionId(10)));
        assert_eq!(first(2), Some(ActionId(20)));
        assert_eq!(first(3), Some(ActionId(30)));
    }

    #[test]
    fn branch_without_default_has_no_fallback() {
        let body = EntryBody::Branch(AnchorBranch::new().on(ActionId(1), seq(10)).unwrap());
        assert!(body.sequence_for(ActionId(9)).is_none());
    }

    #[test]
    fn feedback_goes_to_the_offered_arm_only() {
        let branch = AnchorBranch::st_aoe(ActionId(1), seq(10), ActionId(2), seq(20)).unwrap();
        let mut body = EntryBody::Branch(branch);
        assert!(body.feedback_sequence().is_none());
        body.offer_sequence(ActionId(2));
        let target = body.feedback_sequence().and_then(|s| s.try_peek_next()).map(|s| s.action);
        assert_eq!(target, Some(ActionId(20)));
    }

    #[test]
    fn branch_validation() {
        assert_eq!(AnchorBranch::new().validate(), Err(ProfileError::EmptyBranch));
        assert_eq!(
            AnchorBranch::new()
                .on(ActionId(1), seq(10))
                .and_then(|b| b.on(ActionId(1), seq(11)))
                .unwrap_err(),
            ProfileError::DuplicateAnchor { anchor: ActionId(1) }
        );
        let full = (1..=4).try_fold(AnchorBranch::new(), |b, i| b.on(ActionId(i), seq(i)));
        assert!(full.unwrap().on(ActionId(5), seq(5)).is_err());
    }

    #[test]
    fn per_anchor_needs_a_debounce_window() {
        let entry = CompiledAction::primary(ActionId(5)).debounce_ms(3000).per_anchor();
        assert_eq!(
            entry.debounce(),
            Some(Debounce {
                interval_ms: 3000,
                per_anchor: true
            })
        );
        let plain = CompiledAction::primary(ActionId(5)).per_anchor();
        assert_eq!(plain.debounce(), None);
        assert_eq!(CompiledAction::primary(ActionId::NONE).validate(), Err(ProfileError::ReservedAction));
    }
}
