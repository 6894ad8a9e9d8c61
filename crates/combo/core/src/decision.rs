use core::fmt;

use crate::types::{ActionId, ObjectId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DecisionKind {
    /// Perform the pressed action on the current target.
    #[default]
    None,
    TargetOverride,
    ActionOverride,
    ActionAndTargetOverride,
}

/// Outcome of one resolution: what to perform and at whom.
///
/// `action` and `target` are only set when they differ from the press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    kind: DecisionKind,
    action: Option<ActionId>,
    target: Option<ObjectId>,
}

impl Decision {
    pub const NONE: Self = Self {
        kind: DecisionKind::None,
        action: None,
        target: None,
    };

    /// Builds the decision from what was pressed and what resolution chose.
    ///
    /// An override equal to the pressed action or the current target is not
    /// an override.
    pub fn compose(
        pressed: ActionId,
        replacement: Option<ActionId>,
        current_target: Option<ObjectId>,
        forced_target: Option<ObjectId>,
    ) -> Self {
        let action = replacement.filter(|&a| a != pressed && !a.is_none());
        let target = forced_target.filter(|&t| Some(t) != current_target && !t.is_none());
        let kind = match (action, target) {
            (None, None) => DecisionKind::None,
            (None, Some(_)) => DecisionKind::TargetOverride,
            (Some(_), None) => DecisionKind::ActionOverride,
            (Some(_), Some(_)) => DecisionKind::ActionAndTargetOverride,
        };
        Self {
            kind,
            action,
            target,
        }
    }

    pub fn kind(&self) -> DecisionKind {
        self.kind
    }

    pub fn action(&self) -> Option<ActionId> {
        self.action
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    pub fn is_none(&self) -> bool {
        self.kind == DecisionKind::None
    }

    /// Action the host should actually perform.
    pub fn action_or(&self, pressed: ActionId) -> ActionId {
        self.action.unwrap_or(pressed)
    }

    /// Target the host should actually use.
    pub fn target_or(&self, current: Option<ObjectId>) -> Option<ObjectId> {
        self.target.or(current)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind: &'static str = self.kind.into();
        f.write_str(kind)?;
        if let Some(action) = self.action {
            write!(f, " action={action}")?;
        }
        if let Some(target) = self.target {
            write!(f, " target={target}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESSED: ActionId = ActionId(100);
    const CURRENT: ObjectId = ObjectId(7);

    #[test]
    fn compose_classifies_changes() {
        let none = Decision::compose(PRESSED, Some(PRESSED), Some(CURRENT), Some(CURRENT));
        assert_eq!(none, Decision::NONE);

        let act = Decision::compose(PRESSED, Some(ActionId(5)), Some(CURRENT), None);
        assert_eq!(act.kind(), DecisionKind::ActionOverride);
        assert_eq!(act.action_or(PRESSED), ActionId(5));
        assert_eq!(act.target_or(Some(CURRENT)), Some(CURRENT));

        let tgt = Decision::compose(PRESSED, None, Some(CURRENT), Some(ObjectId(8)));
        assert_eq!(tgt.kind(), DecisionKind::TargetOverride);
        assert_eq!(tgt.action(), None);

        let both = Decision::compose(PRESSED, Some(ActionId(5)), None, Some(ObjectId(8)));
        assert_eq!(both.kind(), DecisionKind::ActionAndTargetOverride);
        assert_eq!(both.to_string(), "action_and_target_override action=5 target=0x00000008");
    }
}
