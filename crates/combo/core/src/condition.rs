//! Inspectable rule conditions.
//!
//! A [`Condition`] is a pure function of the snapshot and the anchor being
//! resolved. The common shapes are enum variants so rules can be printed,
//! compared in tests, and composed with `&`, `|`, and `!`. Job-specific logic
//! that does not fit a variant goes through [`Condition::Predicate`].
use core::ops::{BitAnd, BitOr, Not};

use crate::observer::GaugeCheck;
use crate::snapshot::WorldSnapshot;
use crate::types::{ActionId, StatusId};

/// Named predicate over the snapshot and the current anchor.
pub type PredicateFn = fn(&WorldSnapshot, Option<ActionId>) -> bool;

#[derive(Clone, Debug, Default)]
pub enum Condition {
    #[default]
    Always,
    Never,
    /// The press being resolved is this anchor.
    AnchorIs(ActionId),
    ActionReady(ActionId),
    /// Remaining cooldown of the action is at most this many milliseconds.
    CooldownWithin { action: ActionId, ms: u32 },
    PlayerHasStatus(StatusId),
    /// Player resource (MP) is at or below the amount.
    ResourceAtMost(u32),
    ResourceAtLeast(u32),
    LevelAtLeast(u8),
    InCombat,
    Moving,
    HasTarget,
    DebuffNeedsRefresh { action: ActionId, threshold_ms: u32 },
    AnyPartyDead,
    /// At least `count` living party members at or below `percent` health.
    PartyAtOrBelow { percent: u8, count: u8 },
    Gauge(GaugeCheck),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
    Predicate(&'static str, PredicateFn),
}

impl Condition {
    pub fn evaluate(&self, snapshot: &WorldSnapshot, anchor: Option<ActionId>) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::AnchorIs(expected) => anchor == Some(*expected),
            Self::ActionReady(action) => snapshot.is_action_ready(*action),
            Self::CooldownWithin { action, ms } => snapshot
                .cooldown_remaining_ms(*action)
                .is_some_and(|remaining| remaining <= *ms),
            Self::PlayerHasStatus(status) => snapshot.player_has_status(*status),
            Self::ResourceAtMost(amount) => snapshot.player().is_some_and(|p| p.mp <= *amount),
            Self::ResourceAtLeast(amount) => snapshot.player().is_some_and(|p| p.mp >= *amount),
            Self::LevelAtLeast(level) => snapshot.player_level() >= *level,
            Self::InCombat => snapshot.in_combat(),
            Self::Moving => snapshot.is_moving(),
            Self::HasTarget => snapshot.hard_target().is_some(),
            Self::DebuffNeedsRefresh {
                action,
                threshold_ms,
            } => snapshot.does_debuff_need_refresh(*action, *threshold_ms),
            Self::AnyPartyDead => snapshot.any_party_dead(),
            Self::PartyAtOrBelow { percent, count } => {
                snapshot.count_party_at_or_below(*percent) >= *count as usize
            }
            Self::Gauge(check) => snapshot.gauge().satisfies(*check),
            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(snapshot, anchor)),
            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(snapshot, anchor)),
            Self::Not(inner) => !inner.evaluate(snapshot, anchor),
            Self::Predicate(_, predicate) => predicate(snapshot, anchor),
        }
    }

    /// Wraps a named function pointer.
    pub const fn predicate(name: &'static str, predicate: PredicateFn) -> Self {
        Self::Predicate(name, predicate)
    }
}

impl BitAnd for Condition {
    type Output = Condition;

    fn bitand(self, rhs: Condition) -> Condition {
        match self {
            Self::All(mut conditions) => {
                conditions.push(rhs);
                Self::All(conditions)
            }
            lhs => Self::All(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Condition {
    type Output = Condition;

    fn bitor(self, rhs: Condition) -> Condition {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(rhs);
                Self::Any(conditions)
            }
            lhs => Self::Any(vec![lhs, rhs]),
        }
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}
