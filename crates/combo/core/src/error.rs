//! Common error infrastructure for combo-core.
//!
//! Almost every degraded state in the engine is modelled as data (an absent
//! target, a stalled sequence, an empty candidate list) and surfaces as "no
//! override". The only faults are configuration faults: a job profile that
//! does not fit the fixed capacities or that is internally inconsistent.
//!
//! # Capacity policy
//!
//! Configuration entry points hard-reject. A call that would exceed a fixed
//! capacity returns [`ProfileError::CapacityExceeded`] and leaves the existing
//! configuration untouched; nothing is silently truncated.
use core::fmt;

use crate::types::ActionId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the caller may retry with different input.
    Recoverable,

    /// Validation error - invalid configuration, should not retry without changes.
    ///
    /// Examples: capacity exceeded, duplicate anchor
    Validation,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all combo-core errors.
pub trait ComboError: fmt::Display + fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, suitable for log fields.
    fn error_code(&self) -> &'static str;
}

/// Fixed-capacity storage a configuration call can overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CapacityKind {
    TrackedCooldowns,
    DebuffMappings,
    DebuffStatuses,
    Anchors,
    RuleEntries,
    SequenceSteps,
    Branches,
    RetraceActions,
    OpenerSteps,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &'static str = self.into();
        f.write_str(label)
    }
}

/// Errors raised while assembling rules and job profiles.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("{kind} capacity exceeded (max {capacity})")]
    CapacityExceeded { kind: CapacityKind, capacity: usize },

    #[error("anchor {anchor} already has a rule in this profile")]
    DuplicateAnchor { anchor: ActionId },

    #[error("action id 0 is reserved and cannot be configured")]
    ReservedAction,

    #[error("sequence has no steps")]
    EmptySequence,

    #[error("anchor branch has neither keyed sequences nor a default")]
    EmptyBranch,
}

impl ProfileError {
    pub(crate) const fn capacity(kind: CapacityKind, capacity: usize) -> Self {
        Self::CapacityExceeded { kind, capacity }
    }
}

impl ComboError for ProfileError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "PROFILE_CAPACITY_EXCEEDED",
            Self::DuplicateAnchor { .. } => "PROFILE_DUPLICATE_ANCHOR",
            Self::ReservedAction => "PROFILE_RESERVED_ACTION",
            Self::EmptySequence => "PROFILE_EMPTY_SEQUENCE",
            Self::EmptyBranch => "PROFILE_EMPTY_BRANCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_error_names_the_storage() {
        let err = ProfileError::capacity(CapacityKind::TrackedCooldowns, 16);
        assert_eq!(err.to_string(), "tracked_cooldowns capacity exceeded (max 16)");
        assert_eq!(err.error_code(), "PROFILE_CAPACITY_EXCEEDED");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.severity().as_str(), "validation");
    }
}
