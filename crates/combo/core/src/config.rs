/// Engine capacities and tunable timing parameters.
///
/// Capacities are compile-time constants used as `ArrayVec` type parameters;
/// configuration that would exceed one of them is rejected with
/// [`ProfileError::CapacityExceeded`](crate::ProfileError::CapacityExceeded).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Minimum interval between two successful secondary-lane suggestions.
    pub secondary_throttle_ms: u32,
    /// Safety timeout after which an armed opener is forcibly deactivated.
    pub opener_timeout_ms: u32,
    /// Squared positional delta above which the player counts as moving.
    pub movement_epsilon_sq: f32,
    /// Consecutive still ticks required before the movement flag clears.
    pub movement_settle_ticks: u8,
}

impl EngineConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_PARTY: usize = 8;
    pub const MAX_TRACKED_COOLDOWNS: usize = 16;
    pub const MAX_DEBUFF_MAPPINGS: usize = 16;
    pub const MAX_STATUSES_PER_DEBUFF: usize = 3;
    /// One rule per anchor, so this also bounds the rules of a profile.
    pub const MAX_ANCHORS: usize = 8;
    pub const MAX_RULE_ENTRIES: usize = 32;
    pub const MAX_SEQUENCE_STEPS: usize = 8;
    pub const MAX_BRANCHES: usize = 4;
    pub const MAX_CANDIDATES: usize = 4;
    pub const MAX_RETRACE_ACTIONS: usize = 32;
    pub const MAX_OPENER_STEPS: usize = 24;
    /// Job identifiers at or above this value map to [`Role::Unknown`](crate::Role::Unknown).
    pub const MAX_JOB_ID: usize = 64;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SECONDARY_THROTTLE_MS: u32 = 400;
    pub const DEFAULT_OPENER_TIMEOUT_MS: u32 = 30_000;
    pub const DEFAULT_MOVEMENT_EPSILON_SQ: f32 = 0.0001;
    pub const DEFAULT_MOVEMENT_SETTLE_TICKS: u8 = 3;

    pub const fn new() -> Self {
        Self {
            secondary_throttle_ms: Self::DEFAULT_SECONDARY_THROTTLE_MS,
            opener_timeout_ms: Self::DEFAULT_OPENER_TIMEOUT_MS,
            movement_epsilon_sq: Self::DEFAULT_MOVEMENT_EPSILON_SQ,
            movement_settle_ticks: Self::DEFAULT_MOVEMENT_SETTLE_TICKS,
        }
    }

    #[must_use]
    pub const fn with_secondary_throttle_ms(mut self, ms: u32) -> Self {
        self.secondary_throttle_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_opener_timeout_ms(mut self, ms: u32) -> Self {
        self.opener_timeout_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_movement_settle_ticks(mut self, ticks: u8) -> Self {
        self.movement_settle_ticks = ticks;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
