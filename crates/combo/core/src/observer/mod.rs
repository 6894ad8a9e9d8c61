//! Read-only boundary to the host world.
//!
//! The [`Observer`] trait is the only way the engine learns anything about the
//! host. Implementations extract player, party, target, cooldown, and status
//! data from wherever the host keeps it; the engine only ever reads through
//! it, once per tick into [`WorldSnapshot`](crate::WorldSnapshot) plus the
//! few probes that are deliberately left uncached.
mod fixture;
mod gauge;

pub use fixture::{
    CooldownFixture, FixtureHandle, FixtureObserver, TargetStatusFixture, WorldFixture,
};
pub use gauge::{Gauge, GaugeCheck, SageGauge, WhiteMageGauge};

use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::types::{ActionId, JobId, ObjectId, Position, StatusId};

/// Party list as reported by the host, at most [`EngineConfig::MAX_PARTY`] members.
pub type PartyList = ArrayVec<PartyMember, { EngineConfig::MAX_PARTY }>;

/// Local player state for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerState {
    pub id: ObjectId,
    pub position: Position,
    pub level: u8,
    pub job: JobId,
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub alive: bool,
}

impl PlayerState {
    pub fn health_percent(&self) -> u8 {
        health_percent(self.hp, self.max_hp)
    }
}

/// One party slot.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PartyMember {
    pub id: ObjectId,
    pub job: JobId,
    pub health_percent: u8,
    pub alive: bool,
    pub position: Position,
}

impl PartyMember {
    #[inline]
    pub const fn is_dead(&self) -> bool {
        !self.alive || self.health_percent == 0
    }
}

/// Any visible character, enumerated by [`Observer::for_each_character`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CharacterState {
    pub id: ObjectId,
    pub job: JobId,
    pub hp: u32,
    pub max_hp: u32,
    pub position: Position,
}

impl CharacterState {
    #[inline]
    pub const fn is_dead(&self) -> bool {
        self.hp == 0
    }

    pub fn health_percent(&self) -> u8 {
        health_percent(self.hp, self.max_hp)
    }
}

/// Hard, focus, and soft target of the local player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Targets {
    pub hard: Option<ObjectId>,
    pub focus: Option<ObjectId>,
    pub soft: Option<ObjectId>,
}

bitflags::bitflags! {
    /// Combat-relevant player flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct CombatFlags: u8 {
        const IN_COMBAT = 1 << 0;
        const MOUNTED = 1 << 1;
        const CASTING = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Host conditions that suspend per-tick work entirely.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct HostFlags: u8 {
        const BETWEEN_AREAS = 1 << 0;
        const WATCHING_CUTSCENE = 1 << 1;
        const OCCUPIED_IN_EVENT = 1 << 2;
        const IN_SANCTUARY = 1 << 3;
    }
}

/// Read-only view of the host world.
///
/// All methods are total: absent data is `None`, `false`, or empty. The
/// engine treats "no data" as "no override".
pub trait Observer {
    fn local_player(&self) -> Option<PlayerState>;

    fn targets(&self) -> Targets;

    fn combat_flags(&self) -> CombatFlags;

    fn party(&self) -> PartyList;

    /// Visits every visible character once. Each call restarts the scan.
    fn for_each_character(&self, visit: &mut dyn FnMut(&CharacterState));

    fn can_use_action_on(&self, action: ActionId, target: ObjectId) -> bool;

    /// Direct, uncached readiness probe.
    fn is_action_ready(&self, action: ActionId) -> bool;

    fn action_remaining_ms(&self, action: ActionId) -> Option<u32>;

    fn player_has_status(&self, status: StatusId) -> bool;

    fn has_cleansable_debuff(&self, target: ObjectId) -> bool;

    /// Longest remaining time, in seconds, among `statuses` on `target`.
    ///
    /// Returns `Some(0.0)` when none of them is present and `None` when the
    /// target cannot be inspected at all.
    fn max_status_remaining(&self, target: ObjectId, statuses: &[StatusId]) -> Option<f32>;

    fn gauge(&self, _job: JobId) -> Gauge {
        Gauge::None
    }

    fn host_flags(&self) -> HostFlags {
        HostFlags::empty()
    }
}

/// Integer health percentage clamped to `0..=100`.
///
/// A living character never reports `0`; that value is reserved for dead ones.
pub fn health_percent(current: u32, max: u32) -> u8 {
    if current == 0 || max == 0 {
        return 0;
    }
    let pct = (u64::from(current) * 100 / u64::from(max)).clamp(1, 100);
    pct as u8
}
