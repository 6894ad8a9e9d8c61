//! RON scenario format.
//!
//! A scenario is an initial world plus a list of frames. Each frame optionally
//! edits the world, advances the clock, ticks the engine once, and then plays
//! its presses in order:
//!
//! ```ron
//! (
//!     name: "sage dot refresh",
//!     in_combat: true,
//!     world: (
//!         player: Some((id: 1, level: 100, job: 40, hp: 1, max_hp: 1, mp: 10000, alive: true)),
//!         targets: (hard: Some(1073741825)),
//!     ),
//!     frames: [
//!         (presses: [(action: 24312, expect: Some(24290))]),
//!         (edits: [TargetStatus(target: 1073741825, status: 2616, remaining_secs: 30.0)]),
//!     ],
//! )
//! ```
use std::path::Path;

use anyhow::Context;
use combo_core::{ActionId, CombatFlags, Gauge, JobId, ObjectId, StatusId, WorldFixture};
use serde::{Deserialize, Serialize};

const fn default_frame_ms() -> u64 {
    100
}

const fn default_success() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    /// Clock advance before every frame unless the frame overrides it.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default)]
    pub in_combat: bool,
    /// Arm the profile's opener right after the first tick.
    #[serde(default)]
    pub opener: bool,
    #[serde(default)]
    pub world: WorldFixture,
    pub frames: Vec<Frame>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let scenario: Scenario = ron::from_str(content).context("Failed to parse scenario RON")?;
        if scenario.frames.is_empty() {
            anyhow::bail!("scenario '{}' has no frames", scenario.name);
        }
        Ok(scenario)
    }

    /// Initial world with the scenario-level combat flag applied.
    pub fn initial_world(&self) -> WorldFixture {
        let mut world = self.world.clone();
        world.combat.set(CombatFlags::IN_COMBAT, self.in_combat);
        world
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Frame {
    pub advance_ms: Option<u64>,
    pub edits: Vec<Edit>,
    pub presses: Vec<Press>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Press {
    pub action: ActionId,
    /// Current target when pressed. Defaults to the world's hard target.
    #[serde(default)]
    pub target: Option<ObjectId>,
    /// Whether the host reports the final action as used successfully.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Action the engine must substitute. `None` means no check.
    #[serde(default)]
    pub expect: Option<ActionId>,
}

/// Incremental world change applied before a frame ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    Combat(bool),
    HardTarget(Option<ObjectId>),
    Level(u8),
    Job(JobId),
    Mp(u32),
    Cooldown { action: ActionId, remaining_ms: u32 },
    TargetStatus { target: ObjectId, status: StatusId, remaining_secs: f32 },
    ClearTargetStatuses,
    PlayerStatus(StatusId),
    PartyHealth { member: ObjectId, health_percent: u8 },
    Gauge(Gauge),
    /// Replace the whole world.
    World(WorldFixture),
}

impl Edit {
    pub fn apply(&self, world: &mut WorldFixture) {
        match self {
            Self::Combat(on) => world.combat.set(CombatFlags::IN_COMBAT, *on),
            Self::HardTarget(target) => world.targets.hard = *target,
            Self::Level(level) => {
                if let Some(player) = world.player.as_mut() {
                    player.level = *level;
                }
            }
            Self::Job(job) => {
                if let Some(player) = world.player.as_mut() {
                    player.job = *job;
                }
            }
            Self::Mp(mp) => {
                if let Some(player) = world.player.as_mut() {
                    player.mp = *mp;
                }
            }
            Self::Cooldown {
                action,
                remaining_ms,
            } => world.set_cooldown(*action, *remaining_ms),
            Self::TargetStatus {
                target,
                status,
                remaining_secs,
            } => world.set_target_status(*target, *status, *remaining_secs),
            Self::ClearTargetStatuses => world.target_statuses.clear(),
            Self::PlayerStatus(status) => {
                if !world.player_statuses.contains(status) {
                    world.player_statuses.push(*status);
                }
            }
            Self::PartyHealth {
                member,
                health_percent,
            } => {
                if let Some(m) = world.party.iter_mut().find(|m| m.id == *member) {
                    m.health_percent = *health_percent;
                    m.alive = *health_percent > 0;
                }
            }
            Self::Gauge(gauge) => world.gauge = *gauge,
            Self::World(replacement) => *world = replacement.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario = Scenario::parse(r#"(name: "min", frames: [(presses: [(action: 119)])])"#).unwrap();
        assert_eq!(scenario.frame_ms, 100);
        assert!(!scenario.in_combat);
        let press = scenario.frames[0].presses[0];
        assert!(press.success);
        assert_eq!(press.target, None);
    }

    #[test]
    fn empty_frame_list_is_rejected() {
        let err = Scenario::parse(r#"(name: "empty", frames: [])"#).unwrap_err();
        assert!(err.to_string().contains("no frames"));
    }

    #[test]
    fn edits_touch_only_their_field() {
        let mut world = WorldFixture::default();
        Edit::Combat(true).apply(&mut world);
        Edit::Cooldown {
            action: ActionId(7),
            remaining_ms: 500,
        }
        .apply(&mut world);
        assert!(world.combat.contains(CombatFlags::IN_COMBAT));
        assert_eq!(world.cooldowns.len(), 1);
        // no player to edit
        Edit::Level(90).apply(&mut world);
        assert!(world.player.is_none());
    }
}
