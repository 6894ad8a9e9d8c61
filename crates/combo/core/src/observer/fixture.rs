//! Data-backed observer for tests and scenario replay.
//!
//! [`FixtureObserver`] answers every [`Observer`] query from a plain
//! [`WorldFixture`]. The fixture sits behind a shared handle so a test (or the
//! simulator) can edit the world between ticks while the snapshot owns the
//! observer.
use std::cell::RefCell;
use std::rc::Rc;

use super::{
    CharacterState, CombatFlags, Gauge, HostFlags, Observer, PartyList, PartyMember, PlayerState,
    Targets,
};
use crate::config::EngineConfig;
use crate::types::{ActionId, JobId, ObjectId, StatusId};

/// Remaining cooldown of one action. Actions without an entry are ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownFixture {
    pub action: ActionId,
    pub remaining_ms: u32,
}

/// One status applied to a target, with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetStatusFixture {
    pub target: ObjectId,
    pub status: StatusId,
    pub remaining_secs: f32,
}

/// Complete world description answered by [`FixtureObserver`].
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldFixture {
    pub player: Option<PlayerState>,
    pub targets: Targets,
    pub combat: CombatFlags,
    pub host: HostFlags,
    pub party: Vec<PartyMember>,
    pub characters: Vec<CharacterState>,
    pub cooldowns: Vec<CooldownFixture>,
    /// Statuses on the local player.
    pub player_statuses: Vec<StatusId>,
    pub target_statuses: Vec<TargetStatusFixture>,
    /// Targets whose statuses cannot be inspected.
    pub uninspectable: Vec<ObjectId>,
    pub cleansable: Vec<ObjectId>,
    /// Targets no action can currently reach.
    pub out_of_range: Vec<ObjectId>,
    pub gauge: Gauge,
}

impl WorldFixture {
    pub fn in_combat(mut self) -> Self {
        self.combat.insert(CombatFlags::IN_COMBAT);
        self
    }

    pub fn set_cooldown(&mut self, action: ActionId, remaining_ms: u32) {
        match self.cooldowns.iter_mut().find(|cd| cd.action == action) {
            Some(entry) => entry.remaining_ms = remaining_ms,
            None => self.cooldowns.push(CooldownFixture {
                action,
                remaining_ms,
            }),
        }
    }

    pub fn set_target_status(&mut self, target: ObjectId, status: StatusId, remaining_secs: f32) {
        self.target_statuses
            .retain(|s| !(s.target == target && s.status == status));
        self.target_statuses.push(TargetStatusFixture {
            target,
            status,
            remaining_secs,
        });
    }

    fn remaining_ms(&self, action: ActionId) -> u32 {
        self.cooldowns
            .iter()
            .find(|cd| cd.action == action)
            .map_or(0, |cd| cd.remaining_ms)
    }
}

/// Shared, editable handle to the world behind a [`FixtureObserver`].
#[derive(Clone, Debug)]
pub struct FixtureHandle(Rc<RefCell<WorldFixture>>);

impl FixtureHandle {
    pub fn edit(&self, edit: impl FnOnce(&mut WorldFixture)) {
        edit(&mut self.0.borrow_mut());
    }

    pub fn replace(&self, world: WorldFixture) {
        *self.0.borrow_mut() = world;
    }

    pub fn snapshot(&self) -> WorldFixture {
        self.0.borrow().clone()
    }
}

/// [`Observer`] backed by a [`WorldFixture`].
#[derive(Clone, Debug)]
pub struct FixtureObserver {
    world: Rc<RefCell<WorldFixture>>,
}

impl FixtureObserver {
    pub fn new(world: WorldFixture) -> Self {
        Self {
            world: Rc::new(RefCell::new(world)),
        }
    }

    pub fn handle(&self) -> FixtureHandle {
        FixtureHandle(Rc::clone(&self.world))
    }
}

impl Observer for FixtureObserver {
    fn local_player(&self) -> Option<PlayerState> {
        self.world.borrow().player
    }

    fn targets(&self) -> Targets {
        self.world.borrow().targets
    }

    fn combat_flags(&self) -> CombatFlags {
        self.world.borrow().combat
    }

    fn party(&self) -> PartyList {
        self.world.borrow().party.iter().copied().take(EngineConfig::MAX_PARTY).collect()
    }

    fn for_each_character(&self, visit: &mut dyn FnMut(&CharacterState)) {
        for character in &self.world.borrow().characters {
            visit(character);
        }
    }

    fn can_use_action_on(&self, _action: ActionId, target: ObjectId) -> bool {
        !self.world.borrow().out_of_range.contains(&target)
    }

    fn is_action_ready(&self, action: ActionId) -> bool {
        self.world.borrow().remaining_ms(action) == 0
    }

    fn action_remaining_ms(&self, action: ActionId) -> Option<u32> {
        Some(self.world.borrow().remaining_ms(action))
    }

    fn player_has_status(&self, status: StatusId) -> bool {
        self.world.borrow().player_statuses.contains(&status)
    }

    fn has_cleansable_debuff(&self, target: ObjectId) -> bool {
        self.world.borrow().cleansable.contains(&target)
    }

    fn max_status_remaining(&self, target: ObjectId, statuses: &[StatusId]) -> Option<f32> {
        let world = self.world.borrow();
        if world.uninspectable.contains(&target) {
            return None;
        }
        let best = world
            .target_statuses
            .iter()
            .filter(|s| s.target == target && statuses.contains(&s.status))
            .map(|s| s.remaining_secs)
            .fold(0.0_f32, f32::max);
        Some(best)
    }

    fn gauge(&self, _job: JobId) -> Gauge {
        self.world.borrow().gauge
    }

    fn host_flags(&self) -> HostFlags {
        self.world.borrow().host
    }
}
