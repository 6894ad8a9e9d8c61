//! Automatic target substitution ("retrace").
//!
//! Only actions listed in a [`RetraceTable`] are eligible. Each is tagged with
//! one of three disjoint policies:
//!
//! | Class     | Candidate source                          |
//! |-----------|-------------------------------------------|
//! | `Revive`  | first dead party member other than self   |
//! | `Cleanse` | top-two cleansable members, lowest HP first |
//! | `Heal`    | top-two healable members, lowest HP first |
//!
//! The current target is never returned: retargeting onto it would be a
//! no-op override.
use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::snapshot::WorldSnapshot;
use crate::types::{ActionId, ObjectId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RetraceClass {
    Heal,
    Cleanse,
    Revive,
}

/// Retrace-eligible actions and their policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetraceTable {
    actions: ArrayVec<(ActionId, RetraceClass), { EngineConfig::MAX_RETRACE_ACTIONS }>,
}

impl RetraceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action`, replacing an earlier class for the same action.
    ///
    /// # Errors
    ///
    /// Rejects the reserved action id and more than
    /// [`EngineConfig::MAX_RETRACE_ACTIONS`] distinct actions.
    pub fn insert(&mut self, action: ActionId, class: RetraceClass) -> Result<(), ProfileError> {
        if action.is_none() {
            return Err(ProfileError::ReservedAction);
        }
        if let Some(entry) = self.actions.iter_mut().find(|(a, _)| *a == action) {
            entry.1 = class;
            return Ok(());
        }
        self.actions.try_push((action, class)).map_err(|_| {
            ProfileError::capacity(
                CapacityKind::RetraceActions,
                EngineConfig::MAX_RETRACE_ACTIONS,
            )
        })
    }

    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn heal(mut self, actions: &[ActionId]) -> Result<Self, ProfileError> {
        self.extend(actions, RetraceClass::Heal)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn cleanse(mut self, actions: &[ActionId]) -> Result<Self, ProfileError> {
        self.extend(actions, RetraceClass::Cleanse)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn revive(mut self, actions: &[ActionId]) -> Result<Self, ProfileError> {
        self.extend(actions, RetraceClass::Revive)?;
        Ok(self)
    }

    fn extend(&mut self, actions: &[ActionId], class: RetraceClass) -> Result<(), ProfileError> {
        actions.iter().try_for_each(|&action| self.insert(action, class))
    }

    pub fn contains(&self, action: ActionId) -> bool {
        self.class_of(action).is_some()
    }

    pub fn class_of(&self, action: ActionId) -> Option<RetraceClass> {
        self.actions
            .iter()
            .find(|(a, _)| *a == action)
            .map(|&(_, class)| class)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionId, RetraceClass)> + '_ {
        self.actions.iter().copied()
    }
}

/// Picks a substitute target for `action`, or `None` to leave the target alone.
///
/// Heal and cleanse candidates must be reachable by `action`; the player is a
/// valid candidate for both. Revive ignores reachability and never picks the
/// player.
pub fn auto_target(
    snapshot: &WorldSnapshot,
    action: ActionId,
    table: &RetraceTable,
    current: Option<ObjectId>,
) -> Option<ObjectId> {
    match table.class_of(action)? {
        RetraceClass::Revive => snapshot
            .first_dead_party_member()
            .filter(|&dead| Some(dead) != current),
        RetraceClass::Cleanse => snapshot
            .top_cleansable_pair_for(action, true)
            .first_except(current),
        RetraceClass::Heal => snapshot
            .top_healable_pair_for(action, true)
            .first_except(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{
        CharacterState, FixtureHandle, FixtureObserver, PartyMember, PlayerState, WorldFixture,
    };

    const SELF: ObjectId = ObjectId(1);
    const RAISE: ActionId = ActionId(125);
    const CURE: ActionId = ActionId(120);
    const ESUNA: ActionId = ActionId(7568);

    fn member(id: u64, hp: u8) -> PartyMember {
        PartyMember {
            id: ObjectId(id),
            health_percent: hp,
            alive: hp > 0,
            ..PartyMember::default()
        }
    }

    fn character(id: u64, hp: u32) -> CharacterState {
        CharacterState {
            id: ObjectId(id),
            hp,
            max_hp: 100,
            ..CharacterState::default()
        }
    }

    fn setup() -> (WorldSnapshot, FixtureHandle, RetraceTable) {
        let world = WorldFixture {
            player: Some(PlayerState {
                id: SELF,
                hp: 100,
                max_hp: 100,
                alive: true,
                ..PlayerState::default()
            }),
            party: vec![member(1, 100), member(2, 80), member(3, 30), member(4, 55), member(5, 0)],
            characters: vec![
                character(1, 100),
                character(2, 80),
                character(3, 30),
                character(4, 55),
                character(5, 0),
            ],
            ..WorldFixture::default()
        };
        let observer = FixtureObserver::new(world);
        let handle = observer.handle();
        let mut snapshot = WorldSnapshot::new(observer);
        snapshot.update();
        let table = RetraceTable::new()
            .heal(&[CURE])
            .and_then(|t| t.cleanse(&[ESUNA]))
            .and_then(|t| t.revive(&[RAISE]))
            .unwrap();
        (snapshot, handle, table)
    }

    #[test]
    fn heal_ranks_lowest_health_first_and_skips_dead() {
        let (snapshot, _, table) = setup();
        let pair = snapshot.top_healable_pair(false);
        assert_eq!(pair.ids().collect::<Vec<_>>(), vec![ObjectId(3), ObjectId(4)]);

        assert_eq!(auto_target(&snapshot, CURE, &table, None), Some(ObjectId(3)));
        assert_eq!(auto_target(&snapshot, CURE, &table, Some(ObjectId(3))), Some(ObjectId(4)));
    }

    #[test]
    fn revive_targets_the_dead_unless_already_selected() {
        let (snapshot, _, table) = setup();
        let dead = ObjectId(5);
        assert_eq!(auto_target(&snapshot, RAISE, &table, Some(ObjectId(2))), Some(dead));
        assert_eq!(auto_target(&snapshot, RAISE, &table, Some(dead)), None);
    }

    #[test]
    fn cleanse_uses_the_cleansable_list() {
        let (mut snapshot, handle, table) = setup();
        assert_eq!(auto_target(&snapshot, ESUNA, &table, None), None);

        handle.edit(|w| w.cleansable = vec![ObjectId(2), SELF]);
        snapshot.update();
        assert_eq!(auto_target(&snapshot, ESUNA, &table, None), Some(ObjectId(2)));
        assert_eq!(auto_target(&snapshot, ESUNA, &table, Some(ObjectId(2))), Some(SELF));
    }

    #[test]
    fn unreachable_and_unlisted_actions_are_ignored() {
        let (mut snapshot, handle, table) = setup();
        assert_eq!(auto_target(&snapshot, ActionId(999), &table, None), None);

        handle.edit(|w| w.out_of_range = vec![ObjectId(3)]);
        snapshot.update();
        assert_eq!(auto_target(&snapshot, CURE, &table, None), Some(ObjectId(4)));
    }

    #[test]
    fn reachable_member_behind_a_full_unreachable_list_is_found() {
        let (mut snapshot, handle, table) = setup();
        handle.edit(|w| {
            w.party = (2..=6).map(|id| member(id, (id as u8 - 1) * 10)).collect();
            w.characters = (2..=6).map(|id| character(id, (id as u32 - 1) * 10)).collect();
            w.out_of_range = (2..=5).map(ObjectId).collect();
            w.cleansable = (2..=6).map(ObjectId).collect();
        });
        snapshot.update();
        assert_eq!(snapshot.healable_candidates().len(), EngineConfig::MAX_CANDIDATES);

        assert_eq!(auto_target(&snapshot, CURE, &table, None), Some(ObjectId(6)));
        assert_eq!(auto_target(&snapshot, ESUNA, &table, None), Some(ObjectId(6)));
        assert_eq!(auto_target(&snapshot, CURE, &table, Some(ObjectId(6))), None);
    }

    #[test]
    fn table_replaces_class_and_enforces_capacity() {
        let mut table = RetraceTable::new();
        table.insert(CURE, RetraceClass::Heal).unwrap();
        table.insert(CURE, RetraceClass::Cleanse).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.class_of(CURE), Some(RetraceClass::Cleanse));

        let many: Vec<ActionId> = (1..=33).map(ActionId).collect();
        assert_eq!(
            RetraceTable::new().heal(&many).unwrap_err(),
            ProfileError::capacity(CapacityKind::RetraceActions, 32)
        );
    }
}
