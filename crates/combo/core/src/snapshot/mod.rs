//! Per-tick read model of the host world.
//!
//! [`WorldSnapshot`] is the single mutable shared resource of the engine. It is
//! written only by [`WorldSnapshot::update`] (once per tick) and by
//! configuration calls at profile activation; everything else reads it.
//!
//! Derived queries (candidate rankings, role buckets) are built lazily on
//! first access and stamped with the tick that built them, so any number of
//! reads within a tick observe identical results.
mod cache;
mod party;
mod rules;
mod tracking;

pub use rules::WorldRules;
pub use tracking::DebuffMapping;

pub(crate) use tracking::collect_bounded;

use std::sync::Arc;

use arrayvec::ArrayVec;

use self::cache::TickCache;
use self::party::PartySlots;
use self::tracking::TrackedCooldowns;
use crate::candidates::{CandidateList, RoleBuckets, TopTwo};
use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::observer::{
    CharacterState, CombatFlags, Gauge, Observer, PartyMember, PlayerState, Targets,
};
use crate::types::{ActionId, ObjectId, Position, Role, StatusId, Tick};

/// Read model refreshed once per tick from an [`Observer`].
pub struct WorldSnapshot {
    observer: Box<dyn Observer>,
    rules: Arc<WorldRules>,
    config: EngineConfig,
    tick: Tick,

    player: Option<PlayerState>,
    movement: Movement,
    targets: Targets,
    combat: CombatFlags,
    party: PartySlots,

    cooldowns: TrackedCooldowns,
    debuffs: ArrayVec<DebuffMapping, { EngineConfig::MAX_DEBUFF_MAPPINGS }>,
    anchors: ArrayVec<ActionId, { EngineConfig::MAX_ANCHORS }>,
    just_used: Option<ActionId>,

    healable: TickCache<CandidateList>,
    cleansable: TickCache<CandidateList>,
    roles: TickCache<RoleBuckets>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot at tick 0. Call [`update`](Self::update) before resolving.
    pub fn new(observer: impl Observer + 'static) -> Self {
        Self {
            observer: Box::new(observer),
            rules: Arc::new(WorldRules::new()),
            config: EngineConfig::default(),
            tick: Tick::ZERO,
            player: None,
            movement: Movement::default(),
            targets: Targets::default(),
            combat: CombatFlags::empty(),
            party: PartySlots::default(),
            cooldowns: TrackedCooldowns::default(),
            debuffs: ArrayVec::new(),
            anchors: ArrayVec::new(),
            just_used: None,
            healable: TickCache::new(),
            cleansable: TickCache::new(),
            roles: TickCache::new(),
        }
    }

    /// Injects the shared world tables. They are read-only for the snapshot's lifetime.
    #[must_use]
    pub fn with_rules(mut self, rules: Arc<WorldRules>) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Pulls a fresh read from the observer and starts a new tick.
    ///
    /// Clears every derived cache and the just-used guard, then refreshes
    /// player, target, party, movement, and tracked-cooldown readiness.
    pub fn update(&mut self) {
        self.tick = self.tick.next();
        self.just_used = None;
        self.invalidate_caches();

        self.player = self.observer.local_player();
        self.movement
            .observe(self.player.map(|p| p.position), &self.config);
        self.targets = self.observer.targets();
        self.combat = self.observer.combat_flags();

        let party = self.observer.party();
        let player_id = self.player_id();
        self.party.refresh(&party, player_id);

        self.cooldowns.refresh(self.observer.as_ref());
    }

    pub fn invalidate_caches(&self) {
        self.healable.invalidate();
        self.cleansable.invalidate();
        self.roles.invalidate();
    }

    /// Drops every configured cooldown, debuff mapping, and anchor.
    pub fn clear_tracking(&mut self) {
        self.cooldowns.clear();
        self.debuffs.clear();
        self.anchors.clear();
        self.just_used = None;
        self.invalidate_caches();
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Replaces the tracked cooldown set and refreshes readiness immediately.
    ///
    /// # Errors
    ///
    /// More than [`EngineConfig::MAX_TRACKED_COOLDOWNS`] actions are rejected
    /// and the previous set is kept.
    pub fn configure_cooldowns(&mut self, actions: &[ActionId]) -> Result<(), ProfileError> {
        let actions = collect_bounded(actions, CapacityKind::TrackedCooldowns)?;
        self.cooldowns.configure(actions, self.observer.as_ref());
        Ok(())
    }

    /// Adds or replaces the mapping for `mapping.action()`.
    ///
    /// # Errors
    ///
    /// A new action beyond [`EngineConfig::MAX_DEBUFF_MAPPINGS`] is rejected.
    pub fn configure_debuff(&mut self, mapping: DebuffMapping) -> Result<(), ProfileError> {
        if let Some(existing) = self
            .debuffs
            .iter_mut()
            .find(|m| m.action() == mapping.action())
        {
            *existing = mapping;
            return Ok(());
        }
        self.debuffs.try_push(mapping).map_err(|_| {
            ProfileError::capacity(
                CapacityKind::DebuffMappings,
                EngineConfig::MAX_DEBUFF_MAPPINGS,
            )
        })
    }

    /// # Errors
    ///
    /// More than [`EngineConfig::MAX_ANCHORS`] anchors are rejected and the
    /// previous set is kept.
    pub fn configure_anchors(&mut self, anchors: &[ActionId]) -> Result<(), ProfileError> {
        self.anchors = collect_bounded(anchors, CapacityKind::Anchors)?;
        Ok(())
    }

    // ========================================================================
    // Player, targets, flags
    // ========================================================================

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn observer(&self) -> &dyn Observer {
        self.observer.as_ref()
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    pub fn player_id(&self) -> Option<ObjectId> {
        self.player.map(|p| p.id).filter(|id| !id.is_none())
    }

    pub fn player_level(&self) -> u8 {
        self.player.map_or(0, |p| p.level)
    }

    pub fn player_mp(&self) -> u32 {
        self.player.map_or(0, |p| p.mp)
    }

    pub fn player_health_percent(&self) -> u8 {
        self.player.map_or(0, |p| p.health_percent())
    }

    pub fn is_player_alive(&self) -> bool {
        self.player.is_some_and(|p| p.alive)
    }

    pub fn is_moving(&self) -> bool {
        self.movement.moving
    }

    pub fn targets(&self) -> Targets {
        self.targets
    }

    pub fn hard_target(&self) -> Option<ObjectId> {
        self.targets.hard
    }

    pub fn combat_flags(&self) -> CombatFlags {
        self.combat
    }

    pub fn in_combat(&self) -> bool {
        self.combat.contains(CombatFlags::IN_COMBAT)
    }

    pub fn is_mounted(&self) -> bool {
        self.combat.contains(CombatFlags::MOUNTED)
    }

    pub fn is_casting(&self) -> bool {
        self.combat.contains(CombatFlags::CASTING)
    }

    pub fn player_has_status(&self, status: StatusId) -> bool {
        self.player.is_some() && self.observer.player_has_status(status)
    }

    pub fn gauge(&self) -> Gauge {
        match self.player {
            Some(p) => self.observer.gauge(p.job),
            None => Gauge::None,
        }
    }

    pub fn can_use_action_on(&self, action: ActionId, target: ObjectId) -> bool {
        self.observer.can_use_action_on(action, target)
    }

    // ========================================================================
    // Party
    // ========================================================================

    pub fn party(&self) -> &[PartyMember] {
        self.party.members()
    }

    pub fn is_party_member(&self, id: ObjectId) -> bool {
        self.party.contains(id)
    }

    pub fn any_party_dead(&self) -> bool {
        self.party.dead_count() > 0
    }

    pub fn party_dead_count(&self) -> u8 {
        self.party.dead_count()
    }

    /// First dead party member other than the player.
    pub fn first_dead_party_member(&self) -> Option<ObjectId> {
        self.party.first_dead()
    }

    /// Living party members at or below `percent` health.
    pub fn count_party_at_or_below(&self, percent: u8) -> usize {
        self.party
            .members()
            .iter()
            .filter(|m| !m.is_dead() && m.health_percent <= percent)
            .count()
    }

    // ========================================================================
    // Cooldowns, anchors, debuffs
    // ========================================================================

    /// Readiness with the just-used guard applied first.
    ///
    /// Tracked actions answer from this tick's readiness table; anything else
    /// falls through to an uncached observer probe.
    pub fn is_action_ready(&self, action: ActionId) -> bool {
        if self.just_used == Some(action) {
            return false;
        }
        match self.cooldowns.lookup(action) {
            Some(ready) => ready,
            None => self.observer.is_action_ready(action),
        }
    }

    pub fn cooldown_remaining_ms(&self, action: ActionId) -> Option<u32> {
        self.observer.action_remaining_ms(action)
    }

    pub fn tracked_cooldowns(&self) -> &[ActionId] {
        self.cooldowns.actions()
    }

    pub fn anchors(&self) -> &[ActionId] {
        &self.anchors
    }

    pub fn is_anchor(&self, action: ActionId) -> bool {
        self.anchors.contains(&action)
    }

    /// Anti-repeat guard: `action` reads as not ready for the rest of the tick.
    pub fn mark_action_used(&mut self, action: ActionId) {
        self.just_used = Some(action);
    }

    pub fn just_used(&self) -> Option<ActionId> {
        self.just_used
    }

    pub fn debuff_mapping(&self, action: ActionId) -> Option<&DebuffMapping> {
        self.debuffs.iter().find(|m| m.action() == action)
    }

    /// Whether the debuff applied by `action` should be refreshed on the hard target.
    ///
    /// False without a mapping or a hard target. When the target cannot be
    /// inspected this answers true: a missed refresh costs more than a
    /// redundant one.
    pub fn does_debuff_need_refresh(&self, action: ActionId, threshold_ms: u32) -> bool {
        let Some(mapping) = self.debuff_mapping(action) else {
            return false;
        };
        let Some(target) = self.targets.hard else {
            return false;
        };
        match self.observer.max_status_remaining(target, mapping.statuses()) {
            Some(seconds) => seconds * 1000.0 <= threshold_ms as f32,
            None => true,
        }
    }

    /// Longest remaining time of the debuff applied by `action` on the hard target.
    pub fn debuff_remaining_ms(&self, action: ActionId) -> Option<u32> {
        let mapping = self.debuff_mapping(action)?;
        let target = self.targets.hard?;
        let seconds = self.observer.max_status_remaining(target, mapping.statuses())?;
        Some((seconds.max(0.0) * 1000.0) as u32)
    }

    // ========================================================================
    // Derived candidates
    // ========================================================================

    /// Party members (and self) below full health, ascending by health percent.
    pub fn healable_candidates(&self) -> CandidateList {
        self.healable
            .get_or_build(self.tick, || self.collect_candidates(heal_key))
    }

    /// Living party members (and self) carrying a cleansable debuff, ascending by health.
    pub fn cleansable_candidates(&self) -> CandidateList {
        self.cleansable
            .get_or_build(self.tick, || self.collect_candidates(|c| self.cleanse_key(c)))
    }

    pub fn top_healable_pair(&self, include_self: bool) -> TopTwo {
        self.top_pair(&self.healable_candidates(), include_self, None)
    }

    pub fn top_cleansable_pair(&self, include_self: bool) -> TopTwo {
        self.top_pair(&self.cleansable_candidates(), include_self, None)
    }

    /// Healable pair restricted to targets `action` can currently reach.
    pub fn top_healable_pair_for(&self, action: ActionId, include_self: bool) -> TopTwo {
        let list = self.healable_candidates();
        if list.len() < list.capacity() {
            return self.top_pair(&list, include_self, Some(action));
        }
        self.scan_usable_pair(action, include_self, heal_key)
    }

    /// Cleansable pair restricted to targets `action` can currently reach.
    pub fn top_cleansable_pair_for(&self, action: ActionId, include_self: bool) -> TopTwo {
        let list = self.cleansable_candidates();
        if list.len() < list.capacity() {
            return self.top_pair(&list, include_self, Some(action));
        }
        self.scan_usable_pair(action, include_self, |c| self.cleanse_key(c))
    }

    pub fn role_buckets(&self) -> RoleBuckets {
        self.roles.get_or_build(self.tick, || self.build_role_buckets())
    }

    fn cleanse_key(&self, character: &CharacterState) -> Option<u8> {
        let pct = character.health_percent();
        (pct > 0 && self.observer.has_cleansable_debuff(character.id)).then_some(pct)
    }

    /// Pair from an already ranked list. Only complete when the list did not fill up.
    fn top_pair(&self, list: &CandidateList, include_self: bool, usable_by: Option<ActionId>) -> TopTwo {
        let player = self.player_id();
        let mut pair = TopTwo::default();
        for candidate in list.iter() {
            if !include_self && Some(candidate.id) == player {
                continue;
            }
            if let Some(action) = usable_by
                && !self.observer.can_use_action_on(action, candidate.id)
            {
                continue;
            }
            pair.offer(candidate.id, candidate.key);
        }
        pair
    }

    /// Ranks the whole party, filtering by reachability before anything is capped.
    fn scan_usable_pair(
        &self,
        action: ActionId,
        include_self: bool,
        rank: impl Fn(&CharacterState) -> Option<u8>,
    ) -> TopTwo {
        let player = self.player_id();
        let mut pair = TopTwo::default();
        self.scan_party_characters(|character| {
            if !include_self && Some(character.id) == player {
                return;
            }
            if let Some(key) = rank(character)
                && self.observer.can_use_action_on(action, character.id)
            {
                pair.offer(character.id, key);
            }
        });
        pair
    }

    fn collect_candidates(&self, rank: impl Fn(&CharacterState) -> Option<u8>) -> CandidateList {
        let mut list = CandidateList::default();
        self.scan_party_characters(|character| {
            if let Some(key) = rank(character) {
                list.offer(character.id, key);
            }
        });
        list
    }

    /// Visits visible characters once, keeping party members and self.
    fn scan_party_characters(&self, mut visit: impl FnMut(&CharacterState)) {
        let player = self.player_id();
        self.observer.for_each_character(&mut |character: &CharacterState| {
            if character.id.is_none() {
                return;
            }
            if Some(character.id) != player && !self.party.contains(character.id) {
                return;
            }
            visit(character);
        });
    }

    fn build_role_buckets(&self) -> RoleBuckets {
        let player = self.player_id();
        let mut buckets = RoleBuckets::default();
        let mut lowest: Option<(u8, ObjectId)> = None;

        for member in self.party.members() {
            if member.id.is_none() || Some(member.id) == player || member.is_dead() {
                continue;
            }
            let role = self.rules.role_of(member.job);
            let slot = match role {
                Role::Tank => Some(&mut buckets.first_tank),
                Role::Healer => Some(&mut buckets.first_healer),
                Role::Melee => Some(&mut buckets.first_melee),
                Role::Ranged => Some(&mut buckets.first_ranged),
                Role::Caster => Some(&mut buckets.first_caster),
                Role::Unknown => None,
            };
            if let Some(slot) = slot {
                slot.get_or_insert(member.id);
            }
            if role.is_dps() && buckets.any_dps.is_none() {
                buckets.any_dps = Some(member.id);
            }
            if lowest.is_none_or(|(pct, _)| member.health_percent < pct) {
                lowest = Some((member.health_percent, member.id));
            }
        }
        buckets.lowest_health = lowest.map(|(_, id)| id);
        buckets
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn diagnostics(&self) -> SnapshotDiagnostics {
        let cooldowns = self
            .cooldowns
            .actions()
            .iter()
            .map(|&action| CooldownView {
                action,
                ready: self.is_action_ready(action),
                remaining_ms: self.cooldown_remaining_ms(action),
            })
            .collect();
        SnapshotDiagnostics {
            tick: self.tick,
            in_combat: self.in_combat(),
            moving: self.is_moving(),
            party_size: self.party.members().len(),
            party_dead: self.party.dead_count(),
            anchors: self.anchors.clone(),
            cooldowns,
            just_used: self.just_used,
        }
    }
}

impl core::fmt::Debug for WorldSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorldSnapshot")
            .field("tick", &self.tick)
            .field("player", &self.player)
            .field("targets", &self.targets)
            .field("combat", &self.combat)
            .field("anchors", &self.anchors)
            .finish_non_exhaustive()
    }
}

/// Positional-delta movement detector with settle hysteresis.
#[derive(Clone, Copy, Debug, Default)]
struct Movement {
    last: Option<Position>,
    moving: bool,
    still_ticks: u8,
}

impl Movement {
    fn observe(&mut self, position: Option<Position>, config: &EngineConfig) {
        match (self.last, position) {
            (Some(prev), Some(current)) => {
                if prev.distance_squared(current) > config.movement_epsilon_sq {
                    self.moving = true;
                    self.still_ticks = 0;
                } else {
                    self.still_ticks = self.still_ticks.saturating_add(1);
                    if self.still_ticks >= config.movement_settle_ticks {
                        self.moving = false;
                    }
                }
            }
            _ => {
                self.moving = false;
                self.still_ticks = 0;
            }
        }
        self.last = position;
    }
}

/// Readiness of one tracked cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CooldownView {
    pub action: ActionId,
    pub ready: bool,
    pub remaining_ms: Option<u32>,
}

fn heal_key(character: &CharacterState) -> Option<u8> {
    let pct = character.health_percent();
    (pct > 0 && pct < 100).then_some(pct)
}

/// Read-only projection of the snapshot for display.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SnapshotDiagnostics {
    pub tick: Tick,
    pub in_combat: bool,
    pub moving: bool,
    pub party_size: usize,
    pub party_dead: u8,
    pub anchors: ArrayVec<ActionId, { EngineConfig::MAX_ANCHORS }>,
    pub cooldowns: ArrayVec<CooldownView, { EngineConfig::MAX_TRACKED_COOLDOWNS }>,
    pub just_used: Option<ActionId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{FixtureHandle, FixtureObserver, WorldFixture};
    use crate::types::JobId;

    const PLAYER: ObjectId = ObjectId(1);
    const ENEMY: ObjectId = ObjectId(99);

    fn character(id: u64, hp: u32) -> CharacterState {
        CharacterState {
            id: ObjectId(id),
            hp,
            max_hp: 100,
            ..CharacterState::default()
        }
    }

    fn member(id: u64, hp: u8, job: u8) -> PartyMember {
        PartyMember {
            id: ObjectId(id),
            job: JobId(job),
            health_percent: hp,
            alive: hp > 0,
            ..PartyMember::default()
        }
    }

    fn world() -> WorldFixture {
        WorldFixture {
            player: Some(PlayerState {
                id: PLAYER,
                level: 90,
                hp: 100,
                max_hp: 100,
                mp: 10_000,
                max_mp: 10_000,
                alive: true,
                ..PlayerState::default()
            }),
            targets: Targets {
                hard: Some(ENEMY),
                ..Targets::default()
            },
            party: vec![
                member(1, 100, 24),
                member(2, 80, 19),
                member(3, 30, 30),
                member(4, 55, 25),
                member(5, 0, 23),
            ],
            characters: vec![
                character(1, 100),
                character(2, 80),
                character(3, 30),
                character(4, 55),
                character(5, 0),
                character(77, 10),
            ],
            ..WorldFixture::default()
        }
        .in_combat()
    }

    fn snapshot() -> (WorldSnapshot, FixtureHandle) {
        let observer = FixtureObserver::new(world());
        let handle = observer.handle();
        let mut snapshot = WorldSnapshot::new(observer);
        snapshot.update();
        (snapshot, handle)
    }

    #[test]
    fn healable_pair_ranks_ascending_and_skips_dead_and_strangers() {
        let (snapshot, _) = snapshot();
        let pair = snapshot.top_healable_pair(false);
        assert_eq!(pair.ids().collect::<Vec<_>>(), vec![ObjectId(3), ObjectId(4)]);
    }

    #[test]
    fn derived_caches_are_stable_within_a_tick() {
        let (mut snapshot, handle) = snapshot();
        let first = snapshot.healable_candidates();
        handle.edit(|w| w.characters[1].hp = 5);
        assert_eq!(snapshot.healable_candidates(), first);

        snapshot.update();
        assert_eq!(snapshot.healable_candidates().first(), Some(ObjectId(2)));
    }

    #[test]
    fn cleansable_candidates_include_full_health_members() {
        let (mut snapshot, handle) = snapshot();
        handle.edit(|w| w.cleansable = vec![ObjectId(1), ObjectId(2), ObjectId(5)]);
        snapshot.update();

        let pair = snapshot.top_cleansable_pair(true);
        assert_eq!(pair.ids().collect::<Vec<_>>(), vec![ObjectId(2), PLAYER]);
        let others = snapshot.top_cleansable_pair(false);
        assert_eq!(others.ids().collect::<Vec<_>>(), vec![ObjectId(2)]);
    }

    #[test]
    fn usable_pair_filters_unreachable_targets() {
        let (mut snapshot, handle) = snapshot();
        handle.edit(|w| w.out_of_range.push(ObjectId(3)));
        snapshot.update();
        let pair = snapshot.top_healable_pair_for(ActionId(120), false);
        assert_eq!(pair.ids().collect::<Vec<_>>(), vec![ObjectId(4), ObjectId(2)]);
    }

    #[test]
    fn just_used_guard_overrides_readiness_until_next_tick() {
        let (mut snapshot, _) = snapshot();
        snapshot.configure_cooldowns(&[ActionId(3571)]).unwrap();
        assert!(snapshot.is_action_ready(ActionId(3571)));

        snapshot.mark_action_used(ActionId(3571));
        assert!(!snapshot.is_action_ready(ActionId(3571)));
        assert!(snapshot.is_action_ready(ActionId(136)));

        snapshot.update();
        assert!(snapshot.is_action_ready(ActionId(3571)));
    }

    #[test]
    fn tracked_readiness_is_sampled_once_per_tick() {
        let (mut snapshot, handle) = snapshot();
        snapshot.configure_cooldowns(&[ActionId(7)]).unwrap();
        handle.edit(|w| w.set_cooldown(ActionId(7), 5000));
        assert!(snapshot.is_action_ready(ActionId(7)));
        // untracked actions are probed directly
        handle.edit(|w| w.set_cooldown(ActionId(8), 5000));
        assert!(!snapshot.is_action_ready(ActionId(8)));

        snapshot.update();
        assert!(!snapshot.is_action_ready(ActionId(7)));
    }

    #[test]
    fn debuff_refresh_rules() {
        let (mut snapshot, handle) = snapshot();
        let dot = ActionId(16532);
        let status = StatusId(1871);
        assert!(!snapshot.does_debuff_need_refresh(dot, 3000), "no mapping");

        snapshot
            .configure_debuff(DebuffMapping::new(dot, &[status]).unwrap())
            .unwrap();
        assert!(snapshot.does_debuff_need_refresh(dot, 3000), "status absent");

        handle.edit(|w| w.set_target_status(ENEMY, status, 20.0));
        assert!(!snapshot.does_debuff_need_refresh(dot, 3000));
        assert_eq!(snapshot.debuff_remaining_ms(dot), Some(20_000));

        handle.edit(|w| w.set_target_status(ENEMY, status, 3.0));
        assert!(snapshot.does_debuff_need_refresh(dot, 3000), "at threshold");

        handle.edit(|w| w.uninspectable.push(ENEMY));
        assert!(snapshot.does_debuff_need_refresh(dot, 3000), "fails open");

        handle.edit(|w| w.targets.hard = None);
        snapshot.update();
        assert!(!snapshot.does_debuff_need_refresh(dot, 3000), "no target");
    }

    #[test]
    fn configuration_overflow_keeps_previous_set() {
        let (mut snapshot, _) = snapshot();
        snapshot.configure_anchors(&[ActionId(100)]).unwrap();
        let too_many: Vec<ActionId> = (1..=9).map(ActionId).collect();
        assert!(snapshot.configure_anchors(&too_many).is_err());
        assert_eq!(snapshot.anchors(), &[ActionId(100)]);

        let cooldowns: Vec<ActionId> = (1..=17).map(ActionId).collect();
        assert!(snapshot.configure_cooldowns(&cooldowns).is_err());

        for i in 1..=16 {
            let mapping = DebuffMapping::new(ActionId(i), &[StatusId(1)]).unwrap();
            snapshot.configure_debuff(mapping).unwrap();
        }
        let overflow = DebuffMapping::new(ActionId(17), &[StatusId(1)]).unwrap();
        assert!(snapshot.configure_debuff(overflow).is_err());
        let replace = DebuffMapping::new(ActionId(16), &[StatusId(2)]).unwrap();
        assert!(snapshot.configure_debuff(replace).is_ok());
    }

    #[test]
    fn party_queries_and_role_buckets() {
        let rules = WorldRules::new()
            .with_role(Role::Tank, &[19])
            .with_role(Role::Melee, &[30])
            .with_role(Role::Caster, &[25])
            .with_role(Role::Healer, &[24]);
        let observer = FixtureObserver::new(world());
        let mut snapshot = WorldSnapshot::new(observer).with_rules(Arc::new(rules));
        snapshot.update();

        assert!(snapshot.any_party_dead());
        assert_eq!(snapshot.first_dead_party_member(), Some(ObjectId(5)));
        assert_eq!(snapshot.count_party_at_or_below(55), 2);
        assert!(snapshot.is_party_member(ObjectId(4)));
        assert!(!snapshot.is_party_member(ObjectId(77)));

        let buckets = snapshot.role_buckets();
        assert_eq!(buckets.first_tank, Some(ObjectId(2)));
        assert_eq!(buckets.first_melee, Some(ObjectId(3)));
        assert_eq!(buckets.first_caster, Some(ObjectId(4)));
        assert_eq!(buckets.first_healer, None, "self is never bucketed");
        assert_eq!(buckets.any_dps, Some(ObjectId(3)));
        assert_eq!(buckets.lowest_health, Some(ObjectId(3)));
    }

    #[test]
    fn movement_settles_after_still_ticks() {
        let observer = FixtureObserver::new(world());
        let handle = observer.handle();
        let mut snapshot =
            WorldSnapshot::new(observer).with_config(EngineConfig::new().with_movement_settle_ticks(2));
        snapshot.update();
        assert!(!snapshot.is_moving());

        handle.edit(|w| {
            if let Some(p) = w.player.as_mut() {
                p.position = Position::new(1.0, 0.0, 0.0);
            }
        });
        snapshot.update();
        assert!(snapshot.is_moving());

        snapshot.update();
        assert!(snapshot.is_moving(), "one still tick is not enough");
        snapshot.update();
        assert!(!snapshot.is_moving());
    }
}
