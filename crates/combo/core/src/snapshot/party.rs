use crate::config::EngineConfig;
use crate::observer::PartyMember;
use crate::types::ObjectId;

/// Fixed party slots refreshed once per tick.
///
/// Slots beyond the current count are zeroed on every refresh so a shrinking
/// party never leaves stale members behind.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub(crate) struct PartySlots {
    slots: [PartyMember; EngineConfig::MAX_PARTY],
    len: usize,
    dead_count: u8,
    first_dead: Option<ObjectId>,
}

impl PartySlots {
    pub(crate) fn refresh(&mut self, members: &[PartyMember], player: Option<ObjectId>) {
        let count = members.len().min(EngineConfig::MAX_PARTY);
        self.slots[..count].copy_from_slice(&members[..count]);
        for slot in &mut self.slots[count..] {
            *slot = PartyMember::default();
        }
        self.len = count;
        self.dead_count = 0;
        self.first_dead = None;

        for member in &self.slots[..count] {
            if member.id.is_none() || !member.is_dead() {
                continue;
            }
            self.dead_count += 1;
            if self.first_dead.is_none() && Some(member.id) != player {
                self.first_dead = Some(member.id);
            }
        }
    }

    pub(crate) fn members(&self) -> &[PartyMember] {
        &self.slots[..self.len]
    }

    #[cfg(test)]
    pub(crate) fn raw_slots(&self) -> &[PartyMember] {
        &self.slots
    }

    pub(crate) fn contains(&self, id: ObjectId) -> bool {
        !id.is_none() && self.members().iter().any(|m| m.id == id)
    }

    pub(crate) fn dead_count(&self) -> u8 {
        self.dead_count
    }

    pub(crate) fn first_dead(&self) -> Option<ObjectId> {
        self.first_dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, hp: u8) -> PartyMember {
        PartyMember {
            id: ObjectId(id),
            health_percent: hp,
            alive: hp > 0,
            ..PartyMember::default()
        }
    }

    #[test]
    fn shrinking_party_zeroes_stale_slots() {
        let mut party = PartySlots::default();
        party.refresh(&[member(1, 100), member(2, 50), member(3, 0)], None);
        assert_eq!(party.members().len(), 3);

        party.refresh(&[member(1, 100)], None);
        assert_eq!(party.members().len(), 1);
        assert!(party.raw_slots()[1..].iter().all(|m| *m == PartyMember::default()));
        assert!(!party.contains(ObjectId(2)));
    }

    #[test]
    fn first_dead_skips_the_player() {
        let mut party = PartySlots::default();
        party.refresh(&[member(1, 0), member(2, 90), member(3, 0)], Some(ObjectId(1)));
        assert_eq!(party.dead_count(), 2);
        assert_eq!(party.first_dead(), Some(ObjectId(3)));
    }
}
