//! Fixed-capacity ranked candidate holders.
//!
//! Candidate lists are rebuilt from scratch each tick and never mutated across
//! ticks. They are `Copy` so the snapshot can cache them in a `Cell` without
//! touching the heap.
use crate::config::EngineConfig;
use crate::types::ObjectId;

/// A ranked target: lower `key` ranks first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Candidate {
    pub id: ObjectId,
    /// Ranking key, health percent for every built-in list.
    pub key: u8,
}

/// Ordered-by-key list holding at most [`EngineConfig::MAX_CANDIDATES`] entries.
///
/// Duplicates are ignored. Ties keep offer order, so the earlier offer ranks first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateList {
    slots: [Candidate; EngineConfig::MAX_CANDIDATES],
    len: u8,
    capacity: u8,
}

impl CandidateList {
    /// Creates an empty list; `capacity` is clamped to `1..=MAX_CANDIDATES`.
    pub const fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            1
        } else if capacity > EngineConfig::MAX_CANDIDATES {
            EngineConfig::MAX_CANDIDATES
        } else {
            capacity
        };
        Self {
            slots: [Candidate {
                id: ObjectId::NONE,
                key: 0,
            }; EngineConfig::MAX_CANDIDATES],
            len: 0,
            capacity: capacity as u8,
        }
    }

    /// Offers a candidate. Returns true if it was retained.
    pub fn offer(&mut self, id: ObjectId, key: u8) -> bool {
        if id.is_none() || self.contains(id) {
            return false;
        }
        let len = self.len as usize;
        let cap = self.capacity as usize;
        let pos = self.slots[..len]
            .iter()
            .position(|c| key < c.key)
            .unwrap_or(len);
        if pos >= cap {
            return false;
        }
        let last = if len < cap { len } else { cap - 1 };
        let mut i = last;
        while i > pos {
            self.slots[i] = self.slots[i - 1];
            i -= 1;
        }
        self.slots[pos] = Candidate { id, key };
        if len < cap {
            self.len += 1;
        }
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.as_slice().iter().any(|c| c.id == id)
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.slots[..self.len as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.as_slice().iter()
    }

    pub fn first(&self) -> Option<ObjectId> {
        self.as_slice().first().map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::with_capacity(EngineConfig::MAX_CANDIDATES)
    }
}

/// The two lowest-keyed candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TopTwo {
    pub first: Option<Candidate>,
    pub second: Option<Candidate>,
}

impl TopTwo {
    pub fn offer(&mut self, id: ObjectId, key: u8) {
        if id.is_none() || self.ids().any(|existing| existing == id) {
            return;
        }
        let candidate = Candidate { id, key };
        match self.first {
            None => self.first = Some(candidate),
            Some(first) if key < first.key => {
                self.second = self.first;
                self.first = Some(candidate);
            }
            Some(_) => match self.second {
                Some(second) if key >= second.key => {}
                _ => self.second = Some(candidate),
            },
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> {
        self.first.into_iter().chain(self.second).map(|c| c.id)
    }

    /// First candidate that is not `exclude`.
    pub fn first_except(&self, exclude: Option<ObjectId>) -> Option<ObjectId> {
        self.ids().find(|&id| Some(id) != exclude)
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

impl From<&CandidateList> for TopTwo {
    fn from(list: &CandidateList) -> Self {
        let mut pair = TopTwo::default();
        for c in list.iter().take(2) {
            pair.offer(c.id, c.key);
        }
        pair
    }
}

/// Party members grouped by role for the current tick. Self is never bucketed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RoleBuckets {
    pub first_tank: Option<ObjectId>,
    pub first_healer: Option<ObjectId>,
    pub first_melee: Option<ObjectId>,
    pub first_ranged: Option<ObjectId>,
    pub first_caster: Option<ObjectId>,
    /// First living damage dealer in party order.
    pub any_dps: Option<ObjectId>,
    /// Living member with the lowest health percent.
    pub lowest_health: Option<ObjectId>,
}
