//! Job profiles: everything a job supplies at activation time.
//!
//! A [`JobProfile`] is built once per activation through [`ProfileBuilder`]
//! and handed to the resolver wholesale. Profiles are never patched in place;
//! a job or level change builds a new one.
use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::error::{CapacityKind, ProfileError};
use crate::opener::Opener;
use crate::retrace::RetraceTable;
use crate::rule::Rule;
use crate::types::{ActionId, JobId, StatusId};

pub use crate::snapshot::DebuffMapping;

/// Supplies job profiles on activation.
pub trait ProfileSource {
    /// Builds the profile for `job` at `level`, or `None` if the job is not supported.
    fn build_profile(&self, job: JobId, level: u8) -> Option<Result<JobProfile, ProfileError>>;
}

#[derive(Clone, Debug)]
pub struct JobProfile {
    job: JobId,
    name: &'static str,
    level: u8,
    rules: Vec<Rule>,
    anchors: ArrayVec<ActionId, { EngineConfig::MAX_ANCHORS }>,
    cooldowns: ArrayVec<ActionId, { EngineConfig::MAX_TRACKED_COOLDOWNS }>,
    debuffs: ArrayVec<DebuffMapping, { EngineConfig::MAX_DEBUFF_MAPPINGS }>,
    retrace: RetraceTable,
    opener: Option<Opener>,
}

impl JobProfile {
    pub fn builder(job: JobId, name: &'static str) -> ProfileBuilder {
        ProfileBuilder::new(job, name)
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Level the profile was built for.
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn anchors(&self) -> &[ActionId] {
        &self.anchors
    }

    pub fn cooldowns(&self) -> &[ActionId] {
        &self.cooldowns
    }

    pub fn debuffs(&self) -> &[DebuffMapping] {
        &self.debuffs
    }

    pub fn retrace(&self) -> &RetraceTable {
        &self.retrace
    }

    pub fn opener(&self) -> Option<&Opener> {
        self.opener.as_ref()
    }

    pub fn rule_for(&self, anchor: ActionId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.anchors().contains(&anchor))
    }

    pub fn rule_for_mut(&mut self, anchor: ActionId) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.anchors().contains(&anchor))
    }

    pub(crate) fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }
}

/// Validating builder for [`JobProfile`]. The first error wins and is
/// reported by [`build`](Self::build).
#[derive(Debug)]
#[must_use]
pub struct ProfileBuilder {
    job: JobId,
    name: &'static str,
    level: u8,
    rules: Vec<Rule>,
    anchors: ArrayVec<ActionId, { EngineConfig::MAX_ANCHORS }>,
    cooldowns: ArrayVec<ActionId, { EngineConfig::MAX_TRACKED_COOLDOWNS }>,
    debuffs: ArrayVec<DebuffMapping, { EngineConfig::MAX_DEBUFF_MAPPINGS }>,
    retrace: RetraceTable,
    opener: Option<Opener>,
    error: Option<ProfileError>,
}

impl ProfileBuilder {
    fn new(job: JobId, name: &'static str) -> Self {
        Self {
            job,
            name,
            level: 1,
            rules: Vec::new(),
            anchors: ArrayVec::new(),
            cooldowns: ArrayVec::new(),
            debuffs: ArrayVec::new(),
            retrace: RetraceTable::new(),
            opener: None,
            error: None,
        }
    }

    fn fail(&mut self, err: ProfileError) {
        self.error.get_or_insert(err);
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Adds a rule under each of its anchors.
    pub fn rule(mut self, rule: Result<Rule, ProfileError>) -> Self {
        let rule = match rule {
            Ok(rule) => rule,
            Err(err) => {
                self.fail(err);
                return self;
            }
        };
        for &anchor in rule.anchors() {
            if self.anchors.contains(&anchor) {
                self.fail(ProfileError::DuplicateAnchor { anchor });
                return self;
            }
        }
        if self.anchors.remaining_capacity() < rule.anchors().len() {
            self.fail(ProfileError::capacity(CapacityKind::Anchors, EngineConfig::MAX_ANCHORS));
            return self;
        }
        self.anchors.extend(rule.anchors().iter().copied());
        self.rules.push(rule);
        self
    }

    pub fn track_cooldowns(mut self, actions: &[ActionId]) -> Self {
        for &action in actions {
            if self.cooldowns.contains(&action) {
                continue;
            }
            if self.cooldowns.try_push(action).is_err() {
                self.fail(ProfileError::capacity(
                    CapacityKind::TrackedCooldowns,
                    EngineConfig::MAX_TRACKED_COOLDOWNS,
                ));
                break;
            }
        }
        self
    }

    /// Maps `action` to the statuses it applies, replacing an earlier mapping.
    pub fn debuff(mut self, action: ActionId, statuses: &[StatusId]) -> Self {
        let mapping = match DebuffMapping::new(action, statuses) {
            Ok(mapping) => mapping,
            Err(err) => {
                self.fail(err);
                return self;
            }
        };
        if let Some(existing) = self.debuffs.iter_mut().find(|m| m.action() == action) {
            *existing = mapping;
        } else if self.debuffs.try_push(mapping).is_err() {
            self.fail(ProfileError::capacity(
                CapacityKind::DebuffMappings,
                EngineConfig::MAX_DEBUFF_MAPPINGS,
            ));
        }
        self
    }

    pub fn retrace(mut self, table: Result<RetraceTable, ProfileError>) -> Self {
        match table {
            Ok(table) => self.retrace = table,
            Err(err) => self.fail(err),
        }
        self
    }

    pub fn opener(mut self, opener: Opener) -> Self {
        match opener.validate() {
            Ok(()) => self.opener = Some(opener),
            Err(err) => self.fail(err),
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first capacity or consistency error recorded while building.
    pub fn build(self) -> Result<JobProfile, ProfileError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(JobProfile {
            job: self.job,
            name: self.name,
            level: self.level,
            rules: self.rules,
            anchors: self.anchors,
            cooldowns: self.cooldowns,
            debuffs: self.debuffs,
            retrace: self.retrace,
            opener: self.opener,
        })
    }
}
