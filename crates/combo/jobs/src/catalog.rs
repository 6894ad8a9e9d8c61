//! Registry of supported jobs.
use combo_core::{JobId, JobProfile, ProfileError, ProfileSource, Role, WorldRules};

use crate::{sge, whm};

type ProfileFn = fn(u8) -> Result<JobProfile, ProfileError>;

/// One supported job.
#[derive(Clone, Copy, Debug)]
pub struct JobEntry {
    pub job: JobId,
    pub name: &'static str,
    build: ProfileFn,
}

impl JobEntry {
    /// # Errors
    ///
    /// Propagates profile build errors.
    pub fn profile(&self, level: u8) -> Result<JobProfile, ProfileError> {
        (self.build)(level)
    }
}

/// Every job with a profile, keyed by job id.
#[derive(Clone, Debug)]
pub struct JobCatalog {
    entries: Vec<JobEntry>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self {
            entries: vec![
                JobEntry {
                    job: whm::JOB,
                    name: whm::NAME,
                    build: whm::profile,
                },
                JobEntry {
                    job: sge::JOB,
                    name: sge::NAME,
                    build: sge::profile,
                },
            ],
        }
    }

    pub fn get(&self, job: JobId) -> Option<&JobEntry> {
        self.entries.iter().find(|e| e.job == job)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&JobEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JobCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileSource for JobCatalog {
    fn build_profile(&self, job: JobId, level: u8) -> Option<Result<JobProfile, ProfileError>> {
        self.get(job).map(|entry| entry.profile(level))
    }
}

// ============================================================================
// Role table
// ============================================================================

pub const TANKS: &[u8] = &[19, 21, 32, 37];
pub const HEALERS: &[u8] = &[24, 28, 33, 40];
pub const MELEE: &[u8] = &[20, 22, 30, 34, 39, 41];
pub const RANGED: &[u8] = &[23, 31, 38];
pub const CASTERS: &[u8] = &[25, 35, 36, 42];

/// Built-in job-to-role table.
pub fn world_rules() -> WorldRules {
    WorldRules::new()
        .with_role(Role::Tank, TANKS)
        .with_role(Role::Healer, HEALERS)
        .with_role(Role::Melee, MELEE)
        .with_role(Role::Ranged, RANGED)
        .with_role(Role::Caster, CASTERS)
}
