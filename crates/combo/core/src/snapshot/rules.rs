use crate::config::EngineConfig;
use crate::types::{JobId, Role};

/// Shared, read-only world tables injected into every [`WorldSnapshot`](super::WorldSnapshot).
///
/// Build it once (typically from the job catalog) and share it behind an
/// `Arc`; the snapshot never mutates it. Unmapped jobs resolve to
/// [`Role::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldRules {
    roles: [Role; EngineConfig::MAX_JOB_ID],
}

impl WorldRules {
    pub const fn new() -> Self {
        Self {
            roles: [Role::Unknown; EngineConfig::MAX_JOB_ID],
        }
    }

    /// Maps `jobs` to `role`. Identifiers outside the table are ignored.
    #[must_use]
    pub fn with_role(mut self, role: Role, jobs: &[u8]) -> Self {
        for &job in jobs {
            if let Some(slot) = self.roles.get_mut(job as usize) {
                *slot = role;
            }
        }
        self
    }

    #[inline]
    pub fn role_of(&self, job: JobId) -> Role {
        self.roles.get(job.0 as usize).copied().unwrap_or_default()
    }
}

impl Default for WorldRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_and_out_of_range_jobs_are_unknown() {
        let rules = WorldRules::new().with_role(Role::Tank, &[19, 200]);
        assert_eq!(rules.role_of(JobId(19)), Role::Tank);
        assert_eq!(rules.role_of(JobId(20)), Role::Unknown);
        assert_eq!(rules.role_of(JobId(200)), Role::Unknown);
    }
}
