//! Job-to-role table loader.
//!
//! The table is a RON list of role assignments:
//!
//! ```ron
//! [
//!     (role: Tank, jobs: [19, 21, 32, 37]),
//!     (role: Healer, jobs: [24, 28, 33, 40]),
//! ]
//! ```
use std::path::Path;

use combo_core::{EngineConfig, Role, WorldRules};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub jobs: Vec<u8>,
}

pub struct RolesLoader;

impl RolesLoader {
    /// Loads the table bundled with the crate.
    pub fn embedded() -> LoadResult<WorldRules> {
        Self::parse(include_str!("../../data/roles.ron"))
    }

    pub fn load(path: &Path) -> LoadResult<WorldRules> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Job ids outside the role table are an error.
    pub fn parse(content: &str) -> LoadResult<WorldRules> {
        let assignments: Vec<RoleAssignment> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse role table RON: {}", e))?;

        let mut rules = WorldRules::new();
        for assignment in &assignments {
            if let Some(job) = assignment
                .jobs
                .iter()
                .find(|&&job| usize::from(job) >= EngineConfig::MAX_JOB_ID)
            {
                anyhow::bail!(
                    "job id {} for role {:?} exceeds the role table (max {})",
                    job,
                    assignment.role,
                    EngineConfig::MAX_JOB_ID - 1
                );
            }
            rules = rules.with_role(assignment.role, &assignment.jobs);
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combo_core::JobId;

    #[test]
    fn embedded_table_matches_builtin() {
        assert_eq!(RolesLoader::embedded().unwrap(), crate::world_rules());
    }

    #[test]
    fn out_of_range_job_is_an_error() {
        let err = RolesLoader::parse("[(role: Tank, jobs: [200])]").unwrap_err();
        assert!(err.to_string().contains("200"));
    }

    #[test]
    fn later_assignments_win() {
        let rules =
            RolesLoader::parse("[(role: Tank, jobs: [5]), (role: Caster, jobs: [5])]").unwrap();
        assert_eq!(rules.role_of(JobId(5)), Role::Caster);
    }
}
