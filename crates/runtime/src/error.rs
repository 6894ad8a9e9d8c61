//! Errors surfaced by the runtime API.
use combo_core::{ComboError, ErrorSeverity, JobId, ProfileError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no profile available for {job} at level {level}")]
    UnknownJob { job: JobId, level: u8 },

    #[error("profile for {job} at level {level} rejected")]
    Profile {
        job: JobId,
        level: u8,
        #[source]
        source: ProfileError,
    },
}

impl ComboError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownJob { .. } => ErrorSeverity::Recoverable,
            Self::Profile { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownJob { .. } => "RUNTIME_UNKNOWN_JOB",
            Self::Profile { source, .. } => source.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combo_core::ActionId;

    #[test]
    fn unknown_job_is_recoverable_and_profile_faults_are_validation() {
        let unknown = RuntimeError::UnknownJob {
            job: JobId(19),
            level: 100,
        };
        assert!(unknown.severity().is_recoverable());
        assert_eq!(unknown.error_code(), "RUNTIME_UNKNOWN_JOB");

        let rejected = RuntimeError::Profile {
            job: JobId(24),
            level: 90,
            source: ProfileError::DuplicateAnchor { anchor: ActionId(119) },
        };
        assert_eq!(rejected.severity(), ErrorSeverity::Validation);
        assert_eq!(rejected.error_code(), "PROFILE_DUPLICATE_ANCHOR");
        assert_eq!(rejected.to_string(), "profile for job#24 at level 90 rejected");
    }
}
