//! Directory service error types.

use thiserror::Error;

use chequealo_core::AlreadyResolved;

use crate::db::RepositoryError;

/// Which uniqueness rule a submission ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicate {
    Review,
    Reply,
    Claim,
    UpdateRequest,
}

impl std::fmt::Display for Duplicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::Review => "you already reviewed this shop",
            Self::Reply => "this review already has a reply; update it instead",
            Self::Claim => "you already have a pending request for this shop",
            Self::UpdateRequest => "this shop already has a pending update request",
        };
        f.write_str(message)
    }
}

/// Errors returned by the directory services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before any write.
    #[error("{0}")]
    Validation(String),

    /// A storage uniqueness rule rejected the write.
    #[error("{0}")]
    Duplicate(Duplicate),

    /// The caller may not perform this operation.
    #[error("not permitted")]
    Forbidden,

    /// The referenced record does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The review already used its single edit.
    #[error("this review has already been edited")]
    AlreadyEdited,

    /// Moderation transition on a request that is no longer pending.
    #[error(transparent)]
    AlreadyResolved(#[from] AlreadyResolved),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record"),
            RepositoryError::AlreadyResolved(resolved) => Self::AlreadyResolved(resolved),
            other => Self::Repository(other),
        }
    }
}

impl ServiceError {
    /// Map a repository conflict to the given duplicate kind.
    pub(crate) fn duplicate_on_conflict(err: RepositoryError, kind: Duplicate) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::Duplicate(kind),
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chequealo_core::RequestStatus;

    #[test]
    fn test_conflict_maps_to_duplicate() {
        let err = ServiceError::duplicate_on_conflict(
            RepositoryError::Conflict("review".to_string()),
            Duplicate::Review,
        );
        assert!(matches!(err, ServiceError::Duplicate(Duplicate::Review)));
        assert_eq!(err.to_string(), "you already reviewed this shop");
    }

    #[test]
    fn test_already_resolved_passes_through() {
        let err: ServiceError = RepositoryError::AlreadyResolved(AlreadyResolved {
            current: RequestStatus::Rejected,
        })
        .into();
        assert_eq!(err.to_string(), "request already rejected");
    }

    #[test]
    fn test_other_errors_stay_internal() {
        let err = ServiceError::duplicate_on_conflict(
            RepositoryError::DataCorruption("bad".to_string()),
            Duplicate::Claim,
        );
        assert!(matches!(err, ServiceError::Repository(_)));
    }
}
