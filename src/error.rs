//! Caller-facing failures of mission operations.

use uuid::Uuid;

use crate::model::StatusKind;
use crate::storage::StorageError;

/// Everything a mission operation can refuse to do, plus storage failures.
///
/// Every variant except `Storage` is a recoverable condition the caller
/// should map to its own response; none are retried here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, or not visible on this read path (e.g. not approved).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Approve or reject on a mission that has already been decided.
    #[error("mission {id} is {status}, not pending approval")]
    InvalidState { id: Uuid, status: StatusKind },

    #[error("mission {mission_id} already completed by user {user_id}")]
    AlreadyCompleted { user_id: Uuid, mission_id: Uuid },

    /// The mission is fine; the caller is too far from it.
    #[error("{distance_m:.1} m from mission {mission_id}, must be within {radius_m} m")]
    OutOfRange {
        mission_id: Uuid,
        distance_m: f64,
        radius_m: f64,
    },

    /// A payload whose shape doesn't match its declared task type,
    /// or an otherwise malformed request.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Infrastructure failure, passed through unchanged.
    #[error(transparent)]
    Storage(StorageError),
}

pub type Result<T> = core::result::Result<T, Error>;

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissionNotFound(id) => Self::NotFound {
                entity: "mission",
                id,
            },
            StorageError::UserNotFound(id) => Self::NotFound { entity: "user", id },
            StorageError::UsernameTaken(username) => Self::UsernameTaken(username),
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_become_not_found() {
        let id = Uuid::new_v4();
        let err = Error::from(StorageError::MissionNotFound(id));
        assert!(matches!(err, Error::NotFound { entity: "mission", id: e } if e == id));

        let err = Error::from(StorageError::UserNotFound(id));
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
    }

    #[test]
    fn infrastructure_errors_pass_through() {
        let err = Error::from(StorageError::Corrupt("bad row".into()));
        assert!(matches!(err, Error::Storage(StorageError::Corrupt(_))));
    }
}
