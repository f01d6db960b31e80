//! Completion ledger: who has solved what, at most once each.

use jiff::Timestamp;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{CompletedMission, CompletionRecord};
use crate::repository::Repository;

/// Records that `user_id` completed `mission_id`.
///
/// The existence check and the insert are one conditional write, so of any
/// number of concurrent calls for the same pair exactly one succeeds; the
/// rest get [`Error::AlreadyCompleted`].
pub fn record_completion(
    repo: &impl Repository,
    user_id: Uuid,
    mission_id: Uuid,
) -> Result<CompletionRecord> {
    let record = CompletionRecord {
        user_id,
        mission_id,
        completed_at: Timestamp::now(),
    };
    if !repo.insert_completion(&record)? {
        tracing::warn!(%user_id, %mission_id, "completion already recorded");
        return Err(Error::AlreadyCompleted {
            user_id,
            mission_id,
        });
    }
    tracing::info!(%user_id, %mission_id, "mission completed");
    Ok(record)
}

pub fn has_completed(repo: &impl Repository, user_id: Uuid, mission_id: Uuid) -> Result<bool> {
    Ok(repo.has_completion(user_id, mission_id)?)
}

/// A user's completion records, oldest first.
#[allow(dead_code)]
pub fn completions_for_user(
    repo: &impl Repository,
    user_id: Uuid,
) -> Result<Vec<CompletionRecord>> {
    Ok(repo.completions_for_user(user_id)?)
}

/// How many missions a user has completed.
pub fn completion_count(repo: &impl Repository, user_id: Uuid) -> Result<u64> {
    Ok(repo.count_completions(user_id)?)
}

/// Who has completed a mission, oldest first.
pub fn completions_for_mission(
    repo: &impl Repository,
    mission_id: Uuid,
) -> Result<Vec<CompletionRecord>> {
    Ok(repo.completions_for_mission(mission_id)?)
}

/// A user's completed missions with their summaries, newest first.
pub fn completed_missions(repo: &impl Repository, user_id: Uuid) -> Result<Vec<CompletedMission>> {
    repo.load_user(user_id)?;
    Ok(repo.completed_missions(user_id)?)
}
