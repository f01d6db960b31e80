//! Mission lifecycle: moderation and the participant flow.
//!
//! ```text
//! create  -> PENDING
//! approve :  PENDING -> APPROVED
//! reject  :  PENDING -> REJECTED
//! delete  :  any     -> (removed, task and completions with it)
//! ```
//!
//! Only approved missions exist as far as participants are concerned.
//! Starting or submitting passes three gates, in order: the mission is
//! approved, the caller hasn't completed it, and the caller is within
//! [`INTERACTION_RADIUS_M`] of it.
//!
//! Callers are already authenticated, and authorized where an operation is
//! administrative. Nothing here checks roles.

use jiff::Timestamp;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::geofence::{self, BoundingBox, INTERACTION_RADIUS_M, NEARBY_RADIUS_M};
use crate::ledger;
use crate::model::{
    Answer, CompletableTask, Location, Mission, MissionDetail, MissionStatus, MissionSummary,
    NewMission, StatusKind, SubmissionResult,
};
use crate::repository::Repository;
use crate::task;

/// Admits a new mission as pending, after checking its task payload
/// against the declared task type.
pub fn create_mission(
    repo: &impl Repository,
    new: NewMission,
    creator_id: Uuid,
) -> Result<MissionDetail> {
    if new.name.trim().is_empty() {
        return Err(Error::Validation("mission name cannot be empty".into()));
    }
    check_location(new.location)?;
    let task = task::parse_task(&new.task)?;
    repo.load_user(creator_id)?;

    let now = Timestamp::now();
    let mission = Mission {
        id: Uuid::new_v4(),
        name: new.name,
        description: new.description,
        location: new.location,
        status: MissionStatus::Pending,
        created_by: creator_id,
        created_at: now,
        updated_at: now,
    };
    repo.insert_mission(&mission, &task)?;

    tracing::info!(mission_id = %mission.id, %creator_id, kind = %task.kind(), "mission created");
    Ok(MissionDetail { mission, task })
}

pub fn approve_mission(repo: &impl Repository, id: Uuid, admin_id: Uuid) -> Result<MissionDetail> {
    decide(repo, id, admin_id, Verdict::Approve)
}

pub fn reject_mission(repo: &impl Repository, id: Uuid, admin_id: Uuid) -> Result<MissionDetail> {
    decide(repo, id, admin_id, Verdict::Reject)
}

/// Removes a mission in any state. Returns the deleted record.
pub fn delete_mission(repo: &impl Repository, id: Uuid) -> Result<MissionDetail> {
    let deleted = repo.delete_mission(id)?;
    tracing::info!(mission_id = %id, "mission deleted");
    Ok(deleted)
}

/// Every mission, newest first, optionally of one status.
pub fn list_all_missions(
    repo: &impl Repository,
    status: Option<StatusKind>,
) -> Result<Vec<MissionDetail>> {
    Ok(repo.list_mission_details(status)?)
}

/// Approved missions within [`NEARBY_RADIUS_M`] that the caller hasn't
/// completed, closest first.
pub fn list_nearby(
    repo: &impl Repository,
    location: Location,
    caller_id: Uuid,
) -> Result<Vec<MissionSummary>> {
    check_location(location)?;
    let area = BoundingBox::around(location, NEARBY_RADIUS_M);

    let mut nearby: Vec<Mission> = repo
        .approved_missions_in(&area, caller_id)?
        .into_iter()
        .filter(|m| geofence::is_nearby(location, m.location))
        .collect();
    let distance = |m: &Mission| geofence::distance_meters(location, m.location);
    nearby.sort_by(|a, b| distance(a).total_cmp(&distance(b)));

    tracing::debug!(%caller_id, count = nearby.len(), "nearby missions");
    Ok(nearby.iter().map(Mission::summary).collect())
}

/// A participant's view of one mission. Unapproved missions don't exist here.
pub fn get_mission_summary(repo: &impl Repository, id: Uuid) -> Result<MissionSummary> {
    let mission = repo.load_mission(id)?;
    if mission.status.kind() != StatusKind::Approved {
        return Err(not_found(id));
    }
    Ok(mission.summary())
}

/// Opens a mission for answering: returns its task with the answers removed.
pub fn start_mission(
    repo: &impl Repository,
    id: Uuid,
    caller_id: Uuid,
    location: Location,
) -> Result<CompletableTask> {
    open_mission(repo, id, caller_id, location)?;
    let task = repo.load_task(id)?;
    Ok(task::to_completable(&task))
}

/// Judges an answer and, if it is correct, records the completion.
///
/// A wrong answer records nothing and may be retried freely.
pub fn submit_mission(
    repo: &impl Repository,
    id: Uuid,
    caller_id: Uuid,
    location: Location,
    answer: &Answer,
) -> Result<SubmissionResult> {
    open_mission(repo, id, caller_id, location)?;
    let task = repo.load_task(id)?;

    if !task::validate_answer(&task, answer)? {
        tracing::debug!(mission_id = %id, %caller_id, "wrong answer");
        return Ok(SubmissionResult::Failed);
    }

    ledger::record_completion(repo, caller_id, id)?;
    Ok(SubmissionResult::Success)
}

#[derive(Debug, Clone, Copy)]
enum Verdict {
    Approve,
    Reject,
}

/// Moves a pending mission to its terminal state.
///
/// The write is conditioned on the mission still being pending, so two
/// concurrent decisions can't both land.
fn decide(
    repo: &impl Repository,
    id: Uuid,
    admin_id: Uuid,
    verdict: Verdict,
) -> Result<MissionDetail> {
    let at = Timestamp::now();
    let status = match verdict {
        Verdict::Approve => MissionStatus::Approved {
            approved_by: admin_id,
            approved_at: at,
        },
        Verdict::Reject => MissionStatus::Rejected {
            approved_by: admin_id,
            approved_at: at,
        },
    };

    if !repo.transition_mission(id, &status, at)? {
        // Missing, or decided by someone else first.
        let current = repo.load_mission(id)?;
        tracing::warn!(
            mission_id = %id,
            status = %current.status.kind(),
            ?verdict,
            "mission not pending"
        );
        return Err(Error::InvalidState {
            id,
            status: current.status.kind(),
        });
    }

    tracing::info!(mission_id = %id, %admin_id, ?verdict, "mission decided");
    Ok(repo.load_mission_detail(id)?)
}

/// The three gates in front of start and submit.
fn open_mission(
    repo: &impl Repository,
    id: Uuid,
    caller_id: Uuid,
    location: Location,
) -> Result<Mission> {
    let mission = repo.load_mission(id)?;
    if mission.status.kind() != StatusKind::Approved {
        return Err(not_found(id));
    }

    if ledger::has_completed(repo, caller_id, id)? {
        tracing::debug!(mission_id = %id, %caller_id, "already completed");
        return Err(Error::AlreadyCompleted {
            user_id: caller_id,
            mission_id: id,
        });
    }

    check_location(location)?;
    if !geofence::is_within_interaction_range(location, mission.location) {
        let distance_m = geofence::distance_meters(location, mission.location);
        tracing::debug!(mission_id = %id, %caller_id, distance_m, "out of range");
        return Err(Error::OutOfRange {
            mission_id: id,
            distance_m,
            radius_m: INTERACTION_RADIUS_M,
        });
    }

    Ok(mission)
}

fn check_location(location: Location) -> Result<()> {
    if location.is_valid() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "invalid location: longitude {}, latitude {}",
            location.longitude, location.latitude
        )))
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound {
        entity: "mission",
        id,
    }
}
