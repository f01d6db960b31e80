//! The storage boundary the mission core is written against.
//!
//! Split by record family; [`Repository`] is anything that provides all three.
//! The two writes that decide races, [`MissionRepository::transition_mission`]
//! and [`CompletionRepository::insert_completion`], must each be a single
//! conditional operation in the backing store.

use jiff::Timestamp;
use uuid::Uuid;

use crate::geofence::BoundingBox;
use crate::model::{
    CompletedMission, CompletionRecord, Mission, MissionDetail, MissionStatus, StatusKind, Task,
    TaskType, User,
};
use crate::storage::Result;

pub trait MissionRepository {
    /// Stores a new mission and its task together.
    fn insert_mission(&self, mission: &Mission, task: &Task) -> Result<()>;

    /// Loads a mission without its task.
    fn load_mission(&self, id: Uuid) -> Result<Mission>;

    /// Loads the task owned by a mission.
    fn load_task(&self, mission_id: Uuid) -> Result<Task>;

    fn load_mission_detail(&self, id: Uuid) -> Result<MissionDetail>;

    /// All missions, newest first, optionally restricted to one status.
    fn list_mission_details(&self, status: Option<StatusKind>) -> Result<Vec<MissionDetail>>;

    /// Approved missions inside `area` that `user_id` has not completed.
    fn approved_missions_in(&self, area: &BoundingBox, user_id: Uuid) -> Result<Vec<Mission>>;

    /// Moves a mission out of `Pending`, only if it is still pending.
    ///
    /// Returns `false` when no row changed: the mission is missing or was
    /// already decided.
    fn transition_mission(&self, id: Uuid, status: &MissionStatus, at: Timestamp) -> Result<bool>;

    /// Deletes a mission, cascading to its task and completions.
    /// Returns what was deleted.
    fn delete_mission(&self, id: Uuid) -> Result<MissionDetail>;
}

pub trait CompletionRepository {
    /// Inserts a completion unless one already exists for the pair.
    ///
    /// Returns `false` when the pair was already present.
    fn insert_completion(&self, record: &CompletionRecord) -> Result<bool>;

    fn has_completion(&self, user_id: Uuid, mission_id: Uuid) -> Result<bool>;

    fn completions_for_user(&self, user_id: Uuid) -> Result<Vec<CompletionRecord>>;

    /// How many missions a user has completed, counted in the store.
    fn count_completions(&self, user_id: Uuid) -> Result<u64>;

    fn completions_for_mission(&self, mission_id: Uuid) -> Result<Vec<CompletionRecord>>;

    /// A user's completed missions, most recent first.
    fn completed_missions(&self, user_id: Uuid) -> Result<Vec<CompletedMission>>;

    /// One `(user, task type)` pair per completion record.
    fn completion_task_types(&self) -> Result<Vec<(Uuid, TaskType)>>;
}

pub trait UserRepository {
    fn insert_user(&self, user: &User) -> Result<()>;

    fn load_user(&self, id: Uuid) -> Result<User>;

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All users, ordered by username.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Replaces a user's display name and returns the updated user.
    fn rename_user(&self, id: Uuid, name: Option<&str>) -> Result<User>;

    /// Deletes a user, cascading to their completions.
    /// Returns what was deleted.
    fn delete_user(&self, id: Uuid) -> Result<User>;
}

/// Everything the mission core reads and writes.
pub trait Repository: MissionRepository + CompletionRepository + UserRepository {}

impl<T> Repository for T where T: MissionRepository + CompletionRepository + UserRepository {}
