//! Mission types: location-anchored quizzes with a moderation status.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Location, Task, TaskSpec};

/// A location-anchored quiz submitted by a creator.
///
/// The task lives in its own record keyed by the mission id; see [`MissionDetail`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: Location,
    #[serde(flatten)]
    pub status: MissionStatus,
    pub created_by: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Mission {
    pub fn summary(&self) -> MissionSummary {
        MissionSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.location,
        }
    }
}

/// Where a mission stands in moderation.
///
/// The decision (who and when) only exists once the mission has left
/// `Pending`, so it is carried by the terminal variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    /// Awaiting an administrator's decision.
    Pending,

    /// Live and discoverable by participants.
    #[serde(rename_all = "camelCase")]
    Approved {
        approved_by: Uuid,
        approved_at: Timestamp,
    },

    /// Turned down. Never becomes discoverable.
    #[serde(rename_all = "camelCase")]
    Rejected {
        approved_by: Uuid,
        approved_at: Timestamp,
    },
}

impl MissionStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Pending => StatusKind::Pending,
            Self::Approved { .. } => StatusKind::Approved,
            Self::Rejected { .. } => StatusKind::Rejected,
        }
    }
}

/// The bare status label, used for filtering and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    Pending,
    Approved,
    Rejected,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown mission status: {other}")),
        }
    }
}

/// What a participant sees of a mission: no status, no task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: Location,
}

/// A mission together with its full task, answers included.
///
/// Administrative views only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDetail {
    #[serde(flatten)]
    pub mission: Mission,
    pub task: Task,
}

/// A creation request, before the task payload has been checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMission {
    pub name: String,
    pub description: String,
    pub location: Location,
    pub task: TaskSpec,
}
