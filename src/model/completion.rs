//! Completion records: proof that a user answered a mission correctly.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MissionSummary;

/// A user completed a mission. At most one per (user, mission), ever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub user_id: Uuid,
    pub mission_id: Uuid,
    pub completed_at: Timestamp,
}

/// A completed mission as shown in a user's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMission {
    #[serde(flatten)]
    pub mission: MissionSummary,
    pub completed_at: Timestamp,
}
