//! Leaderboard rows.

use serde::{Deserialize, Serialize};

use super::TaskType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoints {
    /// Display name, or username when none is set.
    pub name: String,
    pub points: u64,
}

/// The ranking restricted to one task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTypeLeaderboard {
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub user_points: Vec<UserPoints>,
}
