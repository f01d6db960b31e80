//! Core data model for geoquest.
//!
//! These types represent the moving parts of the game:
//! missions and their tasks, completions, users, and rankings.

mod completion;
mod leaderboard;
mod location;
mod mission;
mod task;
mod user;

pub use completion::{CompletedMission, CompletionRecord};
pub use leaderboard::{TaskTypeLeaderboard, UserPoints};
pub use location::Location;
pub use mission::{Mission, MissionDetail, MissionStatus, MissionSummary, NewMission, StatusKind};
pub use task::{
    Answer, CompletableOption, CompletableTask, MultiChoiceTask, SimpleQuestionTask,
    SubmissionResult, Task, TaskSpec, TaskType, TrueOrFalseTask,
};
pub use user::{User, UserProfile};
