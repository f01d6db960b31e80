//! Output formatting for CLI display.

use uuid::Uuid;

use crate::geofence::distance_meters;
use crate::model::{CompletedMission, Location, MissionDetail, MissionSummary, User, UserPoints};

/// The first eight characters of an id, enough to pass back as a prefix.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub(super) fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

pub(super) fn format_nearby_line(mission: &MissionSummary, from: Location) -> String {
    let distance = format_distance(distance_meters(from, mission.location));
    format!("{}  {distance:>7}  {}", short_id(mission.id), mission.name)
}

pub(super) fn format_mission_line(detail: &MissionDetail, completions: usize) -> String {
    let mission = &detail.mission;
    format!(
        "{}  [{}]  [{}]  {}  ({completions} completed)",
        short_id(mission.id),
        mission.status.kind(),
        detail.task.kind(),
        mission.name
    )
}

pub(super) fn format_completed_line(completed: &CompletedMission) -> String {
    format!(
        "{}  {}  {}",
        short_id(completed.mission.id),
        completed.completed_at.strftime("%Y-%m-%d %H:%M"),
        completed.mission.name
    )
}

pub(super) fn format_user_line(user: &User) -> String {
    match &user.name {
        Some(name) => format!("{}  {}  ({name})", short_id(user.id), user.username),
        None => format!("{}  {}", short_id(user.id), user.username),
    }
}

/// Numbered leaderboard rows. Equal points share a rank.
pub(super) fn format_ranking(rows: &[UserPoints]) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows.len());
    let mut rank = 0;
    let mut previous = None;
    for (i, row) in rows.iter().enumerate() {
        if previous != Some(row.points) {
            rank = i + 1;
            previous = Some(row.points);
        }
        lines.push(format!("{rank:>4}. {}  {}", row.name, row.points));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{Mission, MissionStatus, Task, TrueOrFalseTask};

    fn points(name: &str, points: u64) -> UserPoints {
        UserPoints {
            name: name.into(),
            points,
        }
    }

    #[test]
    fn short_id_is_a_prefix() {
        let id = Uuid::new_v4();
        assert!(id.to_string().starts_with(&short_id(id)));
        assert_eq!(short_id(id).len(), 8);
    }

    #[test]
    fn distances_switch_to_kilometres() {
        assert_eq!(format_distance(42.4), "42 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(3957.58), "3.96 km");
    }

    #[test]
    fn ranking_shares_ranks_on_ties() {
        let rows = [points("Ursula", 3), points("amy", 1), points("zed", 1)];
        assert_eq!(
            format_ranking(&rows),
            ["   1. Ursula  3", "   2. amy  1", "   2. zed  1"]
        );
    }

    #[test]
    fn user_line_shows_display_name_when_set() {
        let mut user = User {
            id: Uuid::new_v4(),
            username: "hikerjoe".into(),
            name: None,
            created_at: Timestamp::now(),
        };
        assert!(format_user_line(&user).ends_with("  hikerjoe"));

        user.name = Some("Joe".into());
        assert!(format_user_line(&user).ends_with("  hikerjoe  (Joe)"));
    }

    #[test]
    fn mission_line_shows_status_and_type() {
        let now = Timestamp::now();
        let detail = MissionDetail {
            mission: Mission {
                id: Uuid::new_v4(),
                name: "Parliament Quiz".into(),
                description: String::new(),
                location: Location::new(19.0454, 47.5069),
                status: MissionStatus::Pending,
                created_by: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
            },
            task: Task::TrueOrFalse(TrueOrFalseTask {
                question: "Q?".into(),
                answer: true,
            }),
        };
        let line = format_mission_line(&detail, 2);
        let expected = "[pending]  [TRUE_OR_FALSE]  Parliament Quiz  (2 completed)";
        assert!(line.ends_with(expected), "{line}");
    }
}
