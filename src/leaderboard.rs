//! Rankings derived from the completion ledger.
//!
//! One point per completion. Nothing is cached: every call reads the
//! ledger as it is now. Ties on points are broken by display name, then
//! by user id, so equal inputs always produce the same order.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::error::Result;
use crate::model::{TaskType, TaskTypeLeaderboard, UserPoints};
use crate::repository::Repository;

/// Every user with at least one completion, best first.
pub fn overall_leaderboard(repo: &impl Repository) -> Result<Vec<UserPoints>> {
    let facts = repo.completion_task_types()?;
    let mut names = DisplayNames::new(repo);
    rank(&mut names, tally(facts.iter().map(|(user_id, _)| *user_id)))
}

/// One ranking per task type that has at least one completion, ordered by
/// type name.
pub fn leaderboard_by_task_type(repo: &impl Repository) -> Result<Vec<TaskTypeLeaderboard>> {
    let facts = repo.completion_task_types()?;
    let mut names = DisplayNames::new(repo);

    let mut groups: BTreeMap<&'static str, (TaskType, Vec<Uuid>)> = BTreeMap::new();
    for (user_id, kind) in facts {
        groups
            .entry(kind.as_str())
            .or_insert_with(|| (kind, Vec::new()))
            .1
            .push(user_id);
    }

    groups
        .into_values()
        .map(|(kind, users)| -> Result<TaskTypeLeaderboard> {
            Ok(TaskTypeLeaderboard {
                kind,
                user_points: rank(&mut names, tally(users))?,
            })
        })
        .collect()
}

fn tally(users: impl IntoIterator<Item = Uuid>) -> HashMap<Uuid, u64> {
    let mut counts = HashMap::new();
    for user_id in users {
        *counts.entry(user_id).or_insert(0) += 1;
    }
    counts
}

fn rank<R: Repository>(
    names: &mut DisplayNames<'_, R>,
    counts: HashMap<Uuid, u64>,
) -> Result<Vec<UserPoints>> {
    let mut rows = Vec::with_capacity(counts.len());
    for (user_id, points) in counts {
        rows.push((names.get(user_id)?, user_id, points));
    }
    rows.sort_by(|(a_name, a_id, a_points), (b_name, b_id, b_points)| {
        b_points
            .cmp(a_points)
            .then_with(|| a_name.cmp(b_name))
            .then_with(|| a_id.cmp(b_id))
    });
    Ok(rows
        .into_iter()
        .map(|(name, _, points)| UserPoints { name, points })
        .collect())
}

/// Display names looked up at most once per user within one call.
struct DisplayNames<'a, R> {
    repo: &'a R,
    seen: HashMap<Uuid, String>,
}

impl<'a, R: Repository> DisplayNames<'a, R> {
    fn new(repo: &'a R) -> Self {
        Self {
            repo,
            seen: HashMap::new(),
        }
    }

    fn get(&mut self, user_id: Uuid) -> Result<String> {
        if let Some(name) = self.seen.get(&user_id) {
            return Ok(name.clone());
        }
        let name = self.repo.load_user(user_id)?.display_name().to_string();
        self.seen.insert(user_id, name.clone());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::ledger::record_completion;
    use crate::lifecycle::tests::{approved_mission, new_mission_with, sample_new_mission};
    use crate::model::{Mission, User};
    use crate::storage::Storage;
    use crate::storage::tests::{add_user, test_storage};
    use crate::users::{delete_user, rename_user};

    fn simple_question_mission(storage: &Storage, admin: &User) -> Mission {
        let new = new_mission_with(
            TaskType::SimpleQuestion,
            json!({ "question": "Which river?", "answers": ["Danube"] }),
        );
        approved_mission(storage, admin, new)
    }

    fn points(rows: &[UserPoints]) -> Vec<(&str, u64)> {
        rows.iter().map(|r| (r.name.as_str(), r.points)).collect()
    }

    #[test]
    fn empty_ledger_has_empty_boards() {
        let (_dir, storage) = test_storage();
        assert!(overall_leaderboard(&storage).unwrap().is_empty());
        assert!(leaderboard_by_task_type(&storage).unwrap().is_empty());
    }

    #[test]
    fn overall_orders_by_points() {
        let (_dir, storage) = test_storage();
        let admin = add_user(&storage, "admin01", None);
        let u1 = add_user(&storage, "user0001", Some("Ursula"));
        let u2 = add_user(&storage, "user0002", None);

        let missions: Vec<_> = (0..3)
            .map(|_| approved_mission(&storage, &admin, sample_new_mission()))
            .collect();
        for m in &missions {
            record_completion(&storage, u1.id, m.id).unwrap();
        }
        record_completion(&storage, u2.id, missions[0].id).unwrap();

        let board = overall_leaderboard(&storage).unwrap();
        assert_eq!(points(&board), [("Ursula", 3), ("user0002", 1)]);
    }

    #[test]
    fn ties_break_by_display_name() {
        let (_dir, storage) = test_storage();
        let admin = add_user(&storage, "admin01", None);
        let zed = add_user(&storage, "zed00001", None);
        let amy = add_user(&storage, "amy00001", None);
        let mission = approved_mission(&storage, &admin, sample_new_mission());

        record_completion(&storage, zed.id, mission.id).unwrap();
        record_completion(&storage, amy.id, mission.id).unwrap();

        let board = overall_leaderboard(&storage).unwrap();
        assert_eq!(points(&board), [("amy00001", 1), ("zed00001", 1)]);
    }

    #[test]
    fn by_task_type_groups_in_type_order() {
        let (_dir, storage) = test_storage();
        let admin = add_user(&storage, "admin01", None);
        let u1 = add_user(&storage, "user0001", None);
        let u2 = add_user(&storage, "user0002", None);

        let t1 = approved_mission(&storage, &admin, sample_new_mission());
        let t2 = approved_mission(&storage, &admin, sample_new_mission());
        let sq = simple_question_mission(&storage, &admin);

        record_completion(&storage, u1.id, t1.id).unwrap();
        record_completion(&storage, u1.id, t2.id).unwrap();
        record_completion(&storage, u2.id, t1.id).unwrap();
        record_completion(&storage, u2.id, sq.id).unwrap();

        let boards = leaderboard_by_task_type(&storage).unwrap();
        let kinds: Vec<_> = boards.iter().map(|b| b.kind).collect();
        // No multi-choice completions, so no multi-choice group.
        assert_eq!(kinds, [TaskType::SimpleQuestion, TaskType::TrueOrFalse]);

        assert_eq!(points(&boards[0].user_points), [("user0002", 1)]);
        assert_eq!(
            points(&boards[1].user_points),
            [("user0001", 2), ("user0002", 1)]
        );
    }

    #[test]
    fn deleting_a_mission_removes_its_points() {
        let (_dir, storage) = test_storage();
        let admin = add_user(&storage, "admin01", None);
        let player = add_user(&storage, "player1", None);
        let mission = approved_mission(&storage, &admin, sample_new_mission());
        record_completion(&storage, player.id, mission.id).unwrap();

        crate::lifecycle::delete_mission(&storage, mission.id).unwrap();
        assert!(overall_leaderboard(&storage).unwrap().is_empty());
    }

    #[test]
    fn renamed_user_shows_new_name_on_next_board() {
        let (_dir, storage) = test_storage();
        let admin = add_user(&storage, "admin01", None);
        let player = add_user(&storage, "player1", Some("Pat"));
        let mission = approved_mission(&storage, &admin, sample_new_mission());
        record_completion(&storage, player.id, mission.id).unwrap();

        assert_eq!(points(&overall_leaderboard(&storage).unwrap()), [("Pat", 1)]);

        rename_user(&storage, player.id, Some("Patricia".into())).unwrap();
        let board = overall_leaderboard(&storage).unwrap();
        assert_eq!(points(&board), [("Patricia", 1)]);
        let boards = leaderboard_by_task_type(&storage).unwrap();
        assert_eq!(points(&boards[0].user_points), [("Patricia", 1)]);
    }

    #[test]
    fn deleting_a_user_removes_their_points() {
        let (_dir, storage) = test_storage();
        let admin = add_user(&storage, "admin01", None);
        let stays = add_user(&storage, "stays01", None);
        let leaves = add_user(&storage, "leaves1", None);
        let mission = approved_mission(&storage, &admin, sample_new_mission());
        record_completion(&storage, stays.id, mission.id).unwrap();
        record_completion(&storage, leaves.id, mission.id).unwrap();

        delete_user(&storage, leaves.id).unwrap();

        let board = overall_leaderboard(&storage).unwrap();
        assert_eq!(points(&board), [("stays01", 1)]);
        let boards = leaderboard_by_task_type(&storage).unwrap();
        assert_eq!(points(&boards[0].user_points), [("stays01", 1)]);
    }

    #[test]
    fn board_serializes_with_wire_names() {
        let board = TaskTypeLeaderboard {
            kind: TaskType::MultiChoice,
            user_points: vec![UserPoints {
                name: "Ursula".into(),
                points: 2,
            }],
        };
        assert_eq!(
            serde_json::to_value(&board).unwrap(),
            json!({ "type": "MULTI_CHOICE", "userPoints": [{ "name": "Ursula", "points": 2 }] })
        );
    }
}
