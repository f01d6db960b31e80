//! Completion storage: the at-most-once ledger of solved missions.

use std::cmp::Reverse;

use rusqlite::Row;
use uuid::Uuid;

use crate::model::{CompletedMission, CompletionRecord, Location, MissionSummary, TaskType};
use crate::repository::CompletionRepository;

use super::{Result, Storage, StorageError, parse_timestamp, parse_uuid};

impl CompletionRepository for Storage {
    fn insert_completion(&self, record: &CompletionRecord) -> Result<bool> {
        let conn = self.open_db()?;
        // The primary key decides; a lost race inserts nothing.
        let rows = conn.execute(
            "INSERT INTO completion (user_id, mission_id, completed_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, mission_id) DO NOTHING",
            rusqlite::params![
                record.user_id.to_string(),
                record.mission_id.to_string(),
                record.completed_at.to_string(),
            ],
        )?;
        Ok(rows == 1)
    }

    fn has_completion(&self, user_id: Uuid, mission_id: Uuid) -> Result<bool> {
        let conn = self.open_db()?;
        let exists = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM completion WHERE user_id = ?1 AND mission_id = ?2)",
            [user_id.to_string(), mission_id.to_string()],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    fn completions_for_user(&self, user_id: Uuid) -> Result<Vec<CompletionRecord>> {
        self.query_completions(
            "SELECT user_id, mission_id, completed_at FROM completion WHERE user_id = ?1",
            user_id,
        )
    }

    fn count_completions(&self, user_id: Uuid) -> Result<u64> {
        let conn = self.open_db()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM completion WHERE user_id = ?1",
            [user_id.to_string()],
            |row| row.get::<_, i64>(0),
        )?;
        u64::try_from(count)
            .map_err(|e| StorageError::Corrupt(format!("invalid completion count {count}: {e}")))
    }

    fn completions_for_mission(&self, mission_id: Uuid) -> Result<Vec<CompletionRecord>> {
        self.query_completions(
            "SELECT user_id, mission_id, completed_at FROM completion WHERE mission_id = ?1",
            mission_id,
        )
    }

    fn completed_missions(&self, user_id: Uuid) -> Result<Vec<CompletedMission>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare(
            "SELECT m.id, m.name, m.description, m.longitude, m.latitude, c.completed_at
             FROM completion c JOIN mission m ON m.id = c.mission_id
             WHERE c.user_id = ?1",
        )?;
        let rows = stmt.query_map([user_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut completed = Vec::new();
        for row in rows {
            let (id, name, description, longitude, latitude, completed_at) = row?;
            completed.push(CompletedMission {
                mission: MissionSummary {
                    id: parse_uuid(&id, "mission id")?,
                    name,
                    description,
                    location: Location::new(longitude, latitude),
                },
                completed_at: parse_timestamp(&completed_at, "completed_at")?,
            });
        }
        completed.sort_by_key(|c| Reverse(c.completed_at));
        Ok(completed)
    }

    fn completion_task_types(&self) -> Result<Vec<(Uuid, TaskType)>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare(
            "SELECT c.user_id, t.kind
             FROM completion c JOIN task t ON t.mission_id = c.mission_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut facts = Vec::new();
        for row in rows {
            let (user_id, kind) = row?;
            let kind = kind.parse::<TaskType>().map_err(StorageError::Corrupt)?;
            facts.push((parse_uuid(&user_id, "user_id")?, kind));
        }
        Ok(facts)
    }
}

impl Storage {
    fn query_completions(&self, sql: &str, id: Uuid) -> Result<Vec<CompletionRecord>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([id.to_string()], completion_columns)?;

        let mut records = Vec::new();
        for row in rows {
            let (user_id, mission_id, completed_at) = row?;
            records.push(CompletionRecord {
                user_id: parse_uuid(&user_id, "user_id")?,
                mission_id: parse_uuid(&mission_id, "mission_id")?,
                completed_at: parse_timestamp(&completed_at, "completed_at")?,
            });
        }
        records.sort_by_key(|r| r.completed_at);
        Ok(records)
    }
}

fn completion_columns(row: &Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}
