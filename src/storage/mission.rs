//! Mission storage: missions and the tasks they own.

use std::cmp::Reverse;

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::geofence::BoundingBox;
use crate::model::{Location, Mission, MissionDetail, MissionStatus, StatusKind, Task, TaskType};
use crate::repository::MissionRepository;

use super::{Result, Storage, StorageError, parse_timestamp, parse_uuid};

const MISSION_COLUMNS: &str = "m.id, m.name, m.description, m.longitude, m.latitude, m.status, \
     m.created_by, m.decided_by, m.decided_at, m.created_at, m.updated_at";

impl MissionRepository for Storage {
    fn insert_mission(&self, mission: &Mission, task: &Task) -> Result<()> {
        let mut conn = self.open_db()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (status, decided_by, decided_at) = serialize_status(&mission.status);
        tx.execute(
            "INSERT INTO mission (id, name, description, longitude, latitude, status,
                                  created_by, decided_by, decided_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                mission.id.to_string(),
                &mission.name,
                &mission.description,
                mission.location.longitude,
                mission.location.latitude,
                status,
                mission.created_by.to_string(),
                decided_by,
                decided_at,
                mission.created_at.to_string(),
                mission.updated_at.to_string(),
            ],
        )?;
        tx.execute(
            "INSERT INTO task (mission_id, kind, payload) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                mission.id.to_string(),
                task.kind().as_str(),
                serde_json::to_string(&task.payload()?)?,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_mission(&self, id: Uuid) -> Result<Mission> {
        let conn = self.open_db()?;
        load_mission_row(&conn, id)
    }

    fn load_task(&self, mission_id: Uuid) -> Result<Task> {
        let conn = self.open_db()?;
        load_task_row(&conn, mission_id)
    }

    fn load_mission_detail(&self, id: Uuid) -> Result<MissionDetail> {
        let conn = self.open_db()?;
        load_detail(&conn, id)
    }

    fn list_mission_details(&self, status: Option<StatusKind>) -> Result<Vec<MissionDetail>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MISSION_COLUMNS}, t.kind, t.payload
             FROM mission m JOIN task t ON t.mission_id = m.id
             WHERE ?1 IS NULL OR m.status = ?1"
        ))?;
        let rows = stmt.query_map([status.map(StatusKind::as_str)], |row| {
            Ok((
                MissionRow::from_row(row)?,
                row.get::<_, String>(11)?,
                row.get::<_, String>(12)?,
            ))
        })?;

        let mut details = Vec::new();
        for row in rows {
            let (mission, kind, payload) = row?;
            details.push(MissionDetail {
                mission: mission.decode()?,
                task: decode_task(&kind, &payload)?,
            });
        }
        details.sort_by_key(|d| Reverse(d.mission.created_at));
        Ok(details)
    }

    fn approved_missions_in(&self, area: &BoundingBox, user_id: Uuid) -> Result<Vec<Mission>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MISSION_COLUMNS}
             FROM mission m
             WHERE m.status = 'approved'
               AND m.latitude BETWEEN ?1 AND ?2
               AND (?3 IS NULL OR m.longitude BETWEEN ?3 AND ?4)
               AND NOT EXISTS (
                   SELECT 1 FROM completion c
                   WHERE c.mission_id = m.id AND c.user_id = ?5
               )"
        ))?;
        let (min_lon, max_lon) = area.longitude.unzip();
        let rows = stmt.query_map(
            rusqlite::params![
                area.min_latitude,
                area.max_latitude,
                min_lon,
                max_lon,
                user_id.to_string(),
            ],
            MissionRow::from_row,
        )?;

        let mut missions = Vec::new();
        for row in rows {
            missions.push(row?.decode()?);
        }
        missions.sort_by_key(|m| m.created_at);
        Ok(missions)
    }

    fn transition_mission(&self, id: Uuid, status: &MissionStatus, at: Timestamp) -> Result<bool> {
        let conn = self.open_db()?;
        let (status, decided_by, decided_at) = serialize_status(status);
        let rows = conn.execute(
            "UPDATE mission
             SET status = ?1, decided_by = ?2, decided_at = ?3, updated_at = ?4
             WHERE id = ?5 AND status = 'pending'",
            rusqlite::params![status, decided_by, decided_at, at.to_string(), id.to_string()],
        )?;
        Ok(rows == 1)
    }

    fn delete_mission(&self, id: Uuid) -> Result<MissionDetail> {
        let mut conn = self.open_db()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let detail = load_detail(&tx, id)?;
        tx.execute("DELETE FROM mission WHERE id = ?1", [id.to_string()])?;
        tx.commit()?;
        Ok(detail)
    }
}

/// Raw column values of a mission row, decoded outside rusqlite's closure
/// so decoding failures surface as [`StorageError::Corrupt`].
struct MissionRow {
    id: String,
    name: String,
    description: String,
    longitude: f64,
    latitude: f64,
    status: String,
    created_by: String,
    decided_by: Option<String>,
    decided_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl MissionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            longitude: row.get(3)?,
            latitude: row.get(4)?,
            status: row.get(5)?,
            created_by: row.get(6)?,
            decided_by: row.get(7)?,
            decided_at: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn decode(self) -> Result<Mission> {
        Ok(Mission {
            id: parse_uuid(&self.id, "mission id")?,
            name: self.name,
            description: self.description,
            location: Location::new(self.longitude, self.latitude),
            status: deserialize_status(
                &self.status,
                self.decided_by.as_deref(),
                self.decided_at.as_deref(),
            )?,
            created_by: parse_uuid(&self.created_by, "created_by")?,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
        })
    }
}

fn load_mission_row(conn: &Connection, id: Uuid) -> Result<Mission> {
    let row = conn
        .query_row(
            &format!("SELECT {MISSION_COLUMNS} FROM mission m WHERE m.id = ?1"),
            [id.to_string()],
            MissionRow::from_row,
        )
        .optional()?;
    row.ok_or(StorageError::MissionNotFound(id))?.decode()
}

fn load_task_row(conn: &Connection, mission_id: Uuid) -> Result<Task> {
    let row = conn
        .query_row(
            "SELECT kind, payload FROM task WHERE mission_id = ?1",
            [mission_id.to_string()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    let (kind, payload) = row.ok_or(StorageError::MissionNotFound(mission_id))?;
    decode_task(&kind, &payload)
}

fn load_detail(conn: &Connection, id: Uuid) -> Result<MissionDetail> {
    Ok(MissionDetail {
        mission: load_mission_row(conn, id)?,
        task: load_task_row(conn, id)?,
    })
}

fn decode_task(kind: &str, payload: &str) -> Result<Task> {
    let kind = kind.parse::<TaskType>().map_err(StorageError::Corrupt)?;
    let payload = serde_json::from_str(payload)?;
    Task::from_parts(kind, payload)
        .map_err(|e| StorageError::Corrupt(format!("task payload does not match {kind}: {e}")))
}

/// Converts a `MissionStatus` to column values for the mission table.
fn serialize_status(status: &MissionStatus) -> (&'static str, Option<String>, Option<String>) {
    match status {
        MissionStatus::Pending => (StatusKind::Pending.as_str(), None, None),
        MissionStatus::Approved {
            approved_by,
            approved_at,
        } => (
            StatusKind::Approved.as_str(),
            Some(approved_by.to_string()),
            Some(approved_at.to_string()),
        ),
        MissionStatus::Rejected {
            approved_by,
            approved_at,
        } => (
            StatusKind::Rejected.as_str(),
            Some(approved_by.to_string()),
            Some(approved_at.to_string()),
        ),
    }
}

/// Reconstructs a `MissionStatus` from mission table column values.
fn deserialize_status(
    status: &str,
    decided_by: Option<&str>,
    decided_at: Option<&str>,
) -> Result<MissionStatus> {
    let kind = status.parse::<StatusKind>().map_err(StorageError::Corrupt)?;
    if kind == StatusKind::Pending {
        return Ok(MissionStatus::Pending);
    }

    let (Some(by), Some(at)) = (decided_by, decided_at) else {
        return Err(StorageError::Corrupt(format!(
            "mission is {kind} but has no decision recorded"
        )));
    };
    let approved_by = parse_uuid(by, "decided_by")?;
    let approved_at = parse_timestamp(at, "decided_at")?;

    Ok(match kind {
        StatusKind::Approved => MissionStatus::Approved {
            approved_by,
            approved_at,
        },
        StatusKind::Rejected => MissionStatus::Rejected {
            approved_by,
            approved_at,
        },
        StatusKind::Pending => MissionStatus::Pending,
    })
}
