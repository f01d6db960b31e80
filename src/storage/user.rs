//! User storage: just enough of a directory for attribution and display names.

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::model::User;
use crate::repository::UserRepository;

use super::{Result, Storage, StorageError, parse_timestamp, parse_uuid};

const USER_COLUMNS: &str = "id, username, name, created_at";

impl UserRepository for Storage {
    fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.open_db()?;
        let rows = conn.execute(
            "INSERT INTO user (id, username, name, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (username) DO NOTHING",
            rusqlite::params![
                user.id.to_string(),
                &user.username,
                &user.name,
                user.created_at.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::UsernameTaken(user.username.clone()));
        }
        Ok(())
    }

    fn load_user(&self, id: Uuid) -> Result<User> {
        let conn = self.open_db()?;
        load_user_row(&conn, id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.open_db()?;
        query_user(&conn, "username", username)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.open_db()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM user ORDER BY username");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], UserRow::from_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?.decode()?);
        }
        Ok(users)
    }

    fn rename_user(&self, id: Uuid, name: Option<&str>) -> Result<User> {
        let conn = self.open_db()?;
        let rows = conn.execute(
            "UPDATE user SET name = ?1 WHERE id = ?2",
            rusqlite::params![name, id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::UserNotFound(id));
        }
        load_user_row(&conn, id)
    }

    fn delete_user(&self, id: Uuid) -> Result<User> {
        let mut conn = self.open_db()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let user = load_user_row(&tx, id)?;
        tx.execute("DELETE FROM user WHERE id = ?1", [id.to_string()])?;
        tx.commit()?;
        Ok(user)
    }
}

/// Raw column values of a user row.
struct UserRow {
    id: String,
    username: String,
    name: Option<String>,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn decode(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            username: self.username,
            name: self.name,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        })
    }
}

fn load_user_row(conn: &Connection, id: Uuid) -> Result<User> {
    query_user(conn, "id", &id.to_string())?
        .ok_or(StorageError::UserNotFound(id))
}

/// Looks a user up by a unique column.
fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE {column} = ?1"),
            [value],
            UserRow::from_row,
        )
        .optional()?;
    row.map(UserRow::decode).transpose()
}
