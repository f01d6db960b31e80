//! The user directory: registration and profiles.

use jiff::Timestamp;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger;
use crate::model::{User, UserProfile};
use crate::repository::Repository;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 5..=20;

/// Registers a user under a unique, alphanumeric username.
pub fn register_user(repo: &impl Repository, username: &str, name: Option<String>) -> Result<User> {
    if !USERNAME_LEN.contains(&username.chars().count())
        || !username.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(Error::Validation(format!(
            "username must be {} to {} letters or digits: {username:?}",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        name: name.filter(|n| !n.trim().is_empty()),
        created_at: Timestamp::now(),
    };
    repo.insert_user(&user)?;

    tracing::info!(user_id = %user.id, username, "user registered");
    Ok(user)
}

/// A user with their score.
pub fn user_profile(repo: &impl Repository, id: Uuid) -> Result<UserProfile> {
    let user = repo.load_user(id)?;
    let score = ledger::completion_count(repo, id)?;
    Ok(UserProfile { user, score })
}

pub fn find_by_username(repo: &impl Repository, username: &str) -> Result<Option<User>> {
    Ok(repo.find_user_by_username(username)?)
}

/// Every registered user, ordered by username.
pub fn list_users(repo: &impl Repository) -> Result<Vec<User>> {
    Ok(repo.list_users()?)
}

/// Sets or clears a user's display name. A blank name clears it.
///
/// Leaderboards read names at query time, so the next ranking shows the
/// new name.
pub fn rename_user(repo: &impl Repository, id: Uuid, name: Option<String>) -> Result<User> {
    let name = name.filter(|n| !n.trim().is_empty());
    let user = repo.rename_user(id, name.as_deref())?;
    tracing::info!(user_id = %id, name = user.display_name(), "user renamed");
    Ok(user)
}

/// Deletes a user together with their completions.
///
/// Missions they authored or moderated are kept.
pub fn delete_user(repo: &impl Repository, id: Uuid) -> Result<User> {
    let user = repo.delete_user(id)?;
    tracing::info!(user_id = %id, username = %user.username, "user deleted");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ledger::record_completion;
    use crate::lifecycle::tests::{approved_mission, sample_new_mission};
    use crate::storage::tests::test_storage;

    #[test]
    fn register_and_find() {
        let (_dir, storage) = test_storage();
        let user = register_user(&storage, "hikerjoe", Some("Joe".into())).unwrap();

        assert_eq!(user.display_name(), "Joe");
        assert_eq!(find_by_username(&storage, "hikerjoe").unwrap(), Some(user));
        assert_eq!(find_by_username(&storage, "nobody").unwrap(), None);
    }

    #[test]
    fn blank_display_name_is_dropped() {
        let (_dir, storage) = test_storage();
        let user = register_user(&storage, "hikerjoe", Some("  ".into())).unwrap();
        assert_eq!(user.name, None);
    }

    #[test]
    fn usernames_are_validated() {
        let (_dir, storage) = test_storage();
        for bad in ["joe", "hiker joe", "hiker-joe", "averyveryverylongusername"] {
            let err = register_user(&storage, bad, None).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn duplicate_username_is_taken() {
        let (_dir, storage) = test_storage();
        register_user(&storage, "hikerjoe", None).unwrap();
        let err = register_user(&storage, "hikerjoe", None).unwrap_err();
        assert!(matches!(err, Error::UsernameTaken(name) if name == "hikerjoe"));
    }

    #[test]
    fn profile_scores_completions() {
        let (_dir, storage) = test_storage();
        let admin = register_user(&storage, "admin01", None).unwrap();
        let player = register_user(&storage, "player1", None).unwrap();

        assert_eq!(user_profile(&storage, player.id).unwrap().score, 0);

        let mission = approved_mission(&storage, &admin, sample_new_mission());
        record_completion(&storage, player.id, mission.id).unwrap();
        let profile = user_profile(&storage, player.id).unwrap();
        assert_eq!(profile.user, player);
        assert_eq!(profile.score, 1);
    }

    #[test]
    fn rename_changes_display_name_and_blank_clears_it() {
        let (_dir, storage) = test_storage();
        let user = register_user(&storage, "hikerjoe", Some("Joe".into())).unwrap();

        let renamed = rename_user(&storage, user.id, Some("Joseph".into())).unwrap();
        assert_eq!(renamed.display_name(), "Joseph");

        let cleared = rename_user(&storage, user.id, Some("   ".into())).unwrap();
        assert_eq!(cleared.name, None);
        assert_eq!(cleared.display_name(), "hikerjoe");
    }

    #[test]
    fn rename_of_unknown_user_is_not_found() {
        let (_dir, storage) = test_storage();
        let err = rename_user(&storage, Uuid::new_v4(), None).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
    }

    #[test]
    fn delete_removes_user_and_score() {
        let (_dir, storage) = test_storage();
        let admin = register_user(&storage, "admin01", None).unwrap();
        let player = register_user(&storage, "player1", None).unwrap();
        let mission = approved_mission(&storage, &admin, sample_new_mission());
        record_completion(&storage, player.id, mission.id).unwrap();

        assert_eq!(delete_user(&storage, player.id).unwrap(), player);

        let err = user_profile(&storage, player.id).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
        assert_eq!(ledger::completion_count(&storage, player.id).unwrap(), 0);
        assert_eq!(list_users(&storage).unwrap(), [admin]);
    }

    #[test]
    fn delete_of_unknown_user_is_not_found() {
        let (_dir, storage) = test_storage();
        let err = delete_user(&storage, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
    }

    #[test]
    fn profile_of_unknown_user_is_not_found() {
        let (_dir, storage) = test_storage();
        let err = user_profile(&storage, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
    }
}
