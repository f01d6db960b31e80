//! User commands: add, list, show, rename, delete, completed.

use clap::Subcommand;

use crate::model::User;
use crate::{ledger, users};

use super::format::{format_completed_line, format_user_line};
use super::{Context, print_json};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user. Prints the user ID.
    Add {
        /// Unique login name: 5 to 20 letters or digits.
        username: String,

        /// Display name for leaderboards.
        #[arg(long)]
        name: Option<String>,
    },

    /// List registered users by username.
    List,

    /// Show a profile with its score. Defaults to the acting user.
    Show { username: Option<String> },

    /// Change the acting user's display name. Omit --name to clear it.
    Rename {
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a user and their completions. Defaults to the acting user.
    ///
    /// Missions the user created stay.
    Delete { username: Option<String> },

    /// Missions the acting user has completed, most recent first.
    Completed,
}

pub(super) fn run(ctx: &Context<'_>, command: UserCommand) -> Result<(), String> {
    match command {
        UserCommand::Add { username, name } => {
            let user = users::register_user(ctx.storage, &username, name)
                .map_err(|e| format!("failed to add user: {e}"))?;
            println!("{}", user.id);
            Ok(())
        }
        UserCommand::List => {
            let all = users::list_users(ctx.storage)
                .map_err(|e| format!("failed to list users: {e}"))?;
            if all.is_empty() {
                println!("No users");
            }
            for user in &all {
                println!("{}", format_user_line(user));
            }
            Ok(())
        }
        UserCommand::Show { username } => {
            let user = named_or_caller(ctx, username.as_deref())?;
            let profile = users::user_profile(ctx.storage, user.id)
                .map_err(|e| format!("failed to load profile: {e}"))?;
            print_json(&profile)
        }
        UserCommand::Rename { name } => {
            let caller = ctx.caller()?;
            let user = users::rename_user(ctx.storage, caller.id, name)
                .map_err(|e| format!("failed to rename user: {e}"))?;
            eprintln!("{} is now shown as {}", user.username, user.display_name());
            Ok(())
        }
        UserCommand::Delete { username } => {
            let user = named_or_caller(ctx, username.as_deref())?;
            let deleted = users::delete_user(ctx.storage, user.id)
                .map_err(|e| format!("failed to delete user: {e}"))?;
            eprintln!("User {} deleted", deleted.username);
            Ok(())
        }
        UserCommand::Completed => {
            let caller = ctx.caller()?;
            let completed = ledger::completed_missions(ctx.storage, caller.id)
                .map_err(|e| format!("failed to list completed missions: {e}"))?;
            if completed.is_empty() {
                println!("No completed missions");
            }
            for c in &completed {
                println!("{}", format_completed_line(c));
            }
            Ok(())
        }
    }
}

/// The named user, or the acting user when no name is given.
fn named_or_caller(ctx: &Context<'_>, username: Option<&str>) -> Result<User, String> {
    match username {
        Some(username) => users::find_by_username(ctx.storage, username)
            .map_err(|e| format!("failed to look up user: {e}"))?
            .ok_or_else(|| format!("no user named '{username}'")),
        None => ctx.caller(),
    }
}
