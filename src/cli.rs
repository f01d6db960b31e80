//! CLI interface for Geoquest.
//!
//! Each subcommand is non-interactive: arguments in, structured output out.
//! Structured results (profiles, tasks, submission results) are printed to
//! stdout as JSON; listings are printed as aligned text; confirmations of
//! moderation actions go to stderr.
//!
//! Commands that act on someone's behalf resolve the acting user through
//! `--as`, `GEOQUEST_IDENTITY`, then the config file.
//!
//! Mission ids take a full UUID or an unambiguous prefix.

mod format;
mod mission;
mod user;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::identity::resolve_identity;
use crate::model::User;
use crate::storage::Storage;
use crate::{leaderboard, lifecycle, users};

use format::format_ranking;
use mission::MissionCommand;
use user::UserCommand;

/// Geoquest: location-anchored quiz missions.
#[derive(Debug, Parser)]
#[command(name = "geoquest", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Username to act as. Overrides `GEOQUEST_IDENTITY` and the config file.
    #[arg(long = "as", global = true)]
    identity: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: from submission to leaderboard
  1. geoquest user add hikerjoe --name "Joe"
  2. geoquest --as hikerjoe mission new --name "Parliament Quiz" \
       --description "Facts about the building" --lon 19.0454 --lat 47.5069 \
       --task quiz.json
     → prints a mission ID (e.g. a3b0fc12-...)
  3. geoquest --as admin01 mission approve a3b
  4. geoquest --as hikerjoe mission nearby --lon 19.0460 --lat 47.5071
  5. geoquest --as hikerjoe mission start a3b --lon 19.0460 --lat 47.5071
  6. geoquest --as hikerjoe mission submit a3b --lon 19.0460 --lat 47.5071 --true
  7. geoquest leaderboard

Task file (quiz.json):
  { "type": "TRUE_OR_FALSE",
    "derivativeTask": { "question": "Completed in 1902?", "answer": true } }"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users and look at profiles.
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Create, discover, attempt, and moderate missions.
    Mission {
        #[command(subcommand)]
        command: MissionCommand,
    },

    /// Rank users by completed missions.
    Leaderboard {
        /// One ranking per task type instead of the overall one.
        #[arg(long)]
        by_task_type: bool,
    },
}

/// Everything a command needs besides its own arguments.
pub(crate) struct Context<'a> {
    pub storage: &'a Storage,
    config: &'a Config,
    identity: Option<String>,
}

impl Context<'_> {
    /// The acting user, resolved and looked up.
    pub fn caller(&self) -> Result<User, String> {
        let username = resolve_identity(self.identity.as_deref(), self.config.identity.as_deref())?;
        users::find_by_username(self.storage, &username)
            .map_err(|e| format!("failed to look up user: {e}"))?
            .ok_or_else(|| {
                format!("unknown user '{username}': register with `geoquest user add {username}`")
            })
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();
    let ctx = Context {
        storage,
        config,
        identity: cli.identity,
    };

    match cli.command {
        Command::User { command } => user::run(&ctx, command),
        Command::Mission { command } => mission::run(&ctx, command),
        Command::Leaderboard { by_task_type } => cmd_leaderboard(storage, by_task_type),
    }
}

fn cmd_leaderboard(storage: &Storage, by_task_type: bool) -> Result<(), String> {
    if !by_task_type {
        let board = leaderboard::overall_leaderboard(storage)
            .map_err(|e| format!("failed to build leaderboard: {e}"))?;
        if board.is_empty() {
            println!("No completions yet");
        }
        for line in format_ranking(&board) {
            println!("{line}");
        }
        return Ok(());
    }

    let boards = leaderboard::leaderboard_by_task_type(storage)
        .map_err(|e| format!("failed to build leaderboard: {e}"))?;
    if boards.is_empty() {
        println!("No completions yet");
    }
    for board in &boards {
        println!("{}", board.kind);
        for line in format_ranking(&board.user_points) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Print a value to stdout as pretty JSON.
fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize: {e}"))?;
    println!("{json}");
    Ok(())
}

/// Resolve a mission reference (full UUID or unambiguous prefix) to an id.
fn resolve_mission(storage: &Storage, reference: &str) -> Result<Uuid, String> {
    // A full UUID goes straight through; the operation reports if it's missing.
    if let Ok(id) = reference.parse::<Uuid>() {
        return Ok(id);
    }

    let missions = lifecycle::list_all_missions(storage, None)
        .map_err(|e| format!("failed to list missions: {e}"))?;

    let matches: Vec<Uuid> = missions
        .iter()
        .map(|d| d.mission.id)
        .filter(|id| id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no mission matching '{reference}'")),
        [id] => Ok(*id),
        many => {
            let ids: Vec<String> = many.iter().map(|id| format::short_id(*id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} missions: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}
