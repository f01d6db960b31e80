//! Mission commands: authoring, discovery, attempts, moderation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{Answer, Location, NewMission, StatusKind, TaskSpec};
use crate::{ledger, lifecycle};

use super::format::{format_mission_line, format_nearby_line, short_id};
use super::{Context, print_json, resolve_mission};

#[derive(Debug, Subcommand)]
pub enum MissionCommand {
    /// Submit a new mission for approval. Prints the mission ID.
    New {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        #[command(flatten)]
        location: LocationArgs,

        /// JSON file holding the task: `{ "type": ..., "derivativeTask": {...} }`.
        #[arg(long)]
        task: PathBuf,
    },

    /// Approved missions within a kilometre that you haven't completed.
    Nearby {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Show an approved mission.
    Show {
        /// Mission ID: full UUID or unambiguous prefix.
        mission: String,
    },

    /// Start a mission. Prints its question and options.
    ///
    /// You must be within 100 m of the mission.
    Start {
        /// Mission ID: full UUID or unambiguous prefix.
        mission: String,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Answer a mission. A wrong answer can be retried.
    Submit {
        /// Mission ID: full UUID or unambiguous prefix.
        mission: String,

        #[command(flatten)]
        location: LocationArgs,

        #[command(flatten)]
        answer: AnswerArgs,
    },

    /// List all missions with their tasks, newest first.
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Approve a pending mission.
    Approve { mission: String },

    /// Reject a pending mission.
    Reject { mission: String },

    /// Delete a mission in any state, with its task and completions.
    Delete { mission: String },
}

/// Where the caller is standing.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Longitude in degrees (-180 to 180).
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Latitude in degrees (-90 to 90).
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
}

impl LocationArgs {
    fn to_domain(&self) -> Location {
        Location::new(self.lon, self.lat)
    }
}

const ONE_ANSWER: &str = "give exactly one of --true, --false, --choice, --text";

/// Exactly one answer, matching the mission's task type.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct AnswerArgs {
    /// Answer a true-or-false task with "true".
    #[arg(long = "true")]
    yes: bool,

    /// Answer a true-or-false task with "false".
    #[arg(long = "false")]
    no: bool,

    /// Pick a multi-choice option by zero-based index.
    #[arg(long, allow_negative_numbers = true)]
    choice: Option<i64>,

    /// Answer a simple question.
    #[arg(long)]
    text: Option<String>,
}

impl AnswerArgs {
    fn to_domain(&self) -> Result<Answer, String> {
        match (self.yes, self.no, self.choice, &self.text) {
            (true, false, None, None) => Ok(Answer::TrueOrFalse { answer: true }),
            (false, true, None, None) => Ok(Answer::TrueOrFalse { answer: false }),
            (false, false, Some(selected_index), None) => {
                Ok(Answer::MultiChoice { selected_index })
            }
            (false, false, None, Some(answer)) => Ok(Answer::SimpleQuestion {
                answer: answer.clone(),
            }),
            _ => Err(ONE_ANSWER.to_string()),
        }
    }
}

/// CLI-facing status filter, mapped to the domain `StatusKind`.
#[derive(Debug, Clone, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl StatusArg {
    fn to_domain(&self) -> StatusKind {
        match self {
            Self::Pending => StatusKind::Pending,
            Self::Approved => StatusKind::Approved,
            Self::Rejected => StatusKind::Rejected,
        }
    }
}

pub(super) fn run(ctx: &Context<'_>, command: MissionCommand) -> Result<(), String> {
    match command {
        MissionCommand::New {
            name,
            description,
            location,
            task,
        } => cmd_new(ctx, name, description, location.to_domain(), &task),
        MissionCommand::Nearby { location } => cmd_nearby(ctx, location.to_domain()),
        MissionCommand::Show { mission } => {
            let id = resolve_mission(ctx.storage, &mission)?;
            let summary = lifecycle::get_mission_summary(ctx.storage, id)
                .map_err(|e| format!("failed to show mission: {e}"))?;
            print_json(&summary)
        }
        MissionCommand::Start { mission, location } => {
            let caller = ctx.caller()?;
            let id = resolve_mission(ctx.storage, &mission)?;
            let task = lifecycle::start_mission(ctx.storage, id, caller.id, location.to_domain())
                .map_err(|e| format!("failed to start mission: {e}"))?;
            print_json(&task)
        }
        MissionCommand::Submit {
            mission,
            location,
            answer,
        } => {
            let answer = answer.to_domain()?;
            let caller = ctx.caller()?;
            let id = resolve_mission(ctx.storage, &mission)?;
            let result =
                lifecycle::submit_mission(ctx.storage, id, caller.id, location.to_domain(), &answer)
                    .map_err(|e| format!("failed to submit answer: {e}"))?;
            if result.is_success() {
                eprintln!("Correct! Mission {} completed", short_id(id));
            } else {
                eprintln!("Wrong answer, try again");
            }
            print_json(&result)
        }
        MissionCommand::List { status } => {
            cmd_list(ctx, status.as_ref().map(StatusArg::to_domain))
        }
        MissionCommand::Approve { mission } => {
            let admin = ctx.caller()?;
            let id = resolve_mission(ctx.storage, &mission)?;
            lifecycle::approve_mission(ctx.storage, id, admin.id)
                .map_err(|e| format!("failed to approve mission: {e}"))?;
            eprintln!("Mission {} approved", short_id(id));
            Ok(())
        }
        MissionCommand::Reject { mission } => {
            let admin = ctx.caller()?;
            let id = resolve_mission(ctx.storage, &mission)?;
            lifecycle::reject_mission(ctx.storage, id, admin.id)
                .map_err(|e| format!("failed to reject mission: {e}"))?;
            eprintln!("Mission {} rejected", short_id(id));
            Ok(())
        }
        MissionCommand::Delete { mission } => {
            let id = resolve_mission(ctx.storage, &mission)?;
            let deleted = lifecycle::delete_mission(ctx.storage, id)
                .map_err(|e| format!("failed to delete mission: {e}"))?;
            eprintln!("Mission {} deleted: {}", short_id(id), deleted.mission.name);
            Ok(())
        }
    }
}

fn cmd_new(
    ctx: &Context<'_>,
    name: String,
    description: String,
    location: Location,
    task_path: &Path,
) -> Result<(), String> {
    let creator = ctx.caller()?;

    let contents = fs::read_to_string(task_path)
        .map_err(|e| format!("failed to read {}: {e}", task_path.display()))?;
    let task: TaskSpec = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid task file {}: {e}", task_path.display()))?;

    let new = NewMission {
        name,
        description,
        location,
        task,
    };
    let created = lifecycle::create_mission(ctx.storage, new, creator.id)
        .map_err(|e| format!("failed to create mission: {e}"))?;

    println!("{}", created.mission.id);
    Ok(())
}

fn cmd_nearby(ctx: &Context<'_>, location: Location) -> Result<(), String> {
    let caller = ctx.caller()?;
    let missions = lifecycle::list_nearby(ctx.storage, location, caller.id)
        .map_err(|e| format!("failed to list nearby missions: {e}"))?;

    if missions.is_empty() {
        println!("No missions nearby");
        return Ok(());
    }
    for m in &missions {
        println!("{}", format_nearby_line(m, location));
    }
    Ok(())
}

fn cmd_list(ctx: &Context<'_>, status: Option<StatusKind>) -> Result<(), String> {
    let missions = lifecycle::list_all_missions(ctx.storage, status)
        .map_err(|e| format!("failed to list missions: {e}"))?;

    if missions.is_empty() {
        println!("No missions");
        return Ok(());
    }
    for d in &missions {
        let completions = ledger::completions_for_mission(ctx.storage, d.mission.id)
            .map_err(|e| format!("failed to count completions: {e}"))?;
        println!("{}", format_mission_line(d, completions.len()));
    }
    Ok(())
}
