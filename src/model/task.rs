//! Task types: the quiz content attached to a mission.
//!
//! Three shapes exist, each in three forms:
//!
//! - [`Task`]: the stored task, correct answers included.
//! - [`CompletableTask`]: what a participant receives when starting a mission.
//! - [`Answer`]: what a participant submits.
//!
//! On the wire a task is `{ "type": "...", "derivativeTask": { ... } }`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The declared kind of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    TrueOrFalse,
    MultiChoice,
    SimpleQuestion,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TrueOrFalse => "TRUE_OR_FALSE",
            Self::MultiChoice => "MULTI_CHOICE",
            Self::SimpleQuestion => "SIMPLE_QUESTION",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRUE_OR_FALSE" => Ok(Self::TrueOrFalse),
            "MULTI_CHOICE" => Ok(Self::MultiChoice),
            "SIMPLE_QUESTION" => Ok(Self::SimpleQuestion),
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

/// A stored task. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "derivativeTask",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Task {
    TrueOrFalse(TrueOrFalseTask),
    MultiChoice(MultiChoiceTask),
    SimpleQuestion(SimpleQuestionTask),
}

impl Task {
    pub fn kind(&self) -> TaskType {
        match self {
            Self::TrueOrFalse(_) => TaskType::TrueOrFalse,
            Self::MultiChoice(_) => TaskType::MultiChoice,
            Self::SimpleQuestion(_) => TaskType::SimpleQuestion,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Self::TrueOrFalse(t) => &t.question,
            Self::MultiChoice(t) => &t.question,
            Self::SimpleQuestion(t) => &t.question,
        }
    }

    /// Decodes a derivative-task payload against the declared type.
    ///
    /// Fails when the payload's fields don't belong to that type.
    pub fn from_parts(kind: TaskType, payload: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            TaskType::TrueOrFalse => Self::TrueOrFalse(serde_json::from_value(payload)?),
            TaskType::MultiChoice => Self::MultiChoice(serde_json::from_value(payload)?),
            TaskType::SimpleQuestion => Self::SimpleQuestion(serde_json::from_value(payload)?),
        })
    }

    /// The derivative-task payload alone, without the type tag.
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::TrueOrFalse(t) => serde_json::to_value(t),
            Self::MultiChoice(t) => serde_json::to_value(t),
            Self::SimpleQuestion(t) => serde_json::to_value(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrueOrFalseTask {
    pub question: String,
    pub answer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiChoiceTask {
    pub question: String,

    /// Selectable options, in display order. Indices into this list are
    /// the only valid selections.
    pub answers: Vec<MultiChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiChoiceOption {
    pub text: String,
    #[serde(rename = "isTrue")]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimpleQuestionTask {
    pub question: String,

    /// Accepted answers, compared case- and whitespace-insensitively.
    /// Not normalized in storage.
    pub answers: Vec<String>,
}

/// An unchecked task payload as submitted with a new mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub derivative_task: serde_json::Value,
}

/// A task with every correctness-bearing field removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "derivativeTask",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum CompletableTask {
    TrueOrFalse { question: String },
    MultiChoice {
        question: String,
        answers: Vec<CompletableOption>,
    },
    SimpleQuestion { question: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletableOption {
    pub text: String,
}

/// A participant's submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Answer {
    TrueOrFalse { answer: bool },

    /// Signed so that any client-sent number round-trips; negative indices
    /// simply select nothing.
    MultiChoice { selected_index: i64 },

    SimpleQuestion { answer: String },
}

impl Answer {
    pub fn kind(&self) -> TaskType {
        match self {
            Self::TrueOrFalse { .. } => TaskType::TrueOrFalse,
            Self::MultiChoice { .. } => TaskType::MultiChoice,
            Self::SimpleQuestion { .. } => TaskType::SimpleQuestion,
        }
    }
}

/// The outcome of a submission that passed every gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result")]
pub enum SubmissionResult {
    Success,
    Failed,
}

impl SubmissionResult {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn task_serializes_with_type_tag_and_derivative_task() {
        let task = Task::TrueOrFalse(TrueOrFalseTask {
            question: "Is the Danube blue?".into(),
            answer: false,
        });
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "TRUE_OR_FALSE",
                "derivativeTask": { "question": "Is the Danube blue?", "answer": false }
            })
        );
    }

    #[test]
    fn multi_choice_option_uses_is_true_on_the_wire() {
        let value = json!({
            "question": "Completed in?",
            "answers": [{ "text": "1885", "isTrue": false }, { "text": "1902", "isTrue": true }]
        });
        let task = Task::from_parts(TaskType::MultiChoice, value).unwrap();
        let Task::MultiChoice(mc) = task else {
            panic!("expected multi-choice task");
        };
        assert!(mc.answers[1].is_correct);
    }

    #[test]
    fn from_parts_rejects_payload_of_another_type() {
        let value = json!({ "question": "River?", "answers": ["danube"] });
        assert!(Task::from_parts(TaskType::TrueOrFalse, value.clone()).is_err());
        assert!(Task::from_parts(TaskType::MultiChoice, value.clone()).is_err());
        assert!(Task::from_parts(TaskType::SimpleQuestion, value).is_ok());
    }

    #[test]
    fn payload_round_trips_through_from_parts() {
        let task = Task::SimpleQuestion(SimpleQuestionTask {
            question: "River?".into(),
            answers: vec!["Danube".into(), "Duna".into()],
        });
        let rebuilt = Task::from_parts(task.kind(), task.payload().unwrap()).unwrap();
        assert_eq!(rebuilt, task);
    }

    #[test]
    fn answer_wire_shape() {
        let answer: Answer =
            serde_json::from_value(json!({ "type": "MULTI_CHOICE", "selectedIndex": 2 })).unwrap();
        assert_eq!(answer, Answer::MultiChoice { selected_index: 2 });
    }

    #[test]
    fn submission_result_wire_shape() {
        let value = serde_json::to_value(SubmissionResult::Success).unwrap();
        assert_eq!(value, json!({ "result": "Success" }));
    }

    #[test]
    fn task_type_parses_its_own_label() {
        for kind in [
            TaskType::TrueOrFalse,
            TaskType::MultiChoice,
            TaskType::SimpleQuestion,
        ] {
            assert_eq!(kind.as_str().parse::<TaskType>().unwrap(), kind);
        }
    }
}
