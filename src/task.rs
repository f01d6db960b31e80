//! Task engine: checking task payloads, hiding answers, and judging submissions.
//!
//! Everything here is a pure function of its inputs.

use crate::error::{Error, Result};
use crate::model::{
    Answer, CompletableOption, CompletableTask, MultiChoiceTask, SimpleQuestionTask, Task,
    TaskSpec, TrueOrFalseTask,
};

/// Turns a creation payload into a task, checking that the derivative task
/// has exactly the fields of its declared type.
pub fn parse_task(spec: &TaskSpec) -> Result<Task> {
    let task = Task::from_parts(spec.kind, spec.derivative_task.clone()).map_err(|e| {
        Error::Validation(format!(
            "task payload does not match declared type {}: {e}",
            spec.kind
        ))
    })?;

    if task.question().trim().is_empty() {
        return Err(Error::Validation("task question cannot be empty".into()));
    }
    match &task {
        Task::TrueOrFalse(_) => {}
        Task::MultiChoice(mc) => {
            if mc.answers.is_empty() {
                return Err(Error::Validation(
                    "multi-choice task needs at least one option".into(),
                ));
            }
        }
        Task::SimpleQuestion(sq) => {
            if sq.answers.is_empty() {
                return Err(Error::Validation(
                    "simple-question task needs at least one accepted answer".into(),
                ));
            }
            if sq.answers.iter().any(|a| a.trim().is_empty()) {
                return Err(Error::Validation(
                    "simple-question accepted answers cannot be blank".into(),
                ));
            }
        }
    }

    Ok(task)
}

/// The task as a participant may see it: question and option texts only.
pub fn to_completable(task: &Task) -> CompletableTask {
    match task {
        Task::TrueOrFalse(TrueOrFalseTask { question, .. }) => CompletableTask::TrueOrFalse {
            question: question.clone(),
        },
        Task::MultiChoice(MultiChoiceTask { question, answers }) => CompletableTask::MultiChoice {
            question: question.clone(),
            answers: answers
                .iter()
                .map(|o| CompletableOption {
                    text: o.text.clone(),
                })
                .collect(),
        },
        Task::SimpleQuestion(SimpleQuestionTask { question, .. }) => {
            CompletableTask::SimpleQuestion {
                question: question.clone(),
            }
        }
    }
}

/// Judges a submitted answer.
///
/// `Ok(false)` is a wrong answer. An answer shaped for a different task
/// type is a validation error, whatever its content.
pub fn validate_answer(task: &Task, answer: &Answer) -> Result<bool> {
    match (task, answer) {
        (Task::TrueOrFalse(t), Answer::TrueOrFalse { answer }) => Ok(t.answer == *answer),
        (Task::MultiChoice(t), Answer::MultiChoice { selected_index }) => {
            let selected = usize::try_from(*selected_index)
                .ok()
                .and_then(|i| t.answers.get(i));
            Ok(selected.is_some_and(|o| o.is_correct))
        }
        (Task::SimpleQuestion(t), Answer::SimpleQuestion { answer }) => {
            let submitted = normalize(answer);
            Ok(t.answers.iter().any(|a| normalize(a) == submitted))
        }
        _ => Err(Error::Validation(format!(
            "{} answer submitted for a {} task",
            answer.kind(),
            task.kind()
        ))),
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
