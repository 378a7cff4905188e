//! Checklist (markdown-style) export of a task subset.
//!
//! # Responsibility
//! - Group tasks by phase, then by task label.
//! - Render headings, checkbox lines and quoted note lines.
//!
//! # Invariants
//! - An empty input set is refused with `EmptyExportSet`.
//! - Groups appear in first-seen order of the input; tasks keep input order.
//! - Tasks without a phase (or task label) land in an ungrouped bucket.

use crate::model::task::{Task, TaskStatus};
use crate::parser::document::{extract_phase, extract_task_number};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXPORT_TITLE: &str = "# Task Master Export";
const UNGROUPED_HEADING: &str = "Ungrouped Tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportError {
    /// Nothing to export; no file should be produced.
    EmptyExportSet,
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyExportSet => {
                write!(f, "no tasks to export; adjust the filters and try again")
            }
        }
    }
}

impl Error for ExportError {}

/// Tasks sharing one task label inside a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup<'a> {
    /// `None` is the ungrouped bucket.
    pub label: Option<String>,
    pub tasks: Vec<&'a Task>,
}

/// Task groups sharing one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGroup<'a> {
    /// `None` is the ungrouped bucket.
    pub phase: Option<String>,
    pub groups: Vec<TaskGroup<'a>>,
}

/// Groups tasks by phase, then by task label, in first-seen order.
///
/// Missing `phase`/`task_number` values fall back to a `Phase N: ...` /
/// `Task N: ...` pattern found in the task's section heading.
pub fn group_by_phase_and_task<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<PhaseGroup<'a>> {
    let mut phases: Vec<PhaseGroup<'a>> = Vec::new();

    for task in tasks {
        let phase = phase_key(task);
        let label = task_key(task);

        let phase_index = match phases.iter().position(|group| group.phase == phase) {
            Some(index) => index,
            None => {
                phases.push(PhaseGroup {
                    phase,
                    groups: Vec::new(),
                });
                phases.len() - 1
            }
        };
        let groups = &mut phases[phase_index].groups;
        match groups.iter().position(|group| group.label == label) {
            Some(index) => groups[index].tasks.push(task),
            None => groups.push(TaskGroup {
                label,
                tasks: vec![task],
            }),
        }
    }

    phases
}

/// Renders a grouped checklist document.
///
/// # Errors
/// - `EmptyExportSet` when `tasks` yields nothing.
pub fn render_checklist<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    export_date: NaiveDate,
) -> Result<String, ExportError> {
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    if tasks.is_empty() {
        info!("event=checklist_export module=export status=error error_code=empty_export_set");
        return Err(ExportError::EmptyExportSet);
    }

    let mut out = String::new();
    out.push_str(EXPORT_TITLE);
    out.push_str("\n\n");
    out.push_str(&format!("Export Date: {}\n", export_date.format("%Y-%m-%d")));
    out.push_str(&format!("Total Tasks: {}\n\n", tasks.len()));

    for phase in group_by_phase_and_task(tasks.iter().copied()) {
        let heading = phase.phase.as_deref().unwrap_or(UNGROUPED_HEADING);
        out.push_str(&format!("## {heading}\n\n"));
        for group in &phase.groups {
            if let Some(label) = &group.label {
                out.push_str(&format!("**{label}**\n"));
            }
            for task in &group.tasks {
                out.push_str(&format_task_line(task));
            }
            out.push('\n');
        }
    }

    info!(
        "event=checklist_export module=export status=ok tasks={}",
        tasks.len()
    );
    Ok(out)
}

/// Renders one task as a checkbox line followed by quoted note lines.
pub fn format_task_line(task: &Task) -> String {
    let marker = match task.status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::Completed => "[x]",
        TaskStatus::InProgress => "[_]",
    };
    let mut line = format!("- {marker} {}\n", task.title);
    for note in task.notes.lines().map(str::trim).filter(|note| !note.is_empty()) {
        line.push_str(&format!("  > {note}\n"));
    }
    line
}

/// Default download name for a checklist exported on `date`.
pub fn checklist_file_name(date: NaiveDate) -> String {
    format!("task_master_filtered_{}.md", date.format("%Y-%m-%d"))
}

fn phase_key(task: &Task) -> Option<String> {
    non_empty(task.phase.as_deref())
        .map(str::to_string)
        .or_else(|| non_empty(task.section.as_deref()).and_then(extract_phase))
}

fn task_key(task: &Task) -> Option<String> {
    non_empty(task.task_number.as_deref())
        .map(str::to_string)
        .or_else(|| non_empty(task.section.as_deref()).and_then(extract_task_number))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
