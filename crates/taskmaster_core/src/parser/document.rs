//! Line-oriented checklist document parser.
//!
//! # Responsibility
//! - Track section, phase and task-label context while scanning lines.
//! - Emit one `TaskCandidate` per checklist item, in document order.
//!
//! # Invariants
//! - Heading and task-label lines never produce candidates.
//! - Checkbox lines with a blank title never produce candidates.
//! - Context persists across lines until the next heading/label overwrites it.
//! - Phase always mirrors the section heading text.
//! - Line numbers are 1-based.

use crate::model::task::{TaskCandidate, TaskStatus};
use crate::parser::category::categorize;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s+(.*)$").expect("valid section heading regex"));
static TASK_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\*\*Task\s+").expect("valid task label regex"));
static CHECKLIST_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*[-*+]?\s*\[([x\s\-_✓✗])\]\s*(.+)$").expect("valid checklist item regex")
});
static PHASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Phase\s+(\d+(?:\.\d+)?):?\s*(.+)").expect("valid phase regex")
});
static TASK_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Task\s+(\d+(?:\.\d+)?):?\s*(.+)").expect("valid task number regex")
});

#[derive(Debug, Default)]
struct ParseContext {
    section: Option<String>,
    phase: Option<String>,
    task_label: Option<String>,
}

/// Parses checklist-style text into ordered task candidates.
///
/// Each call is independent. Lines that are neither headings, task labels
/// nor checklist items are ignored.
pub fn parse_document(text: &str, source_name: &str) -> Vec<TaskCandidate> {
    let mut context = ParseContext::default();
    let mut candidates = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if let Some(caps) = SECTION_HEADING_RE.captures(line) {
            let heading = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|value| !value.is_empty());
            context.phase = heading.clone();
            context.section = heading;
            continue;
        }

        if TASK_LABEL_RE.is_match(line) {
            context.task_label = Some(strip_emphasis(line)).filter(|value| !value.is_empty());
            continue;
        }

        let Some(caps) = CHECKLIST_ITEM_RE.captures(line) else {
            continue;
        };
        let marker = caps.get(1).map_or("", |m| m.as_str());
        let title = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
        if title.is_empty() {
            continue;
        }
        let category = categorize(&title, context.section.as_deref().unwrap_or(""));

        candidates.push(TaskCandidate {
            title,
            status: status_from_marker(marker),
            category,
            source: source_name.to_string(),
            notes: String::new(),
            original_line: Some(u32::try_from(index + 1).unwrap_or(u32::MAX)),
            section: context.section.clone(),
            phase: context.phase.clone(),
            task_number: context.task_label.clone(),
        });
    }

    debug!(
        "event=document_parse module=parser status=ok source={} candidates={}",
        source_name,
        candidates.len()
    );
    candidates
}

/// Maps a checkbox marker to a status.
///
/// `x`/`✓` complete, `_`/`-` in progress, anything else (blank, `✗`) pending.
pub fn status_from_marker(marker: &str) -> TaskStatus {
    match marker.to_lowercase().as_str() {
        "x" | "✓" => TaskStatus::Completed,
        "_" | "-" => TaskStatus::InProgress,
        _ => TaskStatus::Pending,
    }
}

/// Extracts a normalized `Phase N: description` label from free text.
pub fn extract_phase(text: &str) -> Option<String> {
    let caps = PHASE_RE.captures(text)?;
    Some(format!("Phase {}: {}", &caps[1], caps[2].trim()))
}

/// Extracts a normalized `Task N: description` label from free text.
pub fn extract_task_number(text: &str) -> Option<String> {
    let caps = TASK_NUMBER_RE.captures(text)?;
    Some(format!("Task {}: {}", &caps[1], caps[2].trim()))
}

fn strip_emphasis(line: &str) -> String {
    let trimmed = line.trim();
    let without_open = trimmed.strip_prefix("**").unwrap_or(trimmed);
    let without_close = without_open.strip_suffix("**").unwrap_or(without_open);
    without_close.trim().to_string()
}
