//! Read-side filtering, sorting and statistics over a `TaskStore`.
//!
//! # Invariants
//! - Filters compose with AND semantics.
//! - Sorting is stable; equal keys keep insertion order.
//! - Missing optional values sort before present ones when ascending.

use crate::model::task::{Task, TaskCategory, TaskStatus};
use crate::store::task_store::TaskStore;
use std::cmp::Ordering;
use std::str::FromStr;

/// Sortable task columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Title,
    Status,
    Category,
    Phase,
    TaskNumber,
    Source,
    DateAdded,
    LastUpdated,
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            "category" => Ok(Self::Category),
            "phase" => Ok(Self::Phase),
            "tasknumber" => Ok(Self::TaskNumber),
            "source" => Ok(Self::Source),
            "dateadded" => Ok(Self::DateAdded),
            "lastupdated" => Ok(Self::LastUpdated),
            _ => Err(format!(
                "unsupported sort column `{value}`; expected title|status|category|phase|task-number|source|date-added|last-updated"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

/// Filter and sort options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring over title, notes and source.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub sort: Option<TaskSort>,
}

impl TaskQuery {
    fn matches(&self, task: &Task, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            let hit = task.title.to_lowercase().contains(needle)
                || task.notes.to_lowercase().contains(needle)
                || task.source.to_lowercase().contains(needle);
            if !hit {
                return false;
            }
        }
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.category.is_some_and(|category| task.category != category) {
            return false;
        }
        true
    }
}

/// Aggregate counters over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub bugs: usize,
    /// Completed share as a whole percentage, rounded half up; 0 when empty.
    pub completion_rate: u32,
}

impl TaskStore {
    /// Returns the filtered and sorted subset described by `query`.
    pub fn query(&self, query: &TaskQuery) -> Vec<&Task> {
        let needle = query
            .search
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        let mut selected: Vec<&Task> = self
            .iter()
            .filter(|task| query.matches(task, needle.as_deref()))
            .collect();

        if let Some(sort) = query.sort {
            selected.sort_by(|left, right| {
                let ordering = compare_by(sort.column, left, right);
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        selected
    }

    pub fn stats(&self) -> TaskStats {
        let mut stats = TaskStats {
            total: self.len(),
            ..TaskStats::default()
        };
        for task in self.iter() {
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
            }
            if task.category == TaskCategory::Bug {
                stats.bugs += 1;
            }
        }
        if stats.total > 0 {
            let rate = (stats.completed * 100 + stats.total / 2) / stats.total;
            stats.completion_rate = u32::try_from(rate).unwrap_or(100);
        }
        stats
    }
}

fn compare_by(column: SortColumn, left: &Task, right: &Task) -> Ordering {
    match column {
        SortColumn::Title => left.title.cmp(&right.title),
        SortColumn::Status => left.status.as_str().cmp(right.status.as_str()),
        SortColumn::Category => left.category.as_str().cmp(right.category.as_str()),
        SortColumn::Phase => left.phase.cmp(&right.phase),
        SortColumn::TaskNumber => left.task_number.cmp(&right.task_number),
        SortColumn::Source => left.source.cmp(&right.source),
        SortColumn::DateAdded => left.date_added.cmp(&right.date_added),
        SortColumn::LastUpdated => left.last_updated.cmp(&right.last_updated),
    }
}

#[cfg(test)]
mod tests {
    use super::SortColumn;

    #[test]
    fn sort_column_accepts_kebab_snake_and_camel_names() {
        assert_eq!("task-number".parse::<SortColumn>(), Ok(SortColumn::TaskNumber));
        assert_eq!("date_added".parse::<SortColumn>(), Ok(SortColumn::DateAdded));
        assert_eq!("lastUpdated".parse::<SortColumn>(), Ok(SortColumn::LastUpdated));
        assert!("priority".parse::<SortColumn>().is_err());
    }
}
