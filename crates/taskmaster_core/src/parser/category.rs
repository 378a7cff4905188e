//! Keyword-based category inference.
//!
//! Rules are checked in order and the first hit wins: bug, testing,
//! documentation, then feature as the fallback. A title mentioning both a
//! bug and a test is a bug.

use crate::model::task::TaskCategory;

const CATEGORY_RULES: &[(TaskCategory, &[&str])] = &[
    (TaskCategory::Bug, &["bug", "fix", "error", "issue"]),
    (TaskCategory::Testing, &["test", "testing", "qa", "verify"]),
    (
        TaskCategory::Documentation,
        &["doc", "documentation", "readme", "guide"],
    ),
];

/// Infers a category from a task title and its enclosing section heading.
///
/// Matching is a case-insensitive substring test over both inputs.
pub fn categorize(title: &str, section_heading: &str) -> TaskCategory {
    let title = title.to_lowercase();
    let section = section_heading.to_lowercase();

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| title.contains(keyword) || section.contains(keyword))
        })
        .map_or(TaskCategory::Feature, |(category, _)| *category)
}
