use serde::{Deserialize, Serialize};

use crate::task::{Task, null_as_default};

const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskCategory {
    pub id: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: usize,
    pub active: usize,
    pub done: usize,
    pub archived: usize,
}

pub fn find_category(categories: &[TaskCategory], id: i64) -> Option<&TaskCategory> {
    categories.iter().find(|cat| cat.id == id)
}

/// Display name of the task's category, `Unknown` when it is gone.
pub fn category_name<'a>(task: &Task, categories: &'a [TaskCategory]) -> &'a str {
    find_category(categories, task.category_id)
        .map(|cat| cat.category.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_CATEGORY)
}

/// Counts over every task of the category, archived and done included.
pub fn category_stats(category_id: i64, tasks: &[Task]) -> CategoryStats {
    tasks
        .iter()
        .filter(|task| task.category_id == category_id)
        .fold(CategoryStats::default(), |mut stats, task| {
            stats.total += 1;
            if task.is_active() {
                stats.active += 1;
            }
            if task.done {
                stats.done += 1;
            }
            if task.archived {
                stats.archived += 1;
            }
            stats
        })
}

/// Case-insensitive search over the category name and description.
pub fn filter_categories(categories: &[TaskCategory], search: &str) -> Vec<TaskCategory> {
    let needle = search.trim().to_lowercase();
    categories
        .iter()
        .filter(|cat| {
            needle.is_empty()
                || cat.category.to_lowercase().contains(&needle)
                || cat
                    .description
                    .as_deref()
                    .is_some_and(|desc| desc.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub fn sort_categories_alphabetically(categories: &[TaskCategory]) -> Vec<TaskCategory> {
    let mut sorted = categories.to_vec();
    sorted.sort_by_cached_key(|cat| cat.category.to_lowercase());
    sorted
}

/// Both repository URL and branch must be non-blank before a task of this
/// category can be handed to the coding agent.
pub fn has_valid_repository(category: Option<&TaskCategory>) -> bool {
    let Some(category) = category else {
        return false;
    };
    let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    filled(&category.repository_url) && filled(&category.branch_name)
}
