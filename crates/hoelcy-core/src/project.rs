use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::datetime::sort_instant;
use crate::task::null_as_default;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodingProject {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub branch_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodingProjectPayload {
    pub name: String,
    pub repository_url: String,
    pub branch_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodingProjectPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

/// Newest first.
pub fn sort_projects_by_date(projects: &[CodingProject]) -> Vec<CodingProject> {
    let mut sorted = projects.to_vec();
    sorted.sort_by_cached_key(|project| Reverse(sort_instant(&project.created_at)));
    sorted
}

pub fn filter_projects_by_branch(projects: &[CodingProject], branch: &str) -> Vec<CodingProject> {
    let needle = branch.to_lowercase();
    projects
        .iter()
        .filter(|project| project.branch_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Names are unique case-insensitively; `exclude_id` skips the project being
/// edited. The webhook does not enforce this.
pub fn validate_unique_name(name: &str, projects: &[CodingProject], exclude_id: Option<i64>) -> bool {
    let wanted = name.trim().to_lowercase();
    !projects.iter().any(|project| {
        project.name.trim().to_lowercase() == wanted && Some(project.id) != exclude_id
    })
}

pub fn project_display_text(project: &CodingProject) -> String {
    format!("{} ({})", project.name, project.branch_name)
}
