use serde::{Deserialize, Serialize};

use crate::task::null_as_default;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Priority {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// 1 is the least urgent; higher levels sort first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePriorityPayload {
    pub name: String,
    pub color: String,
    pub level: i64,
}

/// Stand-in used when the webhook returns no priorities at all.
pub fn fallback_priority() -> Priority {
    Priority {
        id: 1,
        name: "Low".to_string(),
        color: "#999999".to_string(),
        level: 1,
    }
}

/// Priority with level 1, else the minimum level, else the fallback.
pub fn lowest_priority(priorities: &[Priority]) -> Priority {
    if let Some(level_one) = priorities.iter().find(|p| p.level == 1) {
        return level_one.clone();
    }

    priorities
        .iter()
        .reduce(|lowest, current| {
            if current.level < lowest.level {
                current
            } else {
                lowest
            }
        })
        .cloned()
        .unwrap_or_else(fallback_priority)
}

pub fn priority_by_id(priorities: &[Priority], id: i64) -> Priority {
    priorities
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .unwrap_or_else(|| lowest_priority(priorities))
}

pub fn priority_name(priorities: &[Priority], id: i64) -> String {
    priority_by_id(priorities, id).name
}

pub fn priority_color(priorities: &[Priority], id: i64) -> String {
    priority_by_id(priorities, id).color
}

/// Level used for ordering. Unknown or missing ids resolve to 0 so they sort
/// after every known priority.
pub fn resolve_level(priorities: &[Priority], id: Option<i64>) -> i64 {
    id.and_then(|id| priorities.iter().find(|p| p.id == id))
        .map(|p| p.level)
        .unwrap_or(0)
}

/// Ascending by level; equal levels keep their input order.
pub fn sort_priorities_by_level(priorities: &[Priority]) -> Vec<Priority> {
    let mut sorted = priorities.to_vec();
    sorted.sort_by_key(|p| p.level);
    sorted
}
