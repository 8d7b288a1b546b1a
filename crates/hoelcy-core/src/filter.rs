use std::cmp::Reverse;
use std::fmt;

use chrono::{
  DateTime,
  FixedOffset
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::trace;

use crate::datetime::{
  is_due_today_at,
  sort_instant
};
use crate::priority::{
  Priority,
  resolve_level
};
use crate::task::Task;

pub const ALL_CATEGORIES: &str = "All";

/// Category dropdown value: the `All`
/// sentinel or a category id kept in its
/// string form.
#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub enum CategorySelection {
  #[default]
  All,
  Id(String)
}

impl CategorySelection {
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    if trimmed.is_empty()
      || trimmed == ALL_CATEGORIES
    {
      Self::All
    } else {
      Self::Id(trimmed.to_string())
    }
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    match self {
      | Self::All => true,
      | Self::Id(id) => {
        task.category_id.to_string()
          == *id
      }
    }
  }
}

impl From<i64> for CategorySelection {
  fn from(id: i64) -> Self {
    Self::Id(id.to_string())
  }
}

impl fmt::Display for CategorySelection {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Self::All => {
        f.write_str(ALL_CATEGORIES)
      }
      | Self::Id(id) => f.write_str(id)
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
  #[default]
  CreatedAt,
  Priority
}

impl SortMode {
  pub fn toggled(self) -> Self {
    match self {
      | Self::CreatedAt => Self::Priority,
      | Self::Priority => Self::CreatedAt
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::CreatedAt => "Date",
      | Self::Priority => "Priority"
    }
  }
}

/// What the task list view is asked to
/// show.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
  pub category:       CategorySelection,
  pub show_archived:  bool,
  pub due_today_only: bool,
  pub search:         String
}

impl TaskQuery {
  /// Conditions are checked in a fixed
  /// order: archived, due today,
  /// category, search text.
  pub fn matches(
    &self,
    task: &Task,
    now: &DateTime<FixedOffset>
  ) -> bool {
    if !self.show_archived
      && task.archived
    {
      return false;
    }

    if self.due_today_only
      && !is_due_today_at(&task.due, now)
    {
      return false;
    }

    if !self.category.matches(task) {
      return false;
    }

    task
      .task
      .to_lowercase()
      .contains(
        &self.search.to_lowercase()
      )
  }
}

#[tracing::instrument(skip_all, fields(
  total = tasks.len()
))]
pub fn filter_tasks(
  tasks: &[Task],
  query: &TaskQuery,
  now: &DateTime<FixedOffset>
) -> Vec<Task> {
  let kept: Vec<Task> = tasks
    .iter()
    .filter(|task| {
      query.matches(task, now)
    })
    .cloned()
    .collect();
  trace!(
    kept = kept.len(),
    "filtered tasks"
  );
  kept
}

/// Done tasks always sink below open
/// ones. Inside each group `CreatedAt`
/// orders newest first; `Priority`
/// orders by descending level, then
/// newest first, then ascending id.
pub fn sort_tasks(
  tasks: &[Task],
  priorities: &[Priority],
  mode: SortMode
) -> Vec<Task> {
  let mut sorted = tasks.to_vec();
  match mode {
    | SortMode::CreatedAt => {
      sorted.sort_by_cached_key(|task| {
        (
          task.done,
          Reverse(sort_instant(
            &task.created_at
          ))
        )
      });
    }
    | SortMode::Priority => {
      sorted.sort_by_cached_key(|task| {
        (
          task.done,
          Reverse(resolve_level(
            priorities,
            task.priority_id
          )),
          Reverse(sort_instant(
            &task.created_at
          )),
          task.id
        )
      });
    }
  }
  sorted
}

/// Open (not done, not archived) tasks
/// in the selected category.
pub fn task_count_by_category(
  tasks: &[Task],
  category: &CategorySelection
) -> usize {
  tasks
    .iter()
    .filter(|task| {
      task.is_active()
        && category.matches(task)
    })
    .count()
}

#[cfg(test)]
mod tests {
  use chrono::{
    DateTime,
    FixedOffset,
    TimeZone,
    Utc
  };

  use super::*;

  fn now() -> DateTime<FixedOffset> {
    Utc
      .with_ymd_and_hms(
        2024, 1, 10, 9, 0, 0
      )
      .single()
      .expect("valid now")
      .fixed_offset()
  }

  fn task(
    id: i64,
    name: &str,
    done: bool,
    archived: bool,
    category_id: i64,
    created_at: &str
  ) -> Task {
    Task {
      id,
      task: name.to_string(),
      done,
      archived,
      due: "2024-01-12".to_string(),
      category_id,
      priority_id: None,
      description: None,
      created_at: created_at
        .to_string(),
      updated_at: created_at
        .to_string()
    }
  }

  fn priority(
    id: i64,
    level: i64
  ) -> Priority {
    Priority {
      id,
      name: format!("p{id}"),
      color: "#000000".to_string(),
      level
    }
  }

  #[test]
  fn counts_only_active_tasks() {
    let tasks = vec![
      task(
        1, "a", false, false, 5,
        "2024-01-02"
      ),
      task(
        2, "b", true, false, 5,
        "2024-01-03"
      ),
    ];
    assert_eq!(
      task_count_by_category(
        &tasks,
        &CategorySelection::from(5)
      ),
      1
    );
    assert_eq!(
      task_count_by_category(
        &tasks,
        &CategorySelection::All
      ),
      1
    );
    assert_eq!(
      task_count_by_category(
        &tasks,
        &CategorySelection::from(6)
      ),
      0
    );
  }

  #[test]
  fn filter_applies_every_condition() {
    let mut due_today = task(
      3,
      "Call the bank",
      false,
      false,
      1,
      "2024-01-01"
    );
    due_today.due =
      "2024-01-10T18:00:00Z".to_string();
    let tasks = vec![
      task(
        1,
        "Write report",
        false,
        false,
        1,
        "2024-01-01"
      ),
      task(
        2,
        "Old report",
        false,
        true,
        1,
        "2024-01-01"
      ),
      due_today,
      task(
        4,
        "Report taxes",
        false,
        false,
        2,
        "2024-01-01"
      ),
    ];

    let query = TaskQuery {
      category: CategorySelection::parse(
        "1"
      ),
      search: "REPORT".to_string(),
      ..TaskQuery::default()
    };
    let ids: Vec<i64> =
      filter_tasks(&tasks, &query, &now())
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![1]);

    let archived = TaskQuery {
      show_archived: true,
      ..query
    };
    let ids: Vec<i64> = filter_tasks(
      &tasks, &archived, &now()
    )
    .iter()
    .map(|t| t.id)
    .collect();
    assert_eq!(ids, vec![1, 2]);

    let today = TaskQuery {
      due_today_only: true,
      ..TaskQuery::default()
    };
    let ids: Vec<i64> =
      filter_tasks(&tasks, &today, &now())
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![3]);
  }

  #[test]
  fn filtering_is_idempotent() {
    let tasks = vec![
      task(
        1, "alpha", false, false, 1,
        "2024-01-01"
      ),
      task(
        2, "beta", true, true, 1,
        "2024-01-02"
      ),
      task(
        3, "alphabet", true, false, 2,
        "2024-01-03"
      ),
    ];
    let query = TaskQuery {
      search: "alp".to_string(),
      ..TaskQuery::default()
    };
    let once =
      filter_tasks(&tasks, &query, &now());
    let twice =
      filter_tasks(&once, &query, &now());
    assert_eq!(once, twice);
  }

  #[test]
  fn created_at_mode_sinks_done_and_orders_newest_first()
  {
    let tasks = vec![
      task(
        1, "a", true, false, 1,
        "2024-01-05"
      ),
      task(
        2, "b", false, false, 1,
        "2024-01-01"
      ),
      task(
        3, "c", false, false, 1,
        "2024-01-03"
      ),
      task(
        4, "d", true, false, 1,
        "2024-01-09"
      ),
    ];
    let ids: Vec<i64> = sort_tasks(
      &tasks,
      &[],
      SortMode::CreatedAt
    )
    .iter()
    .map(|t| t.id)
    .collect();
    assert_eq!(ids, vec![3, 2, 4, 1]);
  }

  #[test]
  fn priority_mode_orders_by_level_then_date_then_id()
  {
    let priorities =
      vec![priority(10, 1), priority(20, 3)];
    let mut high_old = task(
      1, "a", false, false, 1,
      "2024-01-01"
    );
    high_old.priority_id = Some(20);
    let mut high_new = task(
      2, "b", false, false, 1,
      "2024-01-04"
    );
    high_new.priority_id = Some(20);
    let mut low = task(
      3, "c", false, false, 1,
      "2024-01-09"
    );
    low.priority_id = Some(10);
    let mut unknown = task(
      4, "d", false, false, 1,
      "2024-01-09"
    );
    unknown.priority_id = Some(99);
    let mut done_high = task(
      5, "e", true, false, 1,
      "2024-01-09"
    );
    done_high.priority_id = Some(20);
    let mut twin = task(
      6, "f", false, false, 1,
      "2024-01-04"
    );
    twin.priority_id = Some(20);

    let tasks = vec![
      done_high, unknown, low, twin,
      high_old, high_new,
    ];
    let ids: Vec<i64> = sort_tasks(
      &tasks,
      &priorities,
      SortMode::Priority
    )
    .iter()
    .map(|t| t.id)
    .collect();
    assert_eq!(ids, vec![2, 6, 1, 3, 4, 5]);
  }

  #[test]
  fn selection_parsing() {
    assert_eq!(
      CategorySelection::parse("All"),
      CategorySelection::All
    );
    assert_eq!(
      CategorySelection::parse(" 12 "),
      CategorySelection::Id(
        "12".to_string()
      )
    );
    assert_eq!(
      CategorySelection::from(3)
        .to_string(),
      "3"
    );
    assert_eq!(
      SortMode::CreatedAt.toggled(),
      SortMode::Priority
    );
  }
}
