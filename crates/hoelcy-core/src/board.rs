//! In-memory snapshot of every resource, plus the task actions that keep it
//! in step with the webhooks.

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::api::{Resource, WebhookClient};
use crate::category::{TaskCategory, find_category, has_valid_repository};
use crate::filter::{SortMode, TaskQuery, filter_tasks, sort_tasks};
use crate::priority::Priority;
use crate::project::CodingProject;
use crate::task::{Task, UpdateTaskPayload};

#[derive(Debug, Clone, Default)]
pub struct Board {
    pub tasks: Vec<Task>,
    pub categories: Vec<TaskCategory>,
    pub priorities: Vec<Priority>,
    pub projects: Vec<CodingProject>,
}

impl Board {
    /// Fetches all four lists concurrently. Each list fails soft to empty.
    #[tracing::instrument(skip(client))]
    pub async fn load(client: &WebhookClient) -> Self {
        let projects = async {
            if client.has_endpoint(Resource::CodingProjects) {
                client.fetch_coding_projects().await
            } else {
                Vec::new()
            }
        };
        let (categories, priorities, tasks, projects) = tokio::join!(
            client.fetch_categories(),
            client.fetch_priorities(),
            client.fetch_tasks(),
            projects,
        );

        info!(
            tasks = tasks.len(),
            categories = categories.len(),
            priorities = priorities.len(),
            projects = projects.len(),
            "loaded board"
        );
        Self {
            tasks,
            categories,
            priorities,
            projects,
        }
    }

    /// Filter, then sort.
    pub fn visible_tasks(
        &self,
        query: &TaskQuery,
        sort: SortMode,
        now: &DateTime<FixedOffset>,
    ) -> Vec<Task> {
        let kept = filter_tasks(&self.tasks, query, now);
        sort_tasks(&kept, &self.priorities, sort)
    }

    pub fn task(&self, id: i64) -> anyhow::Result<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| anyhow!("no task with id {id}"))
    }

    pub fn category_for(&self, task: &Task) -> Option<&TaskCategory> {
        find_category(&self.categories, task.category_id)
    }

    pub fn can_send_to_agent(&self, task: &Task) -> bool {
        has_valid_repository(self.category_for(task))
    }

    fn task_mut(&mut self, id: i64) -> anyhow::Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| anyhow!("no task with id {id}"))
    }

    /// `Ok(false)` means the webhook refused and nothing changed locally.
    #[tracing::instrument(skip(self, client))]
    pub async fn toggle_done(&mut self, client: &WebhookClient, id: i64) -> anyhow::Result<bool> {
        let done = !self.task(id)?.done;
        if client.update_task(id, &UpdateTaskPayload::done(done)).await.is_none() {
            return Ok(false);
        }
        self.task_mut(id)?.done = done;
        Ok(true)
    }

    #[tracing::instrument(skip(self, client))]
    pub async fn toggle_archived(
        &mut self,
        client: &WebhookClient,
        id: i64,
    ) -> anyhow::Result<bool> {
        let archived = !self.task(id)?.archived;
        if client
            .update_task(id, &UpdateTaskPayload::archived(archived))
            .await
            .is_none()
        {
            return Ok(false);
        }
        self.task_mut(id)?.archived = archived;
        Ok(true)
    }

    #[tracing::instrument(skip(self, client, description))]
    pub async fn update_description(
        &mut self,
        client: &WebhookClient,
        id: i64,
        description: String,
    ) -> anyhow::Result<bool> {
        self.task(id)?;
        let payload = UpdateTaskPayload::description(description.clone());
        if client.update_task(id, &payload).await.is_none() {
            return Ok(false);
        }
        self.task_mut(id)?.description = Some(description);
        Ok(true)
    }

    #[tracing::instrument(skip(self, client))]
    pub async fn delete_task(&mut self, client: &WebhookClient, id: i64) -> anyhow::Result<bool> {
        self.task(id)?;
        if !client.delete_task(id).await {
            return Ok(false);
        }
        self.tasks.retain(|task| task.id != id);
        Ok(true)
    }

    /// Refused before any request when the task's category has no usable
    /// repository.
    #[tracing::instrument(skip(self, client))]
    pub async fn send_to_coding_agent(
        &self,
        client: &WebhookClient,
        id: i64,
    ) -> anyhow::Result<bool> {
        let task = self.task(id)?;
        if !self.can_send_to_agent(task) {
            warn!(task_id = id, "category has no repository and branch");
            return Err(anyhow!(
                "task {id} belongs to a category without a repository URL and branch"
            ));
        }
        Ok(client.send_to_coding_agent(id).await)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::Board;
    use crate::category::TaskCategory;
    use crate::filter::{CategorySelection, SortMode, TaskQuery};
    use crate::task::Task;

    fn task(id: i64, name: &str, done: bool, category_id: i64, created_at: &str) -> Task {
        Task {
            id,
            task: name.to_string(),
            done,
            archived: false,
            due: "2024-01-12".to_string(),
            category_id,
            priority_id: None,
            description: None,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    fn category(id: i64, repository_url: Option<&str>, branch_name: Option<&str>) -> TaskCategory {
        TaskCategory {
            id,
            category: format!("c{id}"),
            description: None,
            repository_url: repository_url.map(str::to_string),
            branch_name: branch_name.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn visible_tasks_filters_then_sorts() {
        let board = Board {
            tasks: vec![
                task(1, "old", false, 1, "2024-01-01"),
                task(2, "done", true, 1, "2024-01-09"),
                task(3, "new", false, 1, "2024-01-05"),
                task(4, "elsewhere", false, 2, "2024-01-08"),
            ],
            ..Board::default()
        };
        let now = Utc
            .with_ymd_and_hms(2024, 1, 10, 9, 0, 0)
            .single()
            .expect("valid now")
            .fixed_offset();
        let query = TaskQuery {
            category: CategorySelection::from(1),
            ..TaskQuery::default()
        };

        let ids: Vec<i64> = board
            .visible_tasks(&query, SortMode::CreatedAt, &now)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn agent_gate_follows_the_category_repository() {
        let board = Board {
            tasks: vec![
                task(1, "ready", false, 1, "2024-01-01"),
                task(2, "blank branch", false, 2, "2024-01-01"),
                task(3, "orphan", false, 9, "2024-01-01"),
            ],
            categories: vec![
                category(1, Some("https://git.example.com/app"), Some("main")),
                category(2, Some("https://git.example.com/app"), Some("   ")),
            ],
            ..Board::default()
        };

        let can = |id| board.can_send_to_agent(board.task(id).expect("task exists"));
        assert!(can(1));
        assert!(!can(2));
        assert!(!can(3));
        assert!(board.task(42).is_err());
    }
}
