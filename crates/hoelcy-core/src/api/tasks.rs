use tracing::debug;

use super::{ListEntry, Resource, WebhookClient};
use crate::task::{CreateTaskPayload, Task, UpdateTaskPayload};

impl ListEntry for Task {
    const KIND: Resource = Resource::Tasks;

    fn is_well_formed(&self) -> bool {
        !self.task.is_empty()
    }
}

impl WebhookClient {
    pub async fn fetch_tasks(&self) -> Vec<Task> {
        let tasks = self.settle_list(self.list::<Task>().await, "Failed to fetch tasks");
        debug!(count = tasks.len(), "fetched tasks");
        tasks
    }

    #[tracing::instrument(skip(self, payload), fields(task = %payload.task))]
    pub async fn create_task(&self, payload: &CreateTaskPayload) -> Option<Task> {
        let result = self.post(Resource::Tasks, payload).await;
        self.settle(
            result,
            "Task created",
            Some(format!("\"{}\" has been created", payload.task)),
            "Failed to create task",
        )
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn update_task(&self, id: i64, payload: &UpdateTaskPayload) -> Option<Task> {
        let result = self.put(Resource::Tasks, id, payload).await;
        self.settle(result, "Task updated", None, "Failed to update task")
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: i64) -> bool {
        let result = self.delete(Resource::Tasks, id).await;
        self.settle(result, "Task deleted", None, "Failed to delete task")
            .is_some()
    }
}
