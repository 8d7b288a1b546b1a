use super::{ListEntry, Resource, WebhookClient};
use crate::priority::{CreatePriorityPayload, Priority};

impl ListEntry for Priority {
    const KIND: Resource = Resource::Priorities;

    fn is_well_formed(&self) -> bool {
        !self.name.is_empty() && self.level != 0
    }
}

impl WebhookClient {
    pub async fn fetch_priorities(&self) -> Vec<Priority> {
        self.settle_list(self.list::<Priority>().await, "Failed to fetch priorities")
    }

    #[tracing::instrument(skip(self, payload), fields(name = %payload.name, level = payload.level))]
    pub async fn create_priority(&self, payload: &CreatePriorityPayload) -> Option<Priority> {
        let result = self.post(Resource::Priorities, payload).await;
        self.settle(
            result,
            "Priority created",
            Some(format!("\"{}\" has been created", payload.name)),
            "Failed to create priority",
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_priority(&self, id: i64) -> bool {
        let result = self.delete(Resource::Priorities, id).await;
        self.settle(result, "Priority deleted", None, "Failed to delete priority")
            .is_some()
    }
}
