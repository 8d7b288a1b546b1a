use serde::Serialize;

use super::{Resource, Toast, ToastStyle, WebhookClient};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentRequest {
    task_id: i64,
}

impl WebhookClient {
    /// Hands a task to the coding agent webhook. The response body is not
    /// inspected; any 2xx counts as sent.
    #[tracing::instrument(skip(self))]
    pub async fn send_to_coding_agent(&self, task_id: i64) -> bool {
        if !self.has_endpoint(Resource::CodingAgent) {
            self.notifier.notify(Toast {
                style: ToastStyle::Failure,
                title: "Configuration Missing".to_string(),
                message: Some("Please configure endpoints first".to_string()),
            });
            return false;
        }

        let result = self
            .post_ignoring_body(Resource::CodingAgent, &AgentRequest { task_id })
            .await;
        self.settle(
            result,
            "Task Sent to Coding Agent",
            Some(format!("Task #{task_id} has been sent successfully")),
            "Failed to Send Task",
        )
        .is_some()
    }
}
