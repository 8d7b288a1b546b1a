use super::{ListEntry, Resource, WebhookClient};
use crate::project::{CodingProject, CreateCodingProjectPayload, UpdateCodingProjectPayload};

impl ListEntry for CodingProject {
    const KIND: Resource = Resource::CodingProjects;

    fn is_well_formed(&self) -> bool {
        !self.name.is_empty()
    }
}

impl WebhookClient {
    pub async fn fetch_coding_projects(&self) -> Vec<CodingProject> {
        self.settle_list(
            self.list::<CodingProject>().await,
            "Failed to fetch coding projects",
        )
    }

    #[tracing::instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_coding_project(
        &self,
        payload: &CreateCodingProjectPayload,
    ) -> Option<CodingProject> {
        let result = self.post(Resource::CodingProjects, payload).await;
        self.settle(
            result,
            "Coding project created",
            Some(format!("\"{}\" has been created", payload.name)),
            "Failed to create coding project",
        )
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn update_coding_project(
        &self,
        id: i64,
        payload: &UpdateCodingProjectPayload,
    ) -> Option<CodingProject> {
        let result = self.put(Resource::CodingProjects, id, payload).await;
        self.settle(
            result,
            "Coding project updated",
            None,
            "Failed to update coding project",
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_coding_project(&self, id: i64) -> bool {
        let result = self.delete(Resource::CodingProjects, id).await;
        self.settle(
            result,
            "Coding project deleted",
            None,
            "Failed to delete coding project",
        )
        .is_some()
    }
}
