use super::{ListEntry, Resource, WebhookClient};
use crate::category::{CreateCategoryPayload, TaskCategory, UpdateCategoryPayload};

impl ListEntry for TaskCategory {
    const KIND: Resource = Resource::Categories;

    fn is_well_formed(&self) -> bool {
        !self.category.is_empty()
    }
}

impl WebhookClient {
    pub async fn fetch_categories(&self) -> Vec<TaskCategory> {
        self.settle_list(
            self.list::<TaskCategory>().await,
            "Failed to fetch categories",
        )
    }

    #[tracing::instrument(skip(self, payload), fields(category = %payload.category))]
    pub async fn create_category(&self, payload: &CreateCategoryPayload) -> Option<TaskCategory> {
        let result = self.post(Resource::Categories, payload).await;
        self.settle(
            result,
            "Category created",
            Some(format!("\"{}\" has been created", payload.category)),
            "Failed to create category",
        )
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn update_category(
        &self,
        id: i64,
        payload: &UpdateCategoryPayload,
    ) -> Option<TaskCategory> {
        let result = self.put(Resource::Categories, id, payload).await;
        self.settle(result, "Category updated", None, "Failed to update category")
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: i64) -> bool {
        let result = self.delete(Resource::Categories, id).await;
        self.settle(result, "Category deleted", None, "Failed to delete category")
            .is_some()
    }
}
