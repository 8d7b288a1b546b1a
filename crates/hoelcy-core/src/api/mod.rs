//! Webhook clients, one module per resource.
//!
//! Every public call resolves the configured endpoint, performs one HTTP
//! request and reports the outcome through the [`Notifier`]. Failures never
//! escape: callers get `None`, `false` or an empty list instead.

pub mod agent;
pub mod categories;
pub mod priorities;
pub mod projects;
pub mod tasks;

use std::sync::{Arc, Mutex};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Success,
    Failure,
}

/// User-visible outcome of one webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub style: ToastStyle,
    pub title: String,
    pub message: Option<String>,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Keeps every toast in memory, for hosts that render them later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .map(|toasts| toasts.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<Toast> {
        self.toasts()
            .into_iter()
            .filter(|toast| toast.style == ToastStyle::Failure)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration not found")]
    NotConfigured,
    #[error("{0} endpoint is not configured")]
    MissingEndpoint(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tasks,
    Categories,
    Priorities,
    CodingProjects,
    CodingAgent,
}

impl Resource {
    pub fn label(self) -> &'static str {
        match self {
            Resource::Tasks => "tasks",
            Resource::Categories => "categories",
            Resource::Priorities => "priorities",
            Resource::CodingProjects => "coding projects",
            Resource::CodingAgent => "coding agent",
        }
    }

    fn endpoint(self, config: &Config) -> &str {
        match self {
            Resource::Tasks => &config.tasks_endpoint,
            Resource::Categories => &config.categories_endpoint,
            Resource::Priorities => &config.priorities_endpoint,
            Resource::CodingProjects => &config.coding_projects_endpoint,
            Resource::CodingAgent => &config.coding_agent_endpoint,
        }
    }
}

/// Element of a fetch-all response. Entries that fail `is_well_formed` are
/// dropped instead of failing the whole list.
pub trait ListEntry: DeserializeOwned {
    const KIND: Resource;

    fn is_well_formed(&self) -> bool;
}

pub struct WebhookClient {
    http: reqwest::Client,
    config: Option<Config>,
    notifier: Arc<dyn Notifier>,
}

impl WebhookClient {
    pub fn new(config: Option<Config>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            notifier,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn has_endpoint(&self, resource: Resource) -> bool {
        self.config
            .as_ref()
            .is_some_and(|config| !resource.endpoint(config).trim().is_empty())
    }

    fn endpoint(&self, resource: Resource) -> Result<String, ApiError> {
        let config = self.config.as_ref().ok_or(ApiError::NotConfigured)?;
        let url = resource.endpoint(config).trim();
        if url.is_empty() {
            return Err(ApiError::MissingEndpoint(resource.label()));
        }
        Ok(url.to_string())
    }

    #[tracing::instrument(skip(self), fields(resource = T::KIND.label()))]
    async fn list<T: ListEntry>(&self) -> Result<Vec<T>, ApiError> {
        let url = self.endpoint(T::KIND)?;
        let body = self.execute(Method::GET, &url, None).await?;
        let value: Value = serde_json::from_slice(&body)?;

        let Value::Array(items) = value else {
            debug!("list response was not an array");
            return Ok(Vec::new());
        };

        let total = items.len();
        let kept: Vec<T> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<T>(item).ok())
            .filter(|entry: &T| entry.is_well_formed())
            .collect();
        if kept.len() < total {
            warn!(
                dropped = total - kept.len(),
                kept = kept.len(),
                "dropped malformed list entries"
            );
        }
        Ok(kept)
    }

    async fn post<B, T>(&self, resource: Resource, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(resource)?;
        let payload = serde_json::to_vec(body)?;
        let bytes = self.execute(Method::POST, &url, Some(payload)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn put<B, T>(&self, resource: Resource, id: i64, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = item_url(&self.endpoint(resource)?, id);
        let payload = serde_json::to_vec(body)?;
        let bytes = self.execute(Method::PUT, &url, Some(payload)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<(), ApiError> {
        let url = item_url(&self.endpoint(resource)?, id);
        self.execute(Method::DELETE, &url, None).await?;
        Ok(())
    }

    /// POST whose response body is ignored.
    async fn post_ignoring_body<B>(&self, resource: Resource, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(resource)?;
        let payload = serde_json::to_vec(body)?;
        self.execute(Method::POST, &url, Some(payload)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, method, body), fields(method = %method))]
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "webhook returned an error status");
            return Err(ApiError::Status(status));
        }

        let bytes = response.bytes().await?;
        debug!(%status, bytes = bytes.len(), "webhook responded");
        Ok(bytes.to_vec())
    }

    fn success(&self, title: &str, message: Option<String>) {
        info!(title, "webhook call succeeded");
        self.notifier.notify(Toast {
            style: ToastStyle::Success,
            title: title.to_string(),
            message,
        });
    }

    fn failure(&self, title: &str, err: &ApiError) {
        warn!(title, error = %err, "webhook call failed");
        self.notifier.notify(Toast {
            style: ToastStyle::Failure,
            title: title.to_string(),
            message: Some(err.to_string()),
        });
    }

    /// Turns a create/update result into the `Option` callers see.
    fn settle<T>(
        &self,
        result: Result<T, ApiError>,
        success_title: &str,
        success_message: Option<String>,
        failure_title: &str,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                self.success(success_title, success_message);
                Some(value)
            }
            Err(err) => {
                self.failure(failure_title, &err);
                None
            }
        }
    }

    /// Fetch-all only reports failures.
    fn settle_list<T>(&self, result: Result<Vec<T>, ApiError>, failure_title: &str) -> Vec<T> {
        result.unwrap_or_else(|err| {
            self.failure(failure_title, &err);
            Vec::new()
        })
    }
}

fn item_url(base: &str, id: i64) -> String {
    format!("{}/{id}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ApiError, RecordingNotifier, Resource, WebhookClient, item_url};
    use crate::config::default_config;

    #[test]
    fn item_urls_append_the_id_once() {
        assert_eq!(item_url("https://h.example.com/tasks", 4), "https://h.example.com/tasks/4");
        assert_eq!(item_url("https://h.example.com/tasks/", 4), "https://h.example.com/tasks/4");
    }

    #[test]
    fn endpoint_resolution_reports_what_is_missing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let unconfigured = WebhookClient::new(None, notifier.clone());
        assert!(matches!(
            unconfigured.endpoint(Resource::Tasks),
            Err(ApiError::NotConfigured)
        ));

        let mut config = default_config();
        config.coding_agent_endpoint = "  ".to_string();
        let client = WebhookClient::new(Some(config), notifier);
        assert!(client.has_endpoint(Resource::Tasks));
        assert!(!client.has_endpoint(Resource::CodingAgent));
        assert!(matches!(
            client.endpoint(Resource::CodingAgent),
            Err(ApiError::MissingEndpoint("coding agent"))
        ));
    }
}
