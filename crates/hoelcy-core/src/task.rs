use serde::{Deserialize, Deserializer, Serialize};

/// Reads JSON `null` as the field's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub task: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub due: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl Task {
    /// Neither done nor archived.
    pub fn is_active(&self) -> bool {
        !self.done && !self.archived
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub task: String,
    pub due: String,
    pub category_id: i64,
    pub priority_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update; absent fields are left untouched by the webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateTaskPayload {
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Self::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    pub fn description(description: String) -> Self {
        Self {
            description: Some(description),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, UpdateTaskPayload};

    #[test]
    fn wire_names_are_camel_case() {
        let raw = r#"{"id":4,"task":"Ship it","done":true,"archived":false,
            "due":"2024-05-01","categoryId":2,"priorityId":3,
            "createdAt":"2024-04-01T10:00:00.000Z","updatedAt":"2024-04-02T10:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).expect("parse task");
        assert_eq!(task.category_id, 2);
        assert_eq!(task.priority_id, Some(3));
        assert!(task.done);
        assert!(!task.is_active());
        assert_eq!(task.description, None);
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let raw = r#"{"id":2,"task":"Loose ends","done":null,"archived":null,"due":null,
            "categoryId":null,"priorityId":null,"createdAt":null,"updatedAt":null}"#;
        let task: Task = serde_json::from_str(raw).expect("parse task");
        assert_eq!(task.task, "Loose ends");
        assert_eq!(task.category_id, 0);
        assert_eq!(task.due, "");
        assert!(task.is_active());
        assert_eq!(task.priority_id, None);

        let unnamed: Task = serde_json::from_str(r#"{"id":3,"task":null}"#).expect("parse task");
        assert!(unnamed.task.is_empty());
    }

    #[test]
    fn partial_update_omits_absent_fields() {
        let body = serde_json::to_value(UpdateTaskPayload::archived(true)).expect("serialize");
        assert_eq!(body, serde_json::json!({ "archived": true }));
        assert!(UpdateTaskPayload::default().is_empty());
        assert!(!UpdateTaskPayload::done(false).is_empty());
    }
}
