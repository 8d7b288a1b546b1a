use std::fs;

use hoelcy_core::config::{CONFIG_KEY, ConfigProvider, default_config};
use hoelcy_core::store::FileStore;
use serde_json::{Value, json};
use tempfile::tempdir;

fn legacy() -> Value {
    json!({
        "GET_ALL_TASKS_ENDPOINT": "https://h.example.com/webhook/getAllTasks",
        "CREATE_TASK_ENDPOINT": "https://h.example.com/webhook/createTask",
        "GET_TASK_CATEGORIES_ENDPOINT": "",
        "CREATE_TASK_CATEGORY_ENDPOINT": "https://h.example.com/webhook/createCategory",
        "GET_ALL_PRIORITIES_ENDPOINT": "https://h.example.com/webhook/priorities",
        "CODING_AGENT_ENDPOINT": "https://h.example.com/webhook/agent"
    })
}

#[test]
fn legacy_file_is_migrated_once_and_persisted() {
    let temp = tempdir().expect("tempdir");
    let store = FileStore::open(temp.path()).expect("open store");
    let path = store.path_for(CONFIG_KEY);
    fs::write(&path, legacy().to_string()).expect("seed legacy config");

    let mut provider = ConfigProvider::new(store);
    let config = provider.get_config().expect("migrated config");
    assert_eq!(config.tasks_endpoint, "https://h.example.com/webhook/getAllTasks");
    assert_eq!(config.categories_endpoint, "https://h.example.com/webhook/createCategory");
    assert_eq!(config.priorities_endpoint, "https://h.example.com/webhook/priorities");
    assert_eq!(config.coding_agent_endpoint, "https://h.example.com/webhook/agent");
    assert_eq!(config.coding_projects_endpoint, "");

    let rewritten: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(rewritten["version"], json!(2));
    assert_eq!(
        rewritten["data"]["TASKS_ENDPOINT"],
        json!("https://h.example.com/webhook/getAllTasks")
    );
    assert!(rewritten["data"].get("GET_ALL_TASKS_ENDPOINT").is_none());

    let before = fs::read_to_string(&path).expect("read");
    let mut reopened = ConfigProvider::new(FileStore::open(temp.path()).expect("reopen"));
    assert_eq!(reopened.get_config(), Some(config));
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}

#[test]
fn save_validates_and_clear_removes_the_file() {
    let temp = tempdir().expect("tempdir");
    let mut provider = ConfigProvider::new(FileStore::open(temp.path()).expect("open"));
    assert!(!provider.has_config());

    let mut insecure = default_config();
    insecure.tasks_endpoint = "http://h.example.com/tasks".to_string();
    let err = provider.save_config(&insecure).expect_err("http is rejected");
    assert!(err.to_string().contains("tasks"), "{err}");
    assert!(!provider.store().path_for(CONFIG_KEY).exists());

    let mut padded = default_config();
    padded.tasks_endpoint = "  https://h.example.com/tasks  ".to_string();
    provider.save_config(&padded).expect("save");
    assert!(provider.has_config());

    let mut fresh = ConfigProvider::new(FileStore::open(temp.path()).expect("reopen"));
    let stored = fresh.get_config().expect("stored config");
    assert_eq!(stored.tasks_endpoint, "https://h.example.com/tasks");

    fresh.clear_config().expect("clear");
    assert!(!fresh.has_config());
    assert!(!fresh.store().path_for(CONFIG_KEY).exists());
}

#[test]
fn unreadable_file_counts_as_not_configured() {
    let temp = tempdir().expect("tempdir");
    let store = FileStore::open(temp.path()).expect("open");
    fs::write(store.path_for(CONFIG_KEY), "{not json").expect("seed garbage");

    let mut provider = ConfigProvider::new(store);
    assert!(!provider.has_config());
    assert_eq!(provider.get_config(), None);
}
