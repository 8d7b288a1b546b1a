use anyhow::anyhow;
use reqwest::Url;
use serde::{
  Deserialize,
  Serialize
};
use serde_json::{
  Map,
  Value
};
use thiserror::Error;
use tracing::{
  debug,
  info,
  warn
};

use crate::store::KeyValueStore;

pub const CONFIG_KEY: &str =
  "endpoint_config";
pub const CONFIG_VERSION: u64 = 2;
const LEGACY_CONFIG_VERSION: u64 = 1;

/// Webhook endpoints, one per resource.
/// Field names match what earlier
/// releases stored.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(
  rename_all = "SCREAMING_SNAKE_CASE"
)]
pub struct Config {
  pub tasks_endpoint:           String,
  pub categories_endpoint:      String,
  pub priorities_endpoint:      String,
  #[serde(default)]
  pub coding_agent_endpoint:    String,
  #[serde(default)]
  pub coding_projects_endpoint: String
}

/// Per-verb shape written before the
/// per-resource endpoints existed.
#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(
  rename_all = "SCREAMING_SNAKE_CASE",
  default
)]
struct LegacyConfig {
  get_all_tasks_endpoint:           String,
  create_task_endpoint:             String,
  get_task_categories_endpoint:     String,
  create_task_category_endpoint:    String,
  get_all_priorities_endpoint:      String,
  create_priority_endpoint:         String,
  coding_agent_endpoint:            String,
  get_all_coding_projects_endpoint: String,
  create_coding_project_endpoint:   String
}

impl LegacyConfig {
  fn migrate(self) -> Config {
    Config {
      tasks_endpoint:           first_non_empty(
        self.get_all_tasks_endpoint,
        self.create_task_endpoint
      ),
      categories_endpoint:      first_non_empty(
        self.get_task_categories_endpoint,
        self.create_task_category_endpoint
      ),
      priorities_endpoint:      first_non_empty(
        self.get_all_priorities_endpoint,
        self.create_priority_endpoint
      ),
      coding_agent_endpoint:    self
        .coding_agent_endpoint,
      coding_projects_endpoint: first_non_empty(
        self.get_all_coding_projects_endpoint,
        self.create_coding_project_endpoint
      )
    }
  }
}

fn first_non_empty(
  preferred: String,
  fallback: String
) -> String {
  if preferred.is_empty() {
    fallback
  } else {
    preferred
  }
}

/// Persisted form: `{"version": 2,
/// "data": {...}}`.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
  version: u64,
  data:    Value
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{field}: URL is required")]
  MissingEndpoint { field: &'static str },
  #[error(
    "{field}: please enter a valid \
     URL (e.g., \
     https://n8n.example.com/webhook): \
     {reason}"
  )]
  InvalidUrl {
    field:  &'static str,
    reason: String
  },
  #[error(
    "{field}: URL must use HTTPS \
     protocol"
  )]
  InsecureScheme { field: &'static str }
}

impl Config {
  /// Copy with surrounding whitespace
  /// removed from every endpoint.
  pub fn trimmed(&self) -> Self {
    Self {
      tasks_endpoint:           self
        .tasks_endpoint
        .trim()
        .to_string(),
      categories_endpoint:      self
        .categories_endpoint
        .trim()
        .to_string(),
      priorities_endpoint:      self
        .priorities_endpoint
        .trim()
        .to_string(),
      coding_agent_endpoint:    self
        .coding_agent_endpoint
        .trim()
        .to_string(),
      coding_projects_endpoint: self
        .coding_projects_endpoint
        .trim()
        .to_string()
    }
  }

  /// Tasks, categories and priorities
  /// are required; the coding endpoints
  /// are checked only when filled in.
  pub fn validate(
    &self
  ) -> Result<(), ConfigError> {
    validate_endpoint(
      "tasks",
      &self.tasks_endpoint
    )?;
    validate_endpoint(
      "categories",
      &self.categories_endpoint
    )?;
    validate_endpoint(
      "priorities",
      &self.priorities_endpoint
    )?;
    if !self
      .coding_agent_endpoint
      .trim()
      .is_empty()
    {
      validate_endpoint(
        "coding-agent",
        &self.coding_agent_endpoint
      )?;
    }
    if !self
      .coding_projects_endpoint
      .trim()
      .is_empty()
    {
      validate_endpoint(
        "coding-projects",
        &self.coding_projects_endpoint
      )?;
    }
    Ok(())
  }

  /// Sets one endpoint by its CLI name.
  pub fn set_endpoint(
    &mut self,
    field: &str,
    value: String
  ) -> anyhow::Result<()> {
    let slot = match field {
      | "tasks" => {
        &mut self.tasks_endpoint
      }
      | "categories" => {
        &mut self.categories_endpoint
      }
      | "priorities" => {
        &mut self.priorities_endpoint
      }
      | "coding-agent" => {
        &mut self.coding_agent_endpoint
      }
      | "coding-projects" => {
        &mut self
          .coding_projects_endpoint
      }
      | other => {
        return Err(anyhow!(
          "unknown endpoint field: \
           {other}"
        ));
      }
    };
    *slot = value;
    Ok(())
  }

  pub fn endpoints(
    &self
  ) -> [(&'static str, &str); 5] {
    [
      ("tasks", &self.tasks_endpoint),
      (
        "categories",
        &self.categories_endpoint
      ),
      (
        "priorities",
        &self.priorities_endpoint
      ),
      (
        "coding-agent",
        &self.coding_agent_endpoint
      ),
      (
        "coding-projects",
        &self.coding_projects_endpoint
      )
    ]
  }
}

pub fn validate_endpoint(
  field: &'static str,
  value: &str
) -> Result<(), ConfigError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(
      ConfigError::MissingEndpoint {
        field
      }
    );
  }

  let url = Url::parse(trimmed).map_err(
    |err| ConfigError::InvalidUrl {
      field,
      reason: err.to_string()
    }
  )?;
  if url.scheme() != "https" {
    return Err(
      ConfigError::InsecureScheme {
        field
      }
    );
  }
  Ok(())
}

/// Placeholder endpoints offered when
/// setting up for the first time.
pub fn default_config() -> Config {
  Config {
    tasks_endpoint:           "https://n8n.some-instance.com/webhook/tasks".to_string(),
    categories_endpoint:      "https://n8n.some-instance.com/webhook/taskCategories".to_string(),
    priorities_endpoint:      "https://n8n.some-instance.com/webhook/priorities".to_string(),
    coding_agent_endpoint:    "https://n8n.some-instance.com/webhook/agents/codingAgent".to_string(),
    coding_projects_endpoint: "https://n8n.some-instance.com/webhook/codingProjects".to_string()
  }
}

/// Only the per-verb shape carries both
/// of these keys.
fn is_legacy_shape(
  obj: &Map<String, Value>
) -> bool {
  obj.contains_key(
    "GET_ALL_TASKS_ENDPOINT"
  ) && obj
    .contains_key("CREATE_TASK_ENDPOINT")
}

#[derive(Debug)]
struct Decoded {
  config:  Config,
  rewrite: bool
}

fn decode(
  raw: &str
) -> anyhow::Result<Decoded> {
  let value: Value =
    serde_json::from_str(raw)?;
  let Some(obj) = value.as_object()
  else {
    return Err(anyhow!(
      "stored config is not a JSON \
       object"
    ));
  };

  if obj.contains_key("version") {
    let envelope: Envelope =
      serde_json::from_value(value)?;
    return match envelope.version {
      | CONFIG_VERSION => {
        Ok(Decoded {
          config:  serde_json::from_value(
            envelope.data
          )?,
          rewrite: false
        })
      }
      | LEGACY_CONFIG_VERSION => {
        let legacy: LegacyConfig =
          serde_json::from_value(
            envelope.data
          )?;
        Ok(Decoded {
          config:  legacy.migrate(),
          rewrite: true
        })
      }
      | other => {
        Err(anyhow!(
          "unsupported config version \
           {other}"
        ))
      }
    };
  }

  if is_legacy_shape(obj) {
    debug!(
      "stored config has the per-verb \
       shape"
    );
    let legacy: LegacyConfig =
      serde_json::from_value(value)?;
    return Ok(Decoded {
      config:  legacy.migrate(),
      rewrite: true
    });
  }

  Ok(Decoded {
    config:  serde_json::from_value(
      value
    )?,
    rewrite: true
  })
}

fn encode(
  config: &Config
) -> anyhow::Result<String> {
  let envelope = Envelope {
    version: CONFIG_VERSION,
    data:    serde_json::to_value(config)?
  };
  Ok(serde_json::to_string(&envelope)?)
}

/// Loads, caches and persists the
/// endpoint configuration.
#[derive(Debug)]
pub struct ConfigProvider<S> {
  store: S,
  cache: Option<Option<Config>>
}

impl<S: KeyValueStore> ConfigProvider<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      cache: None
    }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn has_config(&mut self) -> bool {
    self.get_config().is_some()
  }

  /// `None` covers both "never saved"
  /// and "stored text is unreadable".
  /// Older shapes are migrated and
  /// written back before returning.
  #[tracing::instrument(skip(self))]
  pub fn get_config(
    &mut self
  ) -> Option<Config> {
    if let Some(cached) = &self.cache {
      return cached.clone();
    }

    let loaded = self.load_uncached();
    self.cache = Some(loaded.clone());
    loaded
  }

  fn load_uncached(
    &mut self
  ) -> Option<Config> {
    let raw = match self
      .store
      .get(CONFIG_KEY)
    {
      | Ok(Some(raw)) => raw,
      | Ok(None) => return None,
      | Err(err) => {
        warn!(
          error = %err,
          "failed reading stored config"
        );
        return None;
      }
    };

    let decoded = match decode(&raw) {
      | Ok(decoded) => decoded,
      | Err(err) => {
        warn!(
          error = %err,
          "failed to parse stored config"
        );
        return None;
      }
    };

    if decoded.rewrite {
      info!(
        "upgrading stored config to \
         version {CONFIG_VERSION}"
      );
      if let Err(err) =
        self.persist(&decoded.config)
      {
        warn!(
          error = %err,
          "failed to persist upgraded config"
        );
      }
    }

    Some(decoded.config)
  }

  /// Trims, validates and stores the
  /// config; the cache is replaced.
  #[tracing::instrument(skip(
    self, config
  ))]
  pub fn save_config(
    &mut self,
    config: &Config
  ) -> anyhow::Result<()> {
    let config = config.trimmed();
    config.validate()?;
    self.persist(&config)?;
    self.cache = Some(Some(config));
    info!("saved endpoint config");
    Ok(())
  }

  #[tracing::instrument(skip(self))]
  pub fn clear_config(
    &mut self
  ) -> anyhow::Result<()> {
    self.store.remove(CONFIG_KEY)?;
    self.cache = Some(None);
    info!("cleared endpoint config");
    Ok(())
  }

  fn persist(
    &mut self,
    config: &Config
  ) -> anyhow::Result<()> {
    let text = encode(config)?;
    self.store.set(CONFIG_KEY, &text)
  }
}
