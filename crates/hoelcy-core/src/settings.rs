use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  info
};

use crate::filter::SortMode;

const DATA_DIR_ENV_VAR: &str =
  "HOELCY_DATA";
const SETTINGS_FILE: &str =
  "settings.toml";

/// Presentation preferences read from
/// `settings.toml` in the data
/// directory. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub color:        String,
  pub timezone:     Option<String>,
  pub default_sort: SortMode,
  #[serde(skip)]
  pub loaded_from:  Option<PathBuf>
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      color:        "on".to_string(),
      timezone:     None,
      default_sort: SortMode::default(),
      loaded_from:  None
    }
  }
}

impl Settings {
  #[tracing::instrument]
  pub fn load(
    data_dir: &Path
  ) -> anyhow::Result<Self> {
    let path =
      data_dir.join(SETTINGS_FILE);
    if !path.exists() {
      debug!(file = %path.display(), "no settings file; using defaults");
      return Ok(Self::default());
    }

    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut settings =
      toml::from_str::<Self>(&text)
        .with_context(|| {
          format!(
            "invalid settings in {}",
            path.display()
          )
        })?;
    settings.loaded_from = Some(path);
    info!(
      color = %settings.color,
      timezone = ?settings.timezone,
      "loaded settings"
    );
    Ok(settings)
  }

  pub fn color_enabled(
    &self
  ) -> anyhow::Result<bool> {
    match self
      .color
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "on" | "yes" | "true" | "1" => {
        Ok(true)
      }
      | "off" | "no" | "false" | "0" => {
        Ok(false)
      }
      | other => {
        Err(anyhow!(
          "invalid color setting: \
           {other}"
        ))
      }
    }
  }
}

/// `--data` wins, then `HOELCY_DATA`,
/// then the platform config directory.
/// The directory is created when
/// missing.
#[tracing::instrument(skip(
  override_dir
))]
pub fn resolve_data_dir(
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    expand_tilde(path)
  } else if let Ok(raw) =
    std::env::var(DATA_DIR_ENV_VAR)
    && !raw.trim().is_empty()
  {
    expand_tilde(Path::new(raw.trim()))
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let base = dirs::config_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine config \
         directory"
      )
    })?;
  Ok(base.join("hoelcy"))
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::{
    Settings,
    resolve_data_dir
  };
  use crate::filter::SortMode;

  #[test]
  fn missing_file_gives_defaults() {
    let temp =
      tempdir().expect("tempdir");
    let settings =
      Settings::load(temp.path())
        .expect("load");
    assert!(
      settings
        .color_enabled()
        .expect("color")
    );
    assert_eq!(
      settings.default_sort,
      SortMode::CreatedAt
    );
    assert!(
      settings.loaded_from.is_none()
    );
  }

  #[test]
  fn reads_every_key() {
    let temp =
      tempdir().expect("tempdir");
    fs::write(
      temp.path().join("settings.toml"),
      "color = \"off\"\ntimezone = \
       \"Europe/Berlin\"\ndefault_sort \
       = \"priority\"\n"
    )
    .expect("write settings");

    let settings =
      Settings::load(temp.path())
        .expect("load");
    assert!(
      !settings
        .color_enabled()
        .expect("color")
    );
    assert_eq!(
      settings.timezone.as_deref(),
      Some("Europe/Berlin")
    );
    assert_eq!(
      settings.default_sort,
      SortMode::Priority
    );
  }

  #[test]
  fn bad_color_value_is_rejected() {
    let settings = Settings {
      color: "sometimes".to_string(),
      ..Settings::default()
    };
    assert!(
      settings.color_enabled().is_err()
    );
  }

  #[test]
  fn explicit_data_dir_is_created() {
    let temp =
      tempdir().expect("tempdir");
    let wanted =
      temp.path().join("nested/data");
    let dir =
      resolve_data_dir(Some(&wanted))
        .expect("resolve");
    assert_eq!(dir, wanted);
    assert!(dir.is_dir());
  }
}
