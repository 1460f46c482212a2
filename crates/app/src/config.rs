use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracker_core::model::{ViewSettings, ViewSettingsDraft, ViewSettingsError};

/// Shape of the optional TOML config file.
///
/// ```toml
/// [view]
/// default_page_size = 25
/// show_more_step = 25
/// progress_decimals = 0
/// entry_search_fields = ["topic", "status"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    view: ViewSettingsDraft,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(ViewSettingsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse(err) => write!(f, "invalid config file: {err}"),
            ConfigError::Invalid(err) => write!(f, "invalid view settings: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse config text into validated view settings.
pub fn parse_settings(raw: &str) -> Result<ViewSettings, ConfigError> {
    let file: ConfigFile = toml::from_str(raw).map_err(ConfigError::Parse)?;
    file.view.validate().map_err(ConfigError::Invalid)
}

/// Load view settings from `path`, or the defaults when no file is given.
pub async fn load_settings(path: Option<&Path>) -> Result<ViewSettings, ConfigError> {
    let Some(path) = path else {
        return ViewSettingsDraft::new()
            .validate()
            .map_err(ConfigError::Invalid);
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_settings(&raw)
}
