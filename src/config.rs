//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hris-forest/hris-forest.toml`
//! 3. Local config: `<dir>/.hris-forest.toml` (usually the working directory)
//! 4. Environment variables: `HRIS_FOREST_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::earnings::{DateFilter, DEFAULT_FALLBACK_CATEGORY};
use crate::domain::entities::UNKNOWN_PARTITION;
use crate::util::path::PathExt;

const APP_NAME: &str = "hris-forest";
const LOCAL_CONFIG_NAME: &str = ".hris-forest.toml";
const ENV_PREFIX: &str = "HRIS_FOREST";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub label_map: Option<PathBuf>,
    pub category_map: Option<PathBuf>,
    pub fallback_category: Option<String>,
    pub date_filter: Option<DateFilter>,
    pub unknown_partition: Option<String>,
}

/// Unified configuration for hris-forest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Earning code → label table (JSON object)
    pub label_map: PathBuf,
    /// Earning code → category table (JSON object)
    pub category_map: PathBuf,
    /// Category for unmapped codes when the category table defines none
    pub fallback_category: String,
    /// Run date deciding window membership
    pub date_filter: DateFilter,
    /// Partition name for groups without a type
    pub unknown_partition: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            label_map: PathBuf::from("earnings_ukg.json"),
            category_map: PathBuf::from("earnings_to_aon.json"),
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
            date_filter: DateFilter::default(),
            unknown_partition: UNKNOWN_PARTITION.to_string(),
        }
    }
}

/// Get the XDG config directory for hris-forest.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_NAME)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        self.label_map = self.label_map.expand();
        self.category_map = self.category_map.expand();
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            label_map: overlay
                .label_map
                .clone()
                .unwrap_or_else(|| self.label_map.clone()),
            category_map: overlay
                .category_map
                .clone()
                .unwrap_or_else(|| self.category_map.clone()),
            fallback_category: overlay
                .fallback_category
                .clone()
                .unwrap_or_else(|| self.fallback_category.clone()),
            date_filter: overlay.date_filter.unwrap_or(self.date_filter),
            unknown_partition: overlay
                .unknown_partition
                .clone()
                .unwrap_or_else(|| self.unknown_partition.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.hris-forest.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "loading local config");
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply HRIS_FOREST_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("label_map") {
            settings.label_map = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("category_map") {
            settings.category_map = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("fallback_category") {
            settings.fallback_category = val;
        }
        if let Ok(val) = config.get_string("date_filter") {
            settings.date_filter = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("unknown_partition") {
            settings.unknown_partition = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# hris-forest configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/hris-forest/hris-forest.toml
#   Local:  ./.hris-forest.toml
#   Env:    HRIS_FOREST_* environment variables (e.g. HRIS_FOREST_DATE_FILTER)

# Earning code -> human label (JSON object). Relative names are searched in
# the given location, the working directory and ./payroll/.
# label_map = "earnings_ukg.json"

# Earning code -> reporting category (JSON object). The entry under
# "Other Allowances or Earnings" names the category for unmapped codes.
# category_map = "earnings_to_aon.json"

# Category for unmapped codes when the category table has no such entry
# fallback_category = "Other Allowances"

# Which run date selects runs into a fiscal window: "end_date" or "check_date"
# date_filter = "end_date"

# Partition for groups without a type
# unknown_partition = "UNKNOWN"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
