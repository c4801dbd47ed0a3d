//! Workspace configuration for LAB runs.
//!
//! Uses `figment` for layered configuration: defaults -> user config ->
//! workspace config -> environment -> explicit overrides. Configuration is
//! loaded from the user config dir (`config.toml`) and/or `.lab/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::thresholds::ThresholdResolver;
use crate::types::Domain;

/// Directory holding workspace-level configuration.
pub const WORKSPACE_CONFIG_DIR: &str = ".lab";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabConfig {
    /// Domain used when the CLI is not given one.
    #[serde(default = "default_domain")]
    pub default_domain: Domain,
    /// Thresholds file. The bundled per-domain table applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds_path: Option<PathBuf>,
    /// Dataset used by `run` and `compare` when no path is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,
    /// Honor `LAB_THRESHOLD_<METRIC>` environment overrides.
    #[serde(default)]
    pub env_overrides: bool,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            default_domain: default_domain(),
            thresholds_path: None,
            dataset_path: None,
            env_overrides: false,
        }
    }
}

fn default_domain() -> Domain {
    Domain::Medicine
}

impl LabConfig {
    /// Resolve relative file paths against `workspace`.
    pub fn anchored_at(mut self, workspace: &Path) -> Self {
        let anchor = |path: PathBuf| {
            if path.is_relative() {
                workspace.join(path)
            } else {
                path
            }
        };
        self.thresholds_path = self.thresholds_path.map(anchor);
        self.dataset_path = self.dataset_path.map(anchor);
        self
    }

    /// Threshold resolver described by this configuration.
    pub fn threshold_resolver(&self) -> ThresholdResolver {
        let resolver = match &self.thresholds_path {
            Some(path) => ThresholdResolver::from_file(path),
            None => ThresholdResolver::new(),
        };
        resolver.with_env_overrides(self.env_overrides)
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "luys", "lab")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_CONFIG_DIR).join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `LAB_`)
/// 3. Workspace-local config (`.lab/config.toml`)
/// 4. User config
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&LabConfig>,
) -> Result<LabConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(LabConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // LAB_DEFAULT_DOMAIN, LAB_THRESHOLDS_PATH, ...
    figment = figment.merge(
        Env::prefixed("LAB_")
            .filter(|key| !key.starts_with("threshold_"))
            .split("__"),
    );

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    Ok(figment.extract().map_err(Box::new)?)
}
