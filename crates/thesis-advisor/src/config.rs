//! Configuration for thesis-advisor.
//!
//! Non-secret settings come from TOML: a global file in the user config
//! directory and `thesis-advisor.toml` in the working directory. API keys
//! only ever come from the environment (optionally via `.env`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory under the user config dir holding the global file
pub const GLOBAL_CONFIG_DIR: &str = "thesis-advisor";
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";
/// The project config file name
pub const PROJECT_CONFIG_FILE: &str = "thesis-advisor.toml";

pub const DEFAULT_ROUTER_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_DEBATER_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_JUDGE_MODEL: &str = "gemini-2.5-flash";

/// One TOML config file (global or project)
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default model for every role
    pub model: Option<String>,
    /// Sampling temperature for every inference call
    pub temperature: Option<f32>,
    #[serde(default)]
    pub router: RoleConfig,
    #[serde(default)]
    pub debater: RoleConfig,
    #[serde(default)]
    pub judge: RoleConfig,
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// Configuration for one role (router, debater or judge)
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    pub model: Option<String>,
}

/// Base URL overrides for the external services
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Endpoints {
    pub gemini: Option<String>,
    pub scholar: Option<String>,
    pub pubmed: Option<String>,
}

impl FileConfig {
    /// Load a config file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    pub fn load_project(working_dir: &Path) -> Result<Option<Self>> {
        Self::load_from(&working_dir.join(PROJECT_CONFIG_FILE))
    }

    pub fn load_global() -> Result<Option<Self>> {
        match global_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Layer `self` over `base`; every key set in `self` wins
    pub fn over(self, base: FileConfig) -> FileConfig {
        FileConfig {
            model: self.model.or(base.model),
            temperature: self.temperature.or(base.temperature),
            router: RoleConfig {
                model: self.router.model.or(base.router.model),
            },
            debater: RoleConfig {
                model: self.debater.model.or(base.debater.model),
            },
            judge: RoleConfig {
                model: self.judge.model.or(base.judge.model),
            },
            endpoints: Endpoints {
                gemini: self.endpoints.gemini.or(base.endpoints.gemini),
                scholar: self.endpoints.scholar.or(base.endpoints.scholar),
                pubmed: self.endpoints.pubmed.or(base.endpoints.pubmed),
            },
        }
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Effective settings after layering defaults, files and CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub router_model: String,
    pub debater_model: String,
    pub judge_model: String,
    pub temperature: Option<f32>,
    pub endpoints: Endpoints,
}

impl Settings {
    /// Priority per role: `--model` > [role].model > global model > built-in default.
    /// The project file wins over the global file key by key.
    pub fn resolve(
        global: Option<FileConfig>,
        project: Option<FileConfig>,
        cli_model: Option<&str>,
    ) -> Self {
        let file = project
            .unwrap_or_default()
            .over(global.unwrap_or_default());

        let pick = |role: &RoleConfig, default: &str| -> String {
            cli_model
                .map(str::to_string)
                .or_else(|| role.model.clone())
                .or_else(|| file.model.clone())
                .unwrap_or_else(|| default.to_string())
        };

        Settings {
            router_model: pick(&file.router, DEFAULT_ROUTER_MODEL),
            debater_model: pick(&file.debater, DEFAULT_DEBATER_MODEL),
            judge_model: pick(&file.judge, DEFAULT_JUDGE_MODEL),
            temperature: file.temperature,
            endpoints: file.endpoints.clone(),
        }
    }
}

/// API credentials, read from the environment only
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub ncbi_api_key: Option<String>,
    pub ncbi_email: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            gemini_api_key: get("GEMINI_API_KEY"),
            serpapi_api_key: get("SERPAPI_API_KEY"),
            ncbi_api_key: get("NCBI_API_KEY"),
            ncbi_email: get("NCBI_EMAIL"),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("gemini_api_key", &mask(&self.gemini_api_key))
            .field("serpapi_api_key", &mask(&self.serpapi_api_key))
            .field("ncbi_api_key", &mask(&self.ncbi_api_key))
            .field("ncbi_email", &self.ncbi_email)
            .finish()
    }
}
