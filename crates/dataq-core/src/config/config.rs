use super::credentials::BackendKind;
use crate::providers::azure::{DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT};
use crate::providers::openai::DEFAULT_MAX_TOKENS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{backend} backend requires `{field}` (set it in config or via {env})")]
    MissingCredential {
        backend: BackendKind,
        field: &'static str,
        env: &'static str,
    },

    #[error("unknown backend '{0}' (expected openai, azure_openai or anthropic)")]
    UnknownBackend(String),
}

/// Azure OpenAI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_deployment")]
    pub deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_deployment() -> String {
    DEFAULT_DEPLOYMENT.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: default_deployment(),
            api_version: default_api_version(),
        }
    }
}

/// Settings for `dataq`, read from `~/.dataq/config.json` with an optional
/// `.dataq.json` in the working directory layered on top.
///
/// ```json
/// {
///   "backend": "azure_openai",
///   "azure": { "endpoint": "https://my-resource.openai.azure.com", "deployment": "o3-mini" },
///   "max_tokens": 200
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataqConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout for backend calls. No timeout when absent.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for DataqConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: String::new(),
            azure: AzureConfig::default(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: None,
        }
    }
}

impl DataqConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let local = std::env::current_dir()
            .ok()
            .map(|d| d.join(".dataq.json"))
            .filter(|p| p.exists());
        let mut config = Self::load_from(&Self::resolve_path("config.json"), local.as_deref())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read `global` (defaults if missing) and shallow-merge `local` over it.
    pub fn load_from(global: &Path, local: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = if global.exists() {
            debug!("loading config from {}", global.display());
            let data = read(global)?;
            serde_json::from_str::<DataqConfig>(&data).map_err(|source| ConfigError::Parse {
                path: global.to_path_buf(),
                source,
            })?
        } else {
            DataqConfig::default()
        };

        if let Some(local) = local {
            debug!("merging local config {}", local.display());
            let parse_err = |source| ConfigError::Parse {
                path: local.to_path_buf(),
                source,
            };
            let data = read(local)?;
            let override_val: serde_json::Value = serde_json::from_str(&data).map_err(parse_err)?;
            let mut base = serde_json::to_value(&config).map_err(parse_err)?;
            if let (Some(base_obj), Some(over_obj)) =
                (base.as_object_mut(), override_val.as_object())
            {
                for (k, v) in over_obj {
                    base_obj.insert(k.clone(), v.clone());
                }
            }
            config = serde_json::from_value(base).map_err(parse_err)?;
        }

        Ok(config)
    }

    /// Fill empty settings from the environment. Values already present in a
    /// config file win.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |key: &str| var(key).filter(|v| !v.is_empty());

        if let Some(backend) = var("DATAQ_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(model) = var("DATAQ_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = var("DATAQ_BASE_URL") {
            self.base_url = base_url;
        }
        if self.api_key.is_empty() {
            let key = match self.backend {
                BackendKind::Anthropic => var("DATAQ_API_KEY").or_else(|| var("ANTHROPIC_API_KEY")),
                _ => var("DATAQ_API_KEY").or_else(|| var("OPENAI_API_KEY")),
            };
            self.api_key = key.unwrap_or_default();
        }
        if self.azure.endpoint.is_empty() {
            self.azure.endpoint = var("AZURE_OPENAI_ENDPOINT").unwrap_or_default();
        }
        if self.azure.api_key.is_empty() {
            self.azure.api_key = var("AZURE_OPENAI_KEY").unwrap_or_default();
        }
        if let Some(deployment) = var("AZURE_OPENAI_DEPLOYMENT") {
            self.azure.deployment = deployment;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn resolve_path(relative: &str) -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dataq")
            .join(relative)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
