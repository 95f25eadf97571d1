use super::config::{ConfigError, DataqConfig};
use crate::providers::{AnthropicProvider, AzureOpenAiProvider, LlmProvider, OpenAiProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure_openai")]
    AzureOpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure_openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "azure_openai" | "azure" => Ok(Self::AzureOpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Everything needed to reach one backend.
///
/// Built from [`DataqConfig`] or loaded from `~/.dataq/credentials.json`.
/// [`build_provider`](Self::build_provider) is the only place a provider is
/// constructed, and it refuses to build one with missing credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend")]
pub enum Credentials {
    #[serde(rename = "openai")]
    OpenAi {
        base_url: String,
        #[serde(default)]
        api_key: String,
        model: String,
    },
    #[serde(rename = "azure_openai")]
    AzureOpenAi {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
    #[serde(rename = "anthropic")]
    Anthropic {
        base_url: String,
        api_key: String,
        model: String,
    },
}

/// Tuning shared by every provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderOptions {
    pub max_tokens: u32,
    pub timeout: Option<Duration>,
}

impl From<&DataqConfig> for ProviderOptions {
    fn from(config: &DataqConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            timeout: config.request_timeout(),
        }
    }
}

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

impl Credentials {
    pub fn from_config(config: &DataqConfig) -> Result<Self, ConfigError> {
        let creds = match config.backend {
            BackendKind::OpenAi => Self::OpenAi {
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
            },
            BackendKind::AzureOpenAi => Self::AzureOpenAi {
                endpoint: config.azure.endpoint.clone(),
                api_key: config.azure.api_key.clone(),
                deployment: config.azure.deployment.clone(),
                api_version: config.azure.api_version.clone(),
            },
            BackendKind::Anthropic => {
                let defaults = DataqConfig::default();
                // The OpenAI default URL is meaningless for Anthropic.
                let base_url = if config.base_url == defaults.base_url {
                    ANTHROPIC_BASE_URL.to_string()
                } else {
                    config.base_url.clone()
                };
                // No sensible default model, so the OpenAI one counts as unset.
                let model = if config.model == defaults.model {
                    String::new()
                } else {
                    config.model.clone()
                };
                Self::Anthropic {
                    base_url,
                    api_key: config.api_key.clone(),
                    model,
                }
            }
        };
        creds.validate()?;
        Ok(creds)
    }

    pub fn backend(&self) -> BackendKind {
        match self {
            Self::OpenAi { .. } => BackendKind::OpenAi,
            Self::AzureOpenAi { .. } => BackendKind::AzureOpenAi,
            Self::Anthropic { .. } => BackendKind::Anthropic,
        }
    }

    /// Check that every required value is present.
    ///
    /// OpenAI-compatible servers on localhost may run without a key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = |field, env| ConfigError::MissingCredential {
            backend: self.backend(),
            field,
            env,
        };
        match self {
            Self::OpenAi {
                base_url,
                api_key,
                model,
            } => {
                if base_url.is_empty() {
                    return Err(missing("base_url", "DATAQ_BASE_URL"));
                }
                if model.is_empty() {
                    return Err(missing("model", "DATAQ_MODEL"));
                }
                if api_key.is_empty() && !is_local(base_url) {
                    return Err(missing("api_key", "OPENAI_API_KEY"));
                }
            }
            Self::AzureOpenAi {
                endpoint,
                api_key,
                deployment,
                api_version,
            } => {
                if endpoint.is_empty() {
                    return Err(missing("azure.endpoint", "AZURE_OPENAI_ENDPOINT"));
                }
                if api_key.is_empty() {
                    return Err(missing("azure.api_key", "AZURE_OPENAI_KEY"));
                }
                if deployment.is_empty() {
                    return Err(missing("azure.deployment", "AZURE_OPENAI_DEPLOYMENT"));
                }
                if api_version.is_empty() {
                    return Err(missing("azure.api_version", "config.json"));
                }
            }
            Self::Anthropic {
                base_url,
                api_key,
                model,
            } => {
                if base_url.is_empty() {
                    return Err(missing("base_url", "DATAQ_BASE_URL"));
                }
                if model.is_empty() {
                    return Err(missing("model", "DATAQ_MODEL"));
                }
                if api_key.is_empty() {
                    return Err(missing("api_key", "ANTHROPIC_API_KEY"));
                }
            }
        }
        Ok(())
    }

    pub fn build_provider(&self, options: ProviderOptions) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        self.validate()?;
        let provider: Arc<dyn LlmProvider> = match self {
            Self::OpenAi {
                base_url,
                api_key,
                model,
            } => {
                let mut p = OpenAiProvider::new(base_url, api_key, model)
                    .with_max_tokens(options.max_tokens);
                if let Some(timeout) = options.timeout {
                    p = p.with_timeout(timeout);
                }
                Arc::new(p)
            }
            Self::AzureOpenAi {
                endpoint,
                api_key,
                deployment,
                api_version,
            } => {
                let mut p = AzureOpenAiProvider::new(endpoint, api_key)
                    .with_deployment(deployment)
                    .with_api_version(api_version)
                    .with_max_tokens(options.max_tokens);
                if let Some(timeout) = options.timeout {
                    p = p.with_timeout(timeout);
                }
                Arc::new(p)
            }
            Self::Anthropic {
                base_url,
                api_key,
                model,
            } => {
                let mut p = AnthropicProvider::new(base_url, api_key, model)
                    .with_max_tokens(options.max_tokens);
                if let Some(timeout) = options.timeout {
                    p = p.with_timeout(timeout);
                }
                Arc::new(p)
            }
        };
        Ok(provider)
    }

    pub fn path() -> PathBuf {
        DataqConfig::resolve_path("credentials.json")
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let creds = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(creds))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, data).map_err(io_err)
    }
}

fn is_local(base_url: &str) -> bool {
    let rest = base_url
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    let host = rest.split(['/', ':']).next().unwrap_or("");
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0")
}
