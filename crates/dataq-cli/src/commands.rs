use anyhow::{Context, Result};
use dataq_core::{
    data_tools, ConfigError, Credentials, DataqConfig, Dataset, LlmProvider, ProviderOptions,
    ReasoningAgent, ToolAgent, ToolRegistry,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Saved credentials win; otherwise the backend comes from config + env.
fn load_provider() -> Result<Arc<dyn LlmProvider>> {
    resolve_provider(Credentials::load()?, DataqConfig::load)
}

/// With saved credentials the config only supplies request options and falls
/// back to defaults when it cannot be loaded.
fn resolve_provider(
    saved: Option<Credentials>,
    load_config: impl FnOnce() -> Result<DataqConfig, ConfigError>,
) -> Result<Arc<dyn LlmProvider>> {
    let (creds, config) = match saved {
        Some(creds) => {
            debug!("using {} credentials from {}", creds.backend(), Credentials::path().display());
            let config = load_config().unwrap_or_else(|e| {
                warn!("ignoring config ({e}), using saved credentials");
                DataqConfig::default()
            });
            (creds, config)
        }
        None => {
            let config = load_config().context("failed to load config")?;
            let creds = Credentials::from_config(&config)
                .context("no usable backend configured (run `dataq setup` or set env vars)")?;
            (creds, config)
        }
    };
    Ok(creds.build_provider(ProviderOptions::from(&config))?)
}

fn load_tools(data: &Path) -> Result<ToolRegistry> {
    let dataset = Dataset::load(data).with_context(|| format!("failed to load {}", data.display()))?;
    debug!("{} rows, columns: {:?}", dataset.rows(), dataset.names());
    Ok(data_tools(Arc::new(dataset)))
}

pub async fn ask(data: &Path, question: &str) -> Result<()> {
    let registry = load_tools(data)?;
    let agent = ToolAgent::new(load_provider()?, registry);
    let value = agent.ask(question).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub async fn chat(question: &str) -> Result<()> {
    let agent = ReasoningAgent::new(load_provider()?);
    println!("{}", agent.ask(question).await?);
    Ok(())
}

pub fn tools(data: &Path) -> Result<()> {
    for (name, description) in load_tools(data)?.describe_all() {
        println!("{name}: {description}");
    }
    Ok(())
}
