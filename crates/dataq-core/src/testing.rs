//! Test doubles shared across modules.

use crate::providers::{LlmProvider, ProviderError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type ErrorFactory = Box<dyn Fn() -> ProviderError + Send + Sync>;

enum Script {
    Reply(String),
    Fail(ErrorFactory),
}

/// A backend that gives the same answer every time and records each prompt.
pub struct ScriptedProvider {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            script: Script::Reply(reply.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: impl Fn() -> ProviderError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Script::Fail(Box::new(error)),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(make) => Err(make()),
        }
    }
}
