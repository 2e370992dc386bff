use anyhow::Result;

use crate::providers::{Provider, ProviderResponse};
use crate::translations::PromptEnvelope;

/// Sends prompt envelopes through a provider template.
///
/// The template carries model and endpoint configuration; each call clones it
/// and applies the request's credential and messages.
#[derive(Debug, Clone)]
pub struct Translator<P: Provider + Clone> {
    provider: P,
}

impl<P: Provider + Clone> Translator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn exec(&self, key: String, prompt: PromptEnvelope) -> Result<ProviderResponse> {
        self.provider
            .clone()
            .with_key(key)
            .append_system_input(prompt.system)
            .append_user_input(prompt.user)
            .complete()
            .await
    }
}
