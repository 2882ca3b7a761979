use std::time::Duration;

use reqwest::Client;

use crate::config::{ConfigStore, ProviderName};
use crate::error::{Error, Result};
use crate::providers::{chat, generate, AnalysisResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Routes a code-analysis request to the provider-specific wire logic.
///
/// Holds an immutable snapshot of the configuration taken at construction
/// time; callers that change the persisted store build a new dispatcher to
/// pick up the new values. Each `analyze` call is stateless beyond reading
/// that snapshot: one network call, no retries, no partial results.
pub struct AnalysisDispatcher {
    store: ConfigStore,
    client: Client,
}

impl AnalysisDispatcher {
    pub fn new(store: ConfigStore) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { store, client })
    }

    pub async fn analyze(&self, code: &str, provider: ProviderName) -> Result<AnalysisResult> {
        tracing::info!("Starting analysis with {}", provider.label());

        let config = self
            .store
            .get(provider)
            .ok_or_else(|| Error::UnknownProvider(provider.to_string()))?;

        // The credential gate fires before any network I/O, for the stub
        // providers as well as the wired ones.
        if provider.requires_api_key() && config.api_key.is_empty() {
            return Err(Error::MissingCredential(provider));
        }

        match provider {
            ProviderName::ChatGpt => chat::analyze(&self.client, provider, config, code).await,
            ProviderName::Ollama => generate::analyze(&self.client, provider, config, code).await,
            ProviderName::DeepSeek | ProviderName::Kimi => Ok(AnalysisResult::pending(provider)),
        }
    }
}
