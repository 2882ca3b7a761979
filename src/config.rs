use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The fixed set of analysis providers the dispatcher knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    ChatGpt,
    DeepSeek,
    Kimi,
    Ollama,
}

impl ProviderName {
    pub const ALL: [ProviderName; 4] = [
        ProviderName::ChatGpt,
        ProviderName::DeepSeek,
        ProviderName::Kimi,
        ProviderName::Ollama,
    ];

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderName::ChatGpt => "ChatGPT",
            ProviderName::DeepSeek => "DeepSeek",
            ProviderName::Kimi => "Kimi",
            ProviderName::Ollama => "Ollama",
        }
    }

    /// Key used in the persisted configuration document and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::ChatGpt => "chatgpt",
            ProviderName::DeepSeek => "deepseek",
            ProviderName::Kimi => "kimi",
            ProviderName::Ollama => "ollama",
        }
    }

    /// Whether a populated `api_key` is required before any call is made.
    /// Ollama is a local endpoint and needs only a base URL.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderName::Ollama)
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chatgpt" => Ok(ProviderName::ChatGpt),
            "deepseek" => Ok(ProviderName::DeepSeek),
            "kimi" => Ok(ProviderName::Kimi),
            "ollama" => Ok(ProviderName::Ollama),
            other => Err(Error::UnknownProvider(other.to_string())),
        }
    }
}

/// Connection settings for one provider. An empty `api_key` means
/// "not configured".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    pub api_base: String,
}

impl ProviderConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_key: String::new(),
            api_base: api_base.into(),
        }
    }
}

/// The persisted mapping of provider name to connection settings.
///
/// Persisted as a single JSON document; `save` replaces the whole document
/// rather than merging. Loading rejects documents containing provider names
/// outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigStore {
    providers: BTreeMap<ProviderName, ProviderConfig>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            ProviderName::ChatGpt,
            ProviderConfig::new("https://api.openai.com/v1"),
        );
        providers.insert(
            ProviderName::DeepSeek,
            ProviderConfig::new("https://api.deepseek.com/v1"),
        );
        providers.insert(
            ProviderName::Kimi,
            ProviderConfig::new("https://api.moonshot.cn/v1"),
        );
        providers.insert(
            ProviderName::Ollama,
            ProviderConfig::new("http://localhost:11434"),
        );
        Self { providers }
    }
}

impl ConfigStore {
    /// Loads the store from `path`. An absent file is not an error: the
    /// built-in defaults are returned. A file that exists but does not parse
    /// as the expected document fails with `ConfigCorrupt`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| Error::ConfigCorrupt(e.to_string()))
    }

    /// Replaces the persisted document wholesale.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), contents).map_err(Error::Persistence)?;
        tracing::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn get(&self, provider: ProviderName) -> Option<&ProviderConfig> {
        self.providers.get(&provider)
    }

    pub fn set(&mut self, provider: ProviderName, config: ProviderConfig) {
        self.providers.insert(provider, config);
    }

    pub fn set_api_key(&mut self, provider: ProviderName, api_key: impl Into<String>) {
        self.providers
            .entry(provider)
            .or_insert_with(|| default_config_for(provider))
            .api_key = api_key.into();
    }

    pub fn set_api_base(&mut self, provider: ProviderName, api_base: impl Into<String>) {
        self.providers
            .entry(provider)
            .or_insert_with(|| default_config_for(provider))
            .api_base = api_base.into();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderName, &ProviderConfig)> {
        self.providers.iter().map(|(name, config)| (*name, config))
    }
}

fn default_config_for(provider: ProviderName) -> ProviderConfig {
    ConfigStore::default()
        .get(provider)
        .cloned()
        .unwrap_or_else(|| ProviderConfig::new(""))
}
