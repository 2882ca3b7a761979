pub mod chat;
pub mod generate;

use serde::{Deserialize, Serialize};

use crate::config::ProviderName;

/// The free-text output of a provider's code review plus a label identifying
/// which provider produced it. Downstream consumers treat it as an opaque
/// report fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: String,
    pub model: String,
}

impl AnalysisResult {
    pub fn new(analysis: impl Into<String>, provider: ProviderName) -> Self {
        Self {
            analysis: analysis.into(),
            model: provider.label().to_string(),
        }
    }

    /// Placeholder result for providers whose integration is not yet built.
    /// Deliberately not an error: the caller gets a report stating the
    /// integration is pending.
    pub fn pending(provider: ProviderName) -> Self {
        Self::new(
            format!(
                "{} integration is not yet implemented; no analysis was performed.",
                provider.label()
            ),
            provider,
        )
    }
}
