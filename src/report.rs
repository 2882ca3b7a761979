use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::StaticFindings;
use crate::providers::AnalysisResult;

/// The merged output of one audit run: the AI review, the static findings,
/// and enough context to identify what was audited and by whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub source_path: String,
    pub model: String,
    pub analysis: String,
    pub findings: StaticFindings,
    pub generated_at: DateTime<Utc>,
}

impl AuditReport {
    pub fn merge(
        source_path: impl Into<String>,
        analysis: AnalysisResult,
        findings: StaticFindings,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            model: analysis.model,
            analysis: analysis.analysis,
            findings,
            generated_at: Utc::now(),
        }
    }
}
