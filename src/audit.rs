use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Runs a static-analysis pass over collected code text.
pub trait StaticAuditor: Send + Sync {
    fn audit(&self, code: &str) -> Result<StaticFindings>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticFindings {
    pub findings: Vec<Finding>,
}

impl StaticFindings {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: String,
    pub file: String,
    pub line: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// The static pass the product has not built yet. Reports no findings so the
/// AI analysis still flows through to the merged report.
pub struct PendingAuditor;

impl StaticAuditor for PendingAuditor {
    fn audit(&self, code: &str) -> Result<StaticFindings> {
        tracing::info!("Static audit pass pending; {} bytes skipped", code.len());
        Ok(StaticFindings::default())
    }
}
