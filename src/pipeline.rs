use std::path::Path;

use crate::audit::StaticAuditor;
use crate::config::ProviderName;
use crate::crawler::CodeCrawler;
use crate::dispatcher::AnalysisDispatcher;
use crate::error::Result;
use crate::report::AuditReport;
use crate::storage::Storage;

/// Orchestrates one audit run: crawl the code, dispatch it to an analysis
/// provider, run the static pass, merge the halves and persist the report.
pub struct AuditPipeline<C, A> {
    crawler: C,
    dispatcher: AnalysisDispatcher,
    auditor: A,
    storage: Storage,
}

impl<C: CodeCrawler, A: StaticAuditor> AuditPipeline<C, A> {
    pub fn new(crawler: C, dispatcher: AnalysisDispatcher, auditor: A, storage: Storage) -> Self {
        Self {
            crawler,
            dispatcher,
            auditor,
            storage,
        }
    }

    pub async fn run(&self, path: &Path, provider: ProviderName) -> Result<AuditReport> {
        tracing::info!("Starting code audit of {}", path.display());

        let code = self.crawler.crawl(path)?;
        tracing::info!("Collected {} bytes of code", code.len());

        let analysis = self.dispatcher.analyze(&code, provider).await?;
        let findings = self.auditor.audit(&code)?;

        let report = AuditReport::merge(path.display().to_string(), analysis, findings);
        self.storage.save_report(&report)?;
        tracing::info!("Report saved to history");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::PendingAuditor;
    use crate::config::ConfigStore;
    use crate::error::Error;

    struct FixedCrawler(&'static str);

    impl CodeCrawler for FixedCrawler {
        fn crawl(&self, _path: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn pipeline_merges_and_persists_a_stub_provider_run() {
        let mut store = ConfigStore::default();
        store.set_api_key(ProviderName::Kimi, "sk-test");

        let pipeline = AuditPipeline::new(
            FixedCrawler("print(1)"),
            AnalysisDispatcher::new(store).unwrap(),
            PendingAuditor,
            Storage::in_memory().unwrap(),
        );

        let report = pipeline
            .run(Path::new("app.py"), ProviderName::Kimi)
            .await
            .unwrap();

        assert_eq!(report.source_path, "app.py");
        assert_eq!(report.model, "Kimi");
        assert!(report.findings.is_empty());

        let cached = pipeline.storage.latest_report("app.py").unwrap().unwrap();
        assert_eq!(cached, report);
    }

    #[tokio::test]
    async fn pipeline_surfaces_dispatcher_failures() {
        let pipeline = AuditPipeline::new(
            FixedCrawler("print(1)"),
            AnalysisDispatcher::new(ConfigStore::default()).unwrap(),
            PendingAuditor,
            Storage::in_memory().unwrap(),
        );

        let result = pipeline.run(Path::new("app.py"), ProviderName::ChatGpt).await;
        assert!(matches!(result, Err(Error::MissingCredential(_))));
    }
}
