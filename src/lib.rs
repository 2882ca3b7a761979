pub mod audit;
pub mod config;
pub mod crawler;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod storage;

pub use audit::{PendingAuditor, StaticAuditor};
pub use config::{ConfigStore, ProviderConfig, ProviderName};
pub use crawler::{CodeCrawler, FsCrawler};
pub use dispatcher::AnalysisDispatcher;
pub use error::{Error, Result};
pub use pipeline::AuditPipeline;
pub use providers::AnalysisResult;
pub use report::AuditReport;
pub use storage::Storage;
