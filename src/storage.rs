use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::Result;
use crate::report::AuditReport;

/// SQLite-backed history of audit reports.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY,
                source_path TEXT NOT NULL,
                model TEXT NOT NULL,
                report_json TEXT NOT NULL,
                generated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_source_path ON reports(source_path);
            "#,
        )?;
        Ok(())
    }

    pub fn save_report(&self, report: &AuditReport) -> Result<()> {
        let report_json = serde_json::to_string(report)?;
        self.conn.execute(
            r#"
            INSERT INTO reports (source_path, model, report_json, generated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                report.source_path,
                report.model,
                report_json,
                report.generated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent report for a source path, if one has been stored.
    pub fn latest_report(&self, source_path: &str) -> Result<Option<AuditReport>> {
        let report_json: Option<String> = self
            .conn
            .query_row(
                r#"
                SELECT report_json FROM reports
                WHERE source_path = ?1
                ORDER BY generated_at DESC, id DESC
                LIMIT 1
                "#,
                params![source_path],
                |row| row.get(0),
            )
            .optional()?;

        match report_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::StaticFindings;
    use crate::config::ProviderName;
    use crate::providers::AnalysisResult;

    fn sample_report(path: &str, analysis: &str) -> AuditReport {
        AuditReport::merge(
            path,
            AnalysisResult::new(analysis, ProviderName::ChatGpt),
            StaticFindings::default(),
        )
    }

    #[test]
    fn save_and_fetch_latest_report() {
        let storage = Storage::in_memory().unwrap();
        let report = sample_report("src/", "No issues.");
        storage.save_report(&report).unwrap();

        let loaded = storage.latest_report("src/").unwrap().unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn latest_report_prefers_newest() {
        let storage = Storage::in_memory().unwrap();
        storage.save_report(&sample_report("src/", "first")).unwrap();
        storage.save_report(&sample_report("src/", "second")).unwrap();

        let loaded = storage.latest_report("src/").unwrap().unwrap();
        assert_eq!(loaded.analysis, "second");
    }

    #[test]
    fn missing_path_yields_none() {
        let storage = Storage::in_memory().unwrap();
        assert!(storage.latest_report("elsewhere/").unwrap().is_none());
    }
}
