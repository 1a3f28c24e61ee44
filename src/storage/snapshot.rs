use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::catalyst::ScoutReport;
use crate::error::Result;

/// Last-write-wins JSON snapshot of the most recent report.
pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save_report(&self, report: &ScoutReport) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)?;

        info!("Saved {} catalysts to {}", report.len(), self.path.display());
        Ok(())
    }
}
