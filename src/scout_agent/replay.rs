use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::catalyst::ScoutReport;
use crate::error::Result;
use super::agent::{parse_report, CatalystSource};
use super::prompt::PromptContext;

/// Replays a saved report instead of querying the model.
pub struct ReplaySource {
    path: PathBuf,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalystSource for ReplaySource {
    async fn scout(&self, _context: &PromptContext) -> Result<ScoutReport> {
        info!("Replaying catalysts from {}", self.path.display());
        let text = fs::read_to_string(&self.path)?;
        parse_report(&text)
    }
}
