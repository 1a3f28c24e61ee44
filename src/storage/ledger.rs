use chrono::DateTime;
use chrono_tz::Tz;
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::info;

use crate::catalyst::Catalyst;
use crate::error::Result;

pub const OPEN_STATUS: &str = "OPEN";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MISSING: &str = "N/A";

/// One row of the alert ledger. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Entry Price")]
    pub entry_price: String,
    #[serde(rename = "Conviction Score")]
    pub conviction_score: u8,
    #[serde(rename = "Market Cap")]
    pub market_cap: String,
    #[serde(rename = "Expected Upside")]
    pub expected_upside: String,
    #[serde(rename = "Thesis")]
    pub thesis: String,
    #[serde(rename = "Absorption Status")]
    pub absorption_status: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl LedgerRow {
    pub fn new(catalyst: &Catalyst, timestamp: &DateTime<Tz>) -> Self {
        Self {
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ticker: single_line(&catalyst.ticker),
            entry_price: single_line(catalyst.current_price.as_deref().unwrap_or(MISSING)),
            conviction_score: catalyst.conviction_score,
            market_cap: single_line(&catalyst.market_cap),
            expected_upside: single_line(&catalyst.expected_upside),
            thesis: single_line(&catalyst.thesis),
            absorption_status: single_line(catalyst.absorption_status.as_deref().unwrap_or(MISSING)),
            status: OPEN_STATUS.to_string(),
        }
    }
}

// Quoting handles delimiters; line breaks are folded so each row stays on one line.
fn single_line(text: &str) -> String {
    text.split(|c| c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append-only CSV history of alerted catalysts.
pub struct AlertLedger {
    path: PathBuf,
}

impl AlertLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends one row. The header is written only when the file is created.
    /// The file is opened and closed per call so no handle outlives the write.
    pub fn append_ledger_row(&self, catalyst: &Catalyst, timestamp: &DateTime<Tz>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists)
            .quote_style(QuoteStyle::Always)
            .from_writer(file);

        writer.serialize(LedgerRow::new(catalyst, timestamp))?;
        writer.flush()?;

        info!("Ledger row appended for {} to {}", catalyst.ticker, self.path.display());
        Ok(())
    }
}
