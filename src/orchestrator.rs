use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use std::time::Duration;
use tracing::{info, warn, error};

use crate::catalyst::ScoutReport;
use crate::config::Config;
use crate::evaluator::{CatalystRanker, FilterOutcome};
use crate::monitoring::{telegram, DeliveryStatus, TelegramNotifier};
use crate::scout_agent::{CatalystSource, PromptContext};
use crate::storage::{AlertLedger, ReportStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Query,
    Parse,
    Filter,
    Persist,
    Notify,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The model returned nothing usable.
    NoCatalysts,
    /// Candidates existed but none passed the filters; the raw report was saved.
    NoQualifyingCandidates { candidates: usize },
    Completed {
        persisted: usize,
        alerted: usize,
        delivered: usize,
    },
    Failed { stage: Stage, reason: String },
}

/// Runs one QUERY → PARSE → FILTER → PERSIST → NOTIFY pass.
pub struct AlphaScout<S> {
    source: S,
    ranker: CatalystRanker,
    store: ReportStore,
    ledger: AlertLedger,
    notifier: TelegramNotifier,
    timezone: Tz,
    lookback_hours: i64,
    alert_delay: Duration,
}

impl<S: CatalystSource> AlphaScout<S> {
    pub fn new(config: &Config, source: S) -> Self {
        Self {
            source,
            ranker: CatalystRanker::new(config.filter.clone()),
            store: ReportStore::new(&config.report_path),
            ledger: AlertLedger::new(&config.ledger_path),
            notifier: TelegramNotifier::new(
                config.telegram_bot_token.clone(),
                config.telegram_chat_id.clone(),
                config.telegram_api_base.clone(),
            ),
            timezone: config.timezone,
            lookback_hours: config.lookback_hours,
            alert_delay: config.alert_delay,
        }
    }

    /// Never returns an error: anything unexpected ends the run as `RunOutcome::Failed`,
    /// tagged with the stage that was in progress.
    pub async fn run(&self) -> RunOutcome {
        let mut stage = Stage::Query;
        match self.execute(&mut stage).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Run failed during {:?} stage: {:#}", stage, e);
                RunOutcome::Failed {
                    stage,
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    async fn execute(&self, stage: &mut Stage) -> Result<RunOutcome> {
        let now = Utc::now().with_timezone(&self.timezone);
        let context = PromptContext::new(now, self.lookback_hours);

        // 1. Ask the model for catalysts
        let report = match self.source.scout(&context).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Catalyst query failed: {}", e);
                info!("No catalysts found.");
                return Ok(RunOutcome::NoCatalysts);
            }
        };

        // 2. Drop records without a usable ticker
        *stage = Stage::Parse;
        let report = report.validated();
        if report.is_empty() {
            info!("No catalysts found.");
            return Ok(RunOutcome::NoCatalysts);
        }
        info!("Model returned {} catalysts", report.len());

        // 3. Apply gates, rescore and rank
        *stage = Stage::Filter;
        let outcome = self.ranker.rank(&report.catalysts);

        // 4. Snapshot first, then the ledger; a failure here aborts the run
        *stage = Stage::Persist;
        let selection = match outcome {
            FilterOutcome::NoQualifyingCandidates => {
                info!("No catalysts met the filter thresholds; saving the unfiltered report for audit");
                self.store
                    .save_report(&report)
                    .context("saving unfiltered report")?;
                return Ok(RunOutcome::NoQualifyingCandidates {
                    candidates: report.len(),
                });
            }
            FilterOutcome::Qualified(selection) => selection,
        };

        self.store
            .save_report(&ScoutReport::new(selection.persisted().to_vec()))
            .context("saving filtered report")?;

        for catalyst in selection.alerts() {
            self.ledger
                .append_ledger_row(catalyst, &now)
                .with_context(|| format!("appending ledger row for {}", catalyst.ticker))?;
        }

        // 5. Send alerts, pacing between consecutive messages
        *stage = Stage::Notify;
        let mut delivered = 0;
        for (i, catalyst) in selection.alerts().iter().enumerate() {
            if i > 0 && !self.alert_delay.is_zero() {
                tokio::time::sleep(self.alert_delay).await;
            }

            let message = telegram::render(catalyst);
            if self.notifier.deliver(&message).await == DeliveryStatus::Sent {
                info!("Alert sent for {}", catalyst.ticker);
                delivered += 1;
            }
        }

        *stage = Stage::Done;
        info!(
            "Run complete: {} persisted, {} alerted, {} delivered",
            selection.persisted().len(),
            selection.alerts().len(),
            delivered
        );

        Ok(RunOutcome::Completed {
            persisted: selection.persisted().len(),
            alerted: selection.alerts().len(),
            delivered,
        })
    }
}
