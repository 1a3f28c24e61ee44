use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn, error};

use crate::catalyst::Catalyst;
use crate::error::{Result, ScoutError};

const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    /// Credentials are not configured; nothing was sent.
    Skipped,
    Failed,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>, api_base: impl Into<String>) -> Self {
        Self {
            bot_token,
            chat_id,
            api_base: api_base.into(),
            client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    /// Sends `message`, swallowing every failure after logging it.
    pub async fn deliver(&self, message: &str) -> DeliveryStatus {
        if !self.is_configured() {
            warn!("Telegram credentials not found. Skipping message.");
            return DeliveryStatus::Skipped;
        }

        match self.send_notification(message).await {
            Ok(()) => DeliveryStatus::Sent,
            Err(e) => {
                error!("Failed to send Telegram notification: {}", e);
                DeliveryStatus::Failed
            }
        }
    }

    pub async fn send_notification(&self, message: &str) -> Result<()> {
        let (bot_token, chat_id) = match (&self.bot_token, &self.chat_id) {
            (Some(token), Some(chat)) => (token, chat),
            _ => return Err(ScoutError::config_error("Telegram bot token or chat ID not configured")),
        };

        info!("Sending Telegram notification");

        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            bot_token
        );

        let response = self.client
            .post(&url)
            .json(&SendMessage {
                chat_id,
                text: message,
                parse_mode: "Markdown",
                disable_web_page_preview: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScoutError::notification_error(format!(
                "Telegram API returned {}: {}",
                status, error_text
            )));
        }

        info!("Telegram notification sent successfully");
        Ok(())
    }
}

/// Escapes the characters legacy Telegram Markdown treats as entity delimiters.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Renders the alert text for one catalyst. Missing optional fields show as "N/A".
///
/// Every value taken from the catalyst is escaped, so only the template's own
/// markup reaches Telegram as formatting.
pub fn render(catalyst: &Catalyst) -> String {
    let opt = |field: &Option<String>| -> String {
        field
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(escape_markdown)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    format!(
        "🚀 *{}* - *{}/10*\n\
        - *Price:* {} | *Mkt Cap:* {}\n\
        - *Expected Upside:* {}\n\
        - *Thesis:* {}\n\
        - *Catalyst:* {}\n\
        - *Why Not Priced In:* {}\n\
        - *Earnings Date:* {}\n\
        - *Relative Volume:* {}\n\
        - *Sentiment:* {} | *X Buzz:* {}\n\
        - *Prediction Market:* {}\n\
        - *Stop Loss:* {}\n\
        - *Risk:* {}\n\
        - *Recency Proof:* {}",
        escape_markdown(&catalyst.ticker),
        catalyst.conviction_score,
        opt(&catalyst.current_price),
        escape_markdown(&catalyst.market_cap),
        escape_markdown(&catalyst.expected_upside),
        escape_markdown(&catalyst.thesis),
        escape_markdown(&catalyst.catalyst_details),
        opt(&catalyst.absorption_status),
        opt(&catalyst.earnings_date),
        opt(&catalyst.relative_volume),
        escape_markdown(&catalyst.sentiment),
        opt(&catalyst.x_sentiment),
        opt(&catalyst.prediction_market),
        opt(&catalyst.stop_loss_trigger),
        opt(&catalyst.risk),
        opt(&catalyst.recency_proof),
    )
}
