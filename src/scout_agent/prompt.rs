use chrono::{DateTime, Datelike, Duration};
use chrono_tz::Tz;
use serde_json::{json, Value};

/// Date anchors the model is told to respect when searching.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub now: DateTime<Tz>,
    pub lookback_hours: i64,
}

impl PromptContext {
    pub fn new(now: DateTime<Tz>, lookback_hours: i64) -> Self {
        Self { now, lookback_hours }
    }

    /// Start of the search window. An out-of-range lookback collapses to `now`.
    pub fn window_start(&self) -> DateTime<Tz> {
        Duration::try_hours(self.lookback_hours)
            .and_then(|lookback| self.now.checked_sub_signed(lookback))
            .unwrap_or(self.now)
    }

    pub fn current_year(&self) -> i32 {
        self.now.year()
    }

    pub fn previous_year(&self) -> i32 {
        self.now.year() - 1
    }
}

pub fn system_instruction(ctx: &PromptContext) -> String {
    let hours = ctx.lookback_hours;
    let year = ctx.current_year();
    let prev_year = ctx.previous_year();

    format!(
        "Role: You are \"Alpha Scout\", a senior event-driven analyst specializing in undervalued bullish \
catalysts with high profit potential. You focus on market inefficiencies where events are not yet fully \
priced in: pre-announcement rumors, sentiment mismatches, small-cap drifts.

Constraints:
1. {hours}h Recency: ONLY items published in the last {hours} hours. ABSOLUTELY NO items from {prev_year} or earlier. \
Verify the year of every source. Every catalyst MUST have been published in {year}.
2. Source Priority: SEC.gov, FDA.gov, official IR, Tier-1 news (Reuters/Bloomberg) first, then X (site:x.com) \
and niche forums (site:reddit.com) for emerging narratives.
3. Prediction Markets: cross-reference Polymarket or Kalshi odds, favouring bullish probabilities above 50% that \
suggest mispricing. Without a direct market, use proxies and estimate the edge.
4. Logic: Deduplicate news and normalize names to tickers. Prefer inefficient sectors (biotech, small caps, emerging tech) \
and evidence of incomplete pricing such as a low-volume reaction or high short interest.
5. Liquidity: prefer market caps between $500M and $10B; never include names below $300M.
6. Conviction: rate 1-10 on upside asymmetry. 8+ requires a hard date or verifiable rumor, bullish prediction odds \
above 60% and visible signs of mispricing.

Task: return a list of 3-7 catalysts ranked by conviction descending. Every field must be filled from sources you \
actually found; use the market cap and expected upside formats shown in the schema descriptions."
    )
}

pub fn user_prompt(ctx: &PromptContext) -> String {
    let year = ctx.current_year();
    let prev_year = ctx.previous_year();
    let start = ctx.window_start().format("%Y-%m-%d");
    let today = ctx.now.format("%Y-%m-%d");

    format!(
        "Current full timestamp: {now}
Today is in the year {year}.

Perform a deep sweep for undervalued bullish catalysts ONLY between {start} and {today}, emphasizing pre-event \
buildups, mispricings and emerging narratives likely to drive multi-day upside.

CRITICAL:
- You MUST ignore any search results from {prev_year}. Late-{prev_year} articles will surface; you are FORBIDDEN from using them.
- For each candidate, verify the publication year is {year}.
- Discard bearish, mixed or fully priced-in events (for example a stock already up more than 10% on the news).

1. Search SEC, FDA, Reuters, Bloomberg and X for bullish signals from the window above. Target small and mid caps.
2. For each candidate, search prediction market odds plus proxies: unusual call volume, short interest, X sentiment.
3. Compare odds to the market reaction and flag the gap. Use historical analogs to estimate the expected move.
4. Record the current price, market cap, expected upside, earnings date, relative volume and a stop-loss trigger.
5. Compile the result into the JSON schema.",
        now = ctx.now.format("%Y-%m-%d %H:%M:%S %Z"),
    )
}

/// Response schema for Gemini structured output, mirroring `ScoutReport`.
pub fn response_schema() -> Value {
    let text = |description: &str| json!({ "type": "STRING", "description": description });

    json!({
        "type": "OBJECT",
        "properties": {
            "catalysts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "ticker": text("Stock ticker, e.g. AAPL."),
                        "conviction_score": { "type": "INTEGER", "description": "1-10 score. 8+ requires a hard date." },
                        "thesis": text("1-2 sentence thesis."),
                        "catalyst_details": text("Specific event details and timing."),
                        "sentiment": text("Bullish, Bearish, or Mixed."),
                        "market_cap": text("Market cap with unit, e.g. $450M or $2.1B."),
                        "expected_upside": text("Expected move as a percent or range, e.g. 12% or 10-20%."),
                        "absorption_status": text("Why the market has not priced this in yet."),
                        "earnings_date": text("Next earnings date if known."),
                        "relative_volume": text("Relative volume versus average."),
                        "stop_loss_trigger": text("Price or event that invalidates the trade."),
                        "prediction_market": text("Source, odds and 24h change if available."),
                        "recency_proof": text("Source link and timestamp."),
                        "risk": text("Primary invalidation factor."),
                        "current_price": text("Latest price, e.g. $12.40."),
                        "x_sentiment": text("Summary of X/social buzz.")
                    },
                    "required": [
                        "ticker",
                        "conviction_score",
                        "thesis",
                        "catalyst_details",
                        "sentiment",
                        "market_cap",
                        "expected_upside"
                    ]
                }
            }
        },
        "required": ["catalysts"]
    })
}
