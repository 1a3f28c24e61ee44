use serde::{Deserialize, Serialize};
use tracing::warn;

/// One candidate trade idea as returned by the scouting model.
///
/// Non-optional fields are required by the response contract; a record missing any
/// of them fails deserialization of the whole report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalyst {
    pub ticker: String,
    /// 1-10 as produced by the model. Overwritten once by the ranker for accepted records.
    pub conviction_score: u8,
    pub thesis: String,
    pub catalyst_details: String,
    pub sentiment: String,
    /// Free text such as "$450M" or "2.1B".
    pub market_cap: String,
    /// Free text such as "12%" or "10-20%".
    pub expected_upside: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recency_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_sentiment: Option<String>,
}

impl Catalyst {
    pub fn is_bullish(&self) -> bool {
        self.sentiment.trim().eq_ignore_ascii_case("bullish")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoutReport {
    pub catalysts: Vec<Catalyst>,
}

impl ScoutReport {
    pub fn new(catalysts: Vec<Catalyst>) -> Self {
        Self { catalysts }
    }

    pub fn is_empty(&self) -> bool {
        self.catalysts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.catalysts.len()
    }

    /// Normalizes tickers and drops records that carry no usable ticker.
    pub fn validated(self) -> Self {
        let catalysts = self
            .catalysts
            .into_iter()
            .filter_map(|mut c| {
                let ticker = c.ticker.trim().trim_start_matches('$').to_uppercase();
                if ticker.is_empty() {
                    warn!("Dropping catalyst with empty ticker: {:?}", c.thesis);
                    return None;
                }
                c.ticker = ticker;
                Some(c)
            })
            .collect();

        Self { catalysts }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_may_be_absent() {
        let json = r#"{
            "catalysts": [{
                "ticker": "ACME",
                "conviction_score": 8,
                "thesis": "Contract win not priced in.",
                "catalyst_details": "8-K filed Monday",
                "sentiment": "Bullish",
                "market_cap": "$1.2B",
                "expected_upside": "15%"
            }]
        }"#;
        let report: ScoutReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.catalysts[0].risk, None);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{"catalysts": [{"ticker": "ACME", "conviction_score": 8}]}"#;
        assert!(serde_json::from_str::<ScoutReport>(json).is_err());
    }

    #[test]
    fn validation_normalizes_and_drops_blank_tickers() {
        let report = ScoutReport::new(vec![
            fixtures::catalyst(" $acme ", "Bullish", "10%", "$1B", 8),
            fixtures::catalyst("   ", "Bullish", "10%", "$1B", 8),
        ])
        .validated();
        assert_eq!(report.len(), 1);
        assert_eq!(report.catalysts[0].ticker, "ACME");
    }

    #[test]
    fn bullish_check_ignores_case_and_padding() {
        assert!(fixtures::catalyst("A", " bullish ", "", "", 1).is_bullish());
        assert!(!fixtures::catalyst("A", "Mixed", "", "", 1).is_bullish());
    }
}
