use tracing::{info, debug};

use crate::catalyst::Catalyst;
use crate::config::FilterConfig;
use super::scorer::CatalystScorer;

/// Accepted catalysts ranked by adjusted conviction, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSelection {
    ranked: Vec<Catalyst>,
    top_n: usize,
}

impl RankedSelection {
    /// The full accepted-and-ranked set; this is what gets persisted.
    pub fn persisted(&self) -> &[Catalyst] {
        &self.ranked
    }

    /// The leading `top_n` slice that gets alerted.
    pub fn alerts(&self) -> &[Catalyst] {
        &self.ranked[..self.top_n.min(self.ranked.len())]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Qualified(RankedSelection),
    NoQualifyingCandidates,
}

pub struct CatalystRanker {
    scorer: CatalystScorer,
    top_n: usize,
}

impl CatalystRanker {
    pub fn new(config: FilterConfig) -> Self {
        let top_n = config.top_n;
        Self {
            scorer: CatalystScorer::new(config),
            top_n,
        }
    }

    /// Scores every candidate, keeps the ones that pass all gates with their
    /// conviction rewritten to the clamped adjusted score, then stable-sorts them.
    pub fn rank(&self, candidates: &[Catalyst]) -> FilterOutcome {
        info!("Ranking {} candidate catalysts...", candidates.len());

        let mut accepted: Vec<Catalyst> = candidates
            .iter()
            .filter_map(|catalyst| {
                let score = self.scorer.calculate_score(catalyst);
                debug!(
                    "{}: upside={:.2}% mcap={:.1}M liquid={} sweet_spot={} final_score={:.1}",
                    catalyst.ticker,
                    score.upside_pct,
                    score.market_cap_millions,
                    score.is_liquid,
                    score.is_sweet_spot,
                    score.final_score
                );
                if !score.is_accepted() {
                    let reasons: Vec<String> = score.rejections.iter().map(ToString::to_string).collect();
                    debug!("Rejected {}: {}", catalyst.ticker, reasons.join(", "));
                    return None;
                }

                let mut kept = catalyst.clone();
                kept.conviction_score = score.stored_score;
                Some(kept)
            })
            .collect();

        if accepted.is_empty() {
            info!("No catalysts passed the filters");
            return FilterOutcome::NoQualifyingCandidates;
        }

        // Vec::sort_by is stable, so equal scores keep input order.
        accepted.sort_by(|a, b| b.conviction_score.cmp(&a.conviction_score));

        info!("{} of {} catalysts passed the filters", accepted.len(), candidates.len());
        FilterOutcome::Qualified(RankedSelection {
            ranked: accepted,
            top_n: self.top_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalyst::fixtures::catalyst;

    fn ranker() -> CatalystRanker {
        CatalystRanker::new(FilterConfig::default())
    }

    fn qualified(outcome: FilterOutcome) -> RankedSelection {
        match outcome {
            FilterOutcome::Qualified(selection) => selection,
            FilterOutcome::NoQualifyingCandidates => panic!("expected qualifying candidates"),
        }
    }

    fn tickers(catalysts: &[Catalyst]) -> Vec<&str> {
        catalysts.iter().map(|c| c.ticker.as_str()).collect()
    }

    #[test]
    fn accepts_only_bullish_liquid_high_upside() {
        let candidates = vec![
            catalyst("A", "Bullish", "12%", "$600M", 8),
            catalyst("B", "Bullish", "3%", "$1B", 9),
            catalyst("C", "Bearish", "20%", "$700M", 9),
        ];
        let selection = qualified(ranker().rank(&candidates));
        assert_eq!(tickers(selection.persisted()), vec!["A"]);
        assert_eq!(selection.persisted()[0].conviction_score, 8);
    }

    #[test]
    fn input_is_left_untouched() {
        let candidates = vec![catalyst("A", "Bullish", "12%", "$600M", 10)];
        let _ = ranker().rank(&candidates);
        assert_eq!(candidates[0].conviction_score, 10);
    }

    #[test]
    fn ranks_descending_and_keeps_ties_in_input_order() {
        let candidates = vec![
            catalyst("LOW", "Bullish", "9%", "$20B", 8),
            catalyst("TIE1", "Bullish", "9%", "$20B", 9),
            catalyst("TOP", "Bullish", "9%", "$20B", 10),
            catalyst("TIE2", "Bullish", "9%", "$800M", 9),
        ];
        let selection = qualified(ranker().rank(&candidates));
        assert_eq!(tickers(selection.persisted()), vec!["TOP", "TIE1", "TIE2", "LOW"]);
    }

    #[test]
    fn alerts_are_capped_but_persisted_is_complete() {
        let candidates: Vec<Catalyst> = (0..5)
            .map(|i| catalyst(&format!("T{}", i), "Bullish", "15%", "$1B", 8))
            .collect();
        let selection = qualified(ranker().rank(&candidates));
        assert_eq!(selection.alerts().len(), 3);
        assert_eq!(selection.persisted().len(), 5);
        assert_eq!(tickers(selection.alerts()), vec!["T0", "T1", "T2"]);
    }

    #[test]
    fn alerts_shrink_to_accepted_count() {
        let candidates = vec![
            catalyst("ONE", "Bullish", "15%", "$1B", 8),
            catalyst("TWO", "Bullish", "15%", "$1B", 9),
        ];
        let selection = qualified(ranker().rank(&candidates));
        assert_eq!(selection.alerts().len(), 2);
        assert_eq!(selection.alerts(), selection.persisted());
    }

    #[test]
    fn empty_input_has_no_qualifying_candidates() {
        assert_eq!(ranker().rank(&[]), FilterOutcome::NoQualifyingCandidates);
    }

    #[test]
    fn price_in_upside_text_does_not_lift_a_small_move() {
        let candidates = vec![catalyst("P", "Bullish", "$20 - 5% upside", "$1B", 8)];
        assert_eq!(ranker().rank(&candidates), FilterOutcome::NoQualifyingCandidates);
    }

    #[test]
    fn thresholds_come_from_config() {
        let config = FilterConfig {
            upside_floor_pct: 20.0,
            top_n: 1,
            ..FilterConfig::default()
        };
        let candidates = vec![
            catalyst("A", "Bullish", "15%", "$1B", 9),
            catalyst("B", "Bullish", "25%", "$1B", 8),
            catalyst("C", "Bullish", "30%", "$1B", 9),
        ];
        let selection = qualified(CatalystRanker::new(config).rank(&candidates));
        assert_eq!(tickers(selection.persisted()), vec!["C", "B"]);
        assert_eq!(tickers(selection.alerts()), vec!["C"]);
    }
}
