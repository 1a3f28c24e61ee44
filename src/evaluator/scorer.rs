use std::fmt;

use crate::catalyst::Catalyst;
use crate::config::FilterConfig;
use super::normalizers::{normalize_market_cap, normalize_upside};

/// Why a candidate failed the acceptance predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotBullish,
    UpsideBelowFloor,
    Illiquid,
    ScoreBelowFloor,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::NotBullish => "sentiment is not bullish",
            Rejection::UpsideBelowFloor => "expected upside below floor",
            Rejection::Illiquid => "market cap below liquidity floor",
            Rejection::ScoreBelowFloor => "adjusted conviction below floor",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalystScore {
    pub upside_pct: f64,
    pub market_cap_millions: f64,
    pub is_liquid: bool,
    pub is_sweet_spot: bool,
    /// Model score plus any sweet-spot bonus, unclamped.
    pub final_score: f64,
    /// `min(10, floor(final_score))`, the value written back on acceptance.
    pub stored_score: u8,
    pub rejections: Vec<Rejection>,
}

impl CatalystScore {
    pub fn is_accepted(&self) -> bool {
        self.rejections.is_empty()
    }
}

pub struct CatalystScorer {
    config: FilterConfig,
}

impl CatalystScorer {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn calculate_score(&self, catalyst: &Catalyst) -> CatalystScore {
        let upside_pct = normalize_upside(&catalyst.expected_upside);
        let market_cap_millions = normalize_market_cap(&catalyst.market_cap);

        let is_liquid = market_cap_millions >= self.config.liquidity_floor_millions;
        let (sweet_min, sweet_max) = self.config.sweet_spot_range;
        let is_sweet_spot = (sweet_min..=sweet_max).contains(&market_cap_millions);

        let mut final_score = f64::from(catalyst.conviction_score);
        if is_sweet_spot {
            final_score += self.config.sweet_spot_bonus;
        }
        let stored_score = final_score.floor().clamp(0.0, 10.0) as u8;

        let mut rejections = Vec::new();
        if !catalyst.is_bullish() {
            rejections.push(Rejection::NotBullish);
        }
        if upside_pct < self.config.upside_floor_pct {
            rejections.push(Rejection::UpsideBelowFloor);
        }
        if !is_liquid {
            rejections.push(Rejection::Illiquid);
        }
        if final_score < self.config.score_floor {
            rejections.push(Rejection::ScoreBelowFloor);
        }

        CatalystScore {
            upside_pct,
            market_cap_millions,
            is_liquid,
            is_sweet_spot,
            final_score,
            stored_score,
            rejections,
        }
    }
}
