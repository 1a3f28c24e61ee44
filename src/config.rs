use anyhow::{Result, Context, anyhow};
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MODEL_ID: &str = "gemini-3-pro-preview";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 365;

/// Thresholds and weights used by the filter & rank engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Minimum market cap, in millions, for a name to count as liquid.
    pub liquidity_floor_millions: f64,
    /// Inclusive market cap band (millions) that earns the sweet-spot bonus.
    pub sweet_spot_range: (f64, f64),
    pub sweet_spot_bonus: f64,
    pub upside_floor_pct: f64,
    pub score_floor: f64,
    pub top_n: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            liquidity_floor_millions: 300.0,
            sweet_spot_range: (500.0, 10_000.0),
            sweet_spot_bonus: 0.5,
            upside_floor_pct: 8.0,
            score_floor: 7.5,
            top_n: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub model_id: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,

    // Storage
    pub report_path: PathBuf,
    pub ledger_path: PathBuf,

    /// Exchange time zone used for prompt dates and ledger timestamps.
    pub timezone: Tz,
    pub alert_delay: Duration,
    pub lookback_hours: i64,

    pub filter: FilterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            report_path: PathBuf::from("data/latest_report.json"),
            ledger_path: PathBuf::from("data/alert_ledger.csv"),
            timezone: chrono_tz::America::New_York,
            alert_delay: Duration::from_millis(1000),
            lookback_hours: 72,
            filter: FilterConfig::default(),
        }
    }
}

impl Config {
    pub fn telegram_configured(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

pub fn load_config() -> Result<Config> {
    apply_overrides(Config::default(), |key| env::var(key).ok())
}

/// Applies overrides from `lookup` on top of `config`. Blank values are ignored.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(key) = get("GEMINI_API_KEY") {
        config.gemini_api_key = Some(key);
    }

    if let Some(base) = get("GEMINI_API_BASE") {
        config.gemini_api_base = base;
    }

    if let Some(model) = get("GEMINI_MODEL") {
        config.model_id = model;
    }

    if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
        config.telegram_bot_token = Some(token);
    }

    if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
        config.telegram_chat_id = Some(chat_id);
    }

    if let Some(base) = get("TELEGRAM_API_BASE") {
        config.telegram_api_base = base;
    }

    if let Some(path) = get("SCOUT_REPORT_PATH") {
        config.report_path = PathBuf::from(path);
    }

    if let Some(path) = get("SCOUT_LEDGER_PATH") {
        config.ledger_path = PathBuf::from(path);
    }

    if let Some(tz) = get("SCOUT_TIMEZONE") {
        config.timezone = Tz::from_str(&tz)
            .map_err(|e| anyhow!("SCOUT_TIMEZONE is not a valid time zone ({}): {}", tz, e))?;
    }

    if let Some(ms) = get("SCOUT_ALERT_DELAY_MS") {
        config.alert_delay = Duration::from_millis(parse_var("SCOUT_ALERT_DELAY_MS", &ms)?);
    }

    if let Some(hours) = get("SCOUT_LOOKBACK_HOURS") {
        let lookback: i64 = parse_var("SCOUT_LOOKBACK_HOURS", &hours)?;
        if !(1..=MAX_LOOKBACK_HOURS).contains(&lookback) {
            return Err(anyhow!(
                "SCOUT_LOOKBACK_HOURS must be between 1 and {}, got {}",
                MAX_LOOKBACK_HOURS,
                lookback
            ));
        }
        config.lookback_hours = lookback;
    }

    let filter = &mut config.filter;
    if let Some(v) = get("SCOUT_LIQUIDITY_FLOOR_M") {
        filter.liquidity_floor_millions = parse_threshold("SCOUT_LIQUIDITY_FLOOR_M", &v)?;
    }
    if let Some(v) = get("SCOUT_SWEET_SPOT_MIN_M") {
        filter.sweet_spot_range.0 = parse_threshold("SCOUT_SWEET_SPOT_MIN_M", &v)?;
    }
    if let Some(v) = get("SCOUT_SWEET_SPOT_MAX_M") {
        filter.sweet_spot_range.1 = parse_threshold("SCOUT_SWEET_SPOT_MAX_M", &v)?;
    }
    if let Some(v) = get("SCOUT_SWEET_SPOT_BONUS") {
        filter.sweet_spot_bonus = parse_threshold("SCOUT_SWEET_SPOT_BONUS", &v)?;
    }
    if let Some(v) = get("SCOUT_UPSIDE_FLOOR_PCT") {
        filter.upside_floor_pct = parse_threshold("SCOUT_UPSIDE_FLOOR_PCT", &v)?;
    }
    if let Some(v) = get("SCOUT_SCORE_FLOOR") {
        filter.score_floor = parse_threshold("SCOUT_SCORE_FLOOR", &v)?;
    }
    if let Some(v) = get("SCOUT_TOP_N") {
        filter.top_n = parse_var("SCOUT_TOP_N", &v)?;
    }

    if filter.sweet_spot_range.0 > filter.sweet_spot_range.1 {
        return Err(anyhow!(
            "sweet spot range is inverted: {} > {}",
            filter.sweet_spot_range.0,
            filter.sweet_spot_range.1
        ));
    }

    Ok(config)
}

// NaN compares false against everything, which would silently disable a gate.
fn parse_threshold(key: &str, value: &str) -> Result<f64> {
    let parsed: f64 = parse_var(key, value)?;
    if !parsed.is_finite() {
        return Err(anyhow!("{} must be a finite number, got {:?}", key, value));
    }
    Ok(parsed)
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("{} has an invalid value: {:?}", key, value))
}

pub fn initialize_config() -> Result<()> {
    info!("Initializing configuration...");

    let config = load_config()?;

    info!("Model: {}", config.model_id);
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set. Scouting runs will find no catalysts.");
    }

    if config.telegram_configured() {
        info!("Telegram delivery enabled for chat {}", config.telegram_chat_id.as_deref().unwrap_or_default());
    } else {
        warn!("Telegram credentials not found. Alerts will be logged but not sent.");
    }

    info!("Exchange time zone: {}", config.timezone);
    info!("Filter thresholds: {:?}", config.filter);

    for path in [&config.report_path, &config.ledger_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
    }

    info!("Report snapshot: {}", config.report_path.display());
    info!("Alert ledger: {}", config.ledger_path.display());
    info!("Configuration initialized successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = apply_overrides(Config::default(), |_| None).unwrap();
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.timezone, chrono_tz::America::New_York);
        assert!(!config.telegram_configured());
    }

    #[test]
    fn overrides_are_read_from_lookup() {
        let lookup = lookup_from(&[
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200"),
            ("SCOUT_TIMEZONE", "Europe/London"),
            ("SCOUT_TOP_N", "5"),
            ("SCOUT_UPSIDE_FLOOR_PCT", "12.5"),
            ("SCOUT_ALERT_DELAY_MS", "0"),
        ]);
        let config = apply_overrides(Config::default(), lookup).unwrap();
        assert_eq!(config.model_id, "gemini-2.5-pro");
        assert!(config.telegram_configured());
        assert_eq!(config.timezone, chrono_tz::Europe::London);
        assert_eq!(config.filter.top_n, 5);
        assert_eq!(config.filter.upside_floor_pct, 12.5);
        assert_eq!(config.alert_delay, Duration::ZERO);
    }

    #[test]
    fn blank_values_are_ignored() {
        let lookup = lookup_from(&[("TELEGRAM_BOT_TOKEN", "  "), ("GEMINI_MODEL", "")]);
        let config = apply_overrides(Config::default(), lookup).unwrap();
        assert!(config.telegram_bot_token.is_none());
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let lookup = lookup_from(&[("SCOUT_TOP_N", "three")]);
        let err = apply_overrides(Config::default(), lookup).unwrap_err();
        assert!(err.to_string().contains("SCOUT_TOP_N"));
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        let lookup = lookup_from(&[("SCOUT_TIMEZONE", "Mars/Olympus")]);
        assert!(apply_overrides(Config::default(), lookup).is_err());
    }

    #[test]
    fn non_finite_thresholds_are_rejected() {
        for key in ["SCOUT_SCORE_FLOOR", "SCOUT_UPSIDE_FLOOR_PCT", "SCOUT_LIQUIDITY_FLOOR_M", "SCOUT_SWEET_SPOT_BONUS"] {
            for value in ["NaN", "inf", "-inf"] {
                let err = apply_overrides(Config::default(), lookup_from(&[(key, value)])).unwrap_err();
                assert!(err.to_string().contains(key), "{} = {}", key, value);
            }
        }
    }

    #[test]
    fn lookback_must_be_positive_and_bounded() {
        for value in ["0", "-24", "9223372036854775"] {
            let lookup = lookup_from(&[("SCOUT_LOOKBACK_HOURS", value)]);
            assert!(apply_overrides(Config::default(), lookup).is_err(), "{}", value);
        }
        let lookup = lookup_from(&[("SCOUT_LOOKBACK_HOURS", "48")]);
        assert_eq!(apply_overrides(Config::default(), lookup).unwrap().lookback_hours, 48);
    }

    #[test]
    fn inverted_sweet_spot_is_rejected() {
        let lookup = lookup_from(&[("SCOUT_SWEET_SPOT_MIN_M", "20000")]);
        assert!(apply_overrides(Config::default(), lookup).is_err());
    }
}
