use regex::Regex;

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', ','];

/// Converts a free-text market cap ("$450M", "2.1b", "$1.2 Trillion") to millions.
///
/// Anything that cannot be read as a number followed by a T/B/M unit yields 0.0,
/// which sits below every liquidity threshold.
pub fn normalize_market_cap(text: &str) -> f64 {
    parse_market_cap(text).unwrap_or(0.0)
}

fn parse_market_cap(text: &str) -> Option<f64> {
    // Drop currency symbols and thousands separators, then case-fold the unit
    let cleaned: String = text
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c))
        .collect::<String>()
        .to_uppercase();

    // The unit letter has to follow the number ("2.1 B", "450M")
    let caps = Regex::new(r"(\d+(?:\.\d+)?)\s*([TBM])")
        .ok()?
        .captures(&cleaned)?;

    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2)?.as_str() {
        "T" => 1_000_000.0,
        "B" => 1_000.0,
        "M" => 1.0,
        _ => return None,
    };

    let millions = value * multiplier;
    millions.is_finite().then_some(millions)
}

/// Collapses every percentage in `text` to their arithmetic mean.
///
/// A range whose upper bound carries the sign ("10-20%", "10 to 20%") counts both
/// bounds, provided the dash touches both numbers and the lower bound is not a
/// price ("$20-25%"). Bare numbers without a "%" are ignored. No percentages yields 0.0.
pub fn normalize_upside(text: &str) -> f64 {
    let values = extract_percentages(text);
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn extract_percentages(text: &str) -> Vec<f64> {
    let cleaned = text.replace(',', "");
    // 1: currency prefix, 2: lower bound or single value, 3: upper bound of a range
    let re = match Regex::new(r"(?i)([$€£¥])?(\d+(?:\.\d+)?)(?:%?(?:-|–|—|\s+to\s+)(\d+(?:\.\d+)?))?\s*%") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    re.captures_iter(&cleaned)
        .flat_map(|caps| {
            let is_price = caps.get(1).is_some();
            let bounds = match caps.get(3) {
                // A price is never a lower bound, only the percentage counts
                Some(upper) if is_price => vec![upper],
                Some(upper) => caps.get(2).into_iter().chain(Some(upper)).collect(),
                None => caps.get(2).into_iter().collect(),
            };
            bounds
                .into_iter()
                .filter_map(|m| m.as_str().parse::<f64>().ok())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_cap_units() {
        assert_eq!(normalize_market_cap("$450M"), 450.0);
        assert_eq!(normalize_market_cap("$2.1B"), 2100.0);
        assert_eq!(normalize_market_cap("$1.2T"), 1_200_000.0);
        assert_eq!(normalize_market_cap("$1,250M"), 1250.0);
        assert_eq!(normalize_market_cap("€3.4 billion"), 3400.0);
    }

    #[test]
    fn market_cap_is_case_insensitive() {
        assert_eq!(normalize_market_cap("2b"), normalize_market_cap("2B"));
        assert_eq!(normalize_market_cap("750m"), 750.0);
    }

    #[test]
    fn market_cap_fails_soft() {
        assert_eq!(normalize_market_cap("garbage"), 0.0);
        assert_eq!(normalize_market_cap(""), 0.0);
        assert_eq!(normalize_market_cap("B"), 0.0);
        assert_eq!(normalize_market_cap("450"), 0.0);
    }

    #[test]
    fn upside_ranges_collapse_to_midpoint() {
        assert_eq!(normalize_upside("10-20%"), 15.0);
        assert_eq!(normalize_upside("10% - 20%"), 15.0);
        assert_eq!(normalize_upside("up 5% to 10%"), 7.5);
    }

    #[test]
    fn upside_single_and_missing() {
        assert_eq!(normalize_upside("8%"), 8.0);
        assert_eq!(normalize_upside("+12.5% near term"), 12.5);
        assert_eq!(normalize_upside("flat"), 0.0);
        assert_eq!(normalize_upside(""), 0.0);
    }

    #[test]
    fn upside_ignores_numbers_without_percent() {
        assert_eq!(normalize_upside("PT $45 implies 30%"), 30.0);
        assert_eq!(normalize_upside("about 20"), 0.0);
    }

    #[test]
    fn upside_ignores_prices_next_to_a_percentage() {
        assert_eq!(normalize_upside("$20 - 5% upside"), 5.0);
        assert_eq!(normalize_upside("PT $45 - 30%"), 30.0);
        assert_eq!(normalize_upside("$20-25%"), 25.0);
        assert_eq!(normalize_upside("10–20%"), 15.0);
        assert_eq!(normalize_upside("10 to 20%"), 15.0);
    }

    #[test]
    fn upside_averages_unrelated_percentages() {
        assert_eq!(normalize_upside("analysts see 10%, bulls 30%"), 20.0);
    }

    #[test]
    fn normalizers_are_pure() {
        for text in ["$2.1B", "garbage", "10-20%", "up 5% to 10%"] {
            assert_eq!(normalize_market_cap(text), normalize_market_cap(text));
            assert_eq!(normalize_upside(text), normalize_upside(text));
        }
    }
}
