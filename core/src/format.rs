use crate::types::{parse_timestamp, AlertCondition};

pub const UNAVAILABLE: &str = "N/A";

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

pub fn format_indicator(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.2}"),
        _ => UNAVAILABLE.to_string(),
    }
}

/// Compact volume: `1.50M`, `820.0K`, `950`.
pub fn format_volume(volume: f64) -> String {
    let abs = volume.abs();
    if abs >= 1e9 {
        format!("{:.2}B", volume / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", volume / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        format!("{volume:.0}")
    }
}

/// Confidence arrives either as a 0–1 fraction or already as a percentage.
pub fn format_confidence(confidence: f64) -> String {
    if !confidence.is_finite() {
        return UNAVAILABLE.to_string();
    }
    let pct = if confidence <= 1.0 {
        confidence * 100.0
    } else {
        confidence
    };
    format!("{:.0}%", pct.clamp(0.0, 100.0))
}

pub fn format_change(delta: f64, pct: f64) -> String {
    let sign = if delta >= 0.0 { '+' } else { '-' };
    format!("{sign}{:.2} ({sign}{:.2}%)", delta.abs(), pct.abs())
}

/// `HH:MM:SS` in UTC, or the raw text when it does not parse.
pub fn format_clock(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn format_date_time(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn condition_label(condition: AlertCondition) -> &'static str {
    match condition {
        AlertCondition::Above => "Price above",
        AlertCondition::Below => "Price below",
    }
}

/// CSS modifier for a free-text recommendation.
pub fn recommendation_class(recommendation: &str) -> &'static str {
    let upper = recommendation.to_ascii_uppercase();
    if upper.contains("BUY") {
        "recommendation--buy"
    } else if upper.contains("SELL") {
        "recommendation--sell"
    } else {
        "recommendation--hold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicators_render_unavailable_not_zero() {
        assert_eq!(format_indicator(None), "N/A");
        assert_eq!(format_indicator(Some(f64::NAN)), "N/A");
        assert_eq!(format_indicator(Some(0.0)), "0.00");
        assert_eq!(format_indicator(Some(55.234)), "55.23");
    }

    #[test]
    fn volumes_are_compact() {
        assert_eq!(format_volume(1_500_000.0), "1.50M");
        assert_eq!(format_volume(820_000.0), "820.0K");
        assert_eq!(format_volume(950.0), "950");
        assert_eq!(format_volume(2_100_000_000.0), "2.10B");
    }

    #[test]
    fn confidence_accepts_fraction_or_percent() {
        assert_eq!(format_confidence(0.82), "82%");
        assert_eq!(format_confidence(64.0), "64%");
        assert_eq!(format_confidence(150.0), "100%");
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(format_price(191.234), "$191.23");
        assert_eq!(format_change(-1.23, -0.643), "-1.23 (-0.64%)");
        assert_eq!(condition_label(AlertCondition::Below), "Price below");
        assert_eq!(recommendation_class("Strong Buy"), "recommendation--buy");
        assert_eq!(recommendation_class("hold"), "recommendation--hold");
        assert_eq!(format_clock("2024-01-15T14:30:05.5"), "14:30:05");
        assert_eq!(format_clock("soon"), "soon");
    }
}
