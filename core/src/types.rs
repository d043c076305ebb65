use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest tick snapshot for the watched symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub timestamp: String,
}

impl Quote {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Indicators computed upstream. Absent values stay `None` and are never
/// treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSet {
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub vwap: Option<f64>,
}

impl IndicatorSet {
    /// Label/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 11] {
        [
            ("SMA 20", self.sma_20),
            ("SMA 50", self.sma_50),
            ("EMA 12", self.ema_12),
            ("EMA 26", self.ema_26),
            ("RSI", self.rsi),
            ("MACD", self.macd),
            ("MACD Signal", self.macd_signal),
            ("BB Upper", self.bb_upper),
            ("BB Middle", self.bb_middle),
            ("BB Lower", self.bb_lower),
            ("VWAP", self.vwap),
        ]
    }
}

/// Payload of a `market_data` stream message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    #[serde(default)]
    pub symbol: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub indicators: IndicatorSet,
}

impl MarketTick {
    /// Split the tick into the quote snapshot and its indicators, filling the
    /// symbol from the subscription when the feed omits it.
    pub fn into_parts(self, fallback_symbol: &str) -> (Quote, IndicatorSet) {
        let quote = Quote {
            symbol: self
                .symbol
                .filter(|symbol| !symbol.is_empty())
                .unwrap_or_else(|| fallback_symbol.to_string()),
            price: self.price,
            volume: self.volume,
            timestamp: self.timestamp,
        };
        (quote, self.indicators)
    }
}

/// One sample of the bounded price history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: String,
    pub price: f64,
    pub volume: f64,
}

impl From<&Quote> for HistoryPoint {
    fn from(source: &Quote) -> Self {
        HistoryPoint {
            timestamp: source.timestamp.clone(),
            price: source.price,
            volume: source.volume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub const ALL: [AlertCondition; 2] = [AlertCondition::Above, AlertCondition::Below];

    pub fn as_str(self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }
}

impl std::str::FromStr for AlertCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            _ => Err(()),
        }
    }
}

/// Price alert as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub symbol: String,
    pub condition: AlertCondition,
    pub target_price: f64,
    pub current_price: f64,
    #[serde(default)]
    pub triggered: bool,
    #[serde(default)]
    pub created_at: String,
}

/// AI analysis produced by the backend service. Display only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRecord {
    pub symbol: String,
    pub timestamp: String,
    pub recommendation: String,
    pub reasoning: String,
    pub confidence: f64,
    #[serde(alias = "pattern")]
    pub pattern_detected: Option<String>,
}

impl AnalysisRecord {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Latest indicator snapshot served over REST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub timestamp: String,
    pub price: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub indicators: IndicatorSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub active_symbols: u64,
    #[serde(default)]
    pub active_connections: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

impl MeetingSummary {
    pub fn parsed_created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolsResponse {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsResponse {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCreated {
    #[serde(default)]
    pub message: String,
    pub alert_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysesResponse {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub analyses: Vec<AnalysisRecord>,
}

/// Body of `POST /api/summarize-text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeTextRequest {
    pub title: String,
    pub content: String,
}

/// Error body returned by the backend on 4xx/5xx.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Parse backend timestamps, which arrive either as RFC 3339 or as naive
/// ISO-8601 text assumed to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_tick_deserializes_with_partial_indicators() {
        let json = r#"{
            "symbol": "AAPL",
            "price": 191.23,
            "volume": 1500000,
            "timestamp": "2024-01-15T14:30:00.123456",
            "indicators": { "sma_20": 189.5, "rsi": null }
        }"#;

        let tick: MarketTick = serde_json::from_str(json).expect("valid tick");
        assert_eq!(tick.symbol.as_deref(), Some("AAPL"));
        assert_eq!(tick.indicators.sma_20, Some(189.5));
        assert_eq!(tick.indicators.rsi, None);
        assert_eq!(tick.indicators.vwap, None);
    }

    #[test]
    fn into_parts_falls_back_to_subscription_symbol() {
        let tick = MarketTick {
            symbol: None,
            price: 10.0,
            volume: 5.0,
            timestamp: String::new(),
            indicators: IndicatorSet::default(),
        };
        let (quote, _) = tick.into_parts("MSFT");
        assert_eq!(quote.symbol, "MSFT");
    }

    #[test]
    fn analysis_accepts_pattern_alias() {
        let json = r#"{"symbol":"AAPL","recommendation":"HOLD","confidence":0.7,"pattern":"double top"}"#;
        let record: AnalysisRecord = serde_json::from_str(json).expect("analysis");
        assert_eq!(record.pattern_detected.as_deref(), Some("double top"));
        assert!(record.reasoning.is_empty());
    }

    #[test]
    fn parses_naive_and_offset_timestamps() {
        assert!(parse_timestamp("2024-01-15T14:30:00.123456").is_some());
        assert!(parse_timestamp("2024-01-15T14:30:00+00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn alert_condition_serializes_lowercase() {
        let value = serde_json::to_value(AlertCondition::Above).expect("serialize");
        assert_eq!(value, serde_json::json!("above"));
        assert_eq!("BELOW".parse::<AlertCondition>(), Ok(AlertCondition::Below));
    }

    #[test]
    fn error_detail_flattens_structured_payloads() {
        let detail: ErrorDetail =
            serde_json::from_str(r#"{"detail":"Meeting title is required"}"#).expect("detail");
        assert_eq!(detail.message(), "Meeting title is required");
    }
}
