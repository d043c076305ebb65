use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::{AnalysisRecord, MarketTick};

/// Inbound frame on the market stream, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Server acknowledgement sent right after the socket opens.
    Connection { message: String },
    MarketData(MarketTick),
    AiAnalysis(AnalysisRecord),
    /// Any other `type`; carried only so it can be logged.
    Unknown(String),
}

impl StreamMessage {
    pub fn decode(payload: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(value)
    }

    pub fn decode_bytes(payload: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(payload)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_string();

        match kind.as_str() {
            "connection" => Ok(StreamMessage::Connection {
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            "market_data" => Ok(StreamMessage::MarketData(serde_json::from_value(value)?)),
            "ai_analysis" => decode_analysis(value).map(StreamMessage::AiAnalysis),
            _ => Ok(StreamMessage::Unknown(kind)),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            StreamMessage::Connection { .. } => "connection",
            StreamMessage::MarketData(_) => "market_data",
            StreamMessage::AiAnalysis(_) => "ai_analysis",
            StreamMessage::Unknown(kind) => kind,
        }
    }
}

// The analysis may arrive flat or nested under `analysis`.
fn decode_analysis(mut value: Value) -> Result<AnalysisRecord, ProtocolError> {
    let outer_symbol = value
        .get("symbol")
        .and_then(Value::as_str)
        .map(str::to_string);

    let nested = value
        .get_mut("analysis")
        .filter(|inner| inner.is_object())
        .map(Value::take);

    let mut record: AnalysisRecord = match nested {
        Some(inner) => serde_json::from_value(inner)?,
        None => serde_json::from_value(value)?,
    };
    if record.symbol.is_empty() {
        if let Some(symbol) = outer_symbol {
            record.symbol = symbol;
        }
    }
    Ok(record)
}
