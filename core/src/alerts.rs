use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{Alert, AlertCondition, Quote};

/// Alert form contents as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub target_price: String,
    pub condition: AlertCondition,
}

impl Default for AlertDraft {
    fn default() -> Self {
        Self {
            target_price: String::new(),
            condition: AlertCondition::Above,
        }
    }
}

impl AlertDraft {
    pub fn new(target_price: impl Into<String>, condition: AlertCondition) -> Self {
        Self {
            target_price: target_price.into(),
            condition,
        }
    }

    pub fn parse_target(&self) -> Result<f64, ValidationError> {
        let raw = self.target_price.trim();
        if raw.is_empty() {
            return Err(ValidationError::MissingPrice);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
            _ => Err(ValidationError::InvalidPrice(raw.to_string())),
        }
    }

    /// Build the record to submit. Nothing should be sent when this fails.
    pub fn build(&self, quote: Option<&Quote>) -> Result<Alert, ValidationError> {
        let target_price = self.parse_target()?;
        let quote = quote.ok_or(ValidationError::NoQuote)?;

        Ok(Alert {
            id: Uuid::new_v4().to_string(),
            symbol: quote.symbol.clone(),
            condition: self.condition,
            target_price,
            current_price: quote.price,
            triggered: false,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Distance from the current price to the target, as a signed percentage.
pub fn distance_to_target(alert: &Alert, current_price: f64) -> Option<f64> {
    if current_price <= 0.0 {
        return None;
    }
    Some((alert.target_price - current_price) / current_price * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: f64) -> Quote {
        Quote {
            symbol: "AAPL".into(),
            price,
            volume: 1_500_000.0,
            timestamp: "2024-01-15T14:30:00".into(),
        }
    }

    #[test]
    fn builds_untriggered_alert_with_price_snapshot() {
        let draft = AlertDraft::new("200", AlertCondition::Above);
        let alert = draft.build(Some(&quote(191.23))).expect("valid alert");

        assert_eq!(alert.symbol, "AAPL");
        assert_eq!(alert.condition, AlertCondition::Above);
        assert_eq!(alert.target_price, 200.0);
        assert_eq!(alert.current_price, 191.23);
        assert!(!alert.triggered);
        assert!(Uuid::parse_str(&alert.id).is_ok());
        assert!(crate::types::parse_timestamp(&alert.created_at).is_some());
    }

    #[test]
    fn rejects_blank_price_before_anything_else() {
        let draft = AlertDraft::new("   ", AlertCondition::Below);
        assert_eq!(draft.build(Some(&quote(10.0))), Err(ValidationError::MissingPrice));
        assert_eq!(draft.build(None), Err(ValidationError::MissingPrice));
    }

    #[test]
    fn rejects_missing_quote() {
        let draft = AlertDraft::new("150", AlertCondition::Below);
        assert_eq!(draft.build(None), Err(ValidationError::NoQuote));
    }

    #[test]
    fn rejects_non_positive_or_garbage_prices() {
        for raw in ["abc", "-5", "0", "NaN", "inf"] {
            let draft = AlertDraft::new(raw, AlertCondition::Above);
            assert_eq!(
                draft.build(Some(&quote(10.0))),
                Err(ValidationError::InvalidPrice(raw.to_string())),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let alert = AlertDraft::new("200", AlertCondition::Above)
            .build(Some(&quote(191.23)))
            .unwrap();
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["condition"], "above");
        assert_eq!(value["current_price"], 191.23);
        assert_eq!(value["target_price"], 200.0);
        assert_eq!(value["triggered"], false);
    }

    #[test]
    fn distance_is_signed() {
        let alert = AlertDraft::new("110", AlertCondition::Above)
            .build(Some(&quote(100.0)))
            .unwrap();
        let distance = distance_to_target(&alert, 100.0).unwrap();
        assert!((distance - 10.0).abs() < 1e-9);
        assert!(distance_to_target(&alert, 0.0).is_none());
    }
}
