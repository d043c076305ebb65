use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use desk_core::alerts::distance_to_target;
use desk_core::format::{condition_label, format_date_time, format_price};
use desk_core::{Alert, AlertCondition, AlertDraft, Quote};

use crate::api::ApiClient;
use crate::config::DeskConfig;
use crate::watch::normalize_symbol;

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List every stored alert
    List,
    /// Create an alert against the latest known price of a symbol
    Create(CreateAlertArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CreateAlertArgs {
    /// Symbol to watch
    pub symbol: String,

    /// Target price that fires the alert
    pub target_price: String,

    /// Fire when the price moves above or below the target
    #[arg(long, default_value = "above", value_parser = parse_condition)]
    pub condition: AlertCondition,
}

fn parse_condition(raw: &str) -> Result<AlertCondition, String> {
    raw.parse()
        .map_err(|_| format!("expected one of: above, below (got {raw:?})"))
}

pub async fn run(config: DeskConfig, command: AlertsCommand) -> Result<()> {
    let api = ApiClient::new(&config)?;
    match command {
        AlertsCommand::List => {
            let alerts = api.alerts().await?;
            print_alerts(&alerts, &latest_prices(&api).await);
        }
        AlertsCommand::Create(args) => create(&api, args).await?,
    }
    Ok(())
}

async fn create(api: &ApiClient, args: CreateAlertArgs) -> Result<()> {
    let draft = AlertDraft::new(args.target_price, args.condition);
    draft.parse_target()?;

    let symbol = normalize_symbol(&args.symbol);
    let quote = latest_quote(api, &symbol).await?;
    let alert = draft.build(quote.as_ref())?;

    let created = api
        .create_alert(&alert)
        .await
        .with_context(|| format!("could not create alert for {symbol}"))?;
    println!(
        "✓ {} (id {}): {} {} {}",
        if created.message.is_empty() {
            "Alert created"
        } else {
            created.message.as_str()
        },
        created.alert_id,
        alert.symbol,
        condition_label(alert.condition).to_lowercase(),
        format_price(alert.target_price)
    );

    let alerts = api.alerts().await?;
    print_alerts(&alerts, &latest_prices(api).await);
    Ok(())
}

/// Latest price for `symbol`: the indicator snapshot first, then the symbol list.
async fn latest_quote(api: &ApiClient, symbol: &str) -> Result<Option<Quote>> {
    if let Some(snapshot) = api.indicators(symbol).await? {
        return Ok(Some(Quote {
            symbol: snapshot.symbol,
            price: snapshot.price,
            volume: snapshot.volume,
            timestamp: snapshot.timestamp,
        }));
    }

    let symbols = api.symbols().await?;
    Ok(symbols
        .into_iter()
        .find(|info| info.symbol.eq_ignore_ascii_case(symbol))
        .and_then(|info| {
            info.price.map(|price| Quote {
                symbol: info.symbol,
                price,
                volume: 0.0,
                timestamp: String::new(),
            })
        }))
}

/// Latest listed price per symbol; empty when the symbol list is unavailable.
async fn latest_prices(api: &ApiClient) -> HashMap<String, f64> {
    match api.symbols().await {
        Ok(symbols) => symbols
            .into_iter()
            .filter_map(|info| info.price.map(|price| (info.symbol, price)))
            .collect(),
        Err(err) => {
            log::warn!("could not load latest prices: {err}");
            HashMap::new()
        }
    }
}

fn print_alerts(alerts: &[Alert], latest: &HashMap<String, f64>) {
    if alerts.is_empty() {
        println!("No alerts set.");
        return;
    }
    for alert in alerts {
        println!("{}", alert_line(alert, latest.get(&alert.symbol).copied()));
    }
}

/// Distance is measured from `latest` when known, else from the price at creation.
fn alert_line(alert: &Alert, latest: Option<f64>) -> String {
    let state = if alert.triggered { "TRIGGERED" } else { "waiting" };
    let (reference, basis) = match latest {
        Some(price) => (price, "now"),
        None => (alert.current_price, "at creation"),
    };
    let distance = distance_to_target(alert, reference)
        .map(|pct| format!("{pct:+.2}% {basis}"))
        .unwrap_or_default();
    format!(
        "{:<8} {:<12} {:>10} {:>18}  {:<9} {}",
        alert.symbol,
        condition_label(alert.condition),
        format_price(alert.target_price),
        distance,
        state,
        format_date_time(&alert.created_at)
    )
}
