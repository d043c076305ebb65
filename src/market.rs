use anyhow::Result;
use clap::Args;
use desk_core::format::{
    format_confidence, format_date_time, format_indicator, format_price, format_volume,
};
use desk_core::{AnalysisRecord, IndicatorSnapshot, SymbolInfo};

use crate::api::ApiClient;
use crate::config::DeskConfig;
use crate::watch::normalize_symbol;

#[derive(Debug, Args, Clone)]
pub struct SymbolArgs {
    /// Ticker symbol, e.g. AAPL
    pub symbol: String,
}

pub async fn symbols(config: DeskConfig) -> Result<()> {
    let api = ApiClient::new(&config)?;
    let symbols = api.symbols().await?;
    if symbols.is_empty() {
        println!("The backend is not tracking any symbols.");
        return Ok(());
    }
    for line in symbol_lines(&symbols) {
        println!("{line}");
    }
    Ok(())
}

pub async fn indicators(config: DeskConfig, args: SymbolArgs) -> Result<()> {
    let api = ApiClient::new(&config)?;
    let symbol = normalize_symbol(&args.symbol);
    match api.indicators(&symbol).await? {
        Some(snapshot) => {
            for line in snapshot_lines(&snapshot) {
                println!("{line}");
            }
        }
        None => println!("No indicator data for {symbol} yet."),
    }
    Ok(())
}

pub async fn analysis(config: DeskConfig, args: SymbolArgs) -> Result<()> {
    let api = ApiClient::new(&config)?;
    let symbol = normalize_symbol(&args.symbol);
    let analyses = api.analyses(&symbol).await?;
    if analyses.is_empty() {
        println!("No AI analyses recorded for {symbol}.");
        return Ok(());
    }
    for record in &analyses {
        println!("{}", analysis_line(record));
        if !record.reasoning.is_empty() {
            println!("    {}", record.reasoning);
        }
    }
    Ok(())
}

pub async fn health(config: DeskConfig) -> Result<()> {
    let api = ApiClient::new(&config)?;
    let health = api.health().await?;
    println!(
        "{} at {} | symbols: {} | stream connections: {}",
        health.status,
        format_date_time(&health.timestamp),
        health.active_symbols,
        health.active_connections
    );
    Ok(())
}

fn symbol_lines(symbols: &[SymbolInfo]) -> Vec<String> {
    symbols
        .iter()
        .map(|info| {
            let price = info
                .price
                .map(format_price)
                .unwrap_or_else(|| format_indicator(None));
            format!("{:<8} {:<28} {:>12}", info.symbol, info.name, price)
        })
        .collect()
}

fn snapshot_lines(snapshot: &IndicatorSnapshot) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} vol {} @ {}",
        snapshot.symbol,
        format_price(snapshot.price),
        format_volume(snapshot.volume),
        format_date_time(&snapshot.timestamp)
    )];
    lines.extend(
        snapshot
            .indicators
            .entries()
            .iter()
            .map(|(label, value)| format!("  {label:<12} {}", format_indicator(*value))),
    );
    lines
}

fn analysis_line(record: &AnalysisRecord) -> String {
    let pattern = record
        .pattern_detected
        .as_deref()
        .map(|pattern| format!(" [{pattern}]"))
        .unwrap_or_default();
    format!(
        "{} {:<6} {:>4}{}",
        format_date_time(&record.timestamp),
        record.recommendation,
        format_confidence(record.confidence),
        pattern
    )
}
