use std::io::BufRead;
use std::thread;

use anyhow::{Context, Result};
use clap::Args;
use desk_core::format::{format_change, format_clock, format_confidence, format_indicator, format_volume};
use desk_core::{DashboardState, StoreEffect, StreamMessage, StreamStatus};
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::config::DeskConfig;
use crate::feed::{Feed, FeedEvent};

#[derive(Debug, Args, Clone)]
pub struct WatchArgs {
    /// Symbol to stream (type another symbol on stdin to switch)
    pub symbol: String,

    /// Stop after printing this many market updates
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print indicator values under each quote
    #[arg(long)]
    pub indicators: bool,
}

pub async fn run(config: DeskConfig, args: WatchArgs) -> Result<()> {
    let api = ApiClient::new(&config)?;
    let symbol = normalize_symbol(&args.symbol);

    let mut state = DashboardState::default();
    state.select_symbol(&symbol);
    refresh_analyses(&api, &mut state).await;

    let mut feed = Feed::spawn(config.endpoints.clone(), config.reconnect.clone(), symbol.clone());
    let handle = feed.handle();
    let mut stdin = spawn_stdin_reader()?;
    let mut stdin_open = true;
    let mut printed = 0usize;

    println!("Watching {symbol}; type a symbol and press enter to switch.");

    loop {
        tokio::select! {
            event = feed.next_event() => {
                let Some(event) = event else { break };
                match event {
                    FeedEvent::Status(status) => {
                        let previous = state.status();
                        state.set_status(status);
                        print_status(status, previous, state.symbol().unwrap_or_default());
                    }
                    FeedEvent::Message(message) => {
                        let is_market = matches!(message, StreamMessage::MarketData(_));
                        let is_analysis = matches!(message, StreamMessage::AiAnalysis(_));
                        if let Some(StoreEffect::RefreshAnalyses { .. }) = state.apply(message) {
                            refresh_analyses(&api, &mut state).await;
                        }
                        if is_market {
                            print_quote(&state, args.indicators);
                            printed += 1;
                        } else if is_analysis {
                            print_analysis(&state);
                        }
                        if args.limit.is_some_and(|limit| printed >= limit) {
                            break;
                        }
                    }
                }
            }
            line = stdin.recv(), if stdin_open => {
                match line {
                    Some(line) => {
                        let next = normalize_symbol(&line);
                        if !next.is_empty() && state.select_symbol(&next) {
                            println!("Switching to {next}");
                            handle.switch(next);
                            refresh_analyses(&api, &mut state).await;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    feed.shutdown().await;
    Ok(())
}

/// Forward stdin lines from a plain thread. A blocked read there never holds
/// up runtime shutdown; the thread dies with the process.
fn spawn_stdin_reader() -> Result<mpsc::UnboundedReceiver<String>> {
    let (lines_tx, lines) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("watch-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if lines_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        log::warn!("stdin closed: {err}");
                        break;
                    }
                }
            }
        })
        .context("could not start stdin reader")?;
    Ok(lines)
}

pub(crate) fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

async fn refresh_analyses(api: &ApiClient, state: &mut DashboardState) {
    let Some(symbol) = state.symbol().map(str::to_string) else {
        return;
    };
    let ticket = state.begin_analyses_fetch();
    match api.analyses(&symbol).await {
        Ok(analyses) => {
            state.apply_analyses(ticket, &symbol, analyses);
        }
        Err(err) => eprintln!("! Failed to load analyses for {symbol}: {err}"),
    }
}

fn print_status(status: StreamStatus, previous: StreamStatus, symbol: &str) {
    if let Some(notice) = status.failure_notice(previous, symbol) {
        eprintln!("! {notice}");
        return;
    }
    match status {
        StreamStatus::Connected => println!("● Live: {symbol}"),
        StreamStatus::Connecting => println!("○ Connecting to {symbol}..."),
        _ => {}
    }
}

fn print_quote(state: &DashboardState, with_indicators: bool) {
    let Some(quote) = state.quote() else { return };
    let trend = state.trend().map(|trend| trend.arrow()).unwrap_or(" ");
    let change = state
        .history()
        .last_change()
        .map(|(delta, pct)| format_change(delta, pct))
        .unwrap_or_default();

    println!(
        "{:>10} | {:>8} | {:>10.2} {} | {:>9} | {}",
        format_clock(&quote.timestamp),
        quote.symbol,
        quote.price,
        trend,
        format_volume(quote.volume),
        change
    );

    if with_indicators {
        if let Some(indicators) = state.indicators() {
            let line = indicators
                .entries()
                .iter()
                .map(|(label, value)| format!("{label}: {}", format_indicator(*value)))
                .collect::<Vec<_>>()
                .join("  ");
            println!("           {line}");
        }
    }
}

fn print_analysis(state: &DashboardState) {
    if let Some(analysis) = state.analysis() {
        println!(
            "★ AI analysis for {}: {} ({} confidence){}",
            analysis.symbol,
            analysis.recommendation,
            format_confidence(analysis.confidence),
            analysis
                .pattern_detected
                .as_deref()
                .map(|pattern| format!(" pattern: {pattern}"))
                .unwrap_or_default()
        );
        if !analysis.reasoning.is_empty() {
            println!("  {}", analysis.reasoning);
        }
        println!("  {} analyses on record", state.analyses().len());
    }
}
