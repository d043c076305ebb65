use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use desk_core::{DashboardState, PriceHistoryWindow, StreamMessage};
use textplots::{Chart, Plot, Shape};
use tokio::time::{self, Instant};

use crate::config::DeskConfig;
use crate::feed::{Feed, FeedEvent};
use crate::watch::normalize_symbol;

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Symbol to sample
    pub symbol: String,

    /// Number of seconds to collect data before plotting
    #[arg(short, long, default_value_t = 30)]
    pub duration_secs: u64,

    /// Chart width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = 30)]
    pub height: u32,
}

pub async fn run(config: DeskConfig, args: ChartArgs) -> Result<()> {
    let symbol = normalize_symbol(&args.symbol);
    let duration = Duration::from_secs(args.duration_secs);
    let history = collect_history(&config, &symbol, duration).await?;

    if history.len() < 2 {
        bail!("not enough data points to render a chart for {symbol}; is the backend streaming?");
    }

    render_chart(&symbol, &history, args.width, args.height);
    Ok(())
}

async fn collect_history(
    config: &DeskConfig,
    symbol: &str,
    duration: Duration,
) -> Result<PriceHistoryWindow> {
    let mut state = DashboardState::default();
    state.select_symbol(symbol);

    let mut feed = Feed::spawn(config.endpoints.clone(), config.reconnect.clone(), symbol);
    let deadline = Instant::now() + duration;
    println!("Collecting {symbol} for {}s...", duration.as_secs());

    loop {
        match time::timeout_at(deadline, feed.next_event()).await {
            Ok(Some(FeedEvent::Message(message @ StreamMessage::MarketData(_)))) => {
                state.apply(message);
            }
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => break,
        }
    }

    feed.shutdown().await;
    Ok(state.history().clone())
}

fn render_chart(symbol: &str, history: &PriceHistoryWindow, width: u32, height: u32) {
    let samples = chart_samples(history);
    println!("Rendering chart for {symbol} ({} samples)", samples.len());
    if let Some((min, max)) = history.price_range() {
        println!("Price range: {min:.2} → {max:.2}");
    }

    let max_x = samples.last().map(|(x, _)| *x).unwrap_or(1.0).max(1.0);
    Chart::new(width.max(40), height.max(10), 0.0, max_x)
        .lineplot(&Shape::Lines(&samples))
        .display();
    println!();
}

/// Plot seconds since the first sample when timestamps parse, else sample index.
fn chart_samples(history: &PriceHistoryWindow) -> Vec<(f32, f32)> {
    let timed: Option<Vec<_>> = history
        .iter()
        .map(|point| {
            desk_core::types::parse_timestamp(&point.timestamp).map(|ts| (ts, point.price))
        })
        .collect();

    match timed {
        Some(points) if !points.is_empty() => {
            let origin = points[0].0;
            points
                .into_iter()
                .map(|(ts, price)| {
                    let elapsed = (ts - origin).num_milliseconds() as f32 / 1000.0;
                    (elapsed, price as f32)
                })
                .collect()
        }
        _ => history
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx as f32, point.price as f32))
            .collect(),
    }
}
