use anyhow::Result;
use clap::Parser;
use market_desk::cli::{Cli, Command};
use market_desk::config::DeskConfig;
use market_desk::{alerts, chart, logging, market, meetings, watch};

#[tokio::main]
async fn main() -> Result<()> {
    let (global, command) = Cli::parse().into_parts();
    let config = DeskConfig::from_args(&global)?;
    logging::init(config.log_level);

    match command {
        Command::Watch(args) => watch::run(config, args).await,
        Command::Chart(args) => chart::run(config, args).await,
        Command::Symbols => market::symbols(config).await,
        Command::Indicators(args) => market::indicators(config, args).await,
        Command::Analysis(args) => market::analysis(config, args).await,
        Command::Alerts(command) => alerts::run(config, command).await,
        Command::Meetings(command) => meetings::run(config, command).await,
        Command::Summarize(command) => meetings::summarize(config, command).await,
        Command::Health => market::health(config).await,
    }
}
