use clap::{Parser, Subcommand};

use crate::alerts::AlertsCommand;
use crate::chart::ChartArgs;
use crate::config::GlobalArgs;
use crate::market::SymbolArgs;
use crate::meetings::{MeetingsCommand, SummarizeCommand};
use crate::watch::WatchArgs;

#[derive(Debug, Parser)]
#[command(author, version, about = "Terminal client for the market desk backend")]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn into_parts(self) -> (GlobalArgs, Command) {
        (self.global, self.command.unwrap_or_default())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream live quotes and AI analyses for a symbol
    Watch(WatchArgs),
    /// Collect streamed prices and render an ASCII price chart
    Chart(ChartArgs),
    /// List the symbols the backend tracks
    Symbols,
    /// Show the latest indicator snapshot for a symbol
    Indicators(SymbolArgs),
    /// Show stored AI analyses for a symbol
    Analysis(SymbolArgs),
    /// List or create price alerts
    #[command(subcommand)]
    Alerts(AlertsCommand),
    /// Browse stored meeting summaries
    #[command(subcommand)]
    Meetings(MeetingsCommand),
    /// Summarize a meeting transcript
    #[command(subcommand)]
    Summarize(SummarizeCommand),
    /// Check backend health
    Health,
}

impl Default for Command {
    fn default() -> Self {
        Command::Health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_subcommand_checks_health() {
        let (_, command) = Cli::parse_from(["market-desk"]).into_parts();
        assert!(matches!(command, Command::Health));
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let (global, command) =
            Cli::parse_from(["market-desk", "watch", "aapl", "--max-retries", "2"]).into_parts();
        assert_eq!(global.max_retries, Some(2));
        match command {
            Command::Watch(args) => assert_eq!(args.symbol, "aapl"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn alert_create_parses_condition() {
        let (_, command) = Cli::parse_from([
            "market-desk",
            "alerts",
            "create",
            "TSLA",
            "250",
            "--condition",
            "below",
        ])
        .into_parts();
        match command {
            Command::Alerts(AlertsCommand::Create(args)) => {
                assert_eq!(args.symbol, "TSLA");
                assert_eq!(args.target_price, "250");
                assert_eq!(args.condition, desk_core::AlertCondition::Below);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
