use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use desk_core::format::format_date_time;
use desk_core::{MeetingSummary, TextSubmission};
use tokio::io::AsyncReadExt;

use crate::api::ApiClient;
use crate::config::DeskConfig;

#[derive(Debug, Subcommand)]
pub enum MeetingsCommand {
    /// List stored summaries, newest as returned by the backend
    List,
    /// Print one stored summary
    Show {
        /// Meeting id
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SummarizeCommand {
    /// Summarize a pasted transcript
    Text(TextArgs),
    /// Upload a .txt or .docx transcript
    File(FileArgs),
}

#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    /// Meeting title
    #[arg(long)]
    pub title: String,

    /// Transcript text (read from stdin when neither this nor --content-file is given)
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the transcript from a local file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FileArgs {
    /// Meeting title
    #[arg(long)]
    pub title: String,

    /// Transcript file (.txt or .docx)
    pub path: PathBuf,
}

pub async fn run(config: DeskConfig, command: MeetingsCommand) -> Result<()> {
    let api = ApiClient::new(&config)?;
    match command {
        MeetingsCommand::List => {
            let meetings = api.meetings().await?;
            if meetings.is_empty() {
                println!("No meetings summarized yet.");
            }
            for meeting in &meetings {
                println!("{}", meeting_row(meeting));
            }
        }
        MeetingsCommand::Show { id } => {
            let meeting = api.meeting(&id).await?;
            print!("{}", render_summary(&meeting));
        }
    }
    Ok(())
}

pub async fn summarize(config: DeskConfig, command: SummarizeCommand) -> Result<()> {
    let api = ApiClient::new(&config)?;
    let summary = match command {
        SummarizeCommand::Text(args) => {
            let content = read_content(&args).await?;
            let submission = TextSubmission::new(args.title, content);
            eprintln!("Summarizing...");
            api.summarize_text(&submission).await?
        }
        SummarizeCommand::File(args) => {
            eprintln!("Uploading {}...", args.path.display());
            api.summarize_file(&args.title, &args.path).await?
        }
    };
    print!("{}", render_summary(&summary));
    Ok(())
}

async fn read_content(args: &TextArgs) -> Result<String> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    if let Some(path) = &args.content_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read {}", path.display()));
    }
    let mut content = String::new();
    tokio::io::stdin()
        .read_to_string(&mut content)
        .await
        .context("could not read transcript from stdin")?;
    Ok(content)
}

fn meeting_row(meeting: &MeetingSummary) -> String {
    format!(
        "{:<38} {:<16} {}",
        meeting.id,
        format_date_time(&meeting.created_at),
        meeting.title
    )
}

fn render_summary(meeting: &MeetingSummary) -> String {
    let mut out = format!(
        "{}\n{} · {}\n\n{}\n",
        meeting.title,
        meeting.id,
        format_date_time(&meeting.created_at),
        meeting.summary
    );
    for (heading, items) in [
        ("Key points", &meeting.key_points),
        ("Action items", &meeting.action_items),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{heading}:\n"));
        for item in items {
            out.push_str(&format!("  - {item}\n"));
        }
    }
    out
}
