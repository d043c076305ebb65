use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use desk_core::{Endpoints, ReconnectPolicy, DEFAULT_BACKEND_URL};
use log::LevelFilter;

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRY_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_DELAY_MS,
};
use crate::logging;

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Backend base URL; REST and stream endpoints are derived from it
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL, global = true)]
    pub backend_url: String,

    /// Delay before the first reconnect attempt
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS, global = true)]
    pub retry_delay_ms: u64,

    /// Growth factor per consecutive failed reconnect (1 keeps the delay fixed)
    #[arg(long, default_value_t = 1.0, global = true)]
    pub retry_multiplier: f64,

    /// Upper bound for the reconnect delay
    #[arg(long, default_value_t = DEFAULT_MAX_RETRY_DELAY_MS, global = true)]
    pub max_retry_delay_ms: u64,

    /// Give up after this many consecutive reconnects (unlimited when omitted)
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// HTTP request timeout
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Log level written to stderr (error, warn, info, debug, trace, off)
    #[arg(long, env = "DESK_LOG", default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub endpoints: Endpoints,
    pub reconnect: ReconnectPolicy,
    pub request_timeout: Duration,
    pub log_level: LevelFilter,
}

impl DeskConfig {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let endpoints = Endpoints::from_base(&args.backend_url)
            .with_context(|| format!("invalid --backend-url {:?}", args.backend_url))?;

        let reconnect = ReconnectPolicy::fixed(Duration::from_millis(args.retry_delay_ms))
            .with_backoff(
                args.retry_multiplier,
                Duration::from_millis(args.max_retry_delay_ms),
            )
            .with_max_attempts(args.max_retries);

        Ok(Self {
            endpoints,
            reconnect,
            request_timeout: Duration::from_secs(args.timeout_secs.max(1)),
            log_level: logging::parse_level(&args.log_level),
        })
    }

    pub fn for_backend(backend_url: &str) -> Result<Self> {
        Ok(Self {
            endpoints: Endpoints::from_base(backend_url)?,
            reconnect: ReconnectPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: LevelFilter::Warn,
        })
    }
}
