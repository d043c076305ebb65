pub const DEFAULT_RETRY_DELAY_MS: u64 = 3_000;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const SUMMARIZE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LOG_LEVEL: &str = "warn";
