//! JSON-lines logger behind the `log` facade.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;

static SILENT: AtomicBool = AtomicBool::new(false);
static LOGGER: JsonLogger = JsonLogger;

#[derive(Serialize)]
struct LogEvent<'a> {
    level: &'a str,
    event: &'a str,
    message: String,
    timestamp_ms: u128,
}

struct JsonLogger;

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && !SILENT.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = record.level();
        let entry = LogEvent {
            level: level_name(level),
            event: record.target(),
            message: record.args().to_string(),
            timestamp_ms: current_timestamp_ms(),
        };
        emit(level, &entry);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

// Logs go to stderr so command output on stdout stays clean.
fn emit(level: Level, entry: &LogEvent<'_>) {
    match serde_json::to_string(entry) {
        Ok(payload) => eprintln!("{payload}"),
        Err(err) => eprintln!(
            "{{\"level\":\"error\",\"event\":\"logging_failure\",\"message\":\"failed to serialise {} log\",\"error\":\"{err}\"}}",
            level_name(level)
        ),
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warn",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

fn current_timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Parse a level name; unknown names fall back to `info`.
pub fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Install the logger once; later calls only adjust the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Suppress all output, e.g. inside benchmarks.
pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}
