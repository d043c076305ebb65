//! Connection lifecycle for the per-symbol market stream.
//!
//! [`StreamSupervisor`] owns no sockets or timers. Platform drivers feed it
//! events (socket opened, socket closed, retry timer fired, user actions) and
//! execute the [`StreamCommand`]s it returns. Every socket and timer carries a
//! fresh id, so events from a superseded socket are recognised and dropped.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RetryId(u64);

impl fmt::Display for RetryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "retry#{}", self.0)
    }
}

/// How long to wait before reconnecting, and how many times.
///
/// The default reconnects every 3 seconds forever.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    /// Growth factor applied per consecutive failure; values below 1 are treated as 1.
    pub multiplier: f64,
    pub max_delay: Duration,
    /// `None` retries indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            multiplier: 1.0,
            max_delay: DEFAULT_MAX_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_delay: delay.max(DEFAULT_MAX_RETRY_DELAY),
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.multiplier = multiplier;
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `attempt` (1-based), or `None` once the cap is hit.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return Some(Duration::ZERO);
        }
        if let Some(max) = self.max_attempts {
            if attempt > max {
                return None;
            }
        }

        let factor = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        };
        if attempt == 1 || factor == 1.0 {
            return Some(self.delay);
        }

        let ceiling = self.max_delay.max(self.delay);
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = self.delay.as_secs_f64() * factor.powi(exponent);
        if !scaled.is_finite() || scaled >= ceiling.as_secs_f64() {
            return Some(ceiling);
        }
        Some(Duration::from_secs_f64(scaled))
    }
}

/// Internal lifecycle of the supervised connection.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamState {
    Idle,
    Connecting {
        symbol: String,
        connection: ConnectionId,
        /// 0 for the first attempt after a user action.
        attempt: u32,
    },
    Open {
        symbol: String,
        connection: ConnectionId,
    },
    /// Socket closed; a single retry timer is pending.
    Waiting {
        symbol: String,
        retry: RetryId,
        attempt: u32,
        delay: Duration,
    },
    /// Retry cap reached; only an explicit reconnect or symbol change resumes.
    Exhausted { symbol: String, attempts: u32 },
    /// Torn down. Terminal.
    Stopped,
}

/// Connection indicator surfaced to the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Idle,
    Connecting,
    Connected,
    Reconnecting { attempt: u32, delay_ms: u64 },
    Failed,
}

impl StreamStatus {
    /// User-facing message for a transition into a failure state.
    pub fn failure_notice(self, previous: StreamStatus, symbol: &str) -> Option<String> {
        if self == previous {
            return None;
        }
        match self {
            StreamStatus::Reconnecting { attempt, delay_ms } => Some(format!(
                "Connection lost for {symbol}; reconnect #{attempt} in {:.1}s",
                delay_ms as f64 / 1000.0
            )),
            StreamStatus::Failed => Some(format!("Gave up reconnecting to {symbol}")),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StreamStatus::Idle => "Idle",
            StreamStatus::Connecting => "Connecting",
            StreamStatus::Connected => "Live",
            StreamStatus::Reconnecting { .. } => "Reconnecting",
            StreamStatus::Failed => "Disconnected",
        }
    }
}

/// Side effects the driver must perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamCommand {
    Open {
        connection: ConnectionId,
        symbol: String,
    },
    Close {
        connection: ConnectionId,
    },
    ScheduleRetry {
        retry: RetryId,
        delay: Duration,
    },
    CancelRetry {
        retry: RetryId,
    },
}

#[derive(Debug, Clone)]
pub struct StreamSupervisor {
    policy: ReconnectPolicy,
    state: StreamState,
    next_id: u64,
}

impl Default for StreamSupervisor {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

impl StreamSupervisor {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: StreamState::Idle,
            next_id: 0,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn status(&self) -> StreamStatus {
        match &self.state {
            StreamState::Idle | StreamState::Stopped => StreamStatus::Idle,
            StreamState::Connecting { .. } => StreamStatus::Connecting,
            StreamState::Open { .. } => StreamStatus::Connected,
            StreamState::Waiting { attempt, delay, .. } => StreamStatus::Reconnecting {
                attempt: *attempt,
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            },
            StreamState::Exhausted { .. } => StreamStatus::Failed,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match &self.state {
            StreamState::Connecting { symbol, .. }
            | StreamState::Open { symbol, .. }
            | StreamState::Waiting { symbol, .. }
            | StreamState::Exhausted { symbol, .. } => Some(symbol),
            StreamState::Idle | StreamState::Stopped => None,
        }
    }

    /// The socket whose frames should currently be delivered, if any.
    pub fn active_connection(&self) -> Option<ConnectionId> {
        match &self.state {
            StreamState::Connecting { connection, .. } | StreamState::Open { connection, .. } => {
                Some(*connection)
            }
            _ => None,
        }
    }

    pub fn is_current(&self, connection: ConnectionId) -> bool {
        self.active_connection() == Some(connection)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, StreamState::Stopped)
    }

    /// Watch `symbol`, replacing whatever connection or retry is in flight.
    pub fn connect(&mut self, symbol: impl Into<String>) -> Vec<StreamCommand> {
        if self.is_stopped() {
            log::debug!("stream supervisor stopped; ignoring connect");
            return Vec::new();
        }
        let symbol = symbol.into();
        let mut commands = self.teardown();
        commands.push(self.open(symbol, 0));
        commands
    }

    /// Reopen the current symbol immediately, resetting the retry count.
    pub fn reconnect(&mut self) -> Vec<StreamCommand> {
        match self.symbol().map(str::to_string) {
            Some(symbol) => self.connect(symbol),
            None => Vec::new(),
        }
    }

    pub fn opened(&mut self, connection: ConnectionId) -> Vec<StreamCommand> {
        match &self.state {
            StreamState::Connecting {
                symbol,
                connection: current,
                ..
            } if *current == connection => {
                log::info!("stream {connection} open for {symbol}");
                self.state = StreamState::Open {
                    symbol: symbol.clone(),
                    connection,
                };
            }
            _ => log::debug!("ignoring open for superseded {connection}"),
        }
        Vec::new()
    }

    /// Socket ended, by error or normal termination. Schedules one retry.
    pub fn closed(&mut self, connection: ConnectionId) -> Vec<StreamCommand> {
        let (symbol, failed_attempt) = match &self.state {
            StreamState::Connecting {
                symbol,
                connection: current,
                attempt,
            } if *current == connection => (symbol.clone(), *attempt),
            StreamState::Open {
                symbol,
                connection: current,
            } if *current == connection => (symbol.clone(), 0),
            _ => {
                log::debug!("ignoring close for superseded {connection}");
                return Vec::new();
            }
        };

        let attempt = failed_attempt.saturating_add(1);
        match self.policy.delay_for(attempt) {
            Some(delay) => {
                let retry = RetryId(self.fresh_id());
                log::warn!(
                    "stream {connection} for {symbol} closed; retry {attempt} in {}ms",
                    delay.as_millis()
                );
                self.state = StreamState::Waiting {
                    symbol,
                    retry,
                    attempt,
                    delay,
                };
                vec![StreamCommand::ScheduleRetry { retry, delay }]
            }
            None => {
                log::error!("stream for {symbol} gave up after {failed_attempt} retries");
                self.state = StreamState::Exhausted {
                    symbol,
                    attempts: failed_attempt,
                };
                Vec::new()
            }
        }
    }

    pub fn retry_elapsed(&mut self, retry: RetryId) -> Vec<StreamCommand> {
        match &self.state {
            StreamState::Waiting {
                symbol,
                retry: pending,
                attempt,
                ..
            } if *pending == retry => {
                let symbol = symbol.clone();
                let attempt = *attempt;
                vec![self.open(symbol, attempt)]
            }
            _ => {
                log::debug!("ignoring stale {retry}");
                Vec::new()
            }
        }
    }

    /// Component teardown: close the socket, cancel any retry, stop for good.
    pub fn shutdown(&mut self) -> Vec<StreamCommand> {
        let commands = self.teardown();
        self.state = StreamState::Stopped;
        commands
    }

    fn open(&mut self, symbol: String, attempt: u32) -> StreamCommand {
        let connection = ConnectionId(self.fresh_id());
        self.state = StreamState::Connecting {
            symbol: symbol.clone(),
            connection,
            attempt,
        };
        StreamCommand::Open { connection, symbol }
    }

    fn teardown(&mut self) -> Vec<StreamCommand> {
        let command = match &self.state {
            StreamState::Connecting { connection, .. } | StreamState::Open { connection, .. } => {
                Some(StreamCommand::Close {
                    connection: *connection,
                })
            }
            StreamState::Waiting { retry, .. } => Some(StreamCommand::CancelRetry { retry: *retry }),
            StreamState::Idle | StreamState::Exhausted { .. } | StreamState::Stopped => None,
        };
        if !self.is_stopped() {
            self.state = StreamState::Idle;
        }
        command.into_iter().collect()
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_id(commands: &[StreamCommand]) -> ConnectionId {
        commands
            .iter()
            .find_map(|command| match command {
                StreamCommand::Open { connection, .. } => Some(*connection),
                _ => None,
            })
            .expect("open command")
    }

    fn retry_id(commands: &[StreamCommand]) -> RetryId {
        match commands {
            [StreamCommand::ScheduleRetry { retry, .. }] => *retry,
            other => panic!("expected a single retry, got {other:?}"),
        }
    }

    #[test]
    fn dropped_connection_raises_a_notice_once() {
        let mut supervisor = StreamSupervisor::default();
        let connection = open_id(&supervisor.connect("AAPL"));
        supervisor.opened(connection);
        let live = supervisor.status();
        supervisor.closed(connection);
        let lost = supervisor.status();

        assert_eq!(
            lost.failure_notice(live, "AAPL").as_deref(),
            Some("Connection lost for AAPL; reconnect #1 in 3.0s")
        );
        assert_eq!(lost.failure_notice(lost, "AAPL"), None);
        assert_eq!(live.failure_notice(lost, "AAPL"), None);
        assert_eq!(
            StreamStatus::Failed
                .failure_notice(lost, "AAPL")
                .as_deref(),
            Some("Gave up reconnecting to AAPL")
        );
    }

    #[test]
    fn first_connect_opens_one_socket() {
        let mut supervisor = StreamSupervisor::default();
        let commands = supervisor.connect("AAPL");

        assert_eq!(commands.len(), 1);
        assert!(matches!(&commands[0], StreamCommand::Open { symbol, .. } if symbol == "AAPL"));
        assert_eq!(supervisor.status(), StreamStatus::Connecting);
    }

    #[test]
    fn switching_symbol_closes_before_opening() {
        let mut supervisor = StreamSupervisor::default();
        let first = open_id(&supervisor.connect("AAPL"));
        supervisor.opened(first);
        assert_eq!(supervisor.status(), StreamStatus::Connected);

        let commands = supervisor.connect("MSFT");
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], StreamCommand::Close { connection: first });
        let second = open_id(&commands);
        assert_ne!(first, second);
        assert_eq!(supervisor.symbol(), Some("MSFT"));
        assert!(supervisor.is_current(second));
        assert!(!supervisor.is_current(first));
    }

    #[test]
    fn close_schedules_exactly_one_retry_with_same_symbol() {
        let mut supervisor = StreamSupervisor::default();
        let conn = open_id(&supervisor.connect("AAPL"));
        supervisor.opened(conn);

        let commands = supervisor.closed(conn);
        assert_eq!(
            commands,
            vec![StreamCommand::ScheduleRetry {
                retry: retry_id(&commands),
                delay: Duration::from_secs(3),
            }]
        );
        assert_eq!(
            supervisor.status(),
            StreamStatus::Reconnecting {
                attempt: 1,
                delay_ms: 3_000
            }
        );

        // A duplicate close for the same socket must not stack a second timer.
        assert!(supervisor.closed(conn).is_empty());

        let reopened = supervisor.retry_elapsed(retry_id(&commands));
        assert!(matches!(&reopened[..], [StreamCommand::Open { symbol, .. }] if symbol == "AAPL"));
    }

    #[test]
    fn symbol_change_cancels_pending_retry() {
        let mut supervisor = StreamSupervisor::default();
        let conn = open_id(&supervisor.connect("AAPL"));
        let retry = retry_id(&supervisor.closed(conn));

        let commands = supervisor.connect("TSLA");
        assert_eq!(commands[0], StreamCommand::CancelRetry { retry });
        assert_eq!(commands.len(), 2);

        // The cancelled timer firing late is ignored.
        assert!(supervisor.retry_elapsed(retry).is_empty());
        assert_eq!(supervisor.symbol(), Some("TSLA"));
    }

    #[test]
    fn shutdown_cancels_retry_and_stops() {
        let mut supervisor = StreamSupervisor::default();
        let conn = open_id(&supervisor.connect("AAPL"));
        let retry = retry_id(&supervisor.closed(conn));

        assert_eq!(supervisor.shutdown(), vec![StreamCommand::CancelRetry { retry }]);
        assert!(supervisor.is_stopped());
        assert!(supervisor.retry_elapsed(retry).is_empty());
        assert!(supervisor.connect("AAPL").is_empty());
    }

    #[test]
    fn shutdown_closes_open_socket() {
        let mut supervisor = StreamSupervisor::default();
        let conn = open_id(&supervisor.connect("AAPL"));
        supervisor.opened(conn);
        assert_eq!(
            supervisor.shutdown(),
            vec![StreamCommand::Close { connection: conn }]
        );
    }

    #[test]
    fn late_close_from_replaced_socket_is_ignored() {
        let mut supervisor = StreamSupervisor::default();
        let old = open_id(&supervisor.connect("AAPL"));
        supervisor.opened(old);
        let new = open_id(&supervisor.connect("MSFT"));

        assert!(supervisor.closed(old).is_empty());
        assert!(supervisor.opened(old).is_empty());
        assert!(supervisor.is_current(new));
        assert_eq!(supervisor.status(), StreamStatus::Connecting);
    }

    #[test]
    fn attempts_reset_after_successful_open() {
        let mut supervisor = StreamSupervisor::new(
            ReconnectPolicy::fixed(Duration::from_millis(10))
                .with_backoff(2.0, Duration::from_secs(1)),
        );
        let conn = open_id(&supervisor.connect("AAPL"));
        let retry = retry_id(&supervisor.closed(conn));
        let conn = open_id(&supervisor.retry_elapsed(retry));
        let commands = supervisor.closed(conn);
        assert!(matches!(
            &commands[..],
            [StreamCommand::ScheduleRetry { delay, .. }] if *delay == Duration::from_millis(20)
        ));

        let conn = open_id(&supervisor.retry_elapsed(retry_id(&commands)));
        supervisor.opened(conn);
        let commands = supervisor.closed(conn);
        assert!(matches!(
            &commands[..],
            [StreamCommand::ScheduleRetry { delay, .. }] if *delay == Duration::from_millis(10)
        ));
    }

    #[test]
    fn retry_cap_moves_to_failed_until_reconnect() {
        let mut supervisor = StreamSupervisor::new(
            ReconnectPolicy::fixed(Duration::from_millis(5)).with_max_attempts(Some(1)),
        );
        let conn = open_id(&supervisor.connect("AAPL"));
        let retry = retry_id(&supervisor.closed(conn));
        let conn = open_id(&supervisor.retry_elapsed(retry));

        assert!(supervisor.closed(conn).is_empty());
        assert_eq!(supervisor.status(), StreamStatus::Failed);

        let commands = supervisor.reconnect();
        assert!(matches!(&commands[..], [StreamCommand::Open { symbol, .. }] if symbol == "AAPL"));
    }

    #[test]
    fn policy_delays_grow_and_saturate() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1))
            .with_backoff(2.0, Duration::from_secs(5));
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_for(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_secs(5)));

        let default = ReconnectPolicy::default();
        assert_eq!(default.delay_for(10_000), Some(Duration::from_secs(3)));
    }
}
