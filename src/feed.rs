//! Tokio driver for the market stream.
//!
//! One task owns the [`StreamSupervisor`] and executes its commands: each
//! socket runs in its own task tagged with a [`ConnectionId`], and the single
//! retry timer lives in the driver loop. Callers steer it through a
//! [`FeedHandle`] and read decoded frames and status changes from [`Feed`].

use std::collections::HashMap;
use std::future::pending;
use std::pin::Pin;

use desk_core::{
    ConnectionId, Endpoints, ProtocolError, ReconnectPolicy, RetryId, StreamCommand, StreamMessage,
    StreamStatus, StreamSupervisor,
};
use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Status(StreamStatus),
    Message(StreamMessage),
}

#[derive(Debug, Clone)]
enum FeedControl {
    Switch(String),
    Reconnect,
    Shutdown,
}

#[derive(Debug)]
enum SocketEvent {
    Opened(ConnectionId),
    Frame(ConnectionId, Frame),
    Closed(ConnectionId),
}

#[derive(Debug)]
enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    fn decode(&self) -> Result<StreamMessage, ProtocolError> {
        match self {
            Frame::Text(text) => StreamMessage::decode(text),
            Frame::Binary(bytes) => StreamMessage::decode_bytes(bytes),
        }
    }
}

/// Cloneable control side of a running feed.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    control: mpsc::UnboundedSender<FeedControl>,
}

impl FeedHandle {
    /// Close the current socket and watch `symbol` instead.
    pub fn switch(&self, symbol: impl Into<String>) -> bool {
        self.control.send(FeedControl::Switch(symbol.into())).is_ok()
    }

    pub fn reconnect(&self) -> bool {
        self.control.send(FeedControl::Reconnect).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.control.send(FeedControl::Shutdown).is_ok()
    }
}

pub struct Feed {
    handle: FeedHandle,
    events: mpsc::UnboundedReceiver<FeedEvent>,
    task: JoinHandle<()>,
}

impl Feed {
    pub fn spawn(endpoints: Endpoints, policy: ReconnectPolicy, symbol: impl Into<String>) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            endpoints,
            supervisor: StreamSupervisor::new(policy),
            events: events_tx,
            socket_events: socket_tx,
            sockets: HashMap::new(),
            last_status: StreamStatus::Idle,
        };
        let task = tokio::spawn(driver.run(symbol.into(), control_rx, socket_rx));

        Self {
            handle: FeedHandle {
                control: control_tx,
            },
            events,
            task,
        }
    }

    pub fn handle(&self) -> FeedHandle {
        self.handle.clone()
    }

    /// `None` once the driver has stopped.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    /// Tear down: cancel any pending retry, close the socket, wait for the driver.
    pub async fn shutdown(self) {
        self.handle.shutdown();
        let _ = self.task.await;
    }
}

struct ActiveSocket {
    close: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ActiveSocket {
    fn close(mut self) {
        if let Some(close) = self.close.take() {
            let _ = close.send(());
        }
        // Detach; the task reports `Closed` on its own once the close handshake ends.
        drop(self.task);
    }
}

type PendingRetry = Option<(RetryId, Pin<Box<Sleep>>)>;

enum Wake {
    Control(Option<FeedControl>),
    Socket(SocketEvent),
    Retry(RetryId),
}

struct Driver {
    endpoints: Endpoints,
    supervisor: StreamSupervisor,
    events: mpsc::UnboundedSender<FeedEvent>,
    socket_events: mpsc::UnboundedSender<SocketEvent>,
    sockets: HashMap<ConnectionId, ActiveSocket>,
    last_status: StreamStatus,
}

impl Driver {
    async fn run(
        mut self,
        symbol: String,
        mut control: mpsc::UnboundedReceiver<FeedControl>,
        mut socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    ) {
        let mut retry: PendingRetry = None;
        let commands = self.supervisor.connect(symbol);
        self.execute(commands, &mut retry);
        self.publish_status();

        loop {
            let wake = tokio::select! {
                control = control.recv() => Wake::Control(control),
                Some(event) = socket_events.recv() => Wake::Socket(event),
                id = wait_for_retry(&mut retry) => Wake::Retry(id),
            };

            let commands = match wake {
                Wake::Control(Some(FeedControl::Switch(symbol))) => self.supervisor.connect(symbol),
                Wake::Control(Some(FeedControl::Reconnect)) => self.supervisor.reconnect(),
                Wake::Control(Some(FeedControl::Shutdown)) | Wake::Control(None) => {
                    let commands = self.supervisor.shutdown();
                    self.execute(commands, &mut retry);
                    self.publish_status();
                    break;
                }
                Wake::Socket(event) => self.on_socket_event(event),
                Wake::Retry(id) => {
                    retry = None;
                    self.supervisor.retry_elapsed(id)
                }
            };
            self.execute(commands, &mut retry);
            self.publish_status();
        }

        log::info!("market feed stopped");
    }

    fn on_socket_event(&mut self, event: SocketEvent) -> Vec<StreamCommand> {
        match event {
            SocketEvent::Opened(connection) => self.supervisor.opened(connection),
            SocketEvent::Frame(connection, frame) => {
                if !self.supervisor.is_current(connection) {
                    log::debug!("dropping frame from superseded {connection}");
                    return Vec::new();
                }
                match frame.decode() {
                    Ok(message) => {
                        let _ = self.events.send(FeedEvent::Message(message));
                    }
                    Err(err) => log::warn!("dropping malformed stream payload: {err}"),
                }
                Vec::new()
            }
            SocketEvent::Closed(connection) => {
                self.sockets.remove(&connection);
                self.supervisor.closed(connection)
            }
        }
    }

    fn execute(&mut self, commands: Vec<StreamCommand>, retry: &mut PendingRetry) {
        for command in commands {
            match command {
                StreamCommand::Open { connection, symbol } => {
                    let url = self.endpoints.market_stream(&symbol);
                    log::info!("opening {connection} to {url}");
                    let (close_tx, close_rx) = oneshot::channel();
                    let task = tokio::spawn(run_socket(
                        connection,
                        url,
                        self.socket_events.clone(),
                        close_rx,
                    ));
                    self.sockets.insert(
                        connection,
                        ActiveSocket {
                            close: Some(close_tx),
                            task,
                        },
                    );
                }
                StreamCommand::Close { connection } => {
                    if let Some(socket) = self.sockets.remove(&connection) {
                        log::info!("closing {connection}");
                        socket.close();
                    }
                }
                StreamCommand::ScheduleRetry { retry: id, delay } => {
                    *retry = Some((id, Box::pin(sleep(delay))));
                }
                StreamCommand::CancelRetry { retry: id } => {
                    if retry.as_ref().is_some_and(|(pending, _)| *pending == id) {
                        *retry = None;
                    }
                }
            }
        }
    }

    fn publish_status(&mut self) {
        let status = self.supervisor.status();
        if status != self.last_status {
            self.last_status = status;
            let _ = self.events.send(FeedEvent::Status(status));
        }
    }
}

async fn wait_for_retry(retry: &mut PendingRetry) -> RetryId {
    match retry {
        Some((id, timer)) => {
            timer.as_mut().await;
            *id
        }
        None => pending().await,
    }
}

async fn run_socket(
    connection: ConnectionId,
    url: String,
    events: mpsc::UnboundedSender<SocketEvent>,
    mut close: oneshot::Receiver<()>,
) {
    let connected = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = &mut close => {
            let _ = events.send(SocketEvent::Closed(connection));
            return;
        }
    };

    let mut socket = match connected {
        Ok((socket, _)) => socket,
        Err(err) => {
            log::warn!("{connection} failed to connect to {url}: {err}");
            let _ = events.send(SocketEvent::Closed(connection));
            return;
        }
    };
    let _ = events.send(SocketEvent::Opened(connection));

    loop {
        tokio::select! {
            _ = &mut close => {
                let _ = socket.close(None).await;
                break;
            }
            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SocketEvent::Frame(connection, Frame::Text(text)));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let _ = events.send(SocketEvent::Frame(connection, Frame::Binary(bytes)));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    log::warn!("{connection} read error: {err}");
                    break;
                }
            }
        }
    }

    let _ = events.send(SocketEvent::Closed(connection));
}
