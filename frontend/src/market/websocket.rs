//! Browser driver for the market stream.
//!
//! Mirrors the native feed: the shared [`StreamSupervisor`] decides, this
//! module performs. Everything lives on the single wasm thread, so state is an
//! `Rc<RefCell<_>>` and callbacks are fired only after the borrow is released.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use desk_core::{
    ConnectionId, Endpoints, ReconnectPolicy, RetryId, StreamCommand, StreamMessage,
    StreamStatus, StreamSupervisor,
};
use futures::channel::oneshot;
use futures::future::{self, Either};
use futures::{SinkExt, StreamExt};
use gloo_net::websocket::{Message, futures::WebSocket};
use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;

pub type MessageCallback = Rc<dyn Fn(StreamMessage)>;
pub type StatusCallback = Rc<dyn Fn(StreamStatus)>;

enum SocketEvent {
    Opened(ConnectionId),
    Frame(ConnectionId, Message),
    Closed(ConnectionId),
    RetryElapsed(RetryId),
}

struct Inner {
    endpoints: Endpoints,
    supervisor: StreamSupervisor,
    sockets: HashMap<ConnectionId, oneshot::Sender<()>>,
    retry: Option<(RetryId, Timeout)>,
    last_status: StreamStatus,
}

enum Output {
    Message(StreamMessage),
    Status(StreamStatus),
}

/// Handle to the live market connection. Cloning shares the connection.
#[derive(Clone)]
pub struct MarketStream {
    inner: Rc<RefCell<Inner>>,
    on_message: MessageCallback,
    on_status: StatusCallback,
}

impl MarketStream {
    pub fn new(
        endpoints: Endpoints,
        policy: ReconnectPolicy,
        on_message: MessageCallback,
        on_status: StatusCallback,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                endpoints,
                supervisor: StreamSupervisor::new(policy),
                sockets: HashMap::new(),
                retry: None,
                last_status: StreamStatus::Idle,
            })),
            on_message,
            on_status,
        }
    }

    /// Watch `symbol`; any open socket or pending retry is dropped first.
    pub fn connect(&self, symbol: &str) {
        let commands = self.inner.borrow_mut().supervisor.connect(symbol);
        self.run(commands, Vec::new());
    }

    pub fn reconnect(&self) {
        let commands = self.inner.borrow_mut().supervisor.reconnect();
        self.run(commands, Vec::new());
    }

    /// Tear down for good. Called from the owning component's cleanup.
    pub fn shutdown(&self) {
        let commands = self.inner.borrow_mut().supervisor.shutdown();
        self.run(commands, Vec::new());
    }

    pub fn status(&self) -> StreamStatus {
        self.inner.borrow().supervisor.status()
    }

    fn downgrade(&self) -> WeakStream {
        WeakStream {
            inner: Rc::downgrade(&self.inner),
            on_message: self.on_message.clone(),
            on_status: self.on_status.clone(),
        }
    }

    fn handle(&self, event: SocketEvent) {
        let mut outputs = Vec::new();
        let commands = {
            let mut inner = self.inner.borrow_mut();
            match event {
                SocketEvent::Opened(connection) => inner.supervisor.opened(connection),
                SocketEvent::Frame(connection, frame) => {
                    if inner.supervisor.is_current(connection) {
                        let decoded = match &frame {
                            Message::Text(text) => StreamMessage::decode(text),
                            Message::Bytes(bytes) => StreamMessage::decode_bytes(bytes),
                        };
                        match decoded {
                            Ok(message) => outputs.push(Output::Message(message)),
                            Err(err) => log::warn!("dropping malformed stream payload: {err}"),
                        }
                    } else {
                        log::debug!("dropping frame from superseded {connection}");
                    }
                    Vec::new()
                }
                SocketEvent::Closed(connection) => {
                    inner.sockets.remove(&connection);
                    inner.supervisor.closed(connection)
                }
                SocketEvent::RetryElapsed(retry) => {
                    if inner.retry.as_ref().is_some_and(|(pending, _)| *pending == retry) {
                        inner.retry = None;
                    }
                    inner.supervisor.retry_elapsed(retry)
                }
            }
        };
        self.run(commands, outputs);
    }

    fn run(&self, commands: Vec<StreamCommand>, mut outputs: Vec<Output>) {
        {
            let mut inner = self.inner.borrow_mut();
            for command in commands {
                match command {
                    StreamCommand::Open { connection, symbol } => {
                        let url = inner.endpoints.market_stream(&symbol);
                        match WebSocket::open(&url) {
                            Ok(socket) => {
                                let (close_tx, close_rx) = oneshot::channel();
                                inner.sockets.insert(connection, close_tx);
                                spawn_local(read_socket(
                                    connection,
                                    socket,
                                    close_rx,
                                    self.downgrade(),
                                ));
                            }
                            Err(err) => {
                                log::error!("could not open {url}: {err}");
                                // Report asynchronously so the supervisor sees a normal close.
                                let weak = self.downgrade();
                                spawn_local(async move {
                                    weak.deliver(SocketEvent::Closed(connection));
                                });
                            }
                        }
                    }
                    StreamCommand::Close { connection } => {
                        if let Some(close) = inner.sockets.remove(&connection) {
                            let _ = close.send(());
                        }
                    }
                    StreamCommand::ScheduleRetry { retry, delay } => {
                        let weak = self.downgrade();
                        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
                        // Deliver from a task: the handler drops this timeout,
                        // which must not happen inside its own callback.
                        let timeout = Timeout::new(millis, move || {
                            spawn_local(async move {
                                weak.deliver(SocketEvent::RetryElapsed(retry));
                            });
                        });
                        inner.retry = Some((retry, timeout));
                    }
                    StreamCommand::CancelRetry { retry } => {
                        if inner.retry.as_ref().is_some_and(|(pending, _)| *pending == retry) {
                            // Dropping the timeout cancels it.
                            inner.retry = None;
                        }
                    }
                }
            }

            let status = inner.supervisor.status();
            if status != inner.last_status {
                inner.last_status = status;
                outputs.push(Output::Status(status));
            }
        }

        for output in outputs {
            match output {
                Output::Message(message) => (self.on_message)(message),
                Output::Status(status) => (self.on_status)(status),
            }
        }
    }
}

/// Non-owning handle held by socket tasks and timers.
struct WeakStream {
    inner: Weak<RefCell<Inner>>,
    on_message: MessageCallback,
    on_status: StatusCallback,
}

impl WeakStream {
    fn deliver(&self, event: SocketEvent) {
        if let Some(inner) = self.inner.upgrade() {
            let stream = MarketStream {
                inner,
                on_message: self.on_message.clone(),
                on_status: self.on_status.clone(),
            };
            stream.handle(event);
        }
    }
}

enum Step {
    Frame(Option<Result<Message, gloo_net::websocket::WebSocketError>>),
    Close,
}

async fn read_socket(
    connection: ConnectionId,
    socket: WebSocket,
    mut close: oneshot::Receiver<()>,
    stream: WeakStream,
) {
    let (mut write, mut read) = socket.split();
    let mut opened = false;

    loop {
        let step = match future::select(read.next(), &mut close).await {
            Either::Left((frame, _)) => Step::Frame(frame),
            Either::Right(_) => Step::Close,
        };

        let frame = match step {
            Step::Close => {
                let _ = write.close().await;
                break;
            }
            Step::Frame(Some(Ok(frame))) => frame,
            Step::Frame(Some(Err(err))) => {
                log::warn!("{connection} read error: {err}");
                break;
            }
            Step::Frame(None) => break,
        };

        // The backend acknowledges every new socket with a frame, so the
        // first frame doubles as the open notification.
        if !opened {
            opened = true;
            stream.deliver(SocketEvent::Opened(connection));
        }
        stream.deliver(SocketEvent::Frame(connection, frame));
    }

    stream.deliver(SocketEvent::Closed(connection));
}
