//! Platform-independent client logic shared by the dashboard, the meeting
//! summarizer and the terminal client.

pub mod alerts;
pub mod dashboard;
pub mod endpoints;
pub mod epoch;
pub mod error;
pub mod format;
pub mod history;
pub mod message;
pub mod notice;
pub mod stream;
pub mod summarize;
pub mod types;

pub use alerts::AlertDraft;
pub use dashboard::{DashboardState, StoreEffect};
pub use endpoints::{Endpoints, DEFAULT_BACKEND_URL};
pub use epoch::{RequestEpoch, Ticket};
pub use error::{EndpointError, ProtocolError, ValidationError};
pub use history::{PriceHistoryWindow, Trend, HISTORY_CAPACITY};
pub use message::StreamMessage;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use stream::{
    ConnectionId, ReconnectPolicy, RetryId, StreamCommand, StreamState, StreamStatus,
    StreamSupervisor,
};
pub use summarize::{FileSubmission, SummarizerState, SummarizerTab, TextSubmission, UploadKind};
pub use types::{
    Alert, AlertCondition, AnalysisRecord, HealthStatus, HistoryPoint, IndicatorSet,
    IndicatorSnapshot, MarketTick, MeetingSummary, Quote, SymbolInfo,
};
