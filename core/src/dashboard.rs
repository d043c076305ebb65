use crate::alerts::AlertDraft;
use crate::epoch::{RequestEpoch, Ticket};
use crate::error::ValidationError;
use crate::history::{PriceHistoryWindow, Trend, HISTORY_CAPACITY};
use crate::message::StreamMessage;
use crate::stream::StreamStatus;
use crate::types::{Alert, AnalysisRecord, IndicatorSet, Quote, SymbolInfo};

/// Follow-up work requested by a stream message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEffect {
    RefreshAnalyses { symbol: String },
}

/// Client state for the financial dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    symbol: Option<String>,
    quote: Option<Quote>,
    indicators: Option<IndicatorSet>,
    history: PriceHistoryWindow,
    analysis: Option<AnalysisRecord>,
    analyses: Vec<AnalysisRecord>,
    alerts: Vec<Alert>,
    symbols: Vec<SymbolInfo>,
    status: StreamStatus,
    analyses_epoch: RequestEpoch,
    alerts_epoch: RequestEpoch,
    symbols_epoch: RequestEpoch,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl DashboardState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            symbol: None,
            quote: None,
            indicators: None,
            history: PriceHistoryWindow::new(history_capacity),
            analysis: None,
            analyses: Vec::new(),
            alerts: Vec::new(),
            symbols: Vec::new(),
            status: StreamStatus::Idle,
            analyses_epoch: RequestEpoch::default(),
            alerts_epoch: RequestEpoch::default(),
            symbols_epoch: RequestEpoch::default(),
        }
    }

    /// Switch the watched symbol. Per-symbol data is dropped and in-flight
    /// analysis fetches for the old symbol become stale. Returns `false` when
    /// the symbol is unchanged.
    pub fn select_symbol(&mut self, symbol: &str) -> bool {
        if self.symbol.as_deref() == Some(symbol) {
            return false;
        }
        self.symbol = Some(symbol.to_string());
        self.quote = None;
        self.indicators = None;
        self.history.clear();
        self.analysis = None;
        self.analyses.clear();
        self.analyses_epoch.invalidate();
        true
    }

    pub fn apply(&mut self, message: StreamMessage) -> Option<StoreEffect> {
        match message {
            StreamMessage::Connection { message } => {
                log::info!("stream acknowledged: {message}");
                None
            }
            StreamMessage::MarketData(tick) => {
                if !self.matches_selected(tick.symbol.as_deref()) {
                    log::debug!("dropping market data for {:?}", tick.symbol);
                    return None;
                }
                let fallback = self.symbol.clone().unwrap_or_default();
                let (quote, indicators) = tick.into_parts(&fallback);
                self.history.record(&quote);
                self.quote = Some(quote);
                self.indicators = Some(indicators);
                None
            }
            StreamMessage::AiAnalysis(mut record) => {
                let incoming = (!record.symbol.is_empty()).then_some(record.symbol.as_str());
                if !self.matches_selected(incoming) {
                    log::debug!("dropping analysis for {}", record.symbol);
                    return None;
                }
                if record.symbol.is_empty() {
                    record.symbol = self.symbol.clone().unwrap_or_default();
                }
                let symbol = record.symbol.clone();
                self.analysis = Some(record);
                Some(StoreEffect::RefreshAnalyses { symbol })
            }
            StreamMessage::Unknown(kind) => {
                log::debug!("ignoring stream message of type {kind}");
                None
            }
        }
    }

    fn matches_selected(&self, incoming: Option<&str>) -> bool {
        match (incoming, self.symbol.as_deref()) {
            (Some(incoming), Some(selected)) => incoming.eq_ignore_ascii_case(selected),
            _ => true,
        }
    }

    pub fn set_status(&mut self, status: StreamStatus) {
        self.status = status;
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn indicators(&self) -> Option<&IndicatorSet> {
        self.indicators.as_ref()
    }

    pub fn history(&self) -> &PriceHistoryWindow {
        &self.history
    }

    pub fn trend(&self) -> Option<Trend> {
        self.history.trend()
    }

    pub fn analysis(&self) -> Option<&AnalysisRecord> {
        self.analysis.as_ref()
    }

    pub fn analyses(&self) -> &[AnalysisRecord] {
        &self.analyses
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn symbols(&self) -> &[SymbolInfo] {
        &self.symbols
    }

    /// Validate the alert form against the live quote.
    pub fn build_alert(&self, draft: &AlertDraft) -> Result<Alert, ValidationError> {
        draft.build(self.quote.as_ref())
    }

    pub fn begin_analyses_fetch(&mut self) -> Ticket {
        self.analyses_epoch.issue()
    }

    pub fn apply_analyses(
        &mut self,
        ticket: Ticket,
        symbol: &str,
        analyses: Vec<AnalysisRecord>,
    ) -> bool {
        if !self.analyses_epoch.is_current(ticket) || self.symbol.as_deref() != Some(symbol) {
            log::debug!("discarding stale analyses for {symbol}");
            return false;
        }
        self.analyses = analyses;
        true
    }

    pub fn begin_alerts_fetch(&mut self) -> Ticket {
        self.alerts_epoch.issue()
    }

    pub fn apply_alerts(&mut self, ticket: Ticket, alerts: Vec<Alert>) -> bool {
        if !self.alerts_epoch.is_current(ticket) {
            log::debug!("discarding stale alert list");
            return false;
        }
        self.alerts = alerts;
        true
    }

    pub fn begin_symbols_fetch(&mut self) -> Ticket {
        self.symbols_epoch.issue()
    }

    pub fn apply_symbols(&mut self, ticket: Ticket, symbols: Vec<SymbolInfo>) -> bool {
        if !self.symbols_epoch.is_current(ticket) {
            return false;
        }
        self.symbols = symbols;
        true
    }
}
