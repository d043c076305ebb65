use std::rc::Rc;

use leptos::*;

use desk_core::notice::NOTICE_TIMEOUT_MS;
use desk_core::{
    DashboardState, Endpoints, NoticeBoard, NoticeLevel, ReconnectPolicy, StoreEffect,
    StreamMessage, StreamStatus,
};

use crate::market::api::{self, ApiError};
use crate::market::websocket::MarketStream;

use super::{
    alerts::AlertsPanel, analysis::AnalysisPanel, history_chart::HistoryChart,
    indicators::IndicatorsPanel, notices::NoticeList, quote_panel::QuotePanel,
    symbol_bar::SymbolBar,
};

/// Symbol watched until the user picks another one.
pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Shared dashboard handles, provided once via context. Every field is `Copy`.
#[derive(Clone, Copy)]
pub struct DeskContext {
    pub state: RwSignal<DashboardState>,
    pub notices: RwSignal<NoticeBoard>,
    endpoints: StoredValue<Option<Endpoints>>,
    stream: StoredValue<Option<MarketStream>>,
}

pub fn use_desk() -> DeskContext {
    use_context::<DeskContext>().expect("desk context missing")
}

impl DeskContext {
    fn new() -> Self {
        Self {
            state: create_rw_signal(DashboardState::default()),
            notices: create_rw_signal(NoticeBoard::default()),
            endpoints: store_value(None),
            stream: store_value(None),
        }
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let notices = self.notices;
        let Some(id) = notices.try_update(|board| board.push(level, message)) else {
            return;
        };
        gloo_timers::callback::Timeout::new(NOTICE_TIMEOUT_MS, move || {
            notices.update(|board| board.dismiss(id));
        })
        .forget();
    }

    pub fn endpoints(&self) -> Option<Endpoints> {
        self.endpoints.get_value()
    }

    /// Switch the watched symbol: drop per-symbol data, reconnect, refetch analyses.
    pub fn select_symbol(&self, symbol: &str) {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return;
        }
        let changed = self
            .state
            .try_update(|state| state.select_symbol(&symbol))
            .unwrap_or(false);
        if !changed {
            return;
        }
        if let Some(stream) = self.stream.get_value() {
            stream.connect(&symbol);
        }
        self.refresh_analyses();
    }

    pub fn reconnect(&self) {
        if let Some(stream) = self.stream.get_value() {
            stream.reconnect();
        }
    }

    pub fn refresh_analyses(&self) {
        let Some(endpoints) = self.endpoints() else { return };
        let Some(symbol) = self
            .state
            .with_untracked(|state| state.symbol().map(str::to_string))
        else {
            return;
        };
        let Some(ticket) = self
            .state
            .try_update_untracked(|state| state.begin_analyses_fetch())
        else {
            return;
        };
        let ctx = *self;
        spawn_local(async move {
            match api::fetch_analyses(&endpoints, &symbol).await {
                Ok(analyses) => ctx.state.update(|state| {
                    if !state.apply_analyses(ticket, &symbol, analyses) {
                        log::debug!("discarding stale analyses for {symbol}");
                    }
                }),
                Err(err) => ctx.report("Failed to load analyses", err),
            }
        });
    }

    pub fn refresh_alerts(&self) {
        let Some(endpoints) = self.endpoints() else { return };
        let Some(ticket) = self
            .state
            .try_update_untracked(|state| state.begin_alerts_fetch())
        else {
            return;
        };
        let ctx = *self;
        spawn_local(async move {
            match api::fetch_alerts(&endpoints).await {
                Ok(alerts) => ctx.state.update(|state| {
                    state.apply_alerts(ticket, alerts);
                }),
                Err(err) => ctx.report("Failed to load alerts", err),
            }
        });
    }

    pub fn refresh_symbols(&self) {
        let Some(endpoints) = self.endpoints() else { return };
        let Some(ticket) = self
            .state
            .try_update_untracked(|state| state.begin_symbols_fetch())
        else {
            return;
        };
        let ctx = *self;
        spawn_local(async move {
            match api::fetch_symbols(&endpoints).await {
                Ok(symbols) => ctx.state.update(|state| {
                    state.apply_symbols(ticket, symbols);
                }),
                Err(err) => ctx.report("Failed to load symbols", err),
            }
        });
    }

    pub fn report(&self, context: &str, err: ApiError) {
        log::warn!("{context}: {err}");
        self.notify(NoticeLevel::Error, format!("{context}: {err}"));
    }

    fn apply_message(&self, message: StreamMessage) {
        let effect = self.state.try_update(|state| state.apply(message)).flatten();
        if let Some(StoreEffect::RefreshAnalyses { symbol }) = effect {
            self.notify(NoticeLevel::Info, format!("New AI analysis for {symbol}"));
            self.refresh_analyses();
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn start(&self) {
        let endpoints = match api::resolve_endpoints() {
            Ok(endpoints) => endpoints,
            Err(err) => {
                self.notify(NoticeLevel::Error, format!("Backend unavailable: {err}"));
                return;
            }
        };
        self.endpoints.set_value(Some(endpoints.clone()));

        let ctx = *self;
        let on_message = Rc::new(move |message: StreamMessage| ctx.apply_message(message));
        let on_status = Rc::new(move |status: StreamStatus| {
            let notice = ctx.state.with_untracked(|state| {
                status.failure_notice(state.status(), state.symbol().unwrap_or_default())
            });
            ctx.state.update(|state| state.set_status(status));
            if let Some(notice) = notice {
                ctx.notify(NoticeLevel::Error, notice);
            }
        });
        let stream = MarketStream::new(
            endpoints,
            ReconnectPolicy::default(),
            on_message,
            on_status,
        );
        self.stream.set_value(Some(stream));

        self.refresh_symbols();
        self.refresh_alerts();
        self.select_symbol(DEFAULT_SYMBOL);
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn stop(&self) {
        if let Some(stream) = self.stream.get_value() {
            stream.shutdown();
        }
    }
}

/// Top-level dashboard wrapper providing shared application state via context.
#[component]
pub fn Dashboard() -> impl IntoView {
    let ctx = DeskContext::new();
    provide_context(ctx);

    #[cfg(target_arch = "wasm32")]
    {
        ctx.start();
        on_cleanup(move || ctx.stop());
    }

    view! {
        <div class="dashboard">
            <header class="dashboard__header">
                <h1>"Market Desk"</h1>
                <p>"Live quotes, indicators and AI analysis for one symbol at a time."</p>
                <SymbolBar />
            </header>
            <section class="dashboard__body">
                <div class="dashboard__main">
                    <QuotePanel />
                    <HistoryChart />
                    <IndicatorsPanel />
                </div>
                <aside class="dashboard__sidebar">
                    <AnalysisPanel />
                    <AlertsPanel />
                </aside>
            </section>
            <NoticeList notices=ctx.notices />
        </div>
    }
}
