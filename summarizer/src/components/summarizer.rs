use leptos::*;

use desk_core::notice::NOTICE_TIMEOUT_MS;
use desk_core::{Endpoints, MeetingSummary, NoticeBoard, NoticeLevel, SummarizerState, SummarizerTab};

use crate::api::{self, ApiError};

use super::{
    file_form::FileForm, history::HistoryList, notices::NoticeList, result_view::ResultView,
    text_form::TextForm,
};

/// Shared summarizer handles, provided via context.
#[derive(Clone, Copy)]
pub struct SummarizerContext {
    pub state: RwSignal<SummarizerState>,
    pub notices: RwSignal<NoticeBoard>,
    endpoints: StoredValue<Option<Endpoints>>,
}

pub fn use_summarizer() -> SummarizerContext {
    use_context::<SummarizerContext>().expect("summarizer context missing")
}

impl SummarizerContext {
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
        let endpoints = self.endpoints.get_value();
        if endpoints.is_none() {
            self.notify(NoticeLevel::Error, "Backend URL is not configured");
        }
        endpoints
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|state| state.loading)
    }

    /// Claim the shared loading flag; `false` while another submission runs.
    pub fn begin_submit(&self) -> bool {
        let claimed = self
            .state
            .try_update(SummarizerState::begin_submit)
            .unwrap_or(false);
        if !claimed {
            self.notify(
                NoticeLevel::Info,
                "A summary is already being generated; please wait",
            );
        }
        claimed
    }

    pub fn finish_submit(&self, outcome: Result<MeetingSummary, ApiError>) {
        match outcome {
            Ok(summary) => {
                self.notify(
                    NoticeLevel::Success,
                    format!("Summary ready: {}", summary.title),
                );
                self.state.update(|state| state.finish_submit(Some(summary)));
                self.refresh_meetings();
            }
            Err(err) => {
                self.state.update(|state| state.finish_submit(None));
                self.report("Summarization failed", err);
            }
        }
    }

    pub fn refresh_meetings(&self) {
        let Some(endpoints) = self.endpoints() else { return };
        let Some(ticket) = self
            .state
            .try_update_untracked(|state| state.begin_meetings_fetch())
        else {
            return;
        };
        let ctx = *self;
        spawn_local(async move {
            match api::fetch_meetings(&endpoints).await {
                Ok(meetings) => ctx.state.update(|state| {
                    state.apply_meetings(ticket, meetings);
                }),
                Err(err) => ctx.report("Failed to load meetings", err),
            }
        });
    }

    /// Show a stored meeting, fetching it when it is not in the loaded list.
    pub fn open_meeting(&self, id: String) {
        let shown = self
            .state
            .try_update(|state| state.show_meeting(&id))
            .unwrap_or(false);
        if shown {
            return;
        }
        let Some(endpoints) = self.endpoints() else { return };
        let ctx = *self;
        spawn_local(async move {
            match api::fetch_meeting(&endpoints, &id).await {
                Ok(meeting) => ctx.state.update(|state| state.result = Some(meeting)),
                Err(err) => ctx.report("Failed to load meeting", err),
            }
        });
    }

    pub fn report(&self, context: &str, err: ApiError) {
        log::warn!("{context}: {err}");
        self.notify(NoticeLevel::Error, format!("{context}: {err}"));
    }
}

#[component]
pub fn Summarizer() -> impl IntoView {
    let ctx = SummarizerContext {
        state: create_rw_signal(SummarizerState::new()),
        notices: create_rw_signal(NoticeBoard::default()),
        endpoints: store_value(None),
    };
    provide_context(ctx);

    #[cfg(target_arch = "wasm32")]
    {
        match api::resolve_endpoints() {
            Ok(endpoints) => {
                ctx.endpoints.set_value(Some(endpoints));
                ctx.refresh_meetings();
            }
            Err(err) => ctx.notify(NoticeLevel::Error, format!("Backend unavailable: {err}")),
        }
    }

    let tab = move || ctx.state.with(|state| state.tab);
    let select_tab = move |next: SummarizerTab| {
        ctx.state.update(|state| state.tab = next);
        if next == SummarizerTab::History {
            ctx.refresh_meetings();
        }
    };

    view! {
        <div class="summarizer">
            <header class="summarizer__header">
                <h1>"Meeting Summarizer"</h1>
                <p>"Paste a transcript or upload a .txt / .docx file to get a summary, key points and action items."</p>
            </header>
            <nav class="summarizer__tabs">
                {[
                    (SummarizerTab::Text, "Paste text"),
                    (SummarizerTab::File, "Upload file"),
                    (SummarizerTab::History, "History"),
                ]
                    .into_iter()
                    .map(|(target, label)| {
                        view! {
                            <button
                                class="summarizer__tab"
                                class:active=move || tab() == target
                                on:click=move |_| select_tab(target)
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </nav>
            <section class="summarizer__body">
                {move || match tab() {
                    SummarizerTab::Text => view! { <TextForm /> }.into_view(),
                    SummarizerTab::File => view! { <FileForm /> }.into_view(),
                    SummarizerTab::History => view! { <HistoryList /> }.into_view(),
                }}
                <ResultView />
            </section>
            <NoticeList notices=ctx.notices />
        </div>
    }
}
