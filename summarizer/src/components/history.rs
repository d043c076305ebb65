use leptos::*;

use desk_core::MeetingSummary;
use desk_core::format::format_date_time;

use super::summarizer::use_summarizer;

const PREVIEW_CHARS: usize = 140;

#[component]
pub fn HistoryList() -> impl IntoView {
    let ctx = use_summarizer();
    let meetings = create_memo(move |_| ctx.state.with(|state| state.meetings.clone()));

    view! {
        <section class="meeting-history">
            <header>
                <h2>"Past meetings"</h2>
                <button on:click=move |_| ctx.refresh_meetings()>"Refresh"</button>
            </header>
            <Show
                when=move || meetings.with(|meetings| !meetings.is_empty())
                fallback=|| view! { <p>"No meetings summarized yet."</p> }
            >
                <ul>
                    <For
                        each=move || meetings.get()
                        key=|meeting| meeting.id.clone()
                        children=move |meeting: MeetingSummary| {
                            let id = meeting.id.clone();
                            view! {
                                <li
                                    class="meeting-history__row"
                                    on:click=move |_| ctx.open_meeting(id.clone())
                                >
                                    <strong>{meeting.title.clone()}</strong>
                                    <span class="meeting-history__date">
                                        {format_date_time(&meeting.created_at)}
                                    </span>
                                    <p>{preview(&meeting.summary, PREVIEW_CHARS)}</p>
                                    <small>{item_counts(&meeting)}</small>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </section>
    }
}

/// First `limit` characters of the summary, with an ellipsis when cut.
fn preview(summary: &str, limit: usize) -> String {
    let summary = summary.trim();
    match summary.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", summary[..cut].trim_end()),
        None => summary.to_string(),
    }
}

fn item_counts(meeting: &MeetingSummary) -> String {
    format!(
        "{} key points · {} action items",
        meeting.key_points.len(),
        meeting.action_items.len()
    )
}
