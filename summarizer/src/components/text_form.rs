use leptos::{ev, event_target_value, *};

use desk_core::{NoticeLevel, TextSubmission};

use crate::api;

use super::summarizer::use_summarizer;

#[component]
pub fn TextForm() -> impl IntoView {
    let ctx = use_summarizer();
    let title = create_rw_signal(String::new());
    let content = create_rw_signal(String::new());

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let submission = TextSubmission::new(title.get_untracked(), content.get_untracked());
        let request = match submission.validate() {
            Ok(request) => request,
            Err(err) => {
                ctx.notify(NoticeLevel::Error, err.to_string());
                return;
            }
        };
        let Some(endpoints) = ctx.endpoints() else { return };
        if !ctx.begin_submit() {
            return;
        }
        spawn_local(async move {
            let outcome = api::summarize_text(&endpoints, &request).await;
            if outcome.is_ok() {
                title.set(String::new());
                content.set(String::new());
            }
            ctx.finish_submit(outcome);
        });
    };

    view! {
        <form class="summary-form" on:submit=on_submit>
            <label>
                <span>"Meeting title"</span>
                <input
                    type="text"
                    placeholder="Weekly sync"
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
            </label>
            <label>
                <span>"Transcript"</span>
                <textarea
                    rows="12"
                    placeholder="Paste the meeting transcript here"
                    prop:value=move || content.get()
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
            </label>
            <button type="submit" prop:disabled=move || ctx.is_loading()>
                {move || if ctx.is_loading() { "Summarizing..." } else { "Summarize" }}
            </button>
        </form>
    }
}
