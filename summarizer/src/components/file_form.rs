use leptos::{ev, event_target, event_target_value, *};
use web_sys::{File, HtmlInputElement};

use desk_core::summarize::ACCEPT_ATTRIBUTE;
use desk_core::{FileSubmission, NoticeLevel};

use crate::api;

use super::summarizer::use_summarizer;

#[component]
pub fn FileForm() -> impl IntoView {
    let ctx = use_summarizer();
    let title = create_rw_signal(String::new());
    let file = create_rw_signal(None::<File>);

    let on_file_change = move |ev: ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        let selected = input.files().and_then(|files| files.get(0));
        file.set(selected);
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let selected = file.get_untracked();
        let submission = FileSubmission {
            title: title.get_untracked(),
            file_name: selected.as_ref().map(File::name),
        };
        // Extension check happens here, before any upload.
        let (clean_title, selected) = match submission.validate() {
            Ok((clean_title, _kind)) => match selected {
                Some(selected) => (clean_title, selected),
                None => return,
            },
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
            let outcome = api::summarize_file(&endpoints, &clean_title, &selected).await;
            if outcome.is_ok() {
                title.set(String::new());
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
                    placeholder="Quarterly review"
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
            </label>
            <label>
                <span>"Transcript file (.txt or .docx)"</span>
                <input type="file" accept=ACCEPT_ATTRIBUTE on:change=on_file_change />
            </label>
            <button type="submit" prop:disabled=move || ctx.is_loading()>
                {move || if ctx.is_loading() { "Uploading..." } else { "Upload and summarize" }}
            </button>
        </form>
    }
}
