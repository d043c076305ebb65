use leptos::*;

use desk_core::{Notice, NoticeBoard};

/// Toast stack; notices dismiss themselves on a timer or on click.
#[component]
pub fn NoticeList(notices: RwSignal<NoticeBoard>) -> impl IntoView {
    view! {
        <div class="notices" aria-live="polite">
            <For
                each=move || notices.with(NoticeBoard::visible)
                key=|notice| notice.id
                children=move |notice: Notice| {
                    let id = notice.id;
                    view! {
                        <div
                            class=format!("notice {}", notice.level.css_class())
                            on:click=move |_| notices.update(|board| board.dismiss(id))
                        >
                            {notice.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
