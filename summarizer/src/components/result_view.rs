use leptos::*;

use desk_core::format::format_date_time;

use super::summarizer::use_summarizer;

#[component]
pub fn ResultView() -> impl IntoView {
    let state = use_summarizer().state;
    let result = create_memo(move |_| state.with(|state| state.result.clone()));

    move || {
        result.get().map(|summary| {
            view! {
                <article class="summary-result">
                    <header>
                        <h2>{summary.title.clone()}</h2>
                        <span class="summary-result__date">{format_date_time(&summary.created_at)}</span>
                        <button on:click=move |_| state.update(|state| state.clear_result())>"Close"</button>
                    </header>
                    <p class="summary-result__summary">{summary.summary.clone()}</p>
                    <ItemList heading="Key points" items=summary.key_points.clone() />
                    <ItemList heading="Action items" items=summary.action_items.clone() />
                </article>
            }
        })
    }
}

#[component]
fn ItemList(heading: &'static str, items: Vec<String>) -> impl IntoView {
    (!items.is_empty()).then(|| {
        view! {
            <section class="summary-result__list">
                <h3>{heading}</h3>
                <ul>
                    {items.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
                </ul>
            </section>
        }
    })
}
