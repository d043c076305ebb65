use leptos::*;

use desk_core::AnalysisRecord;
use desk_core::format::{format_confidence, format_date_time, recommendation_class};

use super::dashboard::use_desk;

#[component]
pub fn AnalysisPanel() -> impl IntoView {
    let state = use_desk().state;
    let latest = create_memo(move |_| state.with(|state| state.analysis().cloned()));
    let history = create_memo(move |_| state.with(|state| state.analyses().to_vec()));

    view! {
        <section class="analysis-panel">
            <h2>"AI Analysis"</h2>
            {move || match latest.get() {
                Some(record) => view! { <AnalysisCard record=record /> }.into_view(),
                None => view! { <p class="analysis-panel__empty">"No live analysis yet."</p> }.into_view(),
            }}
            <h3>"Recent analyses"</h3>
            <ul class="analysis-panel__history">
                <Show
                    when=move || history.with(|items| !items.is_empty())
                    fallback=|| view! { <li class="analysis-panel__empty">"Nothing on record for this symbol."</li> }
                >
                    <For
                        each=move || history.get().into_iter().enumerate()
                        key=|(idx, record)| format!("{idx}-{}", record.timestamp)
                        children=move |(_, record): (usize, AnalysisRecord)| {
                            view! {
                                <li class=format!("analysis-row {}", recommendation_class(&record.recommendation))>
                                    <span class="analysis-row__time">{format_date_time(&record.timestamp)}</span>
                                    <strong>{record.recommendation.clone()}</strong>
                                    <span>{format_confidence(record.confidence)}</span>
                                </li>
                            }
                        }
                    />
                </Show>
            </ul>
        </section>
    }
}

#[component]
fn AnalysisCard(record: AnalysisRecord) -> impl IntoView {
    let class = format!("analysis-card {}", recommendation_class(&record.recommendation));
    view! {
        <article class=class>
            <header>
                <strong class="analysis-card__recommendation">{record.recommendation.clone()}</strong>
                <span class="analysis-card__confidence">
                    {format!("{} confidence", format_confidence(record.confidence))}
                </span>
            </header>
            {record.pattern_detected.clone().map(|pattern| view! {
                <p class="analysis-card__pattern">"Pattern: "{pattern}</p>
            })}
            <p class="analysis-card__reasoning">{record.reasoning.clone()}</p>
            <footer class="analysis-card__time">{format_date_time(&record.timestamp)}</footer>
        </article>
    }
}
