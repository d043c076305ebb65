use leptos::*;

use desk_core::format::format_indicator;

use super::dashboard::use_desk;

#[component]
pub fn IndicatorsPanel() -> impl IntoView {
    let state = use_desk().state;
    let entries = create_memo(move |_| {
        state.with(|state| {
            state
                .indicators()
                .map(|indicators| indicators.entries().to_vec())
                .unwrap_or_default()
        })
    });

    view! {
        <section class="indicators-panel">
            <h2>"Technical Indicators"</h2>
            <Show
                when=move || entries.with(|entries| !entries.is_empty())
                fallback=|| view! { <p>"No indicator data yet."</p> }
            >
                <dl class="indicators-panel__grid">
                    <For
                        each=move || entries.get()
                        key=|(label, _)| *label
                        children=move |(label, _)| {
                            let value = move || {
                                entries.with(|entries| {
                                    entries
                                        .iter()
                                        .find(|(name, _)| *name == label)
                                        .and_then(|(_, value)| *value)
                                })
                            };
                            view! {
                                <div class="indicators-panel__item">
                                    <dt>{label}</dt>
                                    <dd>{move || format_indicator(value())}</dd>
                                </div>
                            }
                        }
                    />
                </dl>
            </Show>
        </section>
    }
}
