use leptos::*;

use desk_core::format::{format_change, format_clock, format_price, format_volume};

use super::dashboard::use_desk;

#[component]
pub fn QuotePanel() -> impl IntoView {
    let state = use_desk().state;

    let quote = create_memo(move |_| state.with(|state| state.quote().cloned()));
    let trend = create_memo(move |_| state.with(|state| state.trend()));
    let change = move || {
        state.with(|state| {
            state
                .history()
                .last_change()
                .map(|(delta, pct)| (format_change(delta, pct), delta >= 0.0))
        })
    };

    view! {
        <section class="quote-panel">
            <Show
                when=move || quote.with(Option::is_some)
                fallback=move || {
                    let symbol = state.with(|state| state.symbol().unwrap_or_default().to_string());
                    view! { <p class="quote-panel__empty">"Waiting for live data for "{symbol}"..."</p> }
                }
            >
                {move || {
                    quote.get().map(|quote| {
                        let trend = trend.get();
                        view! {
                            <header class="quote-panel__header">
                                <h2>{quote.symbol.clone()}</h2>
                                <span class="quote-panel__time">{format_clock(&quote.timestamp)}</span>
                            </header>
                            <div class="quote-panel__price">
                                <strong>{format_price(quote.price)}</strong>
                                <span class=move || format!("trend trend--{}", trend.map(|t| t.label()).unwrap_or("flat"))>
                                    {trend.map(|t| t.arrow()).unwrap_or_default()}
                                </span>
                                {change().map(|(text, positive)| view! {
                                    <span class="quote-panel__change" class:positive=positive class:negative=!positive>
                                        {text}
                                    </span>
                                })}
                            </div>
                            <p class="quote-panel__volume">"Volume "{format_volume(quote.volume)}</p>
                        }
                    })
                }}
            </Show>
        </section>
    }
}
