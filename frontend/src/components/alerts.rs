use std::str::FromStr;

use leptos::{ev, event_target_value, *};

use desk_core::format::{condition_label, format_date_time, format_price};
use desk_core::{Alert, AlertCondition, AlertDraft, NoticeLevel};

use crate::market::api;

use super::dashboard::use_desk;

#[component]
pub fn AlertsPanel() -> impl IntoView {
    let ctx = use_desk();
    let state = ctx.state;

    let target_price = create_rw_signal(String::new());
    let condition = create_rw_signal(AlertCondition::Above);
    let submitting = create_rw_signal(false);

    let alerts = create_memo(move |_| state.with(|state| state.alerts().to_vec()));

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = AlertDraft::new(target_price.get_untracked(), condition.get_untracked());
        // Nothing is sent unless the draft validates against the live quote.
        let alert = match state.with_untracked(|state| state.build_alert(&draft)) {
            Ok(alert) => alert,
            Err(err) => {
                ctx.notify(NoticeLevel::Error, err.to_string());
                return;
            }
        };
        let Some(endpoints) = ctx.endpoints() else { return };

        submitting.set(true);
        spawn_local(async move {
            match api::create_alert(&endpoints, &alert).await {
                Ok(_) => {
                    target_price.set(String::new());
                    ctx.notify(
                        NoticeLevel::Success,
                        format!(
                            "Alert set: {} {} {}",
                            alert.symbol,
                            condition_label(alert.condition).to_lowercase(),
                            format_price(alert.target_price)
                        ),
                    );
                    ctx.refresh_alerts();
                }
                Err(err) => ctx.report("Failed to create alert", err),
            }
            submitting.set(false);
        });
    };

    view! {
        <section class="alerts-panel">
            <h2>"Price Alerts"</h2>
            <form class="alerts-panel__form" on:submit=on_submit>
                <select
                    on:change=move |ev: ev::Event| {
                        if let Ok(value) = AlertCondition::from_str(&event_target_value(&ev)) {
                            condition.set(value);
                        }
                    }
                    prop:value=move || condition.get().as_str()
                >
                    <For
                        each=move || AlertCondition::ALL.into_iter()
                        key=|condition| condition.as_str()
                        children=move |condition: AlertCondition| {
                            view! { <option value=condition.as_str()>{condition_label(condition)}</option> }
                        }
                    />
                </select>
                <input
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="Target price"
                    prop:value=move || target_price.get()
                    on:input=move |ev| target_price.set(event_target_value(&ev))
                />
                <button type="submit" prop:disabled=move || submitting.get()>
                    {move || if submitting.get() { "Setting..." } else { "Set alert" }}
                </button>
            </form>
            <ul class="alerts-panel__list">
                <Show
                    when=move || alerts.with(|alerts| !alerts.is_empty())
                    fallback=|| view! { <li class="alerts-panel__empty">"No alerts set."</li> }
                >
                    <For
                        each=move || alerts.get()
                        key=|alert| alert.id.clone()
                        children=move |alert: Alert| view! { <AlertRow alert=alert /> }
                    />
                </Show>
            </ul>
        </section>
    }
}

#[component]
fn AlertRow(alert: Alert) -> impl IntoView {
    let class = if alert.triggered {
        "alert-row alert-row--triggered"
    } else {
        "alert-row"
    };
    view! {
        <li class=class>
            <strong>{alert.symbol.clone()}</strong>
            <span>{condition_label(alert.condition)}</span>
            <span>{format_price(alert.target_price)}</span>
            <span class="alert-row__status">
                {if alert.triggered { "Triggered" } else { "Active" }}
            </span>
            <span class="alert-row__time">{format_date_time(&alert.created_at)}</span>
        </li>
    }
}
