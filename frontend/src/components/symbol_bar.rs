use leptos::{ev, event_target_value, *};

use desk_core::StreamStatus;

use super::dashboard::use_desk;

#[component]
pub fn SymbolBar() -> impl IntoView {
    let ctx = use_desk();
    let state = ctx.state;

    let selected = move || state.with(|state| state.symbol().unwrap_or_default().to_string());
    let symbols = create_memo(move |_| state.with(|state| state.symbols().to_vec()));
    let status = move || state.with(|state| state.status());

    let on_change = move |ev: ev::Event| ctx.select_symbol(&event_target_value(&ev));

    view! {
        <div class="symbol-bar">
            <label class="symbol-bar__picker">
                <span>"Symbol"</span>
                <select on:change=on_change prop:value=selected>
                    <Show when=move || symbols.with(|list| list.is_empty())>
                        <option value=selected>{selected}</option>
                    </Show>
                    <For
                        each=move || symbols.get()
                        key=|info| info.symbol.clone()
                        children=move |info| {
                            let label = if info.name.is_empty() {
                                info.symbol.clone()
                            } else {
                                format!("{} · {}", info.symbol, info.name)
                            };
                            view! { <option value=info.symbol.clone()>{label}</option> }
                        }
                    />
                </select>
            </label>
            {move || {
                let status = status();
                let class = format!("status-badge {}", status_class(status));
                let detail = match status {
                    StreamStatus::Reconnecting { attempt, delay_ms } => {
                        format!(" (attempt {attempt}, {:.0}s)", delay_ms as f64 / 1000.0)
                    }
                    _ => String::new(),
                };
                view! { <span class=class>{status.label()}{detail}</span> }
            }}
            <Show when=move || matches!(status(), StreamStatus::Failed)>
                <button class="symbol-bar__reconnect" on:click=move |_| ctx.reconnect()>
                    "Reconnect"
                </button>
            </Show>
        </div>
    }
}

fn status_class(status: StreamStatus) -> &'static str {
    match status {
        StreamStatus::Connecting => "status--connecting",
        StreamStatus::Connected => "status--connected",
        StreamStatus::Reconnecting { .. } => "status--reconnecting",
        StreamStatus::Failed => "status--failed",
        StreamStatus::Idle => "status--idle",
    }
}
