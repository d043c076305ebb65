use leptos::*;
use wasm_bindgen::prelude::wasm_bindgen;

pub mod api;
mod components;
mod logging;

pub use components::summarizer::Summarizer;
pub use logging::init_logging;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app-root">
            <Summarizer />
        </main>
    }
}

/// WASM entry point called automatically by `trunk`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), wasm_bindgen::JsValue> {
    init_logging();
    console_error_panic_hook::set_once();

    leptos::mount_to_body(|| view! { <App /> });
    Ok(())
}
