use leptos::*;

use desk_core::HistoryPoint;
use desk_core::format::format_price;

use super::dashboard::use_desk;

const CHART_WIDTH: f64 = 620.0;
const CHART_HEIGHT: f64 = 220.0;

#[component]
pub fn HistoryChart() -> impl IntoView {
    let state = use_desk().state;

    let history = create_memo(move |_| state.with(|state| state.history().to_vec()));
    let capacity = move || state.with(|state| state.history().capacity());

    view! {
        <section class="history-chart">
            <h2>"Price History"</h2>
            <Show
                when=move || history.with(|history| history.len() >= 2)
                fallback=move || {
                    if history.with(Vec::is_empty) {
                        view! { <p>"Waiting for live data..."</p> }
                    } else {
                        view! { <p>"Collecting more samples..."</p> }
                    }
                }
            >
                {move || {
                    history.with(|history| {
                        compute_chart_geometry(history, CHART_WIDTH, CHART_HEIGHT).map(|geometry| {
                            view! {
                                <div class="history-chart__content">
                                    <svg
                                        width=CHART_WIDTH
                                        height=CHART_HEIGHT
                                        viewBox=format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT)
                                        class="history-chart__svg"
                                    >
                                        <defs>
                                            <linearGradient id="priceFill" x1="0" x2="0" y1="0" y2="1">
                                                <stop offset="0%" stop-color="#38bdf8" stop-opacity="0.35" />
                                                <stop offset="100%" stop-color="#38bdf8" stop-opacity="0.02" />
                                            </linearGradient>
                                        </defs>
                                        <polyline
                                            class="history-chart__line"
                                            points=geometry.points.clone()
                                        />
                                        <polygon
                                            class="history-chart__area"
                                            points=geometry.area_points.clone()
                                        />
                                    </svg>
                                    <footer class="history-chart__footer">
                                        <span>{format!("High: {}", format_price(geometry.max_price))}</span>
                                        <span>{format!("Low: {}", format_price(geometry.min_price))}</span>
                                        <span>{format!("{} / {} samples", history.len(), capacity())}</span>
                                    </footer>
                                </div>
                            }
                        })
                    })
                }}
            </Show>
        </section>
    }
}

#[derive(Debug, PartialEq)]
struct ChartGeometry {
    points: String,
    area_points: String,
    min_price: f64,
    max_price: f64,
}

/// Samples are spaced evenly; a flat series is drawn along the middle.
fn compute_chart_geometry(
    history: &[HistoryPoint],
    width: f64,
    height: f64,
) -> Option<ChartGeometry> {
    if history.len() < 2 || width <= 0.0 || height <= 0.0 {
        return None;
    }

    let min_price = history
        .iter()
        .map(|point| point.price)
        .fold(f64::INFINITY, f64::min);
    let max_price = history
        .iter()
        .map(|point| point.price)
        .fold(f64::NEG_INFINITY, f64::max);

    if !min_price.is_finite() || !max_price.is_finite() {
        return None;
    }

    let step = width / (history.len() - 1) as f64;
    let price_span = max_price - min_price;

    let points_vec: Vec<String> = history
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let x = idx as f64 * step;
            let y = if price_span.abs() < f64::EPSILON {
                height / 2.0
            } else {
                height - ((point.price - min_price) / price_span) * height
            };
            format!("{:.2},{:.2}", x, y)
        })
        .collect();
    let points = points_vec.join(" ");
    let area_points = format!("{} {:.2},{:.2} 0,{:.2}", points, width, height, height);

    Some(ChartGeometry {
        points,
        area_points,
        min_price,
        max_price,
    })
}
