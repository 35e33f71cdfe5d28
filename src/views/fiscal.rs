use crate::api::SharedBackend;
use crate::charts::{
    ChartHandle, ChartKind, ChartSurface, FiscalCharts, create_chart_script, destroy_chart_script,
};
use crate::dashboard::DashboardState;
use crate::screens::FISCAL_SCREEN_ID;
use dioxus::prelude::*;
use serde_json::Value;

/// Chart.js instances living in the page, addressed by handle.
#[derive(Default)]
pub struct ChartJsSurface {
    next_handle: u64,
}

impl ChartSurface for ChartJsSurface {
    fn create(&mut self, canvas_id: &str, config: &Value) -> ChartHandle {
        self.next_handle += 1;
        let handle = ChartHandle(self.next_handle);
        let _ = document::eval(&create_chart_script(handle, canvas_id, config));
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        let _ = document::eval(&destroy_chart_script(handle));
    }
}

#[component]
pub fn FiscalDashboard(state: Signal<DashboardState>) -> Element {
    let backend = use_context::<SharedBackend>();
    let mut charts = use_signal(|| FiscalCharts::new(ChartJsSurface::default()));
    let revision = use_memo(move || state.read().fiscal_revision());
    let mut state = state;

    use_effect(move || {
        let revision = revision();
        if revision == 0 {
            return;
        }
        tracing::debug!(revision, "loading fiscal data");
        charts.write().begin_load();
        let backend = backend.clone();
        spawn(async move {
            let outcome = backend.fiscal_data().await;
            charts.write().finish_load(outcome);
        });
    });

    let panel = charts.read().panel();
    let loading_class = if panel.shows_loading() {
        "fiscal-loading"
    } else {
        "fiscal-loading hidden"
    };
    let error_class = if panel.shows_error() {
        "fiscal-error"
    } else {
        "fiscal-error hidden"
    };
    let charts_class = if panel.shows_charts() {
        "chart-grid"
    } else {
        "chart-grid hidden"
    };

    rsx! {
        div { class: "card fiscal-card",
            h2 { "Dashboard fiscal" }
            div { class: loading_class, aria_hidden: (!panel.shows_loading()).to_string(),
                div { class: "spinner" }
                "Carregando dados fiscais..."
            }
            div { class: error_class, aria_hidden: (!panel.shows_error()).to_string(),
                p { "Não foi possível carregar os dados fiscais." }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| {
                        state.write().activate_screen(FISCAL_SCREEN_ID);
                    },
                    "Tentar novamente"
                }
            }
            div { class: charts_class, aria_hidden: (!panel.shows_charts()).to_string(),
                for kind in ChartKind::ALL {
                    ChartCard { key: "{kind:?}", kind }
                }
            }
        }
    }
}

#[component]
fn ChartCard(kind: ChartKind) -> Element {
    let title = kind.title();
    let canvas_id = kind.canvas_id();
    rsx! {
        div { class: "chart-card",
            h3 { "{title}" }
            canvas { id: canvas_id }
        }
    }
}
