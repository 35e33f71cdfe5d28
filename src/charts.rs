//! Fiscal charts: panel visibility, chart lifecycle and the Chart.js
//! configurations built from `/api/fiscal_data`.

use crate::api::{ApiError, FiscalData, TaxTotals};
use crate::theme::{self, AXIS_TEXT, AXIS_TEXT_MUTED, GRID_LINE};
use serde_json::{Value, json};

/// Which of the mutually exclusive panels is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FiscalPanel {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Charts,
    Error,
}

impl FiscalPanel {
    pub fn shows_loading(self) -> bool {
        matches!(self, FiscalPanel::Loading)
    }

    pub fn shows_charts(self) -> bool {
        matches!(self, FiscalPanel::Charts)
    }

    pub fn shows_error(self) -> bool {
        matches!(self, FiscalPanel::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Classification,
    ConsolidatedTaxes,
    TaxesPerDocument,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::Classification,
        ChartKind::ConsolidatedTaxes,
        ChartKind::TaxesPerDocument,
    ];

    pub fn canvas_id(self) -> &'static str {
        match self {
            ChartKind::Classification => "classificacaoChart",
            ChartKind::ConsolidatedTaxes => "impostosConsolidadosChart",
            ChartKind::TaxesPerDocument => "impostosPorNotaChart",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Classification => "Classificação das notas",
            ChartKind::ConsolidatedTaxes => "Impostos consolidados",
            ChartKind::TaxesPerDocument => "Impostos por nota fiscal",
        }
    }

    fn slot(self) -> usize {
        match self {
            ChartKind::Classification => 0,
            ChartKind::ConsolidatedTaxes => 1,
            ChartKind::TaxesPerDocument => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Whatever actually draws charts (Chart.js in the browser, a recorder in tests).
pub trait ChartSurface {
    fn create(&mut self, canvas_id: &str, config: &Value) -> ChartHandle;

    fn destroy(&mut self, handle: ChartHandle);
}

/// The three fiscal charts plus the panel state around them.
pub struct FiscalCharts<S: ChartSurface> {
    surface: S,
    slots: [Option<ChartHandle>; 3],
    panel: FiscalPanel,
}

impl<S: ChartSurface> FiscalCharts<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            slots: [None; 3],
            panel: FiscalPanel::Idle,
        }
    }

    pub fn panel(&self) -> FiscalPanel {
        self.panel
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn live_instances(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn handle(&self, kind: ChartKind) -> Option<ChartHandle> {
        self.slots[kind.slot()]
    }

    pub fn begin_load(&mut self) {
        self.panel = FiscalPanel::Loading;
    }

    /// Loads are not cancelled; every completion is applied as it arrives.
    pub fn finish_load(&mut self, outcome: Result<FiscalData, ApiError>) {
        match outcome {
            Ok(data) => {
                tracing::debug!(
                    notes = data.classificacao.len(),
                    documents = data.per_document.len(),
                    "rendering fiscal charts"
                );
                self.panel = FiscalPanel::Charts;
                self.render(&data);
            }
            Err(err) => {
                tracing::error!("failed to load fiscal data: {err}");
                self.panel = FiscalPanel::Error;
            }
        }
    }

    fn render(&mut self, data: &FiscalData) {
        for kind in ChartKind::ALL {
            let config = chart_config(kind, data);
            let slot = &mut self.slots[kind.slot()];
            // never let an old instance outlive its replacement
            if let Some(previous) = slot.take() {
                self.surface.destroy(previous);
            }
            *slot = Some(self.surface.create(kind.canvas_id(), &config));
        }
    }
}

// ============================================
// Chart configurations
// ============================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassificationCounts {
    pub entrada: usize,
    pub saida: usize,
}

pub fn classification_counts(data: &FiscalData) -> ClassificationCounts {
    let mut counts = ClassificationCounts::default();
    for note in &data.classificacao {
        match note.tipo.trim().to_lowercase().replace('í', "i").as_str() {
            "entrada" => counts.entrada += 1,
            "saida" => counts.saida += 1,
            other => tracing::debug!(tipo = other, "unclassified note type"),
        }
    }
    counts
}

pub fn chart_config(kind: ChartKind, data: &FiscalData) -> Value {
    match kind {
        ChartKind::Classification => classification_config(classification_counts(data)),
        ChartKind::ConsolidatedTaxes => consolidated_config(&data.consolidated),
        ChartKind::TaxesPerDocument => per_document_config(data),
    }
}

fn classification_config(counts: ClassificationCounts) -> Value {
    json!({
        "type": "doughnut",
        "data": {
            "labels": ["Entrada", "Saída"],
            "datasets": [{
                "data": [counts.entrada, counts.saida],
                "backgroundColor": [theme::GREEN.fill, theme::BLUE.fill],
                "borderColor": [theme::GREEN.border, theme::BLUE.border],
                "borderWidth": 2
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": true,
            "plugins": {
                "legend": {
                    "position": "bottom",
                    "labels": { "color": AXIS_TEXT, "font": { "size": 14 }, "padding": 15 }
                }
            }
        },
        "tooltipFormat": "notes"
    })
}

fn currency_axis(stacked: bool) -> Value {
    json!({
        "stacked": stacked,
        "beginAtZero": true,
        "ticks": { "color": AXIS_TEXT_MUTED },
        "grid": { "color": GRID_LINE }
    })
}

fn consolidated_config(totals: &TaxTotals) -> Value {
    json!({
        "type": "bar",
        "data": {
            "labels": ["ICMS", "PIS", "COFINS"],
            "datasets": [{
                "label": "Valor Total (R$)",
                "data": [totals.icms, totals.pis, totals.cofins],
                "backgroundColor": [theme::BLUE.fill, theme::GREEN.fill, theme::PURPLE.fill],
                "borderColor": [theme::BLUE.border, theme::GREEN.border, theme::PURPLE.border],
                "borderWidth": 2
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": true,
            "plugins": { "legend": { "display": false } },
            "scales": {
                "y": currency_axis(false),
                "x": {
                    "ticks": { "color": AXIS_TEXT, "font": { "size": 13, "weight": "600" } },
                    "grid": { "display": false }
                }
            }
        },
        "tooltipFormat": "currency"
    })
}

fn per_document_config(data: &FiscalData) -> Value {
    let labels: Vec<&str> = data.per_document.iter().map(|doc| doc.nota.as_str()).collect();
    let series = |pick: fn(&TaxTotals) -> f64| -> Vec<f64> {
        data.per_document.iter().map(|doc| pick(&doc.taxes)).collect()
    };
    let dataset = |label: &str, values: Vec<f64>, color: &theme::ChartColor| {
        json!({
            "label": label,
            "data": values,
            "backgroundColor": color.fill,
            "borderColor": color.border,
            "borderWidth": 2
        })
    };

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [
                dataset("ICMS", series(|t| t.icms), &theme::BLUE),
                dataset("PIS", series(|t| t.pis), &theme::GREEN),
                dataset("COFINS", series(|t| t.cofins), &theme::PURPLE),
            ]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": true,
            "plugins": {
                "legend": {
                    "position": "bottom",
                    "labels": { "color": AXIS_TEXT, "font": { "size": 13 }, "padding": 12 }
                }
            },
            "scales": {
                "y": currency_axis(true),
                "x": {
                    "stacked": true,
                    "ticks": { "color": AXIS_TEXT, "font": { "size": 11 } },
                    "grid": { "display": false }
                }
            }
        },
        "tooltipFormat": "currency"
    })
}

// ============================================
// Chart.js scripts
// ============================================

const CHART_JS_RETRIES: u32 = 50;
const CHART_JS_RETRY_MS: u32 = 100;

/// Script that builds a Chart.js instance on `canvas_id` and keeps it under
/// `handle`. `tooltipFormat` in the config selects the label callbacks, which
/// cannot travel as JSON. Creation waits for Chart.js to load.
pub fn create_chart_script(handle: ChartHandle, canvas_id: &str, config: &Value) -> String {
    format!(
        r#"(function() {{
    'use strict';
    const registry = window.__fiscalCharts = window.__fiscalCharts || {{}};
    const brl = (value) => 'R$ ' + Number(value || 0).toLocaleString('pt-BR', {{ minimumFractionDigits: 2, maximumFractionDigits: 2 }});
    const build = (tries) => {{
        if (registry[{handle}] === null) {{
            delete registry[{handle}];
            return;
        }}
        const canvas = document.getElementById({canvas});
        if (!canvas || typeof Chart === 'undefined') {{
            if (tries > 0) {{
                setTimeout(() => build(tries - 1), {retry_ms});
            }} else {{
                console.warn('[fiscal] chart canvas or Chart.js missing:', {canvas});
            }}
            return;
        }}
        const stale = Chart.getChart(canvas);
        if (stale) {{
            stale.destroy();
        }}
        const config = {config};
        const format = config.tooltipFormat;
        delete config.tooltipFormat;
        config.options = config.options || {{}};
        config.options.plugins = config.options.plugins || {{}};
        if (format === 'currency') {{
            config.options.plugins.tooltip = {{ callbacks: {{ label: (ctx) => (ctx.dataset.label ? ctx.dataset.label + ': ' : 'Total: ') + brl(ctx.parsed.y) }} }};
            if (config.options.scales && config.options.scales.y) {{
                config.options.scales.y.ticks.callback = (value) => 'R$ ' + Number(value).toLocaleString('pt-BR');
            }}
        }} else if (format === 'notes') {{
            config.options.plugins.tooltip = {{ callbacks: {{ label: (ctx) => {{
                const total = ctx.dataset.data.reduce((a, b) => a + b, 0);
                const pct = total > 0 ? ((ctx.parsed / total) * 100).toFixed(1) : 0;
                return `${{ctx.label}}: ${{ctx.parsed}} notas (${{pct}}%)`;
            }} }} }};
        }}
        registry[{handle}] = new Chart(canvas, config);
    }};
    build({retries});
}})();"#,
        canvas = Value::String(canvas_id.to_string()),
        config = config,
        handle = handle.0,
        retries = CHART_JS_RETRIES,
        retry_ms = CHART_JS_RETRY_MS,
    )
}

/// Destroys the instance under `handle`, or cancels its pending creation.
pub fn destroy_chart_script(handle: ChartHandle) -> String {
    format!(
        r#"(function() {{
    const registry = window.__fiscalCharts = window.__fiscalCharts || {{}};
    const chart = registry[{handle}];
    if (chart) {{
        chart.destroy();
        delete registry[{handle}];
    }} else {{
        registry[{handle}] = null;
    }}
}})();"#,
        handle = handle.0,
    )
}
