use crate::api::SharedBackend;
use crate::dashboard::DashboardState;
use crate::format::format_file_size;
use crate::ui::AppRoute;
use crate::upload::{SelectedFile, UploadResult, UploadWidget, read_dropped};
use crate::views::credentials::CredentialSidebar;
use crate::views::shared::{AppHeader, StatusLine};
use dioxus::html::{FileEngine, HasFileData};
use dioxus::prelude::*;
use std::sync::Arc;

const ACCEPTED_TYPES: &str = ".pdf,.xml,.jpg,.jpeg,.png";

async fn read_files(engine: Arc<dyn FileEngine>) -> Vec<SelectedFile> {
    let names = engine.files();
    let contents =
        futures::future::join_all(names.iter().map(|name| engine.read_file(name))).await;

    names
        .into_iter()
        .zip(contents)
        .filter_map(|(name, bytes)| match bytes {
            Some(bytes) => Some(SelectedFile::new(name, bytes)),
            None => {
                tracing::warn!(file = %name, "could not read selected file");
                None
            }
        })
        .collect()
}

/// The browser's own dropped file list, for drops the file engine cannot
/// read.
#[cfg(target_arch = "wasm32")]
fn raw_dropped_files(evt: &DragEvent) -> Option<impl Future<Output = Vec<SelectedFile>>> {
    let data = evt.data();
    let raw = data.downcast::<web_sys::DragEvent>()?;
    let list = raw.data_transfer()?.files()?;
    let files: Vec<web_sys::File> = (0..list.length()).filter_map(|i| list.get(i)).collect();

    Some(async move {
        let mut selected = Vec::with_capacity(files.len());
        for file in files {
            let name = file.name();
            match wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => {
                    selected.push(SelectedFile::new(name, js_sys::Uint8Array::new(&buffer).to_vec()))
                }
                Err(_) => tracing::warn!(file = %name, "could not read dropped file"),
            }
        }
        selected
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn raw_dropped_files(_evt: &DragEvent) -> Option<futures::future::Ready<Vec<SelectedFile>>> {
    None
}

/// Standalone upload page.
#[component]
pub fn UploadPage(route: Signal<AppRoute>, state: Signal<DashboardState>) -> Element {
    rsx! {
        div { class: "app-shell",
            AppHeader { route, current: AppRoute::Upload }
            div { class: "dashboard-body",
                CredentialSidebar { state }
                main { class: "dashboard-main",
                    UploadPanel { state, id_prefix: "standalone" }
                }
            }
        }
    }
}

/// Upload box, preview and results. `id_prefix` keeps DOM ids unique when
/// the panel is mounted in more than one place.
#[component]
pub fn UploadPanel(state: Signal<DashboardState>, id_prefix: &'static str) -> Element {
    let backend = use_context::<SharedBackend>();
    let mut widget = use_signal(UploadWidget::new);
    let credential_revision = use_memo(move || state.read().credential_revision());

    use_effect(move || {
        credential_revision();
        widget.write().refresh_banner();
    });

    let on_pick = move |evt: FormEvent| {
        let Some(engine) = evt.files() else {
            return;
        };
        spawn(async move {
            let files = read_files(engine).await;
            if !widget.write().select(files) {
                tracing::debug!("picked files ignored while sending");
            }
        });
    };

    let on_drop = move |evt: DragEvent| {
        evt.prevent_default();
        if widget.peek().is_submitting() {
            widget.write().set_dragging(false);
            return;
        }
        let primary = evt.files().map(read_files);
        let fallback = raw_dropped_files(&evt);
        if primary.is_none() && fallback.is_none() {
            tracing::warn!("drop carried no file data");
            widget.write().set_dragging(false);
            return;
        }
        spawn(async move {
            let files = read_dropped(primary, fallback).await;
            if !widget.write().accept_drop(files) {
                tracing::debug!("drop ignored");
            }
        });
    };

    let submit = move |_| {
        let request = match widget.write().begin_submit(state.read().credentials()) {
            Ok(request) => request,
            Err(blocked) => {
                tracing::debug!(?blocked, "upload not started");
                return;
            }
        };
        tracing::info!(files = request.files.len(), "submitting documents");
        let backend = backend.clone();
        let mut state = state;
        spawn(async move {
            let outcome = backend.process_documents(request).await;
            let reload = widget
                .write()
                .finish_submit(outcome, state.peek().credentials());
            if reload {
                state.write().documents_changed();
            }
        });
    };

    let credentials = state.read().credentials().clone();
    let current = widget.read();
    let banner = current.banner(&credentials);
    let can_submit = current.can_submit(&credentials);
    let submitting = current.is_submitting();
    let dragging = current.is_dragging();
    let has_selection = current.has_selection();
    let header = current.selection_header();
    let total = format_file_size(current.total_size());
    let previews: Vec<(String, String, String)> = current
        .selection()
        .iter()
        .map(|file| (file.badge(), file.name.clone(), file.display_size()))
        .collect();
    let result = current.result().cloned();
    drop(current);

    let input_id = format!("{id_prefix}-fileInput");
    let drop_class = if dragging {
        "drop-zone dragover"
    } else {
        "drop-zone"
    };

    rsx! {
        div { class: "card upload-card", id: "{id_prefix}-upload",
            h2 { "Envio de documentos fiscais" }
            StatusLine { status: Some(banner) }
            label {
                class: drop_class,
                r#for: "{input_id}",
                ondragover: move |evt: DragEvent| {
                    evt.prevent_default();
                    if !widget.peek().is_dragging() && !widget.peek().is_submitting() {
                        widget.write().set_dragging(true);
                    }
                },
                ondragleave: move |_| widget.write().set_dragging(false),
                ondrop: on_drop,
                span { class: "drop-title", "Arraste notas fiscais aqui" }
                span { class: "drop-hint", "ou clique para selecionar (PDF, XML ou imagem)" }
                input {
                    id: "{input_id}",
                    class: "visually-hidden",
                    r#type: "file",
                    multiple: true,
                    accept: ACCEPTED_TYPES,
                    disabled: submitting,
                    onchange: on_pick,
                }
            }
            if has_selection {
                div { class: "file-preview", id: "{id_prefix}-filePreview",
                    div { class: "file-preview-header",
                        strong { "{header}" }
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            disabled: submitting,
                            onclick: move |_| widget.write().clear(),
                            "Limpar"
                        }
                    }
                    ul { class: "file-list",
                        for (index, (badge, name, size)) in previews.into_iter().enumerate() {
                            li { key: "{index}-{name}", class: "file-item",
                                span { class: "file-badge", "{badge}" }
                                span { class: "file-name", "{name}" }
                                span { class: "file-size", "{size}" }
                            }
                        }
                    }
                    div { class: "file-preview-footer", "Total aproximado: {total}" }
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: !can_submit,
                onclick: submit,
                if submitting { "Enviando..." } else { "Enviar para processamento" }
            }
            if let Some(result) = result {
                UploadResultView { result }
            }
        }
    }
}

#[component]
fn UploadResultView(result: UploadResult) -> Element {
    match result {
        UploadResult::Message(status) => rsx! { StatusLine { status: Some(status) } },
        UploadResult::Summary {
            summary,
            lines,
            has_error,
        } => {
            let class = if has_error {
                "upload-result error"
            } else {
                "upload-result success"
            };
            rsx! {
                div { class: class,
                    strong { "{summary}" }
                    ul {
                        for line in lines {
                            li { class: format_args!("result-line {}", line.status.css_class()),
                                span { class: "result-label", "{line.label}" }
                                span { class: "result-status", "{line.status_text}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
