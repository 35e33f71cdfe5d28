//! Upload widget state: file selection, preview, submit gating and the
//! rendering of per-file processing results.

use crate::api::{ApiError, UploadFile, UploadItem, UploadRequest};
use crate::credentials::{ACTIVATE_PRIMARY_HINT, CredentialManager};
use crate::format::format_file_size;
use crate::types::{StatusLevel, StatusMessage};

pub const NO_FILES_MESSAGE: &str = "Selecione pelo menos um arquivo antes de enviar.";
pub const SENDING_MESSAGE: &str = "Enviando arquivos...";
const GENERIC_BADGE: &str = "ARQ";

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub extension: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            extension: file_extension(&name),
            size_bytes: bytes.len() as u64,
            name,
            bytes,
        }
    }

    pub fn badge(&self) -> String {
        file_badge(&self.name)
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// Lowercased extension, `None` when the name has no usable one.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.trim();
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

pub fn file_badge(name: &str) -> String {
    file_extension(name)
        .map(|ext| ext.to_uppercase())
        .unwrap_or_else(|| GENERIC_BADGE.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Ok,
    Error,
    Info,
}

impl ItemStatus {
    pub fn css_class(self) -> &'static str {
        match self {
            ItemStatus::Ok => "ok",
            ItemStatus::Error => "error",
            ItemStatus::Info => "info",
        }
    }
}

/// Classify free-text status by keywords; failure words win.
pub fn classify_status(status: &str) -> ItemStatus {
    let normalized = status.to_lowercase();
    if normalized.contains("erro") || normalized.contains("falha") {
        ItemStatus::Error
    } else if ["sucesso", "process", "ok"]
        .iter()
        .any(|keyword| normalized.contains(keyword))
    {
        ItemStatus::Ok
    } else {
        ItemStatus::Info
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultLine {
    pub label: String,
    pub status_text: String,
    pub status: ItemStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UploadResult {
    /// Plain status line (sending, blocked, transport or server errors).
    Message(StatusMessage),
    /// Summary of a processed batch.
    Summary {
        summary: String,
        lines: Vec<ResultLine>,
        has_error: bool,
    },
}

impl UploadResult {
    pub fn is_error(&self) -> bool {
        match self {
            UploadResult::Message(message) => message.level == StatusLevel::Error,
            UploadResult::Summary { has_error, .. } => *has_error,
        }
    }
}

fn plural(count: usize, singular: &str) -> String {
    if count > 1 {
        format!("{singular}s")
    } else {
        singular.to_string()
    }
}

pub fn summarize_results(items: &[UploadItem]) -> UploadResult {
    if items.is_empty() {
        return UploadResult::Message(StatusMessage::success("Processamento concluído."));
    }

    let lines: Vec<ResultLine> = items
        .iter()
        .map(|item| {
            let status_text = item
                .status
                .clone()
                .unwrap_or_else(|| "Processado".to_string());
            let label = match (&item.arquivo, &item.nota) {
                (Some(arquivo), Some(nota)) => format!("{arquivo} (NF {nota})"),
                (Some(arquivo), None) => arquivo.clone(),
                (None, Some(nota)) => nota.clone(),
                (None, None) => "Arquivo".to_string(),
            };
            ResultLine {
                label,
                status: classify_status(&status_text),
                status_text,
            }
        })
        .collect();

    let count = items.len();
    UploadResult::Summary {
        summary: format!(
            "{count} {} {}",
            plural(count, "arquivo"),
            plural(count, "processado")
        ),
        has_error: lines.iter().any(|line| line.status == ItemStatus::Error),
        lines,
    }
}

/// Files carried by a drop: the event's file engine first, then the raw
/// dropped list when the engine is missing or yields nothing readable.
pub async fn read_dropped<P, F>(primary: Option<P>, fallback: Option<F>) -> Vec<SelectedFile>
where
    P: Future<Output = Vec<SelectedFile>>,
    F: Future<Output = Vec<SelectedFile>>,
{
    if let Some(primary) = primary {
        let files = primary.await;
        if !files.is_empty() {
            return files;
        }
    }
    match fallback {
        Some(fallback) => {
            tracing::debug!("reading the raw dropped file list");
            fallback.await
        }
        None => Vec::new(),
    }
}

/// Why a submit did not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitBlocked {
    NoFiles,
    MissingKey,
    InFlight,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadWidget {
    selection: Vec<SelectedFile>,
    submitting: bool,
    dragging: bool,
    result: Option<UploadResult>,
    /// Outcome banner that temporarily replaces the key banner.
    banner_override: Option<StatusMessage>,
}

impl UploadWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &[SelectedFile] {
        &self.selection
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn result(&self) -> Option<&UploadResult> {
        self.result.as_ref()
    }

    pub fn total_size(&self) -> u64 {
        self.selection.iter().map(|file| file.size_bytes).sum()
    }

    pub fn selection_header(&self) -> String {
        let count = self.selection.len();
        format!(
            "{count} {} {}",
            plural(count, "arquivo"),
            plural(count, "selecionado")
        )
    }

    pub fn can_submit(&self, credentials: &CredentialManager) -> bool {
        self.has_selection() && credentials.is_primary_active() && !self.submitting
    }

    pub fn banner(&self, credentials: &CredentialManager) -> StatusMessage {
        self.banner_override
            .clone()
            .unwrap_or_else(|| credentials.upload_banner())
    }

    /// Credentials changed; show the key banner again.
    pub fn refresh_banner(&mut self) {
        self.banner_override = None;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Files chosen through the picker replace the selection. The selection
    /// being sent is frozen until the submit finishes.
    pub fn select(&mut self, files: Vec<SelectedFile>) -> bool {
        if self.submitting {
            tracing::debug!(files = files.len(), "selection ignored while sending");
            return false;
        }
        self.selection = files;
        self.result = None;
        true
    }

    /// Files dropped on the box. Empty drops are ignored.
    pub fn accept_drop(&mut self, files: Vec<SelectedFile>) -> bool {
        self.dragging = false;
        if files.is_empty() {
            return false;
        }
        self.select(files)
    }

    pub fn clear(&mut self) {
        if self.submitting {
            return;
        }
        self.selection.clear();
        self.result = None;
    }

    /// Validate and build the request. On success the widget is
    /// `submitting` until `finish_submit`.
    pub fn begin_submit(
        &mut self,
        credentials: &CredentialManager,
    ) -> Result<UploadRequest, SubmitBlocked> {
        if self.submitting {
            return Err(SubmitBlocked::InFlight);
        }
        if self.selection.is_empty() {
            self.result = Some(UploadResult::Message(StatusMessage::info(NO_FILES_MESSAGE)));
            return Err(SubmitBlocked::NoFiles);
        }
        let Some(keys) = credentials.snapshot() else {
            self.result = None;
            self.banner_override = Some(StatusMessage::info(ACTIVATE_PRIMARY_HINT));
            return Err(SubmitBlocked::MissingKey);
        };

        self.submitting = true;
        self.result = Some(UploadResult::Message(StatusMessage::info(SENDING_MESSAGE)));

        Ok(UploadRequest {
            files: self
                .selection
                .iter()
                .map(|file| UploadFile {
                    name: file.name.clone(),
                    bytes: file.bytes.clone(),
                })
                .collect(),
            api_key: keys.primary,
            tavily_key: keys.secondary,
        })
    }

    /// Apply the server outcome. Returns `true` when dependent data
    /// (metrics, fiscal charts) should reload.
    pub fn finish_submit(
        &mut self,
        outcome: Result<Vec<UploadItem>, ApiError>,
        credentials: &CredentialManager,
    ) -> bool {
        self.submitting = false;
        match outcome {
            Ok(items) => {
                tracing::info!(items = items.len(), "upload processed");
                self.result = Some(summarize_results(&items));
                self.banner_override = Some(StatusMessage::success(
                    if credentials.is_secondary_active() {
                        "Upload concluído com Gemini e Tavily ativos."
                    } else {
                        "Upload concluído com análise do Gemini."
                    },
                ));
                self.selection.clear();
                true
            }
            Err(err) if err.is_transport() => {
                tracing::error!("upload failed: {err}");
                self.result = Some(UploadResult::Message(StatusMessage::error(format!(
                    "Erro ao enviar os arquivos: {err}"
                ))));
                self.banner_override = Some(StatusMessage::error(
                    "Erro ao enviar arquivos. Verifique sua conexão e tente novamente.",
                ));
                false
            }
            Err(err) => {
                let message = err.user_message();
                tracing::warn!("upload rejected: {message}");
                self.result = Some(UploadResult::Message(StatusMessage::error(format!(
                    "Erro: {message}"
                ))));
                self.banner_override = Some(StatusMessage::error(message));
                false
            }
        }
    }
}
