use reqwest::StatusCode;
use serde_json::Value;

/// Everything a call to the fiscal API can fail with.
///
/// Malformed success bodies are not errors: they decode to the payload's
/// default value (see `ApiClient`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// The request never produced a response.
    #[error("falha de conexão: {0}")]
    Transport(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

pub const TRANSPORT_MESSAGE: &str = "Erro na comunicação com o servidor.";

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Text shown inline by the widget that made the call.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(message) | ApiError::Application { message, .. } => {
                message.clone()
            }
            ApiError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Best message from a failing response: `erro`, `error`, `message`, then the
/// status reason, then `fallback`.
pub fn error_message_from_body(body: &str, status: StatusCode, fallback: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let from_body = parsed.as_ref().and_then(|value| {
        ["erro", "error", "message"].iter().find_map(|field| {
            value
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        })
    });

    from_body
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}
