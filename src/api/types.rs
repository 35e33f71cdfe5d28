use super::error::ApiError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Preencha CNPJ e senha.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthForm {
    pub cnpj: String,
    pub senha: String,
}

impl AuthForm {
    /// Both fields are required; nothing is sent otherwise.
    pub fn new(cnpj: &str, senha: &str) -> Result<Self, ApiError> {
        let cnpj = cnpj.trim();
        if cnpj.is_empty() || senha.is_empty() {
            return Err(ApiError::Validation(MISSING_CREDENTIALS_MESSAGE.to_string()));
        }
        Ok(Self {
            cnpj: cnpj.to_string(),
            senha: senha.to_string(),
        })
    }
}

/// Generic `{mensagem}` acknowledgement.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub mensagem: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub nome: Option<String>,
    pub regime: Option<String>,
    pub natureza: Option<String>,
    pub rbt12: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardMetrics {
    pub faturamento_total: f64,
    pub num_notas: u64,
    pub ticket_medio: f64,
    pub num_clientes: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FiscalData {
    #[serde(default)]
    pub classificacao: Vec<Classification>,
    #[serde(default, rename = "impostosConsolidados")]
    pub consolidated: TaxTotals,
    #[serde(default, rename = "impostosPorNota")]
    pub per_document: Vec<DocumentTaxes>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Classification {
    #[serde(default, deserialize_with = "string_or_number")]
    pub nota: String,
    /// Empty when the note has no operation type yet.
    #[serde(default, deserialize_with = "string_or_number")]
    pub tipo: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaxTotals {
    #[serde(rename = "ICMS", deserialize_with = "number_or_zero")]
    pub icms: f64,
    #[serde(rename = "PIS", deserialize_with = "number_or_zero")]
    pub pis: f64,
    #[serde(rename = "COFINS", deserialize_with = "number_or_zero")]
    pub cofins: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DocumentTaxes {
    #[serde(default, deserialize_with = "string_or_number")]
    pub nota: String,
    #[serde(flatten)]
    pub taxes: TaxTotals,
}

/// One file selected for upload, already read into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
    pub api_key: String,
    pub tavily_key: Option<String>,
}

/// Per-file outcome reported by `/api/process-documents`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadItem {
    pub arquivo: Option<String>,
    #[serde(deserialize_with = "optional_string_or_number")]
    pub nota: Option<String>,
    #[serde(deserialize_with = "optional_string_or_number")]
    pub status: Option<String>,
}

/// Accepts either a bare array of items or `{ "result": [...] }`; anything
/// else is treated as an empty result.
pub fn parse_upload_items(value: Value) -> Vec<UploadItem> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).unwrap_or_else(|err| {
                tracing::warn!("unexpected upload item shape: {err}");
                UploadItem::default()
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    pub pergunta: String,
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Sent as an empty string when no search key is active.
    #[serde(rename = "tavilyKey")]
    pub tavily_key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub resposta: Option<String>,
    pub erro: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatStats {
    pub total_messages: u64,
    pub user_messages: u64,
    pub model_messages: u64,
    pub mensagem: Option<String>,
}

fn value_to_label(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_label(value).unwrap_or_default())
}

/// Null, missing or non-numeric amounts count as zero.
fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64().unwrap_or_default(),
        Value::String(text) => text.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_label(value).filter(|text| !text.is_empty()))
}
