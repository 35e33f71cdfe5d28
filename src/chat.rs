//! Chat widget state. The server owns the conversation; the client only
//! keeps what is on screen.

use crate::api::{ApiError, ChatReply, ChatRequest, ChatStats, TRANSPORT_MESSAGE};
use crate::credentials::CredentialManager;
use crate::types::{ChatMessage, Sender, StatusMessage};
use time::OffsetDateTime;

pub const INTRO_MESSAGE: &str =
    "Olá! Ative as chaves na lateral para conversar com o agente fiscal sobre suas notas.";
pub const THINKING_MESSAGE: &str = "Pensando... (analisando suas notas fiscais)";
pub const ACTIVATE_KEY_MESSAGE: &str =
    "Ative a chave do Google Gemini na barra lateral para conversar.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Escreva uma pergunta antes de enviar.";
pub const CLEARED_MESSAGE: &str =
    "Histórico limpo! Nova conversa iniciada. O agente não lembrará das mensagens anteriores.";
pub const CLEAR_NEEDS_KEY_MESSAGE: &str = "Ative a chave do Google Gemini primeiro.";
pub const CLEAR_CONFIRM_PROMPT: &str = "Limpar histórico da conversa?\n\nIsso apagará toda a memória do chat e o agente não lembrará das mensagens anteriores.";

/// Why `begin_send` did not produce a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendRejected {
    MissingKey,
    EmptyQuestion,
    InFlight,
}

/// An in-flight question: the request to send and the placeholder to
/// replace when it completes.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSend {
    pub request: ChatRequest,
    pub placeholder_id: u64,
}

/// Proof that the user confirmed clearing the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearConfirmed {
    pub api_key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
    sending: bool,
    awaiting_confirmation: bool,
    stats: Option<ChatStats>,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            sending: false,
            awaiting_confirmation: false,
            stats: None,
        }
    }
}

impl ChatLog {
    /// New log; greets with the activation hint while no key is active.
    pub fn new(credentials: &CredentialManager) -> Self {
        let mut log = Self::default();
        if !credentials.is_primary_active() {
            log.push(INTRO_MESSAGE, Sender::Bot);
        }
        log
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    pub fn stats(&self) -> Option<&ChatStats> {
        self.stats.as_ref()
    }

    pub fn set_stats(&mut self, stats: ChatStats) {
        self.stats = Some(stats);
    }

    fn push(&mut self, text: impl Into<String>, sender: Sender) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            text: text.into(),
            sender,
            created_at: Some(OffsetDateTime::now_utc()),
        });
        id
    }

    /// Drop the greeting once the keys are active.
    pub fn dismiss_intro(&mut self) {
        self.messages
            .retain(|msg| !(msg.sender == Sender::Bot && msg.text == INTRO_MESSAGE));
    }

    /// Validate locally and append the question plus a thinking placeholder.
    /// Rejections append one explanatory bot message and send nothing.
    pub fn begin_send(
        &mut self,
        question: &str,
        credentials: &mut CredentialManager,
    ) -> Result<PendingSend, SendRejected> {
        if self.sending {
            return Err(SendRejected::InFlight);
        }
        let Some(keys) = credentials.snapshot() else {
            credentials.report(StatusMessage::error(
                "Ative a chave do Google Gemini antes de iniciar a conversa.",
            ));
            self.push(ACTIVATE_KEY_MESSAGE, Sender::Bot);
            return Err(SendRejected::MissingKey);
        };
        let question = question.trim();
        if question.is_empty() {
            self.push(EMPTY_QUESTION_MESSAGE, Sender::Bot);
            return Err(SendRejected::EmptyQuestion);
        }

        self.push(question, Sender::User);
        let placeholder_id = self.push(THINKING_MESSAGE, Sender::Bot);
        self.sending = true;

        Ok(PendingSend {
            request: ChatRequest {
                pergunta: question.to_string(),
                api_key: keys.primary,
                tavily_key: keys.secondary.unwrap_or_default(),
            },
            placeholder_id,
        })
    }

    /// Replace the placeholder (if it is still there) with exactly one
    /// message: the reply or a formatted error.
    pub fn finish_send(
        &mut self,
        pending: &PendingSend,
        outcome: Result<ChatReply, ApiError>,
        credentials: &mut CredentialManager,
    ) {
        self.sending = false;
        self.messages.retain(|msg| msg.id != pending.placeholder_id);

        match outcome {
            Ok(ChatReply {
                resposta: Some(reply),
                ..
            }) if !reply.trim().is_empty() => {
                self.push(reply, Sender::Bot);
            }
            Ok(reply) => {
                let message = reply
                    .erro
                    .unwrap_or_else(|| "Sem resposta da IA.".to_string());
                self.push(format!("Erro: {message}"), Sender::Bot);
                credentials.report(StatusMessage::error(message));
            }
            Err(err) if err.is_transport() => {
                tracing::error!("chat request failed: {err}");
                self.push(TRANSPORT_MESSAGE, Sender::Bot);
                credentials.report(StatusMessage::error(
                    "Não foi possível conectar ao servidor. Tente novamente em instantes.",
                ));
            }
            Err(err) => {
                let message = err.user_message();
                self.push(format!("Erro: {message}"), Sender::Bot);
                credentials.report(StatusMessage::error(if message.is_empty() {
                    "Ocorreu um erro ao processar sua pergunta.".to_string()
                } else {
                    message
                }));
            }
        }
    }

    /// First step of clearing: requires the key, then asks for confirmation.
    pub fn request_clear(&mut self, credentials: &CredentialManager) -> bool {
        if !credentials.is_primary_active() {
            self.push(CLEAR_NEEDS_KEY_MESSAGE, Sender::Bot);
            return false;
        }
        self.awaiting_confirmation = true;
        true
    }

    pub fn cancel_clear(&mut self) {
        self.awaiting_confirmation = false;
    }

    pub fn confirm_clear(&mut self, credentials: &CredentialManager) -> Option<ClearConfirmed> {
        if !self.awaiting_confirmation {
            return None;
        }
        self.awaiting_confirmation = false;
        let api_key = credentials.primary()?.to_string();
        Some(ClearConfirmed { api_key })
    }

    /// Success wipes the log down to one confirmation; failure keeps it.
    pub fn finish_clear(&mut self, outcome: Result<(), ApiError>) {
        match outcome {
            Ok(()) => {
                tracing::info!("chat history cleared");
                self.messages.clear();
                self.stats = None;
                self.push(CLEARED_MESSAGE, Sender::Bot);
            }
            Err(err) if err.is_transport() => {
                tracing::error!("clearing chat history failed: {err}");
                self.push(TRANSPORT_MESSAGE, Sender::Bot);
            }
            Err(err) => {
                let message = err.user_message();
                let message = if message.is_empty() {
                    "Erro desconhecido".to_string()
                } else {
                    message
                };
                self.push(format!("Erro ao limpar histórico: {message}"), Sender::Bot);
            }
        }
    }
}

pub fn stats_label(stats: &ChatStats) -> String {
    match stats.total_messages {
        0 => "Nenhuma conversa ativa".to_string(),
        1 => "1 mensagem na memória".to_string(),
        n => format!("{n} mensagens na memória"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn active() -> CredentialManager {
        let mut creds = CredentialManager::default();
        creds.activate("g", "t", &mut MemoryStore::new());
        creds
    }

    fn texts(log: &ChatLog) -> Vec<&str> {
        log.messages().iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn intro_only_without_key() {
        assert_eq!(texts(&ChatLog::new(&CredentialManager::default())), vec![INTRO_MESSAGE]);
        assert!(ChatLog::new(&active()).messages().is_empty());

        let mut log = ChatLog::new(&CredentialManager::default());
        log.dismiss_intro();
        assert!(log.messages().is_empty());
    }

    #[test]
    fn empty_question_appends_one_message() {
        let mut creds = active();
        let mut log = ChatLog::new(&creds);
        assert_eq!(log.begin_send("   ", &mut creds), Err(SendRejected::EmptyQuestion));
        assert_eq!(texts(&log), vec![EMPTY_QUESTION_MESSAGE]);
        assert!(!log.is_sending());
    }

    #[test]
    fn missing_key_appends_one_message() {
        let mut creds = CredentialManager::default();
        let mut log = ChatLog::default();
        assert_eq!(log.begin_send("q", &mut creds), Err(SendRejected::MissingKey));
        assert_eq!(texts(&log), vec![ACTIVATE_KEY_MESSAGE]);
        assert!(creds.status().is_some());
    }

    #[test]
    fn reply_replaces_placeholder() {
        let mut creds = active();
        let mut log = ChatLog::new(&creds);
        let pending = log.begin_send(" Qual meu ICMS? ", &mut creds).unwrap();
        assert_eq!(pending.request.pergunta, "Qual meu ICMS?");
        assert_eq!(pending.request.tavily_key, "t");
        assert_eq!(texts(&log), vec!["Qual meu ICMS?", THINKING_MESSAGE]);
        assert!(log.is_sending());
        assert_eq!(log.begin_send("again", &mut creds), Err(SendRejected::InFlight));

        let reply = ChatReply {
            resposta: Some("R$ 10,00".into()),
            erro: None,
        };
        log.finish_send(&pending, Ok(reply), &mut creds);
        assert_eq!(texts(&log), vec!["Qual meu ICMS?", "R$ 10,00"]);
        assert!(!log.is_sending());
    }

    #[test]
    fn missing_placeholder_still_appends_one_result() {
        let mut creds = active();
        let mut log = ChatLog::new(&creds);
        let pending = log.begin_send("q", &mut creds).unwrap();
        log.finish_clear(Ok(()));
        log.finish_send(&pending, Ok(ChatReply::default()), &mut creds);
        assert_eq!(texts(&log), vec![CLEARED_MESSAGE, "Erro: Sem resposta da IA."]);
    }

    #[test]
    fn errors_are_formatted_by_kind() {
        let mut creds = active();
        let mut log = ChatLog::new(&creds);

        let pending = log.begin_send("a", &mut creds).unwrap();
        log.finish_send(
            &pending,
            Err(ApiError::Application {
                status: 400,
                message: "Chave de API inválida.".into(),
            }),
            &mut creds,
        );
        assert_eq!(log.messages().last().unwrap().text, "Erro: Chave de API inválida.");
        assert_eq!(creds.status().unwrap().text, "Chave de API inválida.");

        let pending = log.begin_send("b", &mut creds).unwrap();
        log.finish_send(&pending, Err(ApiError::Transport("reset".into())), &mut creds);
        assert_eq!(log.messages().last().unwrap().text, TRANSPORT_MESSAGE);
        assert!(creds.status().unwrap().text.contains("conectar"));
    }

    #[test]
    fn clear_requires_key_and_confirmation() {
        let creds = CredentialManager::default();
        let mut log = ChatLog::default();
        assert!(!log.request_clear(&creds));
        assert_eq!(texts(&log), vec![CLEAR_NEEDS_KEY_MESSAGE]);

        let creds = active();
        let mut log = ChatLog::default();
        assert!(log.confirm_clear(&creds).is_none());
        assert!(log.request_clear(&creds));
        log.cancel_clear();
        assert!(log.confirm_clear(&creds).is_none());

        assert!(log.request_clear(&creds));
        assert_eq!(
            log.confirm_clear(&creds),
            Some(ClearConfirmed {
                api_key: "g".into()
            })
        );
    }

    #[test]
    fn failed_clear_keeps_log() {
        let mut creds = active();
        let mut log = ChatLog::new(&creds);
        let pending = log.begin_send("q", &mut creds).unwrap();
        log.finish_send(
            &pending,
            Ok(ChatReply {
                resposta: Some("r".into()),
                erro: None,
            }),
            &mut creds,
        );

        log.finish_clear(Err(ApiError::Application {
            status: 500,
            message: "db down".into(),
        }));
        assert_eq!(
            texts(&log),
            vec!["q", "r", "Erro ao limpar histórico: db down"]
        );
    }

    #[test]
    fn stats_labels() {
        let mut stats = ChatStats::default();
        assert_eq!(stats_label(&stats), "Nenhuma conversa ativa");
        stats.total_messages = 4;
        assert_eq!(stats_label(&stats), "4 mensagens na memória");
    }
}
