//! The two provider keys the fiscal agent needs: a required Gemini key and an
//! optional Tavily search key. Both are mirrored to persistent storage.

use crate::storage::{KeyValueStore, PRIMARY_KEY_NAME, SECONDARY_KEY_NAME};
use crate::types::{StatusLevel, StatusMessage};

pub const MISSING_PRIMARY_MESSAGE: &str =
    "Informe a chave do Google Gemini para habilitar o processamento.";
pub const ACTIVATE_PRIMARY_HINT: &str =
    "Ative a chave do Google Gemini na barra lateral para liberar o envio.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CredentialManager {
    primary: Option<String>,
    secondary: Option<String>,
    status: Option<StatusMessage>,
}

/// Snapshot of the keys taken when a request is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySnapshot {
    pub primary: String,
    pub secondary: Option<String>,
}

impl CredentialManager {
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let primary = store.get(PRIMARY_KEY_NAME).filter(|key| !key.is_empty());
        // a secondary key without a primary one means nothing
        let secondary = primary
            .as_ref()
            .and_then(|_| store.get(SECONDARY_KEY_NAME))
            .filter(|key| !key.is_empty());
        Self {
            primary,
            secondary,
            status: None,
        }
    }

    /// Replace both keys. An empty primary key clears everything.
    pub fn activate(&mut self, primary: &str, secondary: &str, store: &mut dyn KeyValueStore) {
        let primary = primary.trim();
        let secondary = secondary.trim();

        self.primary = None;
        self.secondary = None;
        store.write(PRIMARY_KEY_NAME, None);
        store.write(SECONDARY_KEY_NAME, None);

        if primary.is_empty() {
            tracing::info!("credentials cleared");
            self.status = Some(StatusMessage::error(MISSING_PRIMARY_MESSAGE));
            return;
        }

        self.primary = Some(primary.to_string());
        store.write(PRIMARY_KEY_NAME, Some(primary));

        if !secondary.is_empty() {
            self.secondary = Some(secondary.to_string());
            store.write(SECONDARY_KEY_NAME, Some(secondary));
        }

        let message = if self.is_secondary_active() {
            "Chaves ativadas! O dashboard usará Gemini e Tavily nos envios."
        } else {
            "Chave Gemini ativada! Os arquivos enviados serão interpretados pelo agente."
        };
        tracing::info!(secondary = self.is_secondary_active(), "credentials activated");
        self.status = Some(StatusMessage::success(message));
    }

    pub fn is_primary_active(&self) -> bool {
        self.primary.is_some()
    }

    pub fn is_secondary_active(&self) -> bool {
        self.primary.is_some() && self.secondary.is_some()
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn secondary(&self) -> Option<&str> {
        self.secondary.as_deref()
    }

    pub fn snapshot(&self) -> Option<KeySnapshot> {
        let primary = self.primary.clone()?;
        Some(KeySnapshot {
            primary,
            secondary: self.secondary.clone(),
        })
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn report(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn hide_status(&mut self) {
        self.status = None;
    }

    pub fn badges(&self) -> [ProviderBadge; 2] {
        [
            ProviderBadge {
                active: self.is_primary_active(),
                text: if self.is_primary_active() {
                    "Google Gemini conectada"
                } else {
                    "Google Gemini"
                },
            },
            ProviderBadge {
                active: self.is_secondary_active(),
                text: if self.is_secondary_active() {
                    "Tavily Search ativa"
                } else {
                    "Tavily Search"
                },
            },
        ]
    }

    /// Banner above the chat; hidden until the primary key is active.
    pub fn chat_banner(&self) -> Option<ActivationBanner> {
        if !self.is_primary_active() {
            return None;
        }
        Some(if self.is_secondary_active() {
            ActivationBanner {
                title: "Ferramentas conectadas!",
                text: "O agente usa dados internos e buscas fiscais em tempo real.",
            }
        } else {
            ActivationBanner {
                title: "Assistente fiscal pronto!",
                text: "O agente usa suas notas fiscais; ative a Tavily para pesquisas na web.",
            }
        })
    }

    /// Banner in the upload section describing what a submit will do.
    pub fn upload_banner(&self) -> StatusMessage {
        match (self.is_primary_active(), self.is_secondary_active()) {
            (true, true) => StatusMessage::success(
                "Chaves ativas! O upload aplicará análise Gemini e pesquisa Tavily.",
            ),
            (true, false) => StatusMessage::success(
                "Chave Gemini ativa. As notas serão processadas com análise fiscal contextual.",
            ),
            _ => StatusMessage::new(StatusLevel::Info, ACTIVATE_PRIMARY_HINT),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderBadge {
    pub active: bool,
    pub text: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationBanner {
    pub title: &'static str,
    pub text: &'static str,
}
