//! Root application state: everything the dashboard shares across views,
//! owned in one place and changed only through these methods.

use crate::credentials::CredentialManager;
use crate::screens::{
    DASHBOARD_SCREENS, ScreenDescriptor, ScreenError, ScreenLayout, ScreenLoad, SectionId,
    TabController, compose_screens, validate_registry,
};
use crate::storage::KeyValueStore;

pub struct DashboardState {
    store: Box<dyn KeyValueStore>,
    tabs: TabController,
    credentials: CredentialManager,
    layout: ScreenLayout,
    /// Bumped whenever metrics and company data must be fetched again.
    data_revision: u64,
    /// Bumped whenever the fiscal charts must be fetched again.
    fiscal_revision: u64,
    credential_revision: u64,
}

impl DashboardState {
    pub fn new(store: Box<dyn KeyValueStore>) -> Result<Self, ScreenError> {
        Self::with_registry(DASHBOARD_SCREENS, store)
    }

    pub fn with_registry(
        registry: &'static [ScreenDescriptor],
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, ScreenError> {
        validate_registry(registry)?;
        let tabs = TabController::restore(registry, store.as_ref())?;
        let credentials = CredentialManager::restore(store.as_ref());
        let layout = compose_screens(registry, &SectionId::ALL);

        let mut state = Self {
            store,
            tabs,
            credentials,
            layout,
            data_revision: 0,
            fiscal_revision: 0,
            credential_revision: 0,
        };
        if state.tabs.initial_load().is_some() {
            state.fiscal_revision += 1;
        }
        tracing::info!(
            screen = state.tabs.active(),
            primary_key = state.credentials.is_primary_active(),
            "dashboard state restored"
        );
        Ok(state)
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut CredentialManager {
        &mut self.credentials
    }

    pub fn data_revision(&self) -> u64 {
        self.data_revision
    }

    pub fn fiscal_revision(&self) -> u64 {
        self.fiscal_revision
    }

    pub fn credential_revision(&self) -> u64 {
        self.credential_revision
    }

    /// Switch screens. Unknown ids are logged and leave the current screen
    /// active.
    pub fn activate_screen(&mut self, screen_id: &str) -> bool {
        match self.tabs.activate(screen_id, self.store.as_mut()) {
            Ok(Some(ScreenLoad::FiscalData)) => {
                self.fiscal_revision += 1;
                true
            }
            Ok(None) => true,
            Err(err) => {
                tracing::warn!("screen change refused: {err}");
                false
            }
        }
    }

    pub fn activate_keys(&mut self, primary: &str, secondary: &str) {
        self.credentials
            .activate(primary, secondary, self.store.as_mut());
        self.credential_revision += 1;
    }

    /// Uploaded documents change every aggregate the dashboard shows.
    pub fn documents_changed(&mut self) {
        self.data_revision += 1;
        self.fiscal_revision += 1;
    }

    pub fn company_changed(&mut self) {
        self.data_revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::FISCAL_SCREEN_ID;
    use crate::storage::{ACTIVE_SCREEN_KEY, MemoryStore, PRIMARY_KEY_NAME};

    #[test]
    fn starts_on_stored_screen_and_requests_charts() {
        let mut store = MemoryStore::new();
        store.set(ACTIVE_SCREEN_KEY, FISCAL_SCREEN_ID).unwrap();
        store.set(PRIMARY_KEY_NAME, "gemini").unwrap();

        let state = DashboardState::new(Box::new(store)).unwrap();
        assert_eq!(state.tabs().active(), FISCAL_SCREEN_ID);
        assert_eq!(state.fiscal_revision(), 1);
        assert!(state.credentials().is_primary_active());
        assert!(state.layout().orphaned.is_empty());
    }

    #[test]
    fn unknown_screen_is_refused() {
        let mut state = DashboardState::new(Box::new(MemoryStore::new())).unwrap();
        assert!(!state.activate_screen("nope"));
        assert_eq!(state.tabs().active(), "overview");
        assert_eq!(state.fiscal_revision(), 0);
    }

    #[test]
    fn upload_success_bumps_both_revisions() {
        let mut state = DashboardState::new(Box::new(MemoryStore::new())).unwrap();
        state.documents_changed();
        assert_eq!(state.data_revision(), 1);
        assert_eq!(state.fiscal_revision(), 1);
    }
}
