//! Dashboard screens: the static registry, the composition of content
//! sections into screens, and the tab controller that tracks which screen
//! is visible.

use crate::storage::{ACTIVE_SCREEN_KEY, KeyValueStore};
use std::collections::HashSet;

pub const FISCAL_SCREEN_ID: &str = "fiscal-dashboard";
pub const UPLOAD_SCREEN_ID: &str = "uploads";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub section_ids: &'static [&'static str],
    pub description: Option<&'static str>,
}

/// To add a tab, append a descriptor here. The first entry is the default.
pub const DASHBOARD_SCREENS: &[ScreenDescriptor] = &[
    ScreenDescriptor {
        id: "overview",
        label: "Painel Geral",
        section_ids: &["empresaInfo", "dashboardMetrics"],
        description: Some("Resumo executivo com indicadores principais."),
    },
    ScreenDescriptor {
        id: FISCAL_SCREEN_ID,
        label: "Dashboard Fiscal",
        section_ids: &["fiscalDashboard"],
        description: Some(
            "Visualização estratégica de impostos e classificação de notas fiscais.",
        ),
    },
    ScreenDescriptor {
        id: UPLOAD_SCREEN_ID,
        label: "Envio de Documentos",
        section_ids: &["upload"],
        description: Some("Área de upload de notas fiscais e acompanhamento de status."),
    },
    ScreenDescriptor {
        id: "chat",
        label: "Chat IA Fiscal",
        section_ids: &["chatSection"],
        description: Some(
            "Converse com o agente fiscal para esclarecer dúvidas e obter insights.",
        ),
    },
];

/// Content blocks a screen can be composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionId {
    CompanyInfo,
    Metrics,
    FiscalCharts,
    Upload,
    Chat,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::CompanyInfo,
        SectionId::Metrics,
        SectionId::FiscalCharts,
        SectionId::Upload,
        SectionId::Chat,
    ];

    pub fn dom_id(self) -> &'static str {
        match self {
            SectionId::CompanyInfo => "empresaInfo",
            SectionId::Metrics => "dashboardMetrics",
            SectionId::FiscalCharts => "fiscalDashboard",
            SectionId::Upload => "upload",
            SectionId::Chat => "chatSection",
        }
    }

    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.dom_id() == id)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("screen registry is empty")]
    EmptyRegistry,

    #[error("duplicate screen id `{0}`")]
    DuplicateId(String),

    #[error("unknown screen `{0}`")]
    UnknownScreen(String),
}

pub fn validate_registry(registry: &[ScreenDescriptor]) -> Result<(), ScreenError> {
    if registry.is_empty() {
        return Err(ScreenError::EmptyRegistry);
    }
    let mut seen = HashSet::new();
    for screen in registry {
        if !seen.insert(screen.id) {
            return Err(ScreenError::DuplicateId(screen.id.to_string()));
        }
    }
    Ok(())
}

pub fn default_screen_id(registry: &[ScreenDescriptor]) -> Option<&'static str> {
    registry.first().map(|screen| screen.id)
}

// ============================================
// Composition
// ============================================

#[derive(Clone, Debug, PartialEq)]
pub struct ComposedScreen {
    pub id: &'static str,
    pub sections: Vec<SectionId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TabControl {
    pub screen_id: &'static str,
    pub label: &'static str,
    pub title: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ScreenLayout {
    pub screens: Vec<ComposedScreen>,
    pub tabs: Vec<TabControl>,
    /// Section ids a screen asked for that are not available.
    pub missing: Vec<&'static str>,
    /// Available sections no screen references; they are never shown.
    pub orphaned: Vec<SectionId>,
}

/// Build one container and one tab per registry entry, moving each available
/// section into the screen that lists it, in declared order.
///
/// Missing or orphaned sections are configuration mistakes: they are logged
/// and reported on the layout but never fail the build.
pub fn compose_screens(registry: &[ScreenDescriptor], available: &[SectionId]) -> ScreenLayout {
    let mut layout = ScreenLayout::default();
    let mut placed: HashSet<SectionId> = HashSet::new();

    for screen in registry {
        let mut sections = Vec::with_capacity(screen.section_ids.len());
        for &section_id in screen.section_ids {
            let resolved = SectionId::from_dom_id(section_id)
                .filter(|section| available.contains(section))
                // a section lives in exactly one container
                .filter(|section| !placed.contains(section));
            match resolved {
                Some(section) => {
                    placed.insert(section);
                    sections.push(section);
                }
                None => {
                    tracing::warn!(screen = screen.id, section_id, "section not found for screen");
                    layout.missing.push(section_id);
                }
            }
        }

        layout.screens.push(ComposedScreen {
            id: screen.id,
            sections,
        });
        layout.tabs.push(TabControl {
            screen_id: screen.id,
            label: screen.label,
            title: screen.description,
        });
    }

    for section in available {
        if !placed.contains(section) && !layout.orphaned.contains(section) {
            tracing::warn!(section = section.dom_id(), "section is not referenced by any screen");
            layout.orphaned.push(*section);
        }
    }

    layout
}

// ============================================
// Tab controller
// ============================================

/// Data load a screen needs when it becomes active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenLoad {
    FiscalData,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TabController {
    registry: &'static [ScreenDescriptor],
    active: &'static str,
}

impl TabController {
    /// Start on the persisted screen when it still exists, otherwise on the
    /// registry default.
    pub fn restore(
        registry: &'static [ScreenDescriptor],
        store: &dyn KeyValueStore,
    ) -> Result<Self, ScreenError> {
        validate_registry(registry)?;
        let stored = store.get(ACTIVE_SCREEN_KEY);
        let active = stored
            .as_deref()
            .and_then(|id| Self::lookup(registry, id))
            .or_else(|| default_screen_id(registry))
            .ok_or(ScreenError::EmptyRegistry)?;
        Ok(Self { registry, active })
    }

    pub fn active(&self) -> &'static str {
        self.active
    }

    pub fn is_active(&self, screen_id: &str) -> bool {
        self.active == screen_id
    }

    pub fn registry(&self) -> &'static [ScreenDescriptor] {
        self.registry
    }

    /// Switch to `screen_id`. Unknown ids leave the current screen in place.
    pub fn activate(
        &mut self,
        screen_id: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<Option<ScreenLoad>, ScreenError> {
        let Some(target) = Self::lookup(self.registry, screen_id) else {
            tracing::warn!(screen_id, "screen is not configured");
            return Err(ScreenError::UnknownScreen(screen_id.to_string()));
        };

        self.active = target;
        store.write(ACTIVE_SCREEN_KEY, Some(target));
        tracing::debug!(screen = target, "screen activated");

        Ok(Self::load_for(target))
    }

    /// Load the active screen needs right after startup.
    pub fn initial_load(&self) -> Option<ScreenLoad> {
        Self::load_for(self.active)
    }

    fn load_for(screen_id: &str) -> Option<ScreenLoad> {
        (screen_id == FISCAL_SCREEN_ID).then_some(ScreenLoad::FiscalData)
    }

    fn lookup(registry: &[ScreenDescriptor], id: &str) -> Option<&'static str> {
        registry
            .iter()
            .find(|screen| screen.id == id)
            .map(|screen| screen.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn registry_is_valid_and_defaults_to_overview() {
        assert!(validate_registry(DASHBOARD_SCREENS).is_ok());
        assert_eq!(default_screen_id(DASHBOARD_SCREENS), Some("overview"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        const DUP: &[ScreenDescriptor] = &[
            ScreenDescriptor {
                id: "a",
                label: "A",
                section_ids: &[],
                description: None,
            },
            ScreenDescriptor {
                id: "a",
                label: "A again",
                section_ids: &[],
                description: None,
            },
        ];
        assert_eq!(
            validate_registry(DUP),
            Err(ScreenError::DuplicateId("a".to_string()))
        );
        assert_eq!(validate_registry(&[]), Err(ScreenError::EmptyRegistry));
    }

    #[test]
    fn composes_one_screen_and_tab_per_descriptor() {
        let layout = compose_screens(DASHBOARD_SCREENS, &SectionId::ALL);
        assert_eq!(layout.screens.len(), DASHBOARD_SCREENS.len());
        assert_eq!(layout.tabs.len(), DASHBOARD_SCREENS.len());
        assert_eq!(
            layout.screens[0].sections,
            vec![SectionId::CompanyInfo, SectionId::Metrics]
        );
        assert_eq!(layout.tabs[1].label, "Dashboard Fiscal");
        assert!(layout.tabs[1].title.is_some());
        assert!(layout.missing.is_empty());
        assert!(layout.orphaned.is_empty());
    }

    #[test]
    fn missing_sections_are_skipped() {
        let layout = compose_screens(DASHBOARD_SCREENS, &[SectionId::Chat]);
        assert_eq!(layout.screens.len(), 4);
        assert!(layout.screens[0].sections.is_empty());
        assert_eq!(layout.screens[3].sections, vec![SectionId::Chat]);
        assert!(layout.missing.contains(&"empresaInfo"));
        assert!(layout.missing.contains(&"upload"));
    }

    #[test]
    fn unreferenced_sections_are_orphaned() {
        const ONLY_CHAT: &[ScreenDescriptor] = &[ScreenDescriptor {
            id: "chat",
            label: "Chat",
            section_ids: &["chatSection"],
            description: None,
        }];
        let layout = compose_screens(ONLY_CHAT, &[SectionId::Chat, SectionId::Upload]);
        assert_eq!(layout.orphaned, vec![SectionId::Upload]);
        assert_eq!(layout.screens[0].sections, vec![SectionId::Chat]);
    }

    #[test]
    fn restore_falls_back_to_default_for_unknown_id() {
        let mut store = MemoryStore::new();
        store.set(ACTIVE_SCREEN_KEY, "removed-screen").unwrap();
        let tabs = TabController::restore(DASHBOARD_SCREENS, &store).unwrap();
        assert_eq!(tabs.active(), "overview");

        store.set(ACTIVE_SCREEN_KEY, "chat").unwrap();
        let tabs = TabController::restore(DASHBOARD_SCREENS, &store).unwrap();
        assert_eq!(tabs.active(), "chat");
    }

    #[test]
    fn activation_persists_and_requests_fiscal_load() {
        let mut store = MemoryStore::new();
        let mut tabs = TabController::restore(DASHBOARD_SCREENS, &store).unwrap();

        assert_eq!(tabs.activate("uploads", &mut store), Ok(None));
        assert_eq!(store.get(ACTIVE_SCREEN_KEY), Some("uploads".to_string()));

        assert_eq!(
            tabs.activate(FISCAL_SCREEN_ID, &mut store),
            Ok(Some(ScreenLoad::FiscalData))
        );
        assert!(tabs.is_active(FISCAL_SCREEN_ID));
        assert_eq!(tabs.initial_load(), Some(ScreenLoad::FiscalData));
    }

    #[test]
    fn unknown_screen_keeps_current_state() {
        let mut store = MemoryStore::new();
        let mut tabs = TabController::restore(DASHBOARD_SCREENS, &store).unwrap();
        tabs.activate("chat", &mut store).unwrap();

        let result = tabs.activate("nope", &mut store);
        assert_eq!(result, Err(ScreenError::UnknownScreen("nope".to_string())));
        assert_eq!(tabs.active(), "chat");
        assert_eq!(store.get(ACTIVE_SCREEN_KEY), Some("chat".to_string()));
    }
}
