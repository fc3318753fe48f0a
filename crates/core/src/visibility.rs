//! Per-company module visibility.
//!
//! A fixed set of modules can be hidden or shown per company. A module with no
//! stored row is visible (fail-open), unlike role permissions which fail closed.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::CompanyId;

/// A visibility-togglable module known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownModule {
    pub name: &'static str,
    pub label: &'static str,
}

/// The fixed module set, in display order.
pub const KNOWN_MODULES: [KnownModule; 5] = [
    KnownModule { name: "sales", label: "Sales" },
    KnownModule { name: "inventory", label: "Inventory" },
    KnownModule { name: "finance", label: "Finance" },
    KnownModule { name: "reports", label: "Reports" },
    KnownModule { name: "customers", label: "Customers" },
];

/// Label of a known module, if `name` belongs to the fixed set.
pub fn module_label(name: &str) -> Option<&'static str> {
    KNOWN_MODULES.iter().find(|m| m.name == name).map(|m| m.label)
}

/// Stored row (`company_module_visibility`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyModuleVisibility {
    pub company_id: CompanyId,
    pub module_name: String,
    pub visible: bool,
}

/// Visibility entry as edited and saved by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleVisibility {
    pub module_name: String,
    pub visible: bool,
}

impl ModuleVisibility {
    pub fn new(module_name: impl Into<String>, visible: bool) -> Self {
        Self {
            module_name: module_name.into(),
            visible,
        }
    }

    pub fn into_row(self, company_id: CompanyId) -> CompanyModuleVisibility {
        CompanyModuleVisibility {
            company_id,
            module_name: self.module_name,
            visible: self.visible,
        }
    }
}

impl From<CompanyModuleVisibility> for ModuleVisibility {
    fn from(row: CompanyModuleVisibility) -> Self {
        Self {
            module_name: row.module_name,
            visible: row.visible,
        }
    }
}

/// In-memory visibility list for one company (the editing buffer).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilitySettings {
    entries: Vec<ModuleVisibility>,
}

impl VisibilitySettings {
    /// Every known module, visible.
    pub fn defaults() -> Self {
        Self {
            entries: KNOWN_MODULES
                .iter()
                .map(|m| ModuleVisibility::new(m.name, true))
                .collect(),
        }
    }

    pub fn from_entries(entries: Vec<ModuleVisibility>) -> Self {
        Self { entries }
    }

    /// Set `module_name` to `visible`, appending the module if it was absent.
    pub fn toggle(&mut self, module_name: &str, visible: bool) -> DomainResult<()> {
        let module_name = module_name.trim();
        if module_name.is_empty() {
            return Err(DomainError::validation("module name cannot be empty"));
        }

        match self.entries.iter_mut().find(|e| e.module_name == module_name) {
            Some(entry) => entry.visible = visible,
            None => self.entries.push(ModuleVisibility::new(module_name, visible)),
        }
        Ok(())
    }

    /// Fail-open lookup: an absent module is visible.
    pub fn is_visible(&self, module_name: &str) -> bool {
        self.entries
            .iter()
            .find(|e| e.module_name == module_name)
            .map_or(true, |e| e.visible)
    }

    pub fn entries(&self) -> &[ModuleVisibility] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ModuleVisibility> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_known_modules_visible() {
        let settings = VisibilitySettings::defaults();
        assert_eq!(settings.entries().len(), KNOWN_MODULES.len());
        assert!(settings.entries().iter().all(|e| e.visible));
    }

    #[test]
    fn toggle_updates_existing_entry_in_place() {
        let mut settings = VisibilitySettings::defaults();
        settings.toggle("finance", false).unwrap();

        assert_eq!(settings.entries().len(), 5);
        assert_eq!(settings.entries()[2], ModuleVisibility::new("finance", false));
        assert!(!settings.is_visible("finance"));
    }

    #[test]
    fn toggle_appends_unknown_module() {
        let mut settings = VisibilitySettings::from_entries(vec![]);
        settings.toggle("reports", false).unwrap();
        settings.toggle("sales", true).unwrap();

        assert_eq!(
            settings.entries(),
            &[
                ModuleVisibility::new("reports", false),
                ModuleVisibility::new("sales", true),
            ]
        );
    }

    #[test]
    fn toggle_rejects_blank_names() {
        let mut settings = VisibilitySettings::defaults();
        assert!(settings.toggle("   ", false).is_err());
    }

    #[test]
    fn absent_module_is_visible() {
        let settings =
            VisibilitySettings::from_entries(vec![ModuleVisibility::new("sales", false)]);
        assert!(settings.is_visible("customers"));
        assert!(!settings.is_visible("sales"));
    }

    #[test]
    fn labels_resolve_for_known_modules_only() {
        assert_eq!(module_label("inventory"), Some("Inventory"));
        assert_eq!(module_label("payroll"), None);
    }
}
