//! Per-company module visibility.
//!
//! `save` is a full replace: delete every row of the company, then insert the
//! new list. The two statements are not wrapped in a transaction and there is
//! no version check, so concurrent saves race and the last insert wins. A
//! failed insert after a successful delete leaves the company with no rows,
//! which `load` reports as the defaults.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use adminhub_core::{CompanyId, DomainError, ModuleVisibility, VisibilitySettings};

use crate::store::{StoreError, VisibilityStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("failed to load module visibility: {0}")]
    Load(#[source] StoreError),

    /// Carries the underlying message so it can be shown to the user as is.
    #[error("{0}")]
    Save(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[derive(Clone)]
pub struct ModuleVisibilityService {
    store: Arc<dyn VisibilityStore>,
}

impl ModuleVisibilityService {
    pub fn new(store: Arc<dyn VisibilityStore>) -> Self {
        Self { store }
    }

    /// Stored rows in store order, or every known module (visible) when the
    /// company has none.
    pub async fn load(&self, company_id: CompanyId) -> Result<VisibilitySettings, VisibilityError> {
        let rows = self
            .store
            .company_visibility(company_id)
            .await
            .map_err(VisibilityError::Load)?;

        if rows.is_empty() {
            return Ok(VisibilitySettings::defaults());
        }

        Ok(VisibilitySettings::from_entries(
            rows.into_iter().map(ModuleVisibility::from).collect(),
        ))
    }

    /// Replace the company's rows with `entries`.
    pub async fn save(
        &self,
        company_id: CompanyId,
        entries: &[ModuleVisibility],
    ) -> Result<(), VisibilityError> {
        validate(entries)?;

        let rows: Vec<_> = entries
            .iter()
            .cloned()
            .map(|entry| entry.into_row(company_id))
            .collect();

        let removed = self
            .store
            .delete_company_visibility(company_id)
            .await
            .map_err(|e| VisibilityError::Save(e.to_string()))?;

        self.store
            .insert_company_visibility(&rows)
            .await
            .map_err(|e| {
                tracing::error!(
                    company_id = %company_id,
                    removed,
                    error = %e,
                    "visibility insert failed after delete; company left without rows"
                );
                VisibilityError::Save(e.to_string())
            })?;

        tracing::debug!(
            company_id = %company_id,
            removed,
            inserted = rows.len(),
            "visibility saved"
        );
        Ok(())
    }

    /// Load, flip one module, save. Returns the list that was written.
    pub async fn toggle_and_save(
        &self,
        company_id: CompanyId,
        module_name: &str,
        visible: bool,
    ) -> Result<VisibilitySettings, VisibilityError> {
        let mut settings = self.load(company_id).await?;
        settings.toggle(module_name, visible)?;
        self.save(company_id, settings.entries()).await?;
        Ok(settings)
    }

    /// Fail-open: a module without a row is visible, and so is every module
    /// when the lookup itself fails.
    pub async fn is_visible(&self, company_id: CompanyId, module_name: &str) -> bool {
        match self.store.company_visibility(company_id).await {
            Ok(rows) => rows
                .iter()
                .find(|row| row.module_name == module_name)
                .map_or(true, |row| row.visible),
            Err(e) => {
                tracing::warn!(
                    company_id = %company_id,
                    module_name,
                    error = %e,
                    "visibility lookup failed; treating module as visible"
                );
                true
            }
        }
    }
}

fn validate(entries: &[ModuleVisibility]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for entry in entries {
        let name = entry.module_name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("module name cannot be empty"));
        }
        if name != entry.module_name {
            return Err(DomainError::validation(format!(
                "module name '{}' has surrounding whitespace",
                entry.module_name
            )));
        }
        if !seen.insert(name) {
            return Err(DomainError::validation(format!("module '{name}' listed twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use adminhub_core::{CompanyModuleVisibility, KNOWN_MODULES};

    use super::*;
    use crate::store::InMemoryBackend;

    fn service() -> (Arc<InMemoryBackend>, ModuleVisibilityService) {
        let store = Arc::new(InMemoryBackend::new());
        (store.clone(), ModuleVisibilityService::new(store))
    }

    fn entry(name: &str, visible: bool) -> ModuleVisibility {
        ModuleVisibility::new(name, visible)
    }

    #[tokio::test]
    async fn load_without_rows_returns_known_modules_visible() {
        let (_, svc) = service();

        let settings = svc.load(CompanyId::new()).await.unwrap();

        assert_eq!(settings.entries().len(), 5);
        assert!(settings.entries().iter().all(|e| e.visible));
        let names: Vec<&str> = settings.entries().iter().map(|e| e.module_name.as_str()).collect();
        let known: Vec<&str> = KNOWN_MODULES.iter().map(|m| m.name).collect();
        assert_eq!(names, known);
    }

    #[tokio::test]
    async fn save_then_load_returns_exactly_the_saved_set() {
        let (_, svc) = service();
        let company = CompanyId::new();

        let first = [
            entry("sales", false),
            entry("inventory", true),
            entry("payroll", false),
        ];
        svc.save(company, &first).await.unwrap();
        svc.save(company, &[entry("finance", false), entry("sales", true)])
            .await
            .unwrap();

        let settings = svc.load(company).await.unwrap();
        assert_eq!(settings.entries(), &[entry("finance", false), entry("sales", true)]);
    }

    #[tokio::test]
    async fn companies_do_not_see_each_other() {
        let (_, svc) = service();
        let a = CompanyId::new();
        let b = CompanyId::new();

        svc.save(a, &[entry("sales", false)]).await.unwrap();

        assert!(!svc.is_visible(a, "sales").await);
        assert!(svc.is_visible(b, "sales").await);
        assert_eq!(svc.load(b).await.unwrap(), VisibilitySettings::defaults());
    }

    #[tokio::test]
    async fn toggle_and_save_starts_from_defaults() {
        let (store, svc) = service();
        let company = CompanyId::new();

        let settings = svc.toggle_and_save(company, "reports", false).await.unwrap();

        assert_eq!(settings.entries().len(), 5);
        assert!(!settings.is_visible("reports"));
        let stored = store.company_visibility(company).await.unwrap();
        assert_eq!(stored.len(), 5);
        assert!(stored.contains(&CompanyModuleVisibility {
            company_id: company,
            module_name: "reports".to_string(),
            visible: false,
        }));
    }

    #[tokio::test]
    async fn toggle_appends_unknown_module() {
        let (_, svc) = service();
        let company = CompanyId::new();

        let settings = svc.toggle_and_save(company, "payroll", false).await.unwrap();

        assert_eq!(settings.entries().last(), Some(&entry("payroll", false)));
        assert!(!svc.is_visible(company, "payroll").await);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_anything_is_deleted() {
        let (_, svc) = service();
        let company = CompanyId::new();
        svc.save(company, &[entry("sales", false)]).await.unwrap();

        let err = svc
            .save(company, &[entry("sales", true), entry("sales", false)])
            .await
            .unwrap_err();
        assert!(matches!(err, VisibilityError::Invalid(_)));

        let err = svc.save(company, &[entry("  ", true)]).await.unwrap_err();
        assert!(matches!(err, VisibilityError::Invalid(_)));

        assert_eq!(svc.load(company).await.unwrap().entries(), &[entry("sales", false)]);
    }

    #[tokio::test]
    async fn store_failures_surface_as_load_and_save_errors() {
        let (store, svc) = service();
        let company = CompanyId::new();
        store.set_unavailable(true);

        assert!(matches!(svc.load(company).await, Err(VisibilityError::Load(_))));
        let err = svc.save(company, &[entry("sales", true)]).await.unwrap_err();
        assert!(matches!(&err, VisibilityError::Save(msg) if msg.contains("unavailable")));
        assert!(svc.is_visible(company, "sales").await);
    }
}
