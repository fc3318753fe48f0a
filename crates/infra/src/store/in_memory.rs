use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use adminhub_auth::{AppModule, Profile, Role, RoleModulePermission};
use adminhub_core::{
    AccessLogEntry, ActivityLogEntry, CompanyId, CompanyModuleVisibility, ModuleId, RoutePath,
    UserId,
};

use super::{AuditStore, DirectoryStore, StoreError, VisibilityStore, usable_modules};

/// `app_modules` row as stored; the route is only checked on read.
#[derive(Debug, Clone)]
struct ModuleRow {
    id: ModuleId,
    name: String,
    route: String,
}

impl ModuleRow {
    fn decode(&self) -> Result<AppModule, StoreError> {
        let route = RoutePath::parse(self.route.clone())
            .map_err(|e| StoreError::decode("app_modules", e.to_string()))?;
        Ok(AppModule {
            id: self.id,
            name: self.name.clone(),
            route,
        })
    }
}

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<UserId, Role>,
    modules: Vec<ModuleRow>,
    permissions: Vec<RoleModulePermission>,
    visibility: Vec<CompanyModuleVisibility>,
    access_logs: Vec<AccessLogEntry>,
    activity_logs: Vec<ActivityLogEntry>,
}

/// In-memory back end for tests/dev.
///
/// Rows keep insertion order, which stands in for "store order". Flip
/// [`InMemoryBackend::set_unavailable`] to make every trait call fail the way
/// an unreachable remote store would.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.check_available()?;
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.check_available()?;
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    // ── Seeding (rows the dashboard itself never writes) ────────────────────

    pub fn upsert_profile(&self, user_id: UserId, role: Role) {
        if let Ok(mut t) = self.inner.write() {
            t.profiles.insert(user_id, role);
        }
    }

    pub fn insert_module(&self, module: AppModule) {
        self.insert_module_row(module.id, &module.name, module.route.as_str());
    }

    /// Seed an `app_modules` row without validating its route.
    pub fn insert_module_row(&self, id: ModuleId, name: &str, route: &str) {
        if let Ok(mut t) = self.inner.write() {
            t.modules.push(ModuleRow {
                id,
                name: name.to_string(),
                route: route.to_string(),
            });
        }
    }

    pub fn insert_permission(&self, permission: RoleModulePermission) {
        if let Ok(mut t) = self.inner.write() {
            t.permissions.push(permission);
        }
    }

    // ── Inspection ──────────────────────────────────────────────────────────

    pub fn access_logs(&self) -> Vec<AccessLogEntry> {
        self.inner
            .read()
            .map(|t| t.access_logs.clone())
            .unwrap_or_default()
    }

    pub fn activity_logs(&self) -> Vec<ActivityLogEntry> {
        self.inner
            .read()
            .map(|t| t.activity_logs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryBackend {
    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self.read()?.profiles.get(&user_id).map(|role| Profile {
            user_id,
            role: role.clone(),
        }))
    }

    async fn list_modules(&self) -> Result<Vec<AppModule>, StoreError> {
        Ok(usable_modules(self.read()?.modules.iter().map(ModuleRow::decode)))
    }

    async fn role_permissions(&self, role: &Role) -> Result<Vec<RoleModulePermission>, StoreError> {
        Ok(self
            .read()?
            .permissions
            .iter()
            .filter(|p| &p.role == role)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VisibilityStore for InMemoryBackend {
    async fn company_visibility(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<CompanyModuleVisibility>, StoreError> {
        Ok(self
            .read()?
            .visibility
            .iter()
            .filter(|row| row.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn delete_company_visibility(&self, company_id: CompanyId) -> Result<u64, StoreError> {
        let mut t = self.write()?;
        let before = t.visibility.len();
        t.visibility.retain(|row| row.company_id != company_id);
        Ok((before - t.visibility.len()) as u64)
    }

    async fn insert_company_visibility(
        &self,
        rows: &[CompanyModuleVisibility],
    ) -> Result<(), StoreError> {
        self.write()?.visibility.extend_from_slice(rows);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for InMemoryBackend {
    async fn insert_access_log(&self, entry: &AccessLogEntry) -> Result<(), StoreError> {
        self.write()?.access_logs.push(entry.clone());
        Ok(())
    }

    async fn insert_activity_log(&self, entry: &ActivityLogEntry) -> Result<(), StoreError> {
        self.write()?.activity_logs.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company_id: CompanyId, name: &str, visible: bool) -> CompanyModuleVisibility {
        CompanyModuleVisibility {
            company_id,
            module_name: name.to_string(),
            visible,
        }
    }

    #[tokio::test]
    async fn visibility_rows_are_company_isolated() {
        let store = InMemoryBackend::new();
        let a = CompanyId::new();
        let b = CompanyId::new();

        store
            .insert_company_visibility(&[row(a, "sales", false), row(b, "sales", true)])
            .await
            .unwrap();

        assert_eq!(store.delete_company_visibility(a).await.unwrap(), 1);
        assert!(store.company_visibility(a).await.unwrap().is_empty());
        assert_eq!(store.company_visibility(b).await.unwrap(), vec![row(b, "sales", true)]);
    }

    #[tokio::test]
    async fn permissions_are_filtered_by_role_in_insertion_order() {
        let store = InMemoryBackend::new();
        let module = AppModule {
            id: ModuleId::new(),
            name: "reports".to_string(),
            route: RoutePath::from_static("/reports"),
        };
        let staff = Role::new("staff");
        let rows = [
            (staff.clone(), false),
            (Role::new("other"), true),
            (staff.clone(), true),
        ];
        for (role, can_view) in rows {
            store.insert_permission(RoleModulePermission {
                role,
                module_id: module.id,
                can_view,
            });
        }

        let rows = store.role_permissions(&staff).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.can_view).collect::<Vec<_>>(), vec![false, true]);
    }

    #[tokio::test]
    async fn malformed_module_rows_are_skipped() {
        let store = InMemoryBackend::new();
        store.insert_module_row(ModuleId::new(), "legacy", "legacy page");
        store.insert_module_row(ModuleId::new(), "dashboard", "/dashboard");

        let modules = store.list_modules().await.unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "dashboard");
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryBackend::new();
        store.upsert_profile(UserId::new(), Role::ADMIN);
        store.set_unavailable(true);

        assert!(matches!(
            store.profile(UserId::new()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.list_modules().await.is_err());
        assert!(store.delete_company_visibility(CompanyId::new()).await.is_err());

        store.set_unavailable(false);
        assert!(store.list_modules().await.is_ok());
    }
}
