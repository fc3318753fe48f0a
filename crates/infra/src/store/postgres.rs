//! Postgres-backed store implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io`, `Tls` | `Unavailable` |
//! | `Database` and anything else | `Query` |
//! | Column decode / domain validation | `Decode` |
//!
//! ## Company Isolation
//!
//! Visibility queries always filter on `company_id`; nothing else is tenant-scoped.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::instrument;

use adminhub_auth::{AppModule, Profile, Role, RoleModulePermission};
use adminhub_core::{
    AccessLogEntry, ActivityLogEntry, CompanyId, CompanyModuleVisibility, ModuleId, RoutePath,
    UserId,
};

use super::{AuditStore, DirectoryStore, StoreError, VisibilityStore, usable_modules};

const SCHEMA: &str = include_str!("schema.sql");

pub struct PostgresBackend {
    pool: Arc<PgPool>,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create missing tables and indexes (idempotent).
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("{operation}: connection pool unavailable"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("{operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("{operation}: {e}")),
        sqlx::Error::Database(db_err) => StoreError::query(operation, db_err.message()),
        other => StoreError::query(operation, other.to_string()),
    }
}

fn column<'r, T>(row: &'r PgRow, table: &'static str, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<T, _>(name)
        .map_err(|e| StoreError::decode(table, format!("{name}: {e}")))
}

fn profile_from_row(row: &PgRow) -> Result<Profile, StoreError> {
    let role: String = column(row, "profiles", "role")?;
    Ok(Profile {
        user_id: UserId::from_uuid(column(row, "profiles", "user_id")?),
        role: Role::new(role),
    })
}

fn module_from_row(row: &PgRow) -> Result<AppModule, StoreError> {
    let route: String = column(row, "app_modules", "route")?;
    Ok(AppModule {
        id: ModuleId::from_uuid(column(row, "app_modules", "id")?),
        name: column(row, "app_modules", "name")?,
        route: RoutePath::parse(route)
            .map_err(|e| StoreError::decode("app_modules", e.to_string()))?,
    })
}

fn permission_from_row(row: &PgRow) -> Result<RoleModulePermission, StoreError> {
    let role: String = column(row, "role_module_permissions", "role")?;
    Ok(RoleModulePermission {
        role: Role::new(role),
        module_id: ModuleId::from_uuid(column(row, "role_module_permissions", "module_id")?),
        can_view: column(row, "role_module_permissions", "can_view")?,
    })
}

fn visibility_from_row(row: &PgRow) -> Result<CompanyModuleVisibility, StoreError> {
    Ok(CompanyModuleVisibility {
        company_id: CompanyId::from_uuid(column(row, "company_module_visibility", "company_id")?),
        module_name: column(row, "company_module_visibility", "module_name")?,
        visible: column(row, "company_module_visibility", "visible")?,
    })
}

#[async_trait]
impl DirectoryStore for PostgresBackend {
    #[instrument(skip(self), fields(operation = "profile"))]
    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query("SELECT user_id, role FROM profiles WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("profile", e))?;

        row.as_ref().map(profile_from_row).transpose()
    }

    #[instrument(skip(self), fields(operation = "list_modules"))]
    async fn list_modules(&self) -> Result<Vec<AppModule>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, route
            FROM app_modules
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_modules", e))?;

        Ok(usable_modules(rows.iter().map(module_from_row)))
    }

    #[instrument(skip(self, role), fields(operation = "role_permissions", role = %role))]
    async fn role_permissions(&self, role: &Role) -> Result<Vec<RoleModulePermission>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT role, module_id, can_view
            FROM role_module_permissions
            WHERE role = $1
            ORDER BY id ASC
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("role_permissions", e))?;

        rows.iter().map(permission_from_row).collect()
    }
}

#[async_trait]
impl VisibilityStore for PostgresBackend {
    #[instrument(skip(self), fields(operation = "company_visibility"))]
    async fn company_visibility(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<CompanyModuleVisibility>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT company_id, module_name, visible
            FROM company_module_visibility
            WHERE company_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("company_visibility", e))?;

        rows.iter().map(visibility_from_row).collect()
    }

    #[instrument(skip(self), fields(operation = "delete_company_visibility"))]
    async fn delete_company_visibility(&self, company_id: CompanyId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM company_module_visibility WHERE company_id = $1")
            .bind(company_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_company_visibility", e))?;

        Ok(result.rows_affected())
    }

    #[instrument(
        skip(self, rows),
        fields(operation = "insert_company_visibility", count = rows.len())
    )]
    async fn insert_company_visibility(
        &self,
        rows: &[CompanyModuleVisibility],
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let company_ids: Vec<uuid::Uuid> = rows.iter().map(|r| *r.company_id.as_uuid()).collect();
        let names: Vec<String> = rows.iter().map(|r| r.module_name.clone()).collect();
        let visible: Vec<bool> = rows.iter().map(|r| r.visible).collect();

        // One statement so a batch lands entirely or not at all.
        sqlx::query(
            r#"
            INSERT INTO company_module_visibility (company_id, module_name, visible)
            SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::bool[])
            "#,
        )
        .bind(&company_ids)
        .bind(&names)
        .bind(&visible)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_company_visibility", e))?;

        Ok(())
    }
}

#[async_trait]
impl AuditStore for PostgresBackend {
    #[instrument(skip(self, entry), fields(operation = "insert_access_log", route = %entry.route))]
    async fn insert_access_log(&self, entry: &AccessLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO access_logs (
                id, user_id, company_id, route, outcome, ip_address, user_agent, accessed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id.as_uuid())
        .bind(entry.company_id.map(uuid::Uuid::from))
        .bind(entry.route.as_str())
        .bind(entry.outcome.as_str())
        .bind(entry.ip_address.as_deref())
        .bind(entry.user_agent.as_deref())
        .bind(entry.accessed_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_access_log", e))?;

        Ok(())
    }

    #[instrument(
        skip(self, entry),
        fields(operation = "insert_activity_log", action = %entry.action)
    )]
    async fn insert_activity_log(&self, entry: &ActivityLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                id, user_id, company_id, action, entity_type, entity_id,
                details, ip_address, user_agent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id.as_uuid())
        .bind(entry.company_id.map(uuid::Uuid::from))
        .bind(&entry.action)
        .bind(entry.entity_type.as_deref())
        .bind(entry.entity_id.as_deref())
        .bind(&entry.details)
        .bind(entry.ip_address.as_deref())
        .bind(entry.user_agent.as_deref())
        .bind(entry.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_activity_log", e))?;

        Ok(())
    }
}
