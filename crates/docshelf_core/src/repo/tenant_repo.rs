//! Tenant directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve tenant slugs to tenant records for edge handlers.
//! - Provide the minimal tenant write path needed to seed data.
//!
//! # Invariants
//! - Slugs are stored trimmed and lowercase and are unique.

use crate::model::normalize_required_text;
use crate::model::tenant::{Tenant, TenantId};
use crate::repo::schema::{ensure_connection_ready, is_constraint_violation, parse_uuid};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TENANT_SLUG_MAX_CHARS: usize = 64;
const TENANT_NAME_MAX_CHARS: usize = 200;

/// Read contract consumed by the edge facade.
pub trait TenantDirectory {
    /// Resolves a tenant by its URL slug (case-insensitive).
    fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tenant>>;
    /// Loads a tenant by id.
    fn get_tenant(&self, tenant_id: TenantId) -> RepoResult<Option<Tenant>>;
}

/// SQLite-backed tenant repository.
pub struct SqliteTenantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTenantRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tenants", &["id", "slug", "name", "created_at"])?;
        Ok(Self { conn })
    }

    /// Creates one tenant with a generated id.
    pub fn create_tenant(&self, slug: &str, name: &str) -> RepoResult<Tenant> {
        let slug = normalize_slug(slug)?;
        let name = normalize_required_text(name, "tenant name", TENANT_NAME_MAX_CHARS)?;
        let id = Uuid::new_v4();

        let inserted = self.conn.execute(
            "INSERT INTO tenants (id, slug, name) VALUES (?1, ?2, ?3);",
            params![id.to_string(), slug, name],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_constraint_violation(&err) => {
                return Err(RepoError::DuplicateSlug(slug));
            }
            Err(err) => return Err(err.into()),
        }

        self.get_tenant(id)?.ok_or(RepoError::NotFound {
            entity: "tenant",
            id,
        })
    }
}

impl TenantDirectory for SqliteTenantRepository<'_> {
    fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tenant>> {
        let normalized = slug.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(None);
        }
        self.conn
            .query_row(
                "SELECT id, slug, name, created_at
                 FROM tenants
                 WHERE slug = ?1;",
                [normalized],
                parse_tenant_row,
            )
            .optional()?
            .transpose()
    }

    fn get_tenant(&self, tenant_id: TenantId) -> RepoResult<Option<Tenant>> {
        self.conn
            .query_row(
                "SELECT id, slug, name, created_at
                 FROM tenants
                 WHERE id = ?1;",
                [tenant_id.to_string()],
                parse_tenant_row,
            )
            .optional()?
            .transpose()
    }
}

fn normalize_slug(slug: &str) -> RepoResult<String> {
    let normalized = normalize_required_text(slug, "tenant slug", TENANT_SLUG_MAX_CHARS)?;
    Ok(normalized.to_lowercase())
}

fn parse_tenant_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Tenant>> {
    let id_text: String = row.get("id")?;
    let slug: String = row.get("slug")?;
    let name: String = row.get("name")?;
    let created_at: i64 = row.get("created_at")?;
    Ok(parse_uuid(&id_text, "tenants.id").map(|id| Tenant {
        id,
        slug,
        name,
        created_at,
    }))
}
