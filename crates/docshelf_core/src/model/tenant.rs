//! Tenant identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tenant identifier.
pub type TenantId = Uuid;

/// Isolated customer account. The core only consumes `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    /// URL-facing unique key used by edge handlers to resolve the tenant.
    pub slug: String,
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}
