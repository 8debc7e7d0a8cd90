use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{text_enum, RoleId};

text_enum! {
    /// Access level cached in the session at login.
    pub enum Role {
        Administrator => "administrator",
        Advisor => "advisor",
        Producer => "producer",
    }
}

impl Role {
    /// Role ids are fixed by the seed migration.
    pub fn id(&self) -> RoleId {
        match self {
            Role::Administrator => RoleId(1),
            Role::Advisor => RoleId(2),
            Role::Producer => RoleId(3),
        }
    }

    pub fn from_id(id: RoleId) -> Option<Self> {
        Role::ALL.iter().copied().find(|role| role.id() == id)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Producer
    }
}

pub const ADMIN_ONLY: &[Role] = &[Role::Administrator];
pub const STAFF: &[Role] = &[Role::Administrator, Role::Advisor];

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: Role,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub permissions: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RoleCount {
    pub role: Role,
    pub total: i64,
}
