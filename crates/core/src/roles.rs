//! User roles and the capability check used by the RBAC extractors.
//!
//! Role names must match the `CHECK` constraint in
//! `20260301000001_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

/// Permission tier attached to every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => ROLE_OWNER,
            Role::Admin => ROLE_ADMIN,
            Role::Customer => ROLE_CUSTOMER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_OWNER => Ok(Role::Owner),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_CUSTOMER => Ok(Role::Customer),
            other => Err(CoreError::Validation(format!("Unknown role: {other}"))),
        }
    }
}

/// Roles allowed to manage their own credentials.
pub const CREDENTIAL_MANAGERS: &[Role] = &[Role::Owner, Role::Admin];

/// Returns `true` when `role` is one of `required`.
///
/// An empty `required` slice means the operation is open to any role.
pub fn is_authorized(role: Role, required: &[Role]) -> bool {
    required.is_empty() || required.contains(&role)
}
