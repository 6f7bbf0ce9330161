//! Authenticated user, login exchange and permission rules.
//!
//! ## User Hierarchy
//! ```text
//! SUPERADMIN ──► manages everyone, passes every permission check
//!     │
//! ADMIN ───────► manages USER and CUSTOMER
//!     │
//! USER
//!     │
//! CUSTOMER
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserType {
    Superadmin,
    Admin,
    User,
    Customer,
}

impl UserType {
    /// Lower is more privileged.
    pub fn rank(&self) -> u8 {
        match self {
            UserType::Superadmin => 1,
            UserType::Admin => 2,
            UserType::User => 3,
            UserType::Customer => 4,
        }
    }

    /// Whether a user of this type may manage a user of `target` type.
    pub fn can_manage(&self, target: UserType) -> bool {
        match self {
            UserType::Superadmin => true,
            UserType::Admin => matches!(target, UserType::User | UserType::Customer),
            _ => false,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UserType::Superadmin => "Super Administrator",
            UserType::Admin => "Administrator",
            UserType::User => "User",
            UserType::Customer => "Customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EffectivePermissions {
    #[serde(default, alias = "role_permissions")]
    pub role_permissions: Vec<String>,
    #[serde(default, alias = "direct_permissions")]
    pub direct_permissions: Vec<String>,
    #[serde(default, alias = "all_permissions")]
    pub all_permissions: Vec<String>,
}

/// The signed-in user. Accepts both camelCase and snake_case field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "user_type")]
    pub user_type: UserType,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default, alias = "location_id")]
    pub location_id: Option<String>,
    #[serde(default = "crate::types::common::default_true", alias = "is_active")]
    pub is_active: bool,
    #[serde(default, alias = "is_superuser")]
    pub is_superuser: bool,
    #[serde(default, alias = "effective_permissions")]
    pub effective_permissions: EffectivePermissions,
}

impl User {
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_ref().filter(|n| !n.is_empty()) {
            return name.clone();
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.username.clone().unwrap_or_else(|| self.email.clone()),
        }
    }

    /// Superusers and SUPERADMIN bypass every permission check.
    pub fn is_unrestricted(&self) -> bool {
        self.is_superuser || self.user_type == UserType::Superadmin
    }

    pub fn permissions(&self) -> &[String] {
        &self.effective_permissions.all_permissions
    }

    /// True if the user holds any one of `required`.
    pub fn has_any_permission(&self, required: &[&str]) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        required
            .iter()
            .any(|needed| self.permissions().iter().any(|held| held == needed))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_ref().is_some_and(|r| r.name == role)
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
