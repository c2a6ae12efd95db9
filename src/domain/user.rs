use serde::{Deserialize, Serialize};

use crate::action_framework::{Operation, Resource, ResourceKind};
use crate::domain::null_as_default;

/// A registered storefront account as the admin API reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_licenses_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_purchases: u32,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    pub fn new(id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            username: None,
            email: email.into(),
            is_active: true,
            is_admin: false,
            active_licenses_count: 0,
            total_purchases: 0,
            last_login: None,
            created_at: None,
        }
    }

    /// Username when set, otherwise the email.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

impl Resource for User {
    type Id = i64;

    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn supports(operation: Operation) -> bool {
        matches!(operation, Operation::Read | Operation::ToggleStatus)
    }
}
