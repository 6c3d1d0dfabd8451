//! Direct access-control grant model.

use crate::models::condition::Condition;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Direct (non-role) grant: ties a user or a role to allowed actions on a
/// resource, optionally narrowed to one resource id, with a chained
/// condition list.
#[derive(Debug, Clone, FromRow)]
pub struct AccessControl {
    pub id: Uuid,
    pub account_id: Uuid,
    pub resource: String,
    pub resource_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub permissions: Vec<String>,
    pub conditions: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccessControl {
    pub fn new(
        account_id: Uuid,
        resource: String,
        user_id: Option<Uuid>,
        role_id: Option<Uuid>,
        permissions: Vec<String>,
        conditions: Vec<Condition>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            resource,
            resource_id: None,
            user_id,
            role_id,
            permissions,
            conditions: serde_json::to_value(conditions).unwrap_or_default(),
            status: "ACTIVE".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }

    pub fn allows_action(&self, action: &str) -> bool {
        self.permissions.iter().any(|p| p == action)
    }

    /// Decode the stored condition chain.
    pub fn parsed_conditions(&self) -> Result<Vec<Condition>, serde_json::Error> {
        serde_json::from_value(self.conditions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_membership_is_exact() {
        let entry = AccessControl::new(
            Uuid::new_v4(),
            "links".to_string(),
            Some(Uuid::new_v4()),
            None,
            vec!["read".to_string(), "update".to_string()],
            vec![],
        );
        assert!(entry.allows_action("read"));
        assert!(!entry.allows_action("delete"));
        assert!(!entry.allows_action("rea"));
    }
}
