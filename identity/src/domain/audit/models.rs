use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Immutable record of one identity-affecting action.
///
/// Created once, never mutated or deleted. `user_id` is a reference to the
/// subject of the action, not ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Build a new entry for `user_id` with the current timestamp.
    pub fn new(user_id: UserId, action: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action: action.into(),
            timestamp: Utc::now(),
        }
    }
}
