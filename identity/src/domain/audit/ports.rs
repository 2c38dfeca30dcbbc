use async_trait::async_trait;

use crate::domain::audit::models::AuditLogEntry;
use crate::domain::errors::IdentityError;
use crate::domain::user::models::UserId;

/// Append-only audit trail of identity-affecting actions.
///
/// Write-once, read-many: there are no update or delete operations. The
/// user repository writes entries on its own transactions so audit and
/// mutation succeed or fail together; this port is the standalone surface
/// for out-of-band recording and the read path.
#[async_trait]
pub trait AuditLog: Send + Sync + 'static {
    /// Append one immutable entry.
    ///
    /// # Errors
    /// * `AuditWriteFailed` - the insert did not land
    async fn record(&self, user_id: &UserId, action: &str)
        -> Result<AuditLogEntry, IdentityError>;

    /// Entries for one user, ordered by `(timestamp, id)`.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<AuditLogEntry>, IdentityError>;

    /// All entries, ordered by `(timestamp, id)`.
    async fn list_all(&self) -> Result<Vec<AuditLogEntry>, IdentityError>;
}
