use async_trait::async_trait;

use crate::domain::errors::IdentityError;
use crate::domain::user::models::Admin;
use crate::domain::user::models::Client;
use crate::domain::user::models::Manager;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Persistence operations for the user aggregate and its role extensions.
///
/// Every mutation writes its audit entry inside the same atomic unit as the
/// row change: implementations never leave a base row without its extension,
/// or an effective mutation without an audit entry, or vice versa.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new admin: base row, extension row, and audit entry as one
    /// atomic unit. On any partial failure nothing is visible.
    ///
    /// # Errors
    /// * `DuplicateUsername` - username already taken (store-enforced; the
    ///   loser of a concurrent race gets this)
    /// * `AuditWriteFailed` - audit insert failed, creation rolled back
    /// * `StoreUnavailable` / `Database` - store failure
    async fn create_admin(&self, admin: Admin) -> Result<Admin, IdentityError>;

    /// Persist a new client. Same contract as [`create_admin`](Self::create_admin).
    async fn create_client(&self, client: Client) -> Result<Client, IdentityError>;

    /// Persist a new manager. Same contract as [`create_admin`](Self::create_admin).
    async fn create_manager(&self, manager: Manager) -> Result<Manager, IdentityError>;

    /// Retrieve a non-deleted user by identifier.
    ///
    /// Soft-deleted rows are reported as `None`, indistinguishable from
    /// absent rows.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError>;

    /// Retrieve a non-deleted user by username. Same visibility rule as
    /// [`find_by_id`](Self::find_by_id).
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, IdentityError>;

    /// Retrieve a non-deleted admin (base + extension join).
    async fn find_admin(&self, id: &UserId) -> Result<Option<Admin>, IdentityError>;

    /// Retrieve a non-deleted client (base + extension join).
    async fn find_client(&self, id: &UserId) -> Result<Option<Client>, IdentityError>;

    /// Retrieve a non-deleted manager (base + extension join).
    async fn find_manager(&self, id: &UserId) -> Result<Option<Manager>, IdentityError>;

    /// List users of one role, ordered by `(created_at, id)` so pagination
    /// and tests are deterministic. Soft-deleted rows are included only when
    /// `include_deleted` is set.
    async fn list_by_role(
        &self,
        role: Role,
        include_deleted: bool,
    ) -> Result<Vec<User>, IdentityError>;

    /// List every user regardless of role, same ordering and visibility
    /// contract as [`list_by_role`](Self::list_by_role).
    async fn list_all(&self, include_deleted: bool) -> Result<Vec<User>, IdentityError>;

    /// Soft-delete a user: set the flag, bump `updated_at`, and record an
    /// audit entry atomically. Idempotent: an already-deleted user is a
    /// no-op success (and writes no audit entry); a wholly absent id is
    /// `NotFound`.
    async fn soft_delete(&self, id: &UserId) -> Result<(), IdentityError>;

    /// Clear the soft-delete flag. Same atomic-with-audit and idempotency
    /// contract as [`soft_delete`](Self::soft_delete).
    async fn restore(&self, id: &UserId) -> Result<(), IdentityError>;
}
