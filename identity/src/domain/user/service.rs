use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::IdentityError;
use crate::domain::user::models::Admin;
use crate::domain::user::models::Client;
use crate::domain::user::models::CreateAdminCommand;
use crate::domain::user::models::CreateClientCommand;
use crate::domain::user::models::CreateManagerCommand;
use crate::domain::user::models::Manager;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Domain service for identity mutations and lookups.
///
/// Owns entity construction (ids, timestamps, password hashing); the
/// repository port owns storage. Password hashing blocks the calling task
/// for the configured Argon2 cost, so keep these calls off
/// latency-sensitive dispatch paths.
pub struct UserService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: auth::PasswordHasher,
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    fn new_user(&self, username: Username, password: &str, role: Role) -> Result<User, IdentityError> {
        let password_hash = self
            .password_hasher
            .hash(password)
            .map_err(|e| IdentityError::Unknown(format!("Password hashing failed: {}", e)))?;

        let now = Utc::now();
        Ok(User {
            id: UserId::new(),
            username,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        })
    }

    /// Create a new admin. The base row, permission extension, and audit
    /// entry land atomically or not at all.
    ///
    /// # Errors
    /// * `DuplicateUsername` - username already taken
    /// * `AuditWriteFailed` - creation rolled back with its audit entry
    pub async fn create_admin(&self, command: CreateAdminCommand) -> Result<Admin, IdentityError> {
        let user = self.new_user(command.username, &command.password, Role::Admin)?;
        self.repository
            .create_admin(Admin {
                user,
                permissions: command.permissions,
            })
            .await
    }

    /// Create a new client. Same contract as [`create_admin`](Self::create_admin).
    pub async fn create_client(
        &self,
        command: CreateClientCommand,
    ) -> Result<Client, IdentityError> {
        let user = self.new_user(command.username, &command.password, Role::Client)?;
        self.repository
            .create_client(Client {
                user,
                full_name: command.full_name,
                phone_number: command.phone_number,
            })
            .await
    }

    /// Create a new manager. Same contract as [`create_admin`](Self::create_admin).
    pub async fn create_manager(
        &self,
        command: CreateManagerCommand,
    ) -> Result<Manager, IdentityError> {
        let user = self.new_user(command.username, &command.password, Role::Manager)?;
        self.repository
            .create_manager(Manager {
                user,
                full_name: command.full_name,
                hire_date: command.hire_date,
            })
            .await
    }

    /// Retrieve a non-deleted user by id; soft-deleted and absent rows are
    /// the same `NotFound`.
    pub async fn get_user(&self, id: &UserId) -> Result<User, IdentityError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("user {}", id)))
    }

    /// Retrieve a non-deleted user by username.
    pub async fn get_user_by_username(&self, username: &Username) -> Result<User, IdentityError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("user {}", username)))
    }

    /// Retrieve a non-deleted admin with its permission map.
    pub async fn get_admin(&self, id: &UserId) -> Result<Admin, IdentityError> {
        self.repository
            .find_admin(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("admin {}", id)))
    }

    /// Retrieve a non-deleted client with its contact details.
    pub async fn get_client(&self, id: &UserId) -> Result<Client, IdentityError> {
        self.repository
            .find_client(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("client {}", id)))
    }

    /// Retrieve a non-deleted manager with its employment details.
    pub async fn get_manager(&self, id: &UserId) -> Result<Manager, IdentityError> {
        self.repository
            .find_manager(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("manager {}", id)))
    }

    /// List users of one role, ordered by `(created_at, id)`.
    pub async fn list_users_by_role(
        &self,
        role: Role,
        include_deleted: bool,
    ) -> Result<Vec<User>, IdentityError> {
        self.repository.list_by_role(role, include_deleted).await
    }

    /// List every user, same ordering contract as
    /// [`list_users_by_role`](Self::list_users_by_role).
    pub async fn list_all_users(&self, include_deleted: bool) -> Result<Vec<User>, IdentityError> {
        self.repository.list_all(include_deleted).await
    }

    /// Soft-delete a user (idempotent; audit entry written atomically with
    /// the flag flip).
    pub async fn delete_user(&self, id: &UserId) -> Result<(), IdentityError> {
        self.repository.soft_delete(id).await
    }

    /// Restore a soft-deleted user (idempotent; audited like
    /// [`delete_user`](Self::delete_user)).
    pub async fn restore_user(&self, id: &UserId) -> Result<(), IdentityError> {
        self.repository.restore(id).await
    }
}

/// Identity of a successfully authenticated principal.
///
/// Carries everything a caller needs to mint tokens, and nothing secret:
/// the password hash never crosses this boundary.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: Username,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Authentication facade: turns (username, password) into an authenticated
/// identity or a rejection.
///
/// Lookup misses and password mismatches are unobservable from each other:
/// both return the identical [`IdentityError::InvalidCredentials`], and a
/// miss still burns a full Argon2 verification against a fallback hash so
/// the two paths take indistinguishable time.
pub struct AuthService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: auth::PasswordHasher,
    fallback_hash: String,
}

impl<R> AuthService<R>
where
    R: UserRepository,
{
    /// Create the facade. Hashes a throwaway password once up front to use
    /// as the equal-cost fallback on unknown usernames.
    pub fn new(repository: Arc<R>) -> Result<Self, IdentityError> {
        let password_hasher = auth::PasswordHasher::new();
        let fallback_hash = password_hasher
            .hash("fallback-timing-equalizer")
            .map_err(|e| IdentityError::Unknown(format!("Password hashing failed: {}", e)))?;

        Ok(Self {
            repository,
            password_hasher,
            fallback_hash,
        })
    }

    /// Verify credentials against the store.
    ///
    /// # Errors
    /// * `InvalidCredentials` - unknown username, soft-deleted user, wrong
    ///   password, or unreadable stored hash; all indistinguishable
    /// * `StoreUnavailable` / `Database` - lookup failed before the
    ///   credentials could be judged
    pub async fn authenticate(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityError> {
        match self.repository.find_by_username(username).await? {
            Some(user) => match self.password_hasher.verify(password, &user.password_hash) {
                Ok(true) => Ok(AuthenticatedUser::from(user)),
                Ok(false) => Err(IdentityError::InvalidCredentials),
                Err(e) => {
                    tracing::warn!(
                        user_id = %user.id,
                        error = %e,
                        "Stored password hash is unreadable"
                    );
                    Err(IdentityError::InvalidCredentials)
                }
            },
            None => {
                // Pay the same verification cost as the matched path
                let _ = self.password_hasher.verify(password, &self.fallback_hash);
                Err(IdentityError::InvalidCredentials)
            }
        }
    }
}
