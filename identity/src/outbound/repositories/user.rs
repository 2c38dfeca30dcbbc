use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;
use uuid::Uuid;

use super::audit::insert_entry;
use super::map_store_error;
use crate::domain::audit::models::AuditLogEntry;
use crate::domain::errors::IdentityError;
use crate::domain::user::models::Admin;
use crate::domain::user::models::Client;
use crate::domain::user::models::Manager;
use crate::domain::user::models::Permissions;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Soft-delete-aware user store over Postgres.
///
/// Every mutation (create, delete, restore) runs on one transaction that
/// also carries its audit entry; a failed audit insert rolls the mutation
/// back. Uniqueness of active usernames is enforced by the store's partial
/// unique index, so of two concurrent creations with the same username
/// exactly one commits and the other surfaces `DuplicateUsername`.
pub struct PostgresUserRepository {
    pool: PgPool,
    allow_username_reuse_after_delete: bool,
}

impl PostgresUserRepository {
    /// Construct with the default policy: a soft-deleted user's username
    /// stays reserved.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            allow_username_reuse_after_delete: false,
        }
    }

    /// Override the username-reuse policy. When reuse is allowed, only
    /// active (non-deleted) rows count toward uniqueness.
    pub fn with_username_reuse(mut self, allow: bool) -> Self {
        self.allow_username_reuse_after_delete = allow;
        self
    }

    async fn insert_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
    ) -> Result<(), IdentityError> {
        if !self.allow_username_reuse_after_delete {
            // The partial index only guards active rows; reserving deleted
            // usernames needs an explicit check against all rows.
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                    .bind(user.username.as_str())
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(|e| map_store_error(e, "check username availability"))?;

            if taken {
                return Err(IdentityError::DuplicateUsername(user.username.to_string()));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at, updated_at, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.is_deleted)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return IdentityError::DuplicateUsername(user.username.to_string());
                }
            }
            map_store_error(e, "insert user")
        })?;

        Ok(())
    }

    async fn audit_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        action: String,
    ) -> Result<(), IdentityError> {
        let entry = AuditLogEntry::new(user_id, action);
        insert_entry(&mut **tx, &entry).await.map_err(|e| {
            IdentityError::AuditWriteFailed(format!("audit entry for user {}: {}", user_id, e))
        })
    }

    /// Flip the soft-delete flag to `deleted`, bump `updated_at`, and audit
    /// the change, all on one transaction. A row already in the target
    /// state is a no-op success with no audit entry; an absent id is
    /// `NotFound`.
    async fn set_deleted(
        &self,
        id: &UserId,
        deleted: bool,
        action: &str,
    ) -> Result<(), IdentityError> {
        let context = if deleted { "soft delete user" } else { "restore user" };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_store_error(e, context))?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_deleted = $2, updated_at = $3
            WHERE id = $1 AND is_deleted = NOT $2
            "#,
        )
        .bind(id.0)
        .bind(deleted)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_store_error(e, context))?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                    .bind(id.0)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_store_error(e, context))?;

            // Dropping the transaction rolls it back; nothing was written.
            return if exists {
                Ok(())
            } else {
                Err(IdentityError::NotFound(format!("user {}", id)))
            };
        }

        self.audit_in_tx(&mut tx, *id, action.to_string()).await?;

        tx.commit().await.map_err(|e| map_store_error(e, context))?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_deleted: bool,
}

impl TryFrom<UserRow> for User {
    type Error = IdentityError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username)?,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_deleted: row.is_deleted,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    #[sqlx(flatten)]
    user: UserRow,
    permissions: Json<Permissions>,
}

#[derive(sqlx::FromRow)]
struct ClientRow {
    #[sqlx(flatten)]
    user: UserRow,
    full_name: String,
    phone_number: String,
}

#[derive(sqlx::FromRow)]
struct ManagerRow {
    #[sqlx(flatten)]
    user: UserRow,
    full_name: String,
    hire_date: NaiveDate,
}

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at, is_deleted";

const USER_JOIN_COLUMNS: &str = "u.id, u.username, u.password_hash, u.role, u.created_at, \
                                 u.updated_at, u.is_deleted";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_admin(&self, admin: Admin) -> Result<Admin, IdentityError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_store_error(e, "create admin"))?;

        self.insert_user(&mut tx, &admin.user).await?;

        sqlx::query("INSERT INTO admins (id, permissions) VALUES ($1, $2)")
            .bind(admin.user.id.0)
            .bind(Json(&admin.permissions))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_store_error(e, "insert admin profile"))?;

        self.audit_in_tx(
            &mut tx,
            admin.user.id,
            format!("admin {} created", admin.user.username),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| map_store_error(e, "create admin"))?;

        Ok(admin)
    }

    async fn create_client(&self, client: Client) -> Result<Client, IdentityError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_store_error(e, "create client"))?;

        self.insert_user(&mut tx, &client.user).await?;

        sqlx::query("INSERT INTO clients (id, full_name, phone_number) VALUES ($1, $2, $3)")
            .bind(client.user.id.0)
            .bind(&client.full_name)
            .bind(&client.phone_number)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_store_error(e, "insert client profile"))?;

        self.audit_in_tx(
            &mut tx,
            client.user.id,
            format!("client {} created", client.user.username),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| map_store_error(e, "create client"))?;

        Ok(client)
    }

    async fn create_manager(&self, manager: Manager) -> Result<Manager, IdentityError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_store_error(e, "create manager"))?;

        self.insert_user(&mut tx, &manager.user).await?;

        sqlx::query("INSERT INTO managers (id, full_name, hire_date) VALUES ($1, $2, $3)")
            .bind(manager.user.id.0)
            .bind(&manager.full_name)
            .bind(manager.hire_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_store_error(e, "insert manager profile"))?;

        self.audit_in_tx(
            &mut tx,
            manager.user.id,
            format!("manager {} created", manager.user.username),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| map_store_error(e, "create manager"))?;

        Ok(manager)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "find user by id"))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, IdentityError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_deleted = FALSE"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "find user by username"))?;

        row.map(User::try_from).transpose()
    }

    async fn find_admin(&self, id: &UserId) -> Result<Option<Admin>, IdentityError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            SELECT {USER_JOIN_COLUMNS}, a.permissions
            FROM admins a
            JOIN users u ON a.id = u.id
            WHERE u.id = $1 AND u.is_deleted = FALSE
            "#
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "find admin by id"))?;

        match row {
            Some(r) => Ok(Some(Admin {
                user: User::try_from(r.user)?,
                permissions: r.permissions.0,
            })),
            None => Ok(None),
        }
    }

    async fn find_client(&self, id: &UserId) -> Result<Option<Client>, IdentityError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            SELECT {USER_JOIN_COLUMNS}, c.full_name, c.phone_number
            FROM clients c
            JOIN users u ON c.id = u.id
            WHERE u.id = $1 AND u.is_deleted = FALSE
            "#
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "find client by id"))?;

        match row {
            Some(r) => Ok(Some(Client {
                user: User::try_from(r.user)?,
                full_name: r.full_name,
                phone_number: r.phone_number,
            })),
            None => Ok(None),
        }
    }

    async fn find_manager(&self, id: &UserId) -> Result<Option<Manager>, IdentityError> {
        let row = sqlx::query_as::<_, ManagerRow>(&format!(
            r#"
            SELECT {USER_JOIN_COLUMNS}, m.full_name, m.hire_date
            FROM managers m
            JOIN users u ON m.id = u.id
            WHERE u.id = $1 AND u.is_deleted = FALSE
            "#
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "find manager by id"))?;

        match row {
            Some(r) => Ok(Some(Manager {
                user: User::try_from(r.user)?,
                full_name: r.full_name,
                hire_date: r.hire_date,
            })),
            None => Ok(None),
        }
    }

    async fn list_by_role(
        &self,
        role: Role,
        include_deleted: bool,
    ) -> Result<Vec<User>, IdentityError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE role = $1 AND (is_deleted = FALSE OR $2)
            ORDER BY created_at, id
            "#
        ))
        .bind(role.as_str())
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "list users by role"))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn list_all(&self, include_deleted: bool) -> Result<Vec<User>, IdentityError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_deleted = FALSE OR $1
            ORDER BY created_at, id
            "#
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "list all users"))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn soft_delete(&self, id: &UserId) -> Result<(), IdentityError> {
        self.set_deleted(id, true, "user soft-deleted").await
    }

    async fn restore(&self, id: &UserId) -> Result<(), IdentityError> {
        self.set_deleted(id, false, "user restored").await
    }
}
