use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_store_error;
use crate::domain::audit::models::AuditLogEntry;
use crate::domain::audit::ports::AuditLog;
use crate::domain::errors::IdentityError;
use crate::domain::user::models::UserId;

pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    user_id: Uuid,
    action: String,
    timestamp: DateTime<Utc>,
}

impl From<AuditRow> for AuditLogEntry {
    fn from(row: AuditRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId(row.user_id),
            action: row.action,
            timestamp: row.timestamp,
        }
    }
}

/// Insert one audit row on any executor.
///
/// Takes a generic executor so the user repository can run it on its own
/// open transaction: the mutation and its audit entry then commit or roll
/// back together.
pub(crate) async fn insert_entry<'e, E>(
    executor: E,
    entry: &AuditLogEntry,
) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO user_logs (id, user_id, action, timestamp)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(entry.id)
    .bind(entry.user_id.0)
    .bind(&entry.action)
    .bind(entry.timestamp)
    .execute(executor)
    .await
    .map(|_| ())
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(
        &self,
        user_id: &UserId,
        action: &str,
    ) -> Result<AuditLogEntry, IdentityError> {
        let entry = AuditLogEntry::new(*user_id, action);

        insert_entry(&self.pool, &entry).await.map_err(|e| {
            IdentityError::AuditWriteFailed(format!("record action for user {}: {}", user_id, e))
        })?;

        Ok(entry)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<AuditLogEntry>, IdentityError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, action, timestamp
            FROM user_logs
            WHERE user_id = $1
            ORDER BY timestamp, id
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "list audit entries for user"))?;

        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<AuditLogEntry>, IdentityError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, action, timestamp
            FROM user_logs
            ORDER BY timestamp, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_store_error(e, "list all audit entries"))?;

        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}
