use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::modules::auth::model::Role;
use crate::store::model::{Credential, PiiUpdate};
use crate::store::CredentialStore;
use crate::utils::errors::AppError;

const CREDENTIAL_COLUMNS: &str = "id, username, password, roles, device_fingerprint, \
     last_login_at, failed_attempts, locked_until, first_name, last_name, address";

/// PostgreSQL-backed credential store.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    username: String,
    password: String,
    roles: Vec<String>,
    device_fingerprint: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    failed_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    first_name: String,
    last_name: String,
    address: Option<String>,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        let roles = row
            .roles
            .iter()
            .filter_map(|name| {
                let role = Role::parse(name);
                if role.is_none() {
                    warn!(username = %row.username, role = %name, "Ignoring unknown role");
                }
                role
            })
            .collect();

        Credential {
            id: row.id,
            username: row.username,
            password: row.password,
            roles,
            device_fingerprint: row.device_fingerprint,
            last_login_at: row.last_login_at,
            failed_attempts: row.failed_attempts,
            locked_until: row.locked_until,
            first_name: row.first_name,
            last_name: row.last_name,
            address: row.address,
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Credential::from))
    }

    async fn record_login(
        &self,
        id: Uuid,
        fingerprint: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET device_fingerprint = $2, last_login_at = $3, failed_attempts = 0 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(fingerprint)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Credential>, AppError> {
        let rows = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Credential::from).collect())
    }

    async fn save_pii(&self, updates: &[PiiUpdate]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for update in updates {
            sqlx::query(
                "UPDATE users SET first_name = $2, last_name = $3, address = $4 WHERE id = $1",
            )
            .bind(update.id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.address)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
