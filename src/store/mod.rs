//! Credential store accessor.
//!
//! The user store itself belongs to the surrounding CRUD application; the
//! auth core only needs the narrow read/update surface defined by
//! [`CredentialStore`]. Production uses the PostgreSQL implementation, tests
//! use the in-memory one behind the `test-utils` feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::utils::errors::AppError;

pub mod model;
pub mod postgres;

#[cfg(feature = "test-utils")]
pub mod memory;

pub use model::{Credential, PiiUpdate};
pub use postgres::PgCredentialStore;

#[cfg(feature = "test-utils")]
pub use memory::MemoryCredentialStore;

/// Narrow persistence surface the auth core depends on.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError>;

    /// Persists the fingerprint and last-login timestamp after a successful
    /// login.
    async fn record_login(
        &self,
        id: Uuid,
        fingerprint: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// All credentials, for the encryption migration pass.
    async fn list_all(&self) -> Result<Vec<Credential>, AppError>;

    /// Batched PII rewrite used by the encryption migration.
    async fn save_pii(&self, updates: &[PiiUpdate]) -> Result<(), AppError>;
}
