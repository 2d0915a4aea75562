use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::modules::auth::model::Role;

/// A stored user credential as seen by the auth core.
///
/// The auth core never creates or deletes credentials; it reads them during
/// login/refresh, updates the device fingerprint and last-login timestamp on
/// successful login, and rewrites the PII envelope fields during encryption
/// migration. `first_name`, `last_name` and `address` hold either versioned
/// ciphertext or legacy plaintext.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: Uuid,
    pub username: String,
    /// bcrypt hash of the password
    pub password: String,
    pub roles: Vec<Role>,
    /// Fingerprint recorded at the most recent login
    pub device_fingerprint: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
}

/// One row of the batched PII rewrite performed by the encryption migration.
#[derive(Debug, Clone)]
pub struct PiiUpdate {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
}
