use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::auth::model::Role;

/// The caller's own profile. PII fields are decrypted before serialization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub roles: Vec<Role>,
    pub last_login_at: Option<DateTime<Utc>>,
}
