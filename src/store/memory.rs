//! In-memory credential store for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::model::{Credential, PiiUpdate};
use crate::store::CredentialStore;
use crate::utils::errors::AppError;

#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<Uuid, Credential>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, credential: Credential) {
        self.users
            .write()
            .expect("credential store lock poisoned")
            .insert(credential.id, credential);
    }

    pub fn get(&self, username: &str) -> Option<Credential> {
        self.users
            .read()
            .expect("credential store lock poisoned")
            .values()
            .find(|c| c.username == username)
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError> {
        Ok(self.get(username))
    }

    async fn record_login(
        &self,
        id: Uuid,
        fingerprint: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut users = self.users.write().expect("credential store lock poisoned");
        if let Some(credential) = users.get_mut(&id) {
            credential.device_fingerprint = fingerprint.map(|fp| fp.to_string());
            credential.last_login_at = Some(at);
            credential.failed_attempts = 0;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Credential>, AppError> {
        let users = self.users.read().expect("credential store lock poisoned");
        Ok(users.values().cloned().collect())
    }

    async fn save_pii(&self, updates: &[PiiUpdate]) -> Result<(), AppError> {
        let mut users = self.users.write().expect("credential store lock poisoned");
        for update in updates {
            if let Some(credential) = users.get_mut(&update.id) {
                credential.first_name = update.first_name.clone();
                credential.last_name = update.last_name.clone();
                credential.address = update.address.clone();
            }
        }
        Ok(())
    }
}
