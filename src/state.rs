use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::config::rate_limit::RateLimitConfig;
use crate::config::security::SecurityConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::store::{CredentialStore, PgCredentialStore};
use crate::utils::crypto::FieldEncryptor;
use crate::utils::errors::AppError;
use crate::utils::jwt::TokenCodec;

/// Application state: every collaborator is constructed here and injected,
/// never looked up through ambient statics.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub codec: Arc<TokenCodec>,
    pub encryptor: Arc<FieldEncryptor>,
    pub rate_limiter: RateLimiter,
    pub jwt_config: JwtConfig,
    pub security_config: SecurityConfig,
    pub rate_limit_config: RateLimitConfig,
    pub cors_config: CorsConfig,
    auth_required: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt_config: JwtConfig,
        security_config: SecurityConfig,
        rate_limit_config: RateLimitConfig,
        cors_config: CorsConfig,
    ) -> Result<Self, AppError> {
        let codec = Arc::new(TokenCodec::new(jwt_config.clone())?);
        let encryptor = Arc::new(FieldEncryptor::new(&security_config.encryption_key));
        let rate_limiter = RateLimiter::new(&rate_limit_config);

        Ok(Self {
            store,
            codec,
            encryptor,
            rate_limiter,
            jwt_config,
            security_config,
            rate_limit_config,
            cors_config,
            auth_required: Arc::new(AtomicBool::new(true)),
        })
    }

    pub async fn from_env() -> Result<Self, AppError> {
        let pool = init_db_pool().await;
        Self::new(
            Arc::new(PgCredentialStore::new(pool)),
            JwtConfig::from_env(),
            SecurityConfig::from_env(),
            RateLimitConfig::from_env(),
            CorsConfig::from_env(),
        )
    }

    /// Emergency kill switch: while false, every request short-circuits with
    /// a maintenance response.
    pub fn set_auth_required(&self, required: bool) {
        self.auth_required.store(required, Ordering::SeqCst);
    }

    pub fn auth_required(&self) -> bool {
        self.auth_required.load(Ordering::SeqCst)
    }
}
