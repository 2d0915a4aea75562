use std::env;

/// Device-binding and PII-encryption settings.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// When false, no fingerprint claims are embedded or checked.
    pub fingerprinting_enabled: bool,
    /// Passphrase the field encryptor derives its keys from.
    pub encryption_key: String,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        Self {
            fingerprinting_enabled: env::var("DEVICE_FINGERPRINTING_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            encryption_key: env::var("FIELD_ENCRYPTION_KEY")
                .unwrap_or_else(|_| "campusgate-dev-encryption-key".to_string()),
        }
    }
}
