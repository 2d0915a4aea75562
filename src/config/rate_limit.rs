use std::env;

/// Rate limit configuration for the API.
///
/// A fixed window of `window_secs` allows `max_requests` per client IP.
/// Paths under any of `exempt_prefixes` bypass the limiter so the auth
/// endpoints stay reachable.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
    pub exempt_prefixes: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 30,
            exempt_prefixes: vec!["/api/auth".to_string()],
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.window_secs),
            max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_requests),
            exempt_prefixes: env::var("RATE_LIMIT_EXEMPT_PREFIXES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.exempt_prefixes),
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.window_secs, 60);
        assert_eq!(config.max_requests, 30);
    }

    #[test]
    fn test_is_exempt() {
        let config = RateLimitConfig::default();
        assert!(config.is_exempt("/api/auth/login"));
        assert!(config.is_exempt("/api/auth/refresh"));
        assert!(!config.is_exempt("/api/users/me"));
        assert!(!config.is_exempt("/health"));
    }
}
