//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names with warning logs.

use prover_registry_common::config::{CacheBackend, RegistryConfig};

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the legacy variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use prover_registry::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("PROVER_REGISTRY_PORT", "PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Load the server configuration from environment variables.
pub fn load_config() -> RegistryConfig {
    let defaults = RegistryConfig::default();

    RegistryConfig {
        host: get_env_with_fallback_or("PROVER_REGISTRY_HOST", "HOST", &defaults.host),
        port: get_env_with_fallback_parse("PROVER_REGISTRY_PORT", "PORT", defaults.port),
        database_url: get_env_with_fallback_or(
            "PROVER_REGISTRY_DATABASE_URL",
            "DATABASE_URL",
            &defaults.database_url,
        ),
        cache_backend: get_env_with_fallback_parse::<CacheBackend>(
            "PROVER_REGISTRY_CACHE_BACKEND",
            "CACHE_BACKEND",
            defaults.cache_backend,
        ),
        public_dir: get_env_with_fallback_or(
            "PROVER_REGISTRY_PUBLIC_DIR",
            "PUBLIC_DIR",
            &defaults.public_dir,
        ),
        probe_timeout_secs: get_env_with_fallback_parse(
            "PROVER_REGISTRY_PROBE_TIMEOUT_SECS",
            "PROBE_TIMEOUT_SECS",
            defaults.probe_timeout_secs,
        ),
    }
}
