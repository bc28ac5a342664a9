//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Where uploaded images end up.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// Files under `dir/<bucket>/<key>`, served at `/storage`
    Local { dir: PathBuf },
    /// Supabase-storage compatible HTTP API
    Http { url: String, service_key: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Absolute base used when building public URLs (storage, static pages)
    pub public_base_url: String,
    pub session_ttl_hours: i64,
    /// Return password reset tokens in the API response (no e-mail delivery exists)
    pub expose_reset_tokens: bool,
    pub storage: StorageConfig,
    pub cors_allowed_origins: Vec<String>,
    pub run_migrations: bool,
    /// Rate-limit on `X-Forwarded-For` / `X-Real-IP`; only behind a proxy that sets them
    pub trust_forwarded_headers: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_TTL_HOURS",
                        value: raw,
                    })
                }
            },
            None => 168,
        };

        let expose_reset_tokens = parse_bool(&lookup, "EXPOSE_RESET_TOKENS", false)?;
        let run_migrations = parse_bool(&lookup, "RUN_MIGRATIONS", true)?;
        let trust_forwarded_headers = parse_bool(&lookup, "TRUST_FORWARDED_HEADERS", false)?;

        let storage = match lookup("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                dir: PathBuf::from(lookup("STORAGE_DIR").unwrap_or_else(|| "./storage".to_string())),
            },
            "http" => StorageConfig::Http {
                url: lookup("STORAGE_URL")
                    .ok_or(ConfigError::Missing("STORAGE_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
                service_key: lookup("STORAGE_SERVICE_KEY")
                    .ok_or(ConfigError::Missing("STORAGE_SERVICE_KEY"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
            session_ttl_hours,
            expose_reset_tokens,
            storage,
            cors_allowed_origins,
            run_migrations,
            trust_forwarded_headers,
        })
    }

    /// Configuration from a fixed map, for tests and tooling.
    pub fn from_map(values: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).map(|v| v.to_string()))
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
    }
}
