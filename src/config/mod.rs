use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::domains::audit::types::AuditEntryType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(String, std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(String, toml::de::Error),

    #[error("invalid value for environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Top level, layered configuration: file defaults overridden by
/// `FEDERATION_*` environment variables (spec.md §4.1, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub maintenance: MaintenanceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for any
    /// field the file does not set, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.display().to_string(), e))
    }

    /// Overlay `FEDERATION_*` environment variables onto the loaded config.
    /// Unset variables leave the existing (file or default) value in place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env::var;

        if let Ok(v) = var("FEDERATION_BASE_URL") {
            self.server.base_url = v;
        }
        if let Ok(v) = var("FEDERATION_NAME") {
            self.server.name = v;
        }
        if let Ok(v) = var("FEDERATION_API_KEY") {
            self.server.api_key = v;
        }
        if let Ok(v) = var("FEDERATION_MAX_UPLOAD_SIZE") {
            self.server.max_upload_size = parse_env("FEDERATION_MAX_UPLOAD_SIZE", &v)?;
        }
        if let Ok(v) = var("FEDERATION_STORAGE_PATH") {
            self.server.storage_path = v;
        }
        if let Ok(v) = var("FEDERATION_PUBLIC_AUDIT_LOGS") {
            self.server.public_audit_logs = parse_env("FEDERATION_PUBLIC_AUDIT_LOGS", &v)?;
        }
        if let Ok(v) = var("FEDERATION_PUBLIC_EVIDENCE") {
            self.server.public_evidence = parse_env("FEDERATION_PUBLIC_EVIDENCE", &v)?;
        }
        if let Ok(v) = var("FEDERATION_PUBLIC_BLACKLIST") {
            self.server.public_blacklist = parse_env("FEDERATION_PUBLIC_BLACKLIST", &v)?;
        }
        if let Ok(v) = var("FEDERATION_PUBLIC_ENTITIES") {
            self.server.public_entities = parse_env("FEDERATION_PUBLIC_ENTITIES", &v)?;
        }
        if let Ok(v) = var("FEDERATION_MIN_BLACKLIST_TIME") {
            self.server.min_blacklist_time = parse_env("FEDERATION_MIN_BLACKLIST_TIME", &v)?;
        }

        if let Ok(v) = var("FEDERATION_DATABASE_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = var("FEDERATION_DATABASE_PORT") {
            self.database.port = parse_env("FEDERATION_DATABASE_PORT", &v)?;
        }
        if let Ok(v) = var("FEDERATION_DATABASE_USERNAME") {
            self.database.username = v;
        }
        if let Ok(v) = var("FEDERATION_DATABASE_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = var("FEDERATION_DATABASE_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = var("FEDERATION_DATABASE_CHARSET") {
            self.database.charset = v;
        }
        if let Ok(v) = var("FEDERATION_DATABASE_COLLATION") {
            self.database.collation = v;
        }

        if let Ok(v) = var("FEDERATION_REDIS_ENABLED") {
            self.cache.enabled = parse_env("FEDERATION_REDIS_ENABLED", &v)?;
        }
        if let Ok(v) = var("FEDERATION_REDIS_HOST") {
            self.cache.host = v;
        }
        if let Ok(v) = var("FEDERATION_REDIS_PORT") {
            self.cache.port = parse_env("FEDERATION_REDIS_PORT", &v)?;
        }
        if let Ok(v) = var("FEDERATION_REDIS_PASSWORD") {
            self.cache.password = Some(v);
        }
        if let Ok(v) = var("FEDERATION_REDIS_DATABASE") {
            self.cache.database = parse_env("FEDERATION_REDIS_DATABASE", &v)?;
        }

        for kind in CacheKind::all() {
            let prefix = format!("FEDERATION_CACHE_{}", kind.env_suffix());
            let entry = self.cache.per_kind.entry(kind).or_insert_with(CacheKindConfig::default);
            if let Ok(v) = var(format!("{prefix}_ENABLED")) {
                entry.enabled = parse_env("FEDERATION_CACHE_*_ENABLED", &v)?;
            }
            if let Ok(v) = var(format!("{prefix}_LIMIT")) {
                entry.limit = parse_env("FEDERATION_CACHE_*_LIMIT", &v)?;
            }
            if let Ok(v) = var(format!("{prefix}_TTL")) {
                entry.ttl_seconds = parse_env("FEDERATION_CACHE_*_TTL", &v)?;
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue(name, raw.to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub name: String,
    pub api_key: String,
    pub max_upload_size: u64,
    pub max_items_per_kind: u32,
    pub storage_path: String,
    pub public_audit_logs: bool,
    pub public_evidence: bool,
    pub public_blacklist: bool,
    pub public_entities: bool,
    pub public_audit_entries: Vec<AuditEntryType>,
    pub min_blacklist_time: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            name: "FederationServer".to_string(),
            api_key: generate_master_key(),
            max_upload_size: 50 * 1024 * 1024,
            max_items_per_kind: 100,
            storage_path: "./storage".to_string(),
            public_audit_logs: false,
            public_evidence: false,
            public_blacklist: false,
            public_entities: false,
            public_audit_entries: Vec::new(),
            min_blacklist_time: 1800,
        }
    }
}

/// A fresh install with no configured master key still needs to be usable;
/// generate a random 32-char alnum key the same way operator keys are minted.
fn generate_master_key() -> String {
    crate::domains::operator::types::generate_api_key()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub charset: String,
    pub collation: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            username: "federation".to_string(),
            password: String::new(),
            name: "federation".to_string(),
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_unicode_ci".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.name
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Operators,
    Entities,
    Evidence,
    Attachments,
    Blacklist,
    Audit,
}

impl CacheKind {
    pub fn all() -> [CacheKind; 6] {
        [
            CacheKind::Operators,
            CacheKind::Entities,
            CacheKind::Evidence,
            CacheKind::Attachments,
            CacheKind::Blacklist,
            CacheKind::Audit,
        ]
    }

    pub fn key_prefix(&self) -> &'static str {
        match self {
            CacheKind::Operators => "operator",
            CacheKind::Entities => "entity",
            CacheKind::Evidence => "evidence",
            CacheKind::Attachments => "attachment",
            CacheKind::Blacklist => "blacklist",
            CacheKind::Audit => "audit",
        }
    }

    fn env_suffix(&self) -> &'static str {
        match self {
            CacheKind::Operators => "OPERATORS",
            CacheKind::Entities => "ENTITIES",
            CacheKind::Evidence => "EVIDENCE",
            CacheKind::Attachments => "ATTACHMENTS",
            CacheKind::Blacklist => "BLACKLIST",
            CacheKind::Audit => "AUDIT",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheKindConfig {
    pub enabled: bool,
    pub limit: u32,
    pub ttl_seconds: u64,
}

impl Default for CacheKindConfig {
    fn default() -> Self {
        Self { enabled: true, limit: 10_000, ttl_seconds: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub database: u8,
    pub throw_on_errors: bool,
    pub pre_cache_enabled: bool,
    pub system_caching_enabled: bool,
    pub per_kind: HashMap<CacheKind, CacheKindConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let mut per_kind = HashMap::new();
        for kind in CacheKind::all() {
            per_kind.insert(kind, CacheKindConfig::default());
        }
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            database: 0,
            throw_on_errors: false,
            pre_cache_enabled: true,
            system_caching_enabled: true,
            per_kind,
        }
    }
}

impl CacheConfig {
    pub fn redis_url(&self) -> String {
        match &self.password {
            Some(pw) => format!("redis://:{}@{}:{}/{}", pw, self.host, self.port, self.database),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    pub enabled: bool,
    pub clean_audit_logs_days: u32,
    pub clean_blacklist_days: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self { enabled: true, clean_audit_logs_days: 365, clean_blacklist_days: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_functional() {
        let config = Config::default();
        assert_eq!(config.server.api_key.len(), 32);
        assert_eq!(config.server.max_upload_size, 50 * 1024 * 1024);
        assert_eq!(config.server.max_items_per_kind, 100);
        assert_eq!(config.server.min_blacklist_time, 1800);
    }

    #[test]
    fn env_override_replaces_base_url() {
        std::env::set_var("FEDERATION_BASE_URL", "https://fed.example.com");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.server.base_url, "https://fed.example.com");
        std::env::remove_var("FEDERATION_BASE_URL");
    }

    #[test]
    fn invalid_numeric_override_is_rejected() {
        std::env::set_var("FEDERATION_MAX_UPLOAD_SIZE", "not-a-number");
        let mut config = Config::default();
        let result = config.apply_env_overrides();
        assert!(result.is_err());
        std::env::remove_var("FEDERATION_MAX_UPLOAD_SIZE");
    }
}
