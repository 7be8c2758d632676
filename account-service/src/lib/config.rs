use std::env;

use auth::JwtError;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::account::models::RefreshPolicy;
use crate::account::models::StorageBackend;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_token_secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_minutes: i64,
    pub refresh_token_secret: String,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
    pub api_base_url: Option<String>,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    24 * 60
}

fn default_refresh_token_expiry() -> i64 {
    10 * 24 * 60
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_policy: RefreshPolicy::default(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl JwtConfig {
    /// Build the token issuer from the configured secrets and lifetimes.
    ///
    /// # Errors
    /// * `InvalidKey` - A secret is empty or both secrets are equal
    /// * `InvalidLifetime` - An expiry is out of range, not positive, or the
    ///   access expiry exceeds the refresh expiry
    pub fn token_issuer(&self) -> Result<TokenIssuer, JwtError> {
        TokenIssuer::new(
            self.access_token_secret.as_bytes(),
            lifetime_minutes(self.access_token_expiry_minutes)?,
            self.refresh_token_secret.as_bytes(),
            lifetime_minutes(self.refresh_token_expiry_minutes)?,
        )
    }
}

fn lifetime_minutes(minutes: i64) -> Result<Duration, JwtError> {
    Duration::try_minutes(minutes)
        .ok_or_else(|| JwtError::InvalidLifetime(format!("{minutes} minutes is out of range")))
}

impl PasswordConfig {
    pub fn password_hasher(&self) -> Result<PasswordHasher, PasswordError> {
        PasswordHasher::with_cost(self.memory_cost_kib, self.time_cost, self.parallelism)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__ACCESS_TOKEN_SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
        [server]
        http_port = 8000

        [database]
        url = "postgresql://localhost/accounts"

        [jwt]
        access_token_secret = "access-secret"
        refresh_token_secret = "refresh-secret"

        [media]
        cloud_name = "demo"
        api_key = "key"
        api_secret = "secret"
    "#;

    #[test]
    fn test_defaults_applied() {
        let config = from_toml(MINIMAL);

        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.access_token_expiry_minutes, 1440);
        assert_eq!(config.jwt.refresh_token_expiry_minutes, 14400);
        assert_eq!(config.session.refresh_policy, RefreshPolicy::MatchStored);
        assert!(config.session.secure_cookies);
        assert_eq!(config.password.memory_cost_kib, 19456);
        assert_eq!(config.media.folder, None);
    }

    #[test]
    fn test_token_issuer_from_config() {
        let config = from_toml(MINIMAL);
        let issuer = config.jwt.token_issuer().unwrap();

        assert_eq!(issuer.access_lifetime(), Duration::days(1));
        assert_eq!(issuer.refresh_lifetime(), Duration::days(10));
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut config = from_toml(MINIMAL);
        config.jwt.refresh_token_secret = config.jwt.access_token_secret.clone();

        assert!(matches!(
            config.jwt.token_issuer(),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_out_of_range_expiry_rejected() {
        let mut config = from_toml(MINIMAL);
        config.jwt.access_token_expiry_minutes = 1_000_000_000_000_000;

        assert!(matches!(
            config.jwt.token_issuer(),
            Err(JwtError::InvalidLifetime(_))
        ));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut config = from_toml(MINIMAL);
        config.jwt.access_token_expiry_minutes = 0;

        assert!(matches!(
            config.jwt.token_issuer(),
            Err(JwtError::InvalidLifetime(_))
        ));
    }

    #[test]
    fn test_memory_backend_and_stateless_policy() {
        let toml = MINIMAL.replace(
            "[database]",
            "[session]\nrefresh_policy = \"stateless\"\nsecure_cookies = false\n\n[database]\nbackend = \"memory\"",
        );
        let config = from_toml(&toml);

        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.session.refresh_policy, RefreshPolicy::Stateless);
        assert!(!config.session.secure_cookies);
    }

    #[test]
    fn test_password_hasher_from_config() {
        let config = PasswordConfig {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        };
        let hash = config.password_hasher().unwrap().hash("p@ss1234").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));
    }
}
