use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

pub const POSTGRES_URL_ENV: &str = "BANK_POSTGRES_URL";
pub const JWT_SECRET_ENV: &str = "BANK_JWT_SECRET";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL for accounts and transfers
    pub postgres_url: String,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply environment overrides
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(POSTGRES_URL_ENV).filter(|v| !v.is_empty()) {
            self.postgres_url = url;
        }
        if let Some(secret) = lookup(JWT_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.security.jwt_secret = secret;
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.security.jwt_secret.is_empty(),
            "security.jwt_secret is empty (set it in the config file or {})",
            JWT_SECRET_ENV
        );
        anyhow::ensure!(
            self.security.token_ttl_hours > 0,
            "security.token_ttl_hours must be positive"
        );
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}
