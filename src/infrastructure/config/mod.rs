// ============================================================
// APP CONFIGURATION
// ============================================================
// Defaults < crm-importer.toml < CRM_IMPORT_* environment variables.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "crm-importer.toml";
pub const ENV_PREFIX: &str = "CRM_IMPORT_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// CORS origin for the UI. None means permissive (local tool mode).
    pub allowed_origin: Option<String>,
    /// Hard cap on uploaded file size.
    pub max_upload_bytes: usize,
    /// How many mapped rows a preview returns at most.
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_url: "sqlite://crm.db".to_string(),
            allowed_origin: None,
            max_upload_bytes: 10 * 1024 * 1024,
            preview_rows: 100,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))
    }

    /// Re-read every source. Callers own when this happens; there is no
    /// background watcher and no global config singleton.
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::load()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.preview_rows, 100);
        assert!(config.allowed_origin.is_none());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("port = 8080\nallowed_origin = \"http://localhost:5173\""))
            .extract()
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origin.as_deref(), Some("http://localhost:5173"));
        // Untouched keys keep their defaults
        assert_eq!(config.host, "127.0.0.1");
    }
}
