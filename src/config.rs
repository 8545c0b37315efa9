use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub sentinel: SentinelConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed to call the HTTP trigger from a browser.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

/// Credential material for the management API.
///
/// When tenant/client/secret are all present the client-credential flow is
/// used; otherwise the local managed-identity endpoint.
#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_identity_endpoint")]
    pub identity_endpoint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            identity_endpoint: default_identity_endpoint(),
        }
    }
}

// Manual Debug impl to avoid leaking the client secret
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("identity_endpoint", &self.identity_endpoint)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SentinelConfig {
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace: String,
    /// Lookback window in hours; fractional values allowed (0.083 ≈ 5 minutes).
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
}

impl SentinelConfig {
    /// Pre-flight check run before any network call is attempted.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("sentinel.subscription_id", &self.subscription_id),
            ("sentinel.resource_group", &self.resource_group),
            ("sentinel.workspace", &self.workspace),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{name} is not set")));
            }
        }
        if !self.window_hours.is_finite() || self.window_hours <= 0.0 {
            return Err(AppError::Config(format!(
                "sentinel.window_hours must be a positive number of hours, got {}",
                self.window_hours
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: default_interval_minutes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origin() -> String {
    "https://portal.azure.com".to_string()
}

fn default_identity_endpoint() -> String {
    "http://169.254.169.254/metadata/identity/oauth2/token".to_string()
}

fn default_window_hours() -> f64 {
    24.0
}

fn default_page_size() -> u32 {
    200
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

fn default_interval_minutes() -> u64 {
    60
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            // Try default paths
            builder = builder.add_source(config::File::with_name("reopener").required(false));
        }

        // Environment variable overrides with REOPENER_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("REOPENER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinel() -> SentinelConfig {
        SentinelConfig {
            subscription_id: "00000000-0000-0000-0000-000000000000".to_string(),
            resource_group: "rg-soc".to_string(),
            workspace: "sentinel-prod".to_string(),
            window_hours: default_window_hours(),
            page_size: default_page_size(),
            management_endpoint: default_management_endpoint(),
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(sentinel().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_workspace() {
        let mut cfg = sentinel();
        cfg.workspace = "  ".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sentinel.workspace"));
    }

    #[test]
    fn validate_rejects_non_positive_window() {
        let mut cfg = sentinel();
        cfg.window_hours = 0.0;
        assert!(cfg.validate().is_err());
        cfg.window_hours = -1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_client_secret() {
        let auth = AuthConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some("hunter2".to_string()),
            identity_endpoint: default_identity_endpoint(),
        };
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
    }
}
