use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub webadmin: WebAdminConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct WebAdminConfig {
    /// Mount the `/errors/*` diagnostic routes
    pub error_routes_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("WEBADMIN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("WEBADMIN_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("WEBADMIN_PORT must be a valid port number")?,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            webadmin: WebAdminConfig {
                error_routes_enabled: env::var("WEBADMIN_ERROR_ROUTES_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .context("WEBADMIN_ERROR_ROUTES_ENABLED must be true or false")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                instance_id: "unknown".to_string(),
            },
            webadmin: WebAdminConfig {
                error_routes_enabled: true,
            },
        }
    }
}
