use anyhow::{anyhow, Context, Result};
use std::env;

use crate::errors::StatusRegistry;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub errors: ErrorConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// `(public code, HTTP status)` pairs applied on top of the catalog
    pub status_overrides: Vec<(String, u16)>,
    pub use_catalog_statuses: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            errors: ErrorConfig {
                status_overrides: parse_status_overrides(
                    &env::var("ERROR_STATUS_OVERRIDES").unwrap_or_default(),
                )
                .context("ERROR_STATUS_OVERRIDES must be a list of code=status pairs")?,
                use_catalog_statuses: env::var("ERROR_USE_CATALOG_STATUSES")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .context("ERROR_USE_CATALOG_STATUSES must be true or false")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the status registry described by this configuration
    pub fn status_registry(&self) -> Result<StatusRegistry> {
        let mut registry = if self.errors.use_catalog_statuses {
            StatusRegistry::with_catalog()
        } else {
            StatusRegistry::new()
        };
        registry
            .extend_overrides(&self.errors.status_overrides)
            .context("Invalid error status override")?;
        Ok(registry)
    }
}

/// Parse `"not_found=404, too_young=422"` into code/status pairs.
fn parse_status_overrides(raw: &str) -> Result<Vec<(String, u16)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(String, u16)> {
            let (code, status) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("missing '=' in '{}'", entry))?;
            let code = code.trim();
            if code.is_empty() {
                return Err(anyhow!("empty error code in '{}'", entry));
            }
            let status = status
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid status in '{}'", entry))?;
            Ok((code.to_string(), status))
        })
        .collect()
}
