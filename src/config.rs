//! Environment-driven server configuration.
//!
//! Everything is resolved once at startup. The public base URL in particular
//! is computed here so the certificate pipeline only ever sees a plain value.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_UPLOADS_DIR: &str = "./uploads";
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Scheme, host and optional port that clients use to reach this server.
    pub public_base_url: String,
    pub uploads_dir: PathBuf,
    pub render_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = get("APP_ENV").unwrap_or_else(|| "development".to_string());
        let production = environment.eq_ignore_ascii_case("production");

        let default_host = if production { "0.0.0.0" } else { "127.0.0.1" };
        let host = get("HOST").unwrap_or_else(|| default_host.to_string());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let public_base_url = match (get("PUBLIC_BASE_URL"), get("EXTERNAL_HOSTNAME")) {
            (Some(url), _) => url,
            (None, Some(hostname)) if production => format!("https://{}", hostname),
            // Certificates embed this URL; it must be reachable from outside.
            _ if production => anyhow::bail!(
                "PUBLIC_BASE_URL or EXTERNAL_HOSTNAME must be set when APP_ENV=production"
            ),
            _ => format!("http://{}:{}", host, port),
        };
        let public_base_url = public_base_url.trim_end_matches('/').to_string();
        if !(public_base_url.starts_with("http://") || public_base_url.starts_with("https://")) {
            anyhow::bail!(
                "PUBLIC_BASE_URL must start with http:// or https://, got '{}'",
                public_base_url
            );
        }

        let uploads_dir = PathBuf::from(get("UPLOADS_DIR").unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string()));

        let render_timeout = match get("RENDER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("RENDER_TIMEOUT_SECS must be an integer, got '{}'", raw))?;
                if secs == 0 {
                    anyhow::bail!("RENDER_TIMEOUT_SECS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
        };

        let allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            environment,
            host,
            port,
            public_base_url,
            uploads_dir,
            render_timeout,
            allowed_origins,
        })
    }
}
