//! Configuration module for the RSVP backend and client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default photo size cap (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Backend configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite file holding the sheet and the gallery folder
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Base URL used when building public file links
    pub public_url: String,
    /// Storage folder that gallery photos are written to
    pub folder_id: String,
    /// Largest decoded photo accepted by `uploadPhoto`
    pub max_upload_bytes: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("PUMPKIN_DB_PATH")
            .unwrap_or_else(|_| "./data/pumpkinfest.sqlite".to_string())
            .into();

        let bind_addr: SocketAddr = env::var("PUMPKIN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid PUMPKIN_BIND_ADDR format");

        let public_url = env::var("PUMPKIN_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://{}", bind_addr));

        let folder_id =
            env::var("PUMPKIN_FOLDER_ID").unwrap_or_else(|_| "pumpkinfest-gallery".to_string());

        let max_upload_bytes = env::var("PUMPKIN_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let log_level = env::var("PUMPKIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            bind_addr,
            public_url,
            folder_id,
            max_upload_bytes,
            log_level,
        }
    }
}

/// Client-side configuration for the state manager.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the backend's action endpoint
    pub backend_url: String,
    /// How often RSVPs are re-fetched
    pub refresh_interval: Duration,
    /// How often the gallery is re-fetched
    pub gallery_refresh_interval: Duration,
    /// Largest photo the client will try to send
    pub max_upload_bytes: usize,
    /// Abandon callback-transport requests after this long
    pub callback_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8080/exec".to_string(),
            refresh_interval: Duration::from_secs(30),
            gallery_refresh_interval: Duration::from_secs(300),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            callback_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Client config pointing at the given action endpoint, other values default.
    pub fn for_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            backend_url: env::var("PUMPKIN_BACKEND_URL").unwrap_or(defaults.backend_url),
            refresh_interval: secs("PUMPKIN_REFRESH_SECS", defaults.refresh_interval),
            gallery_refresh_interval: secs(
                "PUMPKIN_GALLERY_REFRESH_SECS",
                defaults.gallery_refresh_interval,
            ),
            max_upload_bytes: env::var("PUMPKIN_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            callback_timeout: defaults.callback_timeout,
        }
    }
}
