use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration, constructed once at startup and passed by
/// reference into each component.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root of the content tree (images, journals, about record, assets)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the built single-page frontend
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,

    /// Password for the single `admin` account
    #[serde(default)]
    pub admin_password: String,

    /// Production mode: long-lived static cache headers
    #[serde(default)]
    pub production: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum size of one uploaded file, in MB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Maximum number of files in one upload request
    #[serde(default = "default_max_files_per_upload")]
    pub max_files_per_upload: usize,

    /// Rate limit: requests per minute per client
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Log level / env-filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            data_dir: default_data_dir(),
            frontend_dir: default_frontend_dir(),
            admin_password: String::new(),
            production: false,
            timeout_secs: default_timeout_secs(),
            max_upload_mb: default_max_upload_mb(),
            max_files_per_upload: default_max_files_per_upload(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional `shutterlog` config file,
    /// overridden by `SHUTTERLOG__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("shutterlog").required(false))
            .add_source(config::Environment::with_prefix("SHUTTERLOG").separator("__"));

        let mut config: AppConfig = builder.build()?.try_deserialize()?;

        if config.admin_password.is_empty() {
            tracing::warn!("no admin password configured, using 'admin' (development only)");
            config.admin_password = "admin".to_string();
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Per-file upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Request body limit for upload routes: the full batch plus multipart
    /// framing overhead.
    pub fn upload_body_limit(&self) -> usize {
        self.max_upload_bytes() * self.max_files_per_upload + 1024 * 1024
    }

    /// Cache-Control for static asset responses.
    pub fn static_cache_header(&self) -> HeaderValue {
        if self.production {
            HeaderValue::from_static("public, max-age=31536000, immutable")
        } else {
            HeaderValue::from_static("no-cache")
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_upload_mb() -> usize {
    20
}

fn default_max_files_per_upload() -> usize {
    50
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_upload_mb, 20);
        assert_eq!(cfg.max_files_per_upload, 50);
        assert_eq!(cfg.rate_limit_per_minute, 100);
        assert!(!cfg.production);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = AppConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn upload_limits_scale_with_config() {
        let cfg = AppConfig {
            max_upload_mb: 2,
            max_files_per_upload: 3,
            ..AppConfig::default()
        };
        assert_eq!(cfg.max_upload_bytes(), 2 * 1024 * 1024);
        assert_eq!(cfg.upload_body_limit(), 6 * 1024 * 1024 + 1024 * 1024);
    }

    #[test]
    fn cache_header_tracks_production_flag() {
        let dev = AppConfig::default();
        assert_eq!(dev.static_cache_header(), "no-cache");

        let prod = AppConfig {
            production: true,
            ..AppConfig::default()
        };
        assert!(prod
            .static_cache_header()
            .to_str()
            .unwrap()
            .contains("max-age"));
    }
}
