use std::env;
use std::path::PathBuf;
use anyhow::{Result, Context};
use tracing::{info, warn};

pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:5000/upload";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub upload_dir: PathBuf,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port: parse_env_var("SERVER_PORT", 5000)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: parse_env_var("MAX_FILE_SIZE_MB", 10)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    info!("UPLOAD_DIR not set, using default: uploads");
                    PathBuf::from("uploads")
                }),
            request_timeout_seconds: parse_env_var("REQUEST_TIMEOUT_SECONDS", 30)
                .context("Failed to parse REQUEST_TIMEOUT_SECONDS")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Creates the upload directory if it does not exist yet.
    pub fn ensure_upload_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir).with_context(|| {
            format!("Failed to create upload directory {}", self.upload_dir.display())
        })
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            max_file_size_mb: 10,
            upload_dir: PathBuf::from("uploads"),
            request_timeout_seconds: 30,
        }
    }
}

/// Settings for the upload client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub upload_url: String,
    pub max_file_size_mb: usize,
    pub request_timeout_seconds: u64,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig {
            upload_url: env::var("RESUME_API_URL").unwrap_or_else(|_| {
                info!("RESUME_API_URL not set, using default: {}", DEFAULT_UPLOAD_URL);
                DEFAULT_UPLOAD_URL.to_string()
            }),
            max_file_size_mb: parse_env_var("MAX_FILE_SIZE_MB", 10)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            request_timeout_seconds: parse_env_var("REQUEST_TIMEOUT_SECONDS", 30)
                .context("Failed to parse REQUEST_TIMEOUT_SECONDS")?,
        };

        if config.upload_url.trim().is_empty() {
            return Err(anyhow::anyhow!("RESUME_API_URL must not be empty"));
        }
        if config.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        Ok(config)
    }

    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size_mb as u64) * 1024 * 1024
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            max_file_size_mb: 10,
            request_timeout_seconds: 30,
        }
    }
}

fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match env::var(var_name) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                Ok(default)
            }
        },
        Err(_) => {
            info!("{} not set, using default: {:?}", var_name, default);
            Ok(default)
        }
    }
}
