//! Configuration module
//!
//! Server configuration is read from the environment (and an optional `.env` file).
//! Unparseable numeric values fall back to their defaults; only structurally invalid
//! settings (an empty storage path, an unparseable listen address) fail validation.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_DOWNLOAD_LIMIT, DEFAULT_GRPC_ADDR, DEFAULT_LIST_LIMIT, DEFAULT_STORAGE_PATH,
    DEFAULT_UPLOAD_LIMIT,
};
use crate::models::OperationKind;
use crate::storage_types::StorageBackend;

/// Concurrency bounds per operation category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionLimits {
    pub upload: usize,
    pub download: usize,
    pub list: usize,
}

impl AdmissionLimits {
    pub fn new(upload: usize, download: usize, list: usize) -> Self {
        Self {
            upload,
            download,
            list,
        }
    }

    pub fn for_kind(&self, kind: OperationKind) -> usize {
        match kind {
            OperationKind::Upload => self.upload,
            OperationKind::Download => self.download,
            OperationKind::List => self.list,
        }
    }
}

impl Default for AdmissionLimits {
    fn default() -> Self {
        Self::new(
            DEFAULT_UPLOAD_LIMIT,
            DEFAULT_DOWNLOAD_LIMIT,
            DEFAULT_LIST_LIMIT,
        )
    }
}

/// Process-level settings shared by every component
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub grpc_addr: String,
    pub environment: String,
    pub log_format: String,
}

/// File store configuration
#[derive(Clone, Debug)]
pub struct FileStoreConfig {
    pub base: BaseConfig,
    pub storage_backend: StorageBackend,
    pub storage_path: String,
    pub limits: AdmissionLimits,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<FileStoreConfig>);

impl Config {
    fn inner(&self) -> &FileStoreConfig {
        &self.0
    }

    /// Build a configuration directly, bypassing the environment (used by tests and
    /// embedders).
    pub fn new(
        storage_path: impl Into<String>,
        limits: AdmissionLimits,
        grpc_addr: impl Into<String>,
    ) -> Self {
        Config(Box::new(FileStoreConfig {
            base: BaseConfig {
                grpc_addr: normalize_addr(&grpc_addr.into()),
                environment: "development".to_string(),
                log_format: "text".to_string(),
            },
            storage_backend: StorageBackend::Local,
            storage_path: storage_path.into(),
            limits,
        }))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = FileStoreConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn grpc_addr(&self) -> &str {
        &self.inner().base.grpc_addr
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        SocketAddr::from_str(self.grpc_addr())
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", self.grpc_addr(), e))
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn storage_path(&self) -> &str {
        &self.inner().storage_path
    }

    pub fn limits(&self) -> AdmissionLimits {
        self.inner().limits
    }

    pub fn upload_limit(&self) -> usize {
        self.inner().limits.upload
    }

    pub fn download_limit(&self) -> usize {
        self.inner().limits.download
    }

    pub fn list_limit(&self) -> usize {
        self.inner().limits.list
    }
}

impl FileStoreConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let grpc_addr = env::var("GRPC_ADDR")
            .or_else(|_| env::var("GRPC_PORT"))
            .unwrap_or_else(|_| DEFAULT_GRPC_ADDR.to_string());

        let base = BaseConfig {
            grpc_addr: normalize_addr(&grpc_addr),
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .to_lowercase(),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let limits = AdmissionLimits {
            upload: env_usize("UPLOAD_LIMIT", DEFAULT_UPLOAD_LIMIT),
            download: env_usize("DOWNLOAD_LIMIT", DEFAULT_DOWNLOAD_LIMIT),
            list: env_usize("LIST_LIMIT", DEFAULT_LIST_LIMIT),
        };

        Ok(FileStoreConfig {
            base,
            storage_backend,
            storage_path: env::var("STORAGE_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
            limits,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_PATH must not be empty"));
        }
        SocketAddr::from_str(&self.base.grpc_addr).map_err(|e| {
            anyhow::anyhow!(
                "GRPC_ADDR must be a socket address like 0.0.0.0:50051 (got {}): {}",
                self.base.grpc_addr,
                e
            )
        })?;
        if !matches!(self.base.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'text' or 'json' (got {})",
                self.base.log_format
            ));
        }
        Ok(())
    }
}

/// Read a non-negative integer, falling back to `default` when unset or unparseable.
fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// Accept the `:50051` shorthand by binding on all interfaces.
fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}
