use object_store::{local::LocalFileSystem, memory::InMemory};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    adapters::outbound::storage::{
        ApacheObjectStoreProvider, InMemoryProvider, S3Config, create_s3_store,
    },
    domain::models::DEFAULT_PAGE_SIZE,
    ports::storage::StorageProvider,
    services::ObjectStoreService,
};

/// Configuration for the application
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub page_size: usize,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory,
            page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// Native in-memory provider
    InMemory,
    /// Apache object_store in-memory store behind the object_store adapter
    ObjectStoreMemory,
    /// Directory on the local filesystem
    LocalFileSystem { root: PathBuf },
    /// S3 or an S3-compatible endpoint
    S3(S3Config),
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::Configuration {
                message: format!("{} environment variable required", key),
            })
        };

        let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("memory") => StorageBackend::InMemory,
            Some("object-store-memory") => StorageBackend::ObjectStoreMemory,
            Some("local") => StorageBackend::LocalFileSystem {
                root: PathBuf::from(required("STORAGE_ROOT")?),
            },
            Some("s3") => StorageBackend::S3(S3Config {
                bucket: required("S3_BUCKET")?,
                region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key: lookup("S3_ACCESS_KEY"),
                secret_key: lookup("S3_SECRET_KEY"),
                endpoint: lookup("S3_ENDPOINT"),
            }),
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown storage backend: {}", other),
                });
            }
        };

        let page_size = match lookup("STORAGE_PAGE_SIZE") {
            Some(value) => match value.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AppError::Configuration {
                        message: format!("Invalid STORAGE_PAGE_SIZE value `{}`", value),
                    });
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            storage_backend,
            page_size,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Build the provider selected by the configuration
    pub fn build_provider(&self) -> Result<Arc<dyn StorageProvider>, AppError> {
        let page_size = self.config.page_size;

        let provider: Arc<dyn StorageProvider> = match &self.config.storage_backend {
            StorageBackend::InMemory => Arc::new(InMemoryProvider::new().with_page_size(page_size)),
            StorageBackend::ObjectStoreMemory => Arc::new(
                ApacheObjectStoreProvider::new(Arc::new(InMemory::new()))
                    .with_page_size(page_size),
            ),
            StorageBackend::LocalFileSystem { root } => {
                std::fs::create_dir_all(root).map_err(|e| AppError::StorageInit {
                    message: format!("Cannot create storage root {}: {}", root.display(), e),
                })?;
                let store =
                    LocalFileSystem::new_with_prefix(root).map_err(|e| AppError::StorageInit {
                        message: format!("Cannot open storage root {}: {}", root.display(), e),
                    })?;
                Arc::new(
                    ApacheObjectStoreProvider::new(Arc::new(store))
                        .with_page_size(page_size)
                        .with_local_path_rules(),
                )
            }
            StorageBackend::S3(config) => {
                let store = create_s3_store(config).map_err(|e| AppError::StorageInit {
                    message: format!("{:#}", e),
                })?;
                Arc::new(ApacheObjectStoreProvider::new(store).with_page_size(page_size))
            }
        };

        Ok(provider)
    }

    /// Build the object store service
    pub fn build(self) -> Result<ObjectStoreService, AppError> {
        let provider = self.build_provider()?;
        info!(provider = provider.name(), page_size = self.config.page_size, "object store ready");
        Ok(ObjectStoreService::new(provider))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Logging initialization error: {message}")]
    Logging { message: String },
}

/// Install a global `tracing` subscriber
///
/// `RUST_LOG` wins over `default_level` when set. Fails if a subscriber is
/// already installed.
pub fn init_logging(default_level: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| AppError::Logging {
            message: e.to_string(),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| AppError::Logging {
            message: e.to_string(),
        })
}

/// Convenience functions for common configurations
///
/// Create an in-memory service for testing and development
pub fn create_in_memory_app() -> ObjectStoreService {
    ObjectStoreService::new(Arc::new(InMemoryProvider::new()))
}

/// Create a service storing everything below `root`
pub fn create_local_app(root: impl Into<PathBuf>) -> Result<ObjectStoreService, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::LocalFileSystem { root: root.into() })
        .build()
}

/// Create an S3-backed service
pub fn create_s3_app(config: S3Config) -> Result<ObjectStoreService, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3(config))
        .build()
}

/// Create the service from environment variables, loading `.env` first
///
/// Also installs the `tracing` subscriber unless one is already set.
pub fn create_app_from_env() -> Result<ObjectStoreService, AppError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    if let Err(e) = init_logging(&config.log_level) {
        debug!(error = %e, "keeping existing tracing subscriber");
    }
    AppBuilder::new().with_config(config).build()
}
