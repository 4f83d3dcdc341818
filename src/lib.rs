//! Provider-neutral object storage
//!
//! [`ObjectStoreService`] manages containers, each [`Container`] manages its
//! objects and each [`StorageObject`] carries content. The actual backend is a
//! [`StorageProvider`] chosen when the service is built.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    ContainerId,
    // Models
    ContainerInfo,
    // Value objects
    ContainerName,
    ListOptions,
    ObjectId,
    ObjectInfo,
    ObjectName,
    Page,
    // Errors
    StorageError,
    StorageResult,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{ByteReader, ByteStream, StorageProvider};

// Handles
pub use services::{Container, ObjectStoreService, StorageObject, UploadSource};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppError, StorageBackend, create_app_from_env, create_in_memory_app,
    create_local_app, create_s3_app, init_logging,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{ApacheObjectStoreProvider, InMemoryProvider, S3Config};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AppBuilder, Container, ContainerId, ObjectId, ObjectStoreService, StorageBackend,
        StorageError, StorageObject, StorageResult, UploadSource, create_in_memory_app,
    };
}
