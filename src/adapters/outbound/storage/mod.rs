// Infrastructure error types
pub mod error;

// Provider implementations
pub mod apache_object_store_adapter;
pub mod in_memory_provider;

// Backend-specific construction
pub mod s3;

// Re-export key types
pub use apache_object_store_adapter::ApacheObjectStoreProvider;
pub use error::StoreError;
pub use in_memory_provider::InMemoryProvider;
pub use s3::{S3Config, create_s3_store};
