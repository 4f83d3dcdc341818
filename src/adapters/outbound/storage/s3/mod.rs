//! S3 backend construction
//!
//! The S3 transport, signing and credential chain all live in the
//! `object_store` crate; this module only turns our configuration into an
//! `AmazonS3` store that `ApacheObjectStoreProvider` can wrap.

use anyhow::{Context, Result};
use object_store::{ObjectStore as ObjectStoreBackend, aws::AmazonS3Builder};
use std::sync::Arc;

/// Configuration for S3 storage backend
#[derive(Debug, Clone, PartialEq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStoreBackend>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        // Custom endpoints (MinIO, localstack) are usually plain http
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    let store = builder
        .build()
        .with_context(|| format!("Failed to build S3 store for bucket {}", config.bucket))?;

    Ok(Arc::new(store))
}
