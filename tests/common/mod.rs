#![allow(dead_code)]

use cloud_object_store::{AppBuilder, ObjectStoreService, StorageBackend, StorageResult};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tempfile::TempDir;

/// Page size small enough that every listing in the suite spans pages
pub const PAGE_SIZE: usize = 2;

/// A service plus whatever must outlive it
pub struct Fixture {
    pub service: ObjectStoreService,
    _root: Option<TempDir>,
}

pub fn init_logging() {
    // Several tests race to install the subscriber; losing is fine
    cloud_object_store::init_logging("warn").ok();
}

fn build(backend: StorageBackend, root: Option<TempDir>) -> Fixture {
    init_logging();
    let service = AppBuilder::new()
        .with_storage_backend(backend)
        .with_page_size(PAGE_SIZE)
        .build()
        .unwrap();
    Fixture {
        service,
        _root: root,
    }
}

pub fn memory() -> Fixture {
    build(StorageBackend::InMemory, None)
}

pub fn object_store_memory() -> Fixture {
    build(StorageBackend::ObjectStoreMemory, None)
}

pub fn local_fs() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    build(StorageBackend::LocalFileSystem { root }, Some(dir))
}

/// Unique container name for one test run
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// Run `body`, then `cleanup`, even if `body` panicked
///
/// A failing cleanup is only logged; assertions after the cleanup are what
/// catch leaked resources.
pub async fn with_cleanup<T>(
    body: impl Future<Output = T>,
    cleanup: impl Future<Output = StorageResult<()>>,
) -> T {
    let outcome = AssertUnwindSafe(body).catch_unwind().await;

    if let Err(e) = cleanup.await {
        tracing::warn!(error = %e, "cleanup failed");
    }

    match outcome {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
