use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::ObjectInfo,
        value_objects::{ContainerId, ObjectId, ObjectName},
    },
    ports::storage::{ByteReader, StorageProvider},
};

/// Content accepted by [`StorageObject::upload`]
///
/// Either an in-memory byte sequence or a readable byte stream. Most callers
/// never name this type and pass bytes, strings or `UploadSource::reader(..)`.
pub enum UploadSource {
    Bytes(Bytes),
    Reader(ByteReader),
}

impl UploadSource {
    /// Upload from any async reader
    pub fn reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        UploadSource::Reader(Box::new(reader))
    }
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadSource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            UploadSource::Reader(_) => f.write_str("Reader"),
        }
    }
}

impl From<Bytes> for UploadSource {
    fn from(value: Bytes) -> Self {
        UploadSource::Bytes(value)
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(value: Vec<u8>) -> Self {
        UploadSource::Bytes(Bytes::from(value))
    }
}

impl From<&[u8]> for UploadSource {
    fn from(value: &[u8]) -> Self {
        UploadSource::Bytes(Bytes::copy_from_slice(value))
    }
}

impl<const N: usize> From<&[u8; N]> for UploadSource {
    fn from(value: &[u8; N]) -> Self {
        UploadSource::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<String> for UploadSource {
    fn from(value: String) -> Self {
        UploadSource::Bytes(Bytes::from(value))
    }
}

impl From<&str> for UploadSource {
    fn from(value: &str) -> Self {
        UploadSource::Bytes(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<ByteReader> for UploadSource {
    fn from(value: ByteReader) -> Self {
        UploadSource::Reader(value)
    }
}

/// Handle to an object inside a container
///
/// Handles compare equal when they refer to the same object id, however they
/// were obtained. The size/etag/last-modified snapshot is refreshed by
/// `upload` and `refresh` on this handle only.
#[derive(Clone)]
pub struct StorageObject {
    info: ObjectInfo,
    provider: Arc<dyn StorageProvider>,
}

impl StorageObject {
    pub(crate) fn new(info: ObjectInfo, provider: Arc<dyn StorageProvider>) -> Self {
        Self { info, provider }
    }

    pub fn id(&self) -> &ObjectId {
        &self.info.id
    }

    pub fn name(&self) -> &ObjectName {
        &self.info.name
    }

    pub fn container_id(&self) -> &ContainerId {
        &self.info.container_id
    }

    pub fn size(&self) -> u64 {
        self.info.size
    }

    pub fn etag(&self) -> Option<&str> {
        self.info.etag.as_deref()
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.info.last_modified
    }

    pub fn info(&self) -> &ObjectInfo {
        &self.info
    }

    /// Replace the object's content
    pub async fn upload(&mut self, data: impl Into<UploadSource>) -> StorageResult<()> {
        let info = match data.into() {
            UploadSource::Bytes(bytes) => self.provider.put_content(&self.info.id, bytes).await?,
            UploadSource::Reader(reader) => {
                self.provider.put_stream(&self.info.id, reader).await?
            }
        };

        info!(object = %self.info.id, size = info.size, "uploaded object content");
        self.info = info;
        Ok(())
    }

    /// Write the stored bytes into `sink`, returning how many were written
    pub async fn download<W>(&self, sink: &mut W) -> StorageResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut chunks = self.provider.get_stream(&self.info.id).await?;
        let mut written = 0u64;

        while let Some(chunk) = chunks.try_next().await? {
            sink.write_all(&chunk)
                .await
                .map_err(|e| StorageError::infrastructure("Failed to write download sink", e))?;
            written += chunk.len() as u64;
        }
        sink.flush()
            .await
            .map_err(|e| StorageError::infrastructure("Failed to flush download sink", e))?;

        debug!(object = %self.info.id, size = written, "downloaded object content");
        Ok(written)
    }

    /// Fetch the whole content into memory
    pub async fn content(&self) -> StorageResult<Bytes> {
        self.provider.get_content(&self.info.id).await
    }

    pub async fn delete(&self) -> StorageResult<()> {
        self.provider.delete_object(&self.info.id).await?;
        info!(object = %self.info.id, "deleted object");
        Ok(())
    }

    /// Reload the metadata snapshot from the provider
    pub async fn refresh(&mut self) -> StorageResult<()> {
        self.info = self.provider.get_object(&self.info.id).await?;
        Ok(())
    }
}

impl PartialEq for StorageObject {
    fn eq(&self, other: &Self) -> bool {
        self.info.id == other.info.id
    }
}

impl Eq for StorageObject {}

impl std::hash::Hash for StorageObject {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.info.id.hash(state);
    }
}

impl std::fmt::Debug for StorageObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageObject")
            .field("id", &self.info.id.as_str())
            .field("name", &self.info.name.as_str())
            .field("container_id", &self.info.container_id.as_str())
            .field("size", &self.info.size)
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl std::fmt::Display for StorageObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.info.name, self.info.id)
    }
}
