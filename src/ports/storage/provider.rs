use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{TryStreamExt, stream::BoxStream};
use tokio_util::io::ReaderStream;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{ContainerInfo, DEFAULT_PAGE_SIZE, ListOptions, ObjectInfo, Page},
    value_objects::{ContainerId, ContainerName, ObjectId, ObjectName},
};

/// Readable byte source accepted by streaming uploads
pub type ByteReader = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// Chunked object content returned by streaming downloads
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Port for a storage backend
///
/// One implementation exists per backend; the service handles only ever talk
/// to this trait. Object ids are unique across the whole provider, not just
/// within one container.
#[async_trait]
pub trait StorageProvider: Send + Sync + 'static {
    /// Short backend name used in logs and `Debug` output
    fn name(&self) -> &'static str;

    /// Page size used when a listing does not specify one
    fn default_page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }

    /// Provision a container; fails if a live container has the same name
    async fn create_container(&self, name: &ContainerName) -> StorageResult<ContainerInfo>;

    async fn get_container(&self, id: &ContainerId) -> StorageResult<ContainerInfo>;

    /// List live containers ordered by id
    async fn list_containers(&self, options: &ListOptions) -> StorageResult<Page<ContainerInfo>>;

    /// Remove an empty container
    async fn delete_container(&self, id: &ContainerId) -> StorageResult<()>;

    /// Look a container up by name
    async fn find_container(&self, name: &ContainerName) -> StorageResult<Option<ContainerInfo>> {
        let mut options = ListOptions::new();
        loop {
            let page = self.list_containers(&options).await?;
            if let Some(found) = page.items.iter().find(|c| &c.name == name) {
                return Ok(Some(found.clone()));
            }
            match page.next_marker {
                Some(marker) => options.marker = Some(marker),
                None => return Ok(None),
            }
        }
    }

    /// Create a zero-byte object; fails if the name is taken in the container
    async fn create_object(
        &self,
        container: &ContainerId,
        name: &ObjectName,
    ) -> StorageResult<ObjectInfo>;

    async fn get_object(&self, id: &ObjectId) -> StorageResult<ObjectInfo>;

    /// List the objects of a container ordered by id
    async fn list_objects(
        &self,
        container: &ContainerId,
        options: &ListOptions,
    ) -> StorageResult<Page<ObjectInfo>>;

    /// Replace the content of an existing object
    async fn put_content(&self, id: &ObjectId, data: Bytes) -> StorageResult<ObjectInfo>;

    /// Replace the content of an existing object from a reader
    async fn put_stream(&self, id: &ObjectId, reader: ByteReader) -> StorageResult<ObjectInfo> {
        let mut buffer = BytesMut::new();
        let mut chunks = ReaderStream::new(reader);
        while let Some(chunk) = chunks
            .try_next()
            .await
            .map_err(|e| StorageError::infrastructure("Failed to read upload source", e))?
        {
            buffer.extend_from_slice(&chunk);
        }
        self.put_content(id, buffer.freeze()).await
    }

    async fn get_content(&self, id: &ObjectId) -> StorageResult<Bytes>;

    /// Stream the content of an object
    async fn get_stream(&self, id: &ObjectId) -> StorageResult<ByteStream> {
        let data = self.get_content(id).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn delete_object(&self, id: &ObjectId) -> StorageResult<()>;
}
