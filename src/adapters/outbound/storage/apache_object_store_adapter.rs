use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use object_store::{
    ObjectMeta, ObjectStore as ApacheObjectStore, PutMode, PutOptions, PutPayload,
    buffered::BufWriter, path::Path as ObjectPath,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    adapters::outbound::storage::error::StoreError,
    domain::{
        errors::{StorageError, StorageResult, ValidationError},
        models::{ContainerInfo, DEFAULT_PAGE_SIZE, ListOptions, ObjectInfo, Page},
        value_objects::{ContainerId, ContainerName, ObjectId, ObjectName},
    },
    ports::storage::{ByteReader, ByteStream, StorageProvider},
};

const CONTAINERS_PREFIX: &str = "containers";
const NAMES_PREFIX: &str = "names";
const OBJECTS_PREFIX: &str = "objects";
const RECORD_SUFFIX: &str = ".json";

/// Container record persisted next to the object data
#[derive(Debug, Serialize, Deserialize)]
struct ContainerRecord {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
}

/// Provider that implements the storage port on top of Apache object_store
///
/// Layout inside the wrapped store:
/// - `names/<container name>` holds the id of the container owning the name
/// - `containers/<container id>.json` holds the container record
/// - `objects/<container id>/<object name>` holds object content
///
/// Object ids are `<container id>/<object name>`.
///
/// Names are claimed with create-only puts, so uniqueness holds across every
/// process sharing the store. Object writes and container deletes are ordered
/// by a per-provider gate, so a container is never removed while one of its
/// objects is being written through the same provider.
pub struct ApacheObjectStoreProvider {
    inner: Arc<dyn ApacheObjectStore>,
    page_size: usize,
    local_path_rules: bool,
    container_gate: RwLock<()>,
}

impl ApacheObjectStoreProvider {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self {
            inner: store,
            page_size: DEFAULT_PAGE_SIZE,
            local_path_rules: false,
            container_gate: RwLock::new(()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Reject object names the local filesystem store cannot hold
    pub fn with_local_path_rules(mut self) -> Self {
        self.local_path_rules = true;
        self
    }

    fn create_only() -> PutOptions {
        PutOptions {
            mode: PutMode::Create,
            ..Default::default()
        }
    }

    fn record_path(id: &ContainerId) -> Option<ObjectPath> {
        if id.as_str().contains('/') {
            return None;
        }
        ObjectPath::parse(format!("{}/{}{}", CONTAINERS_PREFIX, id, RECORD_SUFFIX)).ok()
    }

    fn name_path(name: &ContainerName) -> Result<ObjectPath, StoreError> {
        Ok(ObjectPath::parse(format!("{}/{}", NAMES_PREFIX, name))?)
    }

    fn objects_prefix(container: &ContainerId) -> Result<ObjectPath, StoreError> {
        Ok(ObjectPath::parse(format!("{}/{}", OBJECTS_PREFIX, container))?)
    }

    fn object_id(container: &ContainerId, name: &ObjectName) -> StorageResult<ObjectId> {
        Ok(ObjectId::new(format!("{}/{}", container, name))?)
    }

    fn check_object_name(&self, name: &ObjectName) -> StorageResult<()> {
        if self.local_path_rules && name.has_part_suffix() {
            return Err(ValidationError::ObjectNameReservedSuffix(name.to_string()).into());
        }
        Ok(())
    }

    /// Split an object id back into its container and name
    fn parse_object_id(id: &ObjectId) -> StorageResult<(ContainerId, ObjectName, ObjectPath)> {
        let not_found = || StorageError::ObjectNotFound { id: id.clone() };

        let (container, name) = id.as_str().split_once('/').ok_or_else(not_found)?;
        let container = ContainerId::new(container).map_err(|_| not_found())?;
        let name = ObjectName::new(name).map_err(|_| not_found())?;
        let path = ObjectPath::parse(format!("{}/{}/{}", OBJECTS_PREFIX, container, name))
            .map_err(|_| not_found())?;

        Ok((container, name, path))
    }

    fn object_info(
        container: &ContainerId,
        prefix: &ObjectPath,
        meta: &ObjectMeta,
    ) -> StorageResult<ObjectInfo> {
        let location: &str = meta.location.as_ref();
        let prefix_str: &str = prefix.as_ref();
        let name = location
            .strip_prefix(prefix_str)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InternalError {
                message: format!("Object {} listed outside of {}", location, prefix),
            })?;
        let name = ObjectName::new(name)?;

        Ok(ObjectInfo {
            id: Self::object_id(container, &name)?,
            container_id: container.clone(),
            name,
            size: meta.size,
            etag: meta.e_tag.clone(),
            last_modified: meta.last_modified,
        })
    }

    async fn read_record(&self, id: &ContainerId) -> StorageResult<ContainerInfo> {
        let not_found = || StorageError::ContainerNotFound { id: id.clone() };
        let path = Self::record_path(id).ok_or_else(not_found)?;

        let result = match self.inner.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let bytes = result.bytes().await?;

        let record: ContainerRecord =
            serde_json::from_slice(&bytes).map_err(StoreError::Serialization)?;
        let corrupt = |reason: String| StoreError::CorruptRecord {
            path: path.to_string(),
            reason,
        };
        let name = ContainerName::new(record.name).map_err(|e| corrupt(e.to_string()))?;
        let record_id = ContainerId::new(record.id).map_err(|e| corrupt(e.to_string()))?;

        Ok(ContainerInfo {
            id: record_id,
            name,
            created_at: record.created_at,
        })
    }

    /// Drop a name claim; a failure leaves the name taken, so it is only logged
    async fn release_name(&self, path: &ObjectPath) {
        if let Err(e) = self.inner.delete(path).await {
            warn!(path = %path, error = %e, "failed to release container name");
        }
    }

    /// Container ids present in the store, sorted
    async fn container_ids(&self) -> StorageResult<Vec<ContainerId>> {
        let prefix = ObjectPath::from(CONTAINERS_PREFIX);
        let metas: Vec<ObjectMeta> = self.inner.list(Some(&prefix)).try_collect().await?;

        let mut ids: Vec<ContainerId> = metas
            .iter()
            .filter_map(|meta| meta.location.filename())
            .filter_map(|file| file.strip_suffix(RECORD_SUFFIX))
            .filter_map(|id| ContainerId::new(id).ok())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_object_metas(&self, container: &ContainerId) -> StorageResult<Vec<ObjectInfo>> {
        let prefix = Self::objects_prefix(container)?;
        let metas: Vec<ObjectMeta> = self.inner.list(Some(&prefix)).try_collect().await?;

        let mut objects = metas
            .iter()
            .map(|meta| Self::object_info(container, &prefix, meta))
            .collect::<StorageResult<Vec<_>>>()?;
        objects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(objects)
    }

    async fn head_object(&self, id: &ObjectId) -> StorageResult<ObjectInfo> {
        let (container, _, path) = Self::parse_object_id(id)?;

        let meta = self.inner.head(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound { id: id.clone() },
            _ => StorageError::infrastructure("Failed to get object metadata", e),
        })?;

        let prefix = Self::objects_prefix(&container)?;
        Self::object_info(&container, &prefix, &meta)
    }
}

#[async_trait]
impl StorageProvider for ApacheObjectStoreProvider {
    fn name(&self) -> &'static str {
        "object_store"
    }

    fn default_page_size(&self) -> usize {
        self.page_size
    }

    async fn create_container(&self, name: &ContainerName) -> StorageResult<ContainerInfo> {
        let id = ContainerId::generate();
        let record = ContainerRecord {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let record_path = Self::record_path(&id).ok_or_else(|| StorageError::InternalError {
            message: format!("Generated container id {} is not a valid path", id),
        })?;
        let name_path = Self::name_path(name)?;
        let payload = serde_json::to_vec(&record).map_err(StoreError::Serialization)?;

        // Exactly one writer can create the claim
        let claim = PutPayload::from(Bytes::from(id.to_string()));
        match self
            .inner
            .put_opts(&name_path, claim, Self::create_only())
            .await
        {
            Ok(_) => {}
            Err(object_store::Error::AlreadyExists { .. }) => {
                return Err(StorageError::ContainerAlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self.inner.put(&record_path, PutPayload::from(payload)).await {
            self.release_name(&name_path).await;
            return Err(StorageError::infrastructure(
                "Failed to write container record",
                e,
            ));
        }

        debug!(container = %id, name = %name, "created container");
        Ok(ContainerInfo {
            id,
            name: name.clone(),
            created_at: record.created_at,
        })
    }

    async fn get_container(&self, id: &ContainerId) -> StorageResult<ContainerInfo> {
        self.read_record(id).await
    }

    async fn list_containers(&self, options: &ListOptions) -> StorageResult<Page<ContainerInfo>> {
        let ids = self.container_ids().await?;
        let page = Page::from_sorted(ids, |id| id.as_str(), options, self.default_page_size())?;

        // Only the records on this page are fetched
        let mut items = Vec::with_capacity(page.items.len());
        for id in &page.items {
            match self.read_record(id).await {
                Ok(info) => items.push(info),
                // Deleted between listing and reading
                Err(StorageError::ContainerNotFound { .. }) => {
                    warn!(container = %id, "container record vanished during listing");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Page {
            items,
            next_marker: page.next_marker,
        })
    }

    async fn delete_container(&self, id: &ContainerId) -> StorageResult<()> {
        let _gate = self.container_gate.write().await;
        let info = self.read_record(id).await?;

        let remaining = self.list_object_metas(id).await?.len();
        if remaining > 0 {
            return Err(StorageError::ContainerNotEmpty {
                id: id.clone(),
                objects: remaining,
            });
        }

        let path = Self::record_path(id)
            .ok_or_else(|| StorageError::ContainerNotFound { id: id.clone() })?;
        self.inner
            .delete(&path)
            .await
            .map_err(|e| StorageError::infrastructure("Failed to delete container record", e))?;

        // Record first, claim second: the name is never free while the record lives
        self.release_name(&Self::name_path(&info.name)?).await;

        debug!(container = %id, "deleted container");
        Ok(())
    }

    async fn find_container(&self, name: &ContainerName) -> StorageResult<Option<ContainerInfo>> {
        let path = Self::name_path(name)?;
        let claim = match self.inner.get(&path).await {
            Ok(result) => result.bytes().await?,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let id = std::str::from_utf8(&claim)
            .ok()
            .and_then(|id| ContainerId::new(id).ok())
            .ok_or_else(|| StoreError::CorruptRecord {
                path: path.to_string(),
                reason: "name claim does not hold a container id".to_string(),
            })?;

        match self.read_record(&id).await {
            Ok(info) if &info.name == name => Ok(Some(info)),
            Ok(_) => Ok(None),
            // Claimed by a create or delete still in flight
            Err(StorageError::ContainerNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_object(
        &self,
        container: &ContainerId,
        name: &ObjectName,
    ) -> StorageResult<ObjectInfo> {
        self.check_object_name(name)?;

        let _gate = self.container_gate.read().await;
        self.read_record(container).await?;

        let id = Self::object_id(container, name)?;
        let (_, _, path) = Self::parse_object_id(&id)?;

        match self
            .inner
            .put_opts(&path, PutPayload::new(), Self::create_only())
            .await
        {
            Ok(_) => {}
            Err(object_store::Error::AlreadyExists { .. }) => {
                return Err(StorageError::ObjectAlreadyExists {
                    container: container.clone(),
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(StorageError::infrastructure("Failed to create object", e)),
        }

        debug!(container = %container, object = %id, "created object");
        self.head_object(&id).await
    }

    async fn get_object(&self, id: &ObjectId) -> StorageResult<ObjectInfo> {
        self.head_object(id).await
    }

    async fn list_objects(
        &self,
        container: &ContainerId,
        options: &ListOptions,
    ) -> StorageResult<Page<ObjectInfo>> {
        self.read_record(container).await?;

        let objects = self.list_object_metas(container).await?;
        let page = Page::from_sorted(
            objects,
            |o| o.id.as_str(),
            options,
            self.default_page_size(),
        )?;
        Ok(page)
    }

    async fn put_content(&self, id: &ObjectId, data: Bytes) -> StorageResult<ObjectInfo> {
        let _gate = self.container_gate.read().await;
        self.head_object(id).await?;
        let (_, _, path) = Self::parse_object_id(id)?;

        let size = data.len();
        self.inner
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| StorageError::infrastructure("Failed to put object", e))?;

        debug!(object = %id, size, "stored object content");
        self.head_object(id).await
    }

    async fn put_stream(&self, id: &ObjectId, mut reader: ByteReader) -> StorageResult<ObjectInfo> {
        let _gate = self.container_gate.read().await;
        self.head_object(id).await?;
        let (_, _, path) = Self::parse_object_id(id)?;

        let mut writer = BufWriter::new(Arc::clone(&self.inner), path);
        let copied = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(copied) => copied,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    warn!(object = %id, error = %abort_err, "failed to abort upload");
                }
                return Err(StoreError::Io(e).into());
            }
        };
        writer.shutdown().await.map_err(StoreError::Io)?;

        debug!(object = %id, size = copied, "streamed object content");
        self.head_object(id).await
    }

    async fn get_content(&self, id: &ObjectId) -> StorageResult<Bytes> {
        let mut chunks = self.get_stream(id).await?;
        let mut data = Vec::new();
        while let Some(chunk) = chunks.try_next().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(data))
    }

    async fn get_stream(&self, id: &ObjectId) -> StorageResult<ByteStream> {
        let (_, _, path) = Self::parse_object_id(id)?;

        let result = self.inner.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound { id: id.clone() },
            _ => StorageError::infrastructure("Failed to get object", e),
        })?;

        Ok(result
            .into_stream()
            .map(|chunk| {
                chunk.map_err(|e| StorageError::infrastructure("Failed to read object bytes", e))
            })
            .boxed())
    }

    async fn delete_object(&self, id: &ObjectId) -> StorageResult<()> {
        let _gate = self.container_gate.read().await;
        // Deleting a missing key succeeds on most stores
        self.head_object(id).await?;
        let (_, _, path) = Self::parse_object_id(id)?;

        self.inner
            .delete(&path)
            .await
            .map_err(|e| StorageError::infrastructure("Failed to delete object", e))?;

        debug!(object = %id, "deleted object");
        Ok(())
    }
}
