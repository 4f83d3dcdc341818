use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ContainerInfo, DEFAULT_PAGE_SIZE, ListOptions, ObjectInfo, Page},
        value_objects::{ContainerId, ContainerName, ObjectId, ObjectName},
    },
    ports::storage::StorageProvider,
};

/// Native in-memory provider for tests and development
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct InMemoryProvider {
    data: Arc<RwLock<ProviderData>>,
    page_size: usize,
}

#[derive(Default)]
struct ProviderData {
    containers: BTreeMap<ContainerId, StoredContainer>,
    objects: BTreeMap<ObjectId, StoredObject>,
}

struct StoredContainer {
    info: ContainerInfo,
    objects: BTreeSet<ObjectId>,
}

struct StoredObject {
    info: ObjectInfo,
    data: Bytes,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(ProviderData::default())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn etag(data: &[u8]) -> String {
        format!("{:x}", md5::compute(data))
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderData {
    fn container(&self, id: &ContainerId) -> StorageResult<&StoredContainer> {
        self.containers
            .get(id)
            .ok_or_else(|| StorageError::ContainerNotFound { id: id.clone() })
    }

    fn object_mut(&mut self, id: &ObjectId) -> StorageResult<&mut StoredObject> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| StorageError::ObjectNotFound { id: id.clone() })
    }
}

#[async_trait]
impl StorageProvider for InMemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn default_page_size(&self) -> usize {
        self.page_size
    }

    async fn create_container(&self, name: &ContainerName) -> StorageResult<ContainerInfo> {
        let mut data = self.data.write().await;

        if data.containers.values().any(|c| &c.info.name == name) {
            return Err(StorageError::ContainerAlreadyExists {
                name: name.to_string(),
            });
        }

        let info = ContainerInfo {
            id: ContainerId::generate(),
            name: name.clone(),
            created_at: Utc::now(),
        };
        data.containers.insert(
            info.id.clone(),
            StoredContainer {
                info: info.clone(),
                objects: BTreeSet::new(),
            },
        );

        debug!(container = %info.id, name = %name, "created container");
        Ok(info)
    }

    async fn get_container(&self, id: &ContainerId) -> StorageResult<ContainerInfo> {
        let data = self.data.read().await;
        Ok(data.container(id)?.info.clone())
    }

    async fn list_containers(&self, options: &ListOptions) -> StorageResult<Page<ContainerInfo>> {
        let data = self.data.read().await;
        let page = Page::from_sorted(
            data.containers.values().map(|c| c.info.clone()),
            |c| c.id.as_str(),
            options,
            self.default_page_size(),
        )?;
        Ok(page)
    }

    async fn delete_container(&self, id: &ContainerId) -> StorageResult<()> {
        let mut data = self.data.write().await;

        let remaining = data.container(id)?.objects.len();
        if remaining > 0 {
            return Err(StorageError::ContainerNotEmpty {
                id: id.clone(),
                objects: remaining,
            });
        }

        data.containers.remove(id);
        debug!(container = %id, "deleted container");
        Ok(())
    }

    async fn create_object(
        &self,
        container: &ContainerId,
        name: &ObjectName,
    ) -> StorageResult<ObjectInfo> {
        let mut data = self.data.write().await;

        let taken = data
            .container(container)?
            .objects
            .iter()
            .filter_map(|id| data.objects.get(id))
            .any(|o| &o.info.name == name);
        if taken {
            return Err(StorageError::ObjectAlreadyExists {
                container: container.clone(),
                name: name.to_string(),
            });
        }

        let info = ObjectInfo {
            id: ObjectId::generate(),
            container_id: container.clone(),
            name: name.clone(),
            size: 0,
            etag: Some(Self::etag(&[])),
            last_modified: Utc::now(),
        };

        if let Some(stored) = data.containers.get_mut(container) {
            stored.objects.insert(info.id.clone());
        }
        data.objects.insert(
            info.id.clone(),
            StoredObject {
                info: info.clone(),
                data: Bytes::new(),
            },
        );

        debug!(container = %container, object = %info.id, name = %name, "created object");
        Ok(info)
    }

    async fn get_object(&self, id: &ObjectId) -> StorageResult<ObjectInfo> {
        let data = self.data.read().await;
        data.objects
            .get(id)
            .map(|o| o.info.clone())
            .ok_or_else(|| StorageError::ObjectNotFound { id: id.clone() })
    }

    async fn list_objects(
        &self,
        container: &ContainerId,
        options: &ListOptions,
    ) -> StorageResult<Page<ObjectInfo>> {
        let data = self.data.read().await;
        let stored = data.container(container)?;

        let page = Page::from_sorted(
            stored
                .objects
                .iter()
                .filter_map(|id| data.objects.get(id))
                .map(|o| o.info.clone()),
            |o| o.id.as_str(),
            options,
            self.default_page_size(),
        )?;
        Ok(page)
    }

    async fn put_content(&self, id: &ObjectId, content: Bytes) -> StorageResult<ObjectInfo> {
        let mut data = self.data.write().await;
        let stored = data.object_mut(id)?;

        stored.info.size = content.len() as u64;
        stored.info.etag = Some(Self::etag(&content));
        stored.info.last_modified = Utc::now();
        stored.data = content;

        debug!(object = %id, size = stored.info.size, "stored object content");
        Ok(stored.info.clone())
    }

    async fn get_content(&self, id: &ObjectId) -> StorageResult<Bytes> {
        let data = self.data.read().await;
        data.objects
            .get(id)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::ObjectNotFound { id: id.clone() })
    }

    async fn delete_object(&self, id: &ObjectId) -> StorageResult<()> {
        let mut data = self.data.write().await;

        let removed = data
            .objects
            .remove(id)
            .ok_or_else(|| StorageError::ObjectNotFound { id: id.clone() })?;
        if let Some(container) = data.containers.get_mut(&removed.info.container_id) {
            container.objects.remove(id);
        }

        debug!(object = %id, "deleted object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_name(s: &str) -> ContainerName {
        ContainerName::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_container_lifecycle() {
        let provider = InMemoryProvider::new();
        let name = container_name("photos");

        let created = provider.create_container(&name).await.unwrap();
        assert_eq!(provider.get_container(&created.id).await.unwrap(), created);
        assert_eq!(
            provider.find_container(&name).await.unwrap(),
            Some(created.clone())
        );

        let err = provider.create_container(&name).await.unwrap_err();
        assert!(err.is_conflict());

        provider.delete_container(&created.id).await.unwrap();
        assert!(
            provider
                .get_container(&created.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(
            provider
                .delete_container(&created.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_name_reusable_after_delete() {
        let provider = InMemoryProvider::new();
        let name = container_name("scratch");

        let first = provider.create_container(&name).await.unwrap();
        provider.delete_container(&first.id).await.unwrap();
        let second = provider.create_container(&name).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_object_content_and_etag() {
        let provider = InMemoryProvider::new();
        let container = provider
            .create_container(&container_name("docs"))
            .await
            .unwrap();
        let name = ObjectName::new("a.txt").unwrap();

        let placeholder = provider.create_object(&container.id, &name).await.unwrap();
        assert_eq!(placeholder.size, 0);
        assert!(
            provider
                .get_content(&placeholder.id)
                .await
                .unwrap()
                .is_empty()
        );

        let updated = provider
            .put_content(&placeholder.id, Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert_eq!(updated.size, 3);
        assert_eq!(
            updated.etag.as_deref(),
            Some("900150983cd24fb0d6963f7d28e17f72")
        );

        let err = provider.create_object(&container.id, &name).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_non_empty_container_cannot_be_deleted() {
        let provider = InMemoryProvider::new();
        let container = provider
            .create_container(&container_name("full"))
            .await
            .unwrap();
        let object = provider
            .create_object(&container.id, &ObjectName::new("x").unwrap())
            .await
            .unwrap();

        let err = provider.delete_container(&container.id).await.unwrap_err();
        assert!(matches!(err, StorageError::ContainerNotEmpty { objects: 1, .. }));

        provider.delete_object(&object.id).await.unwrap();
        provider.delete_container(&container.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_object_listing_pages() {
        let provider = InMemoryProvider::new().with_page_size(2);
        assert_eq!(provider.default_page_size(), 2);
        assert_eq!(InMemoryProvider::new().default_page_size(), DEFAULT_PAGE_SIZE);

        let container = provider
            .create_container(&container_name("paged"))
            .await
            .unwrap();
        for i in 0..5 {
            let name = ObjectName::new(format!("obj-{}", i)).unwrap();
            provider.create_object(&container.id, &name).await.unwrap();
        }

        let first = provider
            .list_objects(&container.id, &ListOptions::new())
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.is_truncated());

        let mut seen = first.items.len();
        let mut marker = first.next_marker;
        while let Some(m) = marker {
            let page = provider
                .list_objects(&container.id, &ListOptions::new().after(m))
                .await
                .unwrap();
            seen += page.items.len();
            marker = page.next_marker;
        }
        assert_eq!(seen, 5);
    }
}
