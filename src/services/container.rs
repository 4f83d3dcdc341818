use chrono::{DateTime, Utc};
use futures::{TryStreamExt, future, stream::BoxStream};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ContainerInfo, ListOptions, Page},
        value_objects::{ContainerId, ContainerName, ObjectId, ObjectName},
    },
    ports::storage::StorageProvider,
    services::{
        paging::paged_stream,
        storage_object::{StorageObject, UploadSource},
    },
};

/// Handle to a container
///
/// Equality is by id: a handle from `create`, one from `get` and one from a
/// listing all compare equal.
#[derive(Clone)]
pub struct Container {
    info: ContainerInfo,
    provider: Arc<dyn StorageProvider>,
}

impl Container {
    pub(crate) fn new(info: ContainerInfo, provider: Arc<dyn StorageProvider>) -> Self {
        Self { info, provider }
    }

    pub fn id(&self) -> &ContainerId {
        &self.info.id
    }

    pub fn name(&self) -> &ContainerName {
        &self.info.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.info.created_at
    }

    pub fn info(&self) -> &ContainerInfo {
        &self.info
    }

    /// All objects in the container
    pub async fn list(&self) -> StorageResult<Vec<StorageObject>> {
        self.stream().try_collect().await
    }

    /// Objects in the container, fetched one page at a time
    pub fn stream(&self) -> BoxStream<'static, StorageResult<StorageObject>> {
        let provider = Arc::clone(&self.provider);
        let container = self.info.id.clone();

        paged_stream(move |options| {
            let provider = Arc::clone(&provider);
            let container = container.clone();
            async move {
                let page = provider.list_objects(&container, &options).await?;
                Ok::<_, StorageError>(
                    page.map(|info| StorageObject::new(info, Arc::clone(&provider))),
                )
            }
        })
    }

    pub async fn list_page(&self, options: &ListOptions) -> StorageResult<Page<StorageObject>> {
        let page = self.provider.list_objects(&self.info.id, options).await?;
        Ok(page.map(|info| StorageObject::new(info, Arc::clone(&self.provider))))
    }

    /// Create an empty object; content is added with `StorageObject::upload`
    pub async fn create_object(&self, name: &str) -> StorageResult<StorageObject> {
        let name = ObjectName::new(name)?;
        let info = self.provider.create_object(&self.info.id, &name).await?;

        info!(container = %self.info.id, object = %info.id, "created object");
        Ok(StorageObject::new(info, Arc::clone(&self.provider)))
    }

    /// Create an object and upload its content in one call
    ///
    /// If the upload fails the placeholder is removed again.
    pub async fn create_object_with_content(
        &self,
        name: &str,
        data: impl Into<UploadSource>,
    ) -> StorageResult<StorageObject> {
        let mut object = self.create_object(name).await?;

        if let Err(err) = object.upload(data).await {
            if let Err(cleanup_err) = object.delete().await {
                warn!(object = %object.id(), error = %cleanup_err, "failed to remove placeholder");
            }
            return Err(err);
        }

        Ok(object)
    }

    /// Fetch an object of this container by id
    pub async fn get_object(&self, id: &ObjectId) -> StorageResult<StorageObject> {
        let info = self.provider.get_object(id).await?;
        if info.container_id != self.info.id {
            return Err(StorageError::ObjectNotFound { id: id.clone() });
        }
        Ok(StorageObject::new(info, Arc::clone(&self.provider)))
    }

    /// Look an object up by name
    pub async fn find_object(&self, name: &str) -> StorageResult<Option<StorageObject>> {
        let name = ObjectName::new(name)?;
        let mut matches = std::pin::pin!(
            self.stream()
                .try_filter(move |object| future::ready(object.name() == &name))
        );
        matches.try_next().await
    }

    /// Delete the container; it must already be empty
    pub async fn delete(&self) -> StorageResult<()> {
        self.provider.delete_container(&self.info.id).await?;
        info!(container = %self.info.id, name = %self.info.name, "deleted container");
        Ok(())
    }

    /// Delete every object, then the container
    pub async fn delete_with_contents(&self) -> StorageResult<()> {
        // Collect first so deletes do not shift the pages being read
        let objects = self.list().await?;
        for object in &objects {
            match object.delete().await {
                Ok(()) | Err(StorageError::ObjectNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        self.delete().await
    }

    /// Reload the container record from the provider
    pub async fn refresh(&mut self) -> StorageResult<()> {
        self.info = self.provider.get_container(&self.info.id).await?;
        Ok(())
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.info.id == other.info.id
    }
}

impl Eq for Container {}

impl std::hash::Hash for Container {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.info.id.hash(state);
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.info.id.as_str())
            .field("name", &self.info.name.as_str())
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.info.name, self.info.id)
    }
}
