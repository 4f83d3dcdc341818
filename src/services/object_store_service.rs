use futures::{TryStreamExt, stream::BoxStream};
use std::sync::Arc;
use tracing::info;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ContainerInfo, ListOptions, Page},
        value_objects::{ContainerId, ContainerName},
    },
    ports::storage::StorageProvider,
    services::{container::Container, paging::paged_stream},
};

/// Entry point for container management on one provider
///
/// Cloning is cheap and every clone talks to the same provider.
#[derive(Clone)]
pub struct ObjectStoreService {
    provider: Arc<dyn StorageProvider>,
}

impl ObjectStoreService {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Name of the backend behind this service
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Provision a new container
    ///
    /// Fails with `ContainerAlreadyExists` when a live container already uses
    /// `name`.
    pub async fn create(&self, name: &str) -> StorageResult<Container> {
        let name = ContainerName::new(name)?;
        let info = self.provider.create_container(&name).await?;

        info!(container = %info.id, name = %info.name, provider = self.provider.name(), "created container");
        Ok(self.handle(info))
    }

    pub async fn get(&self, id: &ContainerId) -> StorageResult<Container> {
        let info = self.provider.get_container(id).await?;
        Ok(self.handle(info))
    }

    /// Look a container up by name
    pub async fn find(&self, name: &str) -> StorageResult<Option<Container>> {
        let name = ContainerName::new(name)?;
        let found = self.provider.find_container(&name).await?;
        Ok(found.map(|info| self.handle(info)))
    }

    /// All live containers
    pub async fn list(&self) -> StorageResult<Vec<Container>> {
        self.stream().try_collect().await
    }

    /// Live containers, fetched one page at a time
    pub fn stream(&self) -> BoxStream<'static, StorageResult<Container>> {
        let provider = Arc::clone(&self.provider);

        paged_stream(move |options| {
            let provider = Arc::clone(&provider);
            async move {
                let page = provider.list_containers(&options).await?;
                Ok::<_, StorageError>(page.map(|info| Container::new(info, Arc::clone(&provider))))
            }
        })
    }

    pub async fn list_page(&self, options: &ListOptions) -> StorageResult<Page<Container>> {
        let page = self.provider.list_containers(options).await?;
        Ok(page.map(|info| self.handle(info)))
    }

    fn handle(&self, info: ContainerInfo) -> Container {
        Container::new(info, Arc::clone(&self.provider))
    }
}

impl std::fmt::Debug for ObjectStoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreService")
            .field("provider", &self.provider.name())
            .finish()
    }
}
