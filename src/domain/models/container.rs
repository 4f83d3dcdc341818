use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ContainerId, ContainerName};

/// Snapshot of a container as reported by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInfo {
    pub id: ContainerId,
    pub name: ContainerName,
    pub created_at: DateTime<Utc>,
}
