use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ContainerId, ObjectId, ObjectName};

/// Snapshot of an object as reported by a provider
///
/// `size`, `etag` and `last_modified` describe the content at the time the
/// snapshot was taken; a freshly created placeholder reports zero bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub container_id: ContainerId,
    pub name: ObjectName,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: DateTime<Utc>,
}
