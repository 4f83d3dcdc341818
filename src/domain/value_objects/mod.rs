mod container_name;
mod object_name;
mod resource_id;

pub use container_name::ContainerName;
pub use object_name::ObjectName;
pub use resource_id::{ContainerId, ObjectId};
