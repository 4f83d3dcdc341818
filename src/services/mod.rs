mod container;
mod object_store_service;
mod paging;
mod storage_object;

pub use container::Container;
pub use object_store_service::ObjectStoreService;
pub use storage_object::{StorageObject, UploadSource};
