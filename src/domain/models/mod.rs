pub mod container;
pub mod object;
pub mod page;

pub use container::ContainerInfo;
pub use object::ObjectInfo;
pub use page::{DEFAULT_PAGE_SIZE, ListOptions, Page};
