use crate::domain::{
    errors::ValidationError,
    value_objects::{ContainerId, ObjectId},
};

/// Errors that can occur during storage operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// No live container has this id
    ContainerNotFound { id: ContainerId },

    /// No live object has this id
    ObjectNotFound { id: ObjectId },

    /// A live container already uses this name
    ContainerAlreadyExists { name: String },

    /// The container already holds an object with this name
    ObjectAlreadyExists { container: ContainerId, name: String },

    /// Container still holds objects and the delete does not cascade
    ContainerNotEmpty { id: ContainerId, objects: usize },

    /// A name, id or request failed validation
    Validation(ValidationError),

    /// Operation not supported by the selected backend
    UnsupportedOperation { operation: String, reason: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },

    /// Generic storage error
    InternalError { message: String },
}

impl StorageError {
    /// True for both container and object lookups that came back empty
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::ContainerNotFound { .. } | StorageError::ObjectNotFound { .. }
        )
    }

    /// True when the request clashes with the current state: a create that
    /// collided with a live name, or a delete of a container that still holds
    /// objects
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StorageError::ContainerAlreadyExists { .. }
                | StorageError::ObjectAlreadyExists { .. }
                | StorageError::ContainerNotEmpty { .. }
        )
    }

    pub(crate) fn infrastructure(context: &str, err: impl std::fmt::Display) -> Self {
        StorageError::InfrastructureError {
            message: format!("{}: {}", context, err),
            source: Some(err.to_string()),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ContainerNotFound { id } => {
                write!(f, "Container not found: {}", id)
            }
            StorageError::ObjectNotFound { id } => {
                write!(f, "Object not found: {}", id)
            }
            StorageError::ContainerAlreadyExists { name } => {
                write!(f, "Container already exists: {}", name)
            }
            StorageError::ObjectAlreadyExists { container, name } => {
                write!(
                    f,
                    "Object '{}' already exists in container {}",
                    name, container
                )
            }
            StorageError::ContainerNotEmpty { id, objects } => {
                write!(
                    f,
                    "Container {} is not empty: {} object(s) remain",
                    id, objects
                )
            }
            StorageError::Validation(err) => {
                write!(f, "Validation error: {}", err)
            }
            StorageError::UnsupportedOperation { operation, reason } => {
                write!(f, "Unsupported operation '{}': {}", operation, reason)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
            StorageError::InternalError { message } => {
                write!(f, "Internal storage error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
