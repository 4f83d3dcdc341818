/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectName validation errors
    EmptyObjectName,
    ObjectNameTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectNameCharacter(char),
    ObjectNameStartsWithSlash,
    ObjectNameEndsWithSlash,
    ObjectNameContainsDoubleSlash,
    ObjectNameRelativeSegment(String),
    /// Last segment ends in `#<digits>`, which the selected backend reserves
    ObjectNameReservedSuffix(String),

    // ContainerName validation errors
    ContainerNameTooShort {
        actual: usize,
        min: usize,
    },
    ContainerNameTooLong {
        actual: usize,
        max: usize,
    },
    ContainerNameInvalidStart,
    ContainerNameInvalidEnd,
    ContainerNameInvalidCharacter(char),
    ContainerNameConsecutiveHyphens,
    ContainerNameLooksLikeIpAddress,

    // Identifier validation errors
    EmptyId,

    // Paging
    InvalidPageLimit(usize),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectName errors
            ValidationError::EmptyObjectName => write!(f, "Object name cannot be empty"),
            ValidationError::ObjectNameTooLong { actual, max } => {
                write!(f, "Object name too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectNameCharacter(c) => {
                write!(f, "Invalid character in object name: {:?}", c)
            }
            ValidationError::ObjectNameStartsWithSlash => {
                write!(f, "Object name cannot start with '/'")
            }
            ValidationError::ObjectNameEndsWithSlash => {
                write!(f, "Object name cannot end with '/'")
            }
            ValidationError::ObjectNameContainsDoubleSlash => {
                write!(f, "Object name cannot contain '//'")
            }
            ValidationError::ObjectNameRelativeSegment(segment) => {
                write!(f, "Object name cannot contain the segment '{}'", segment)
            }
            ValidationError::ObjectNameReservedSuffix(name) => {
                write!(
                    f,
                    "Object name '{}' ends in a '#<digits>' suffix reserved by this backend",
                    name
                )
            }

            // ContainerName errors
            ValidationError::ContainerNameTooShort { actual, min } => {
                write!(
                    f,
                    "Container name too short: {} characters (min: {})",
                    actual, min
                )
            }
            ValidationError::ContainerNameTooLong { actual, max } => {
                write!(
                    f,
                    "Container name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::ContainerNameInvalidStart => {
                write!(f, "Container name must start with lowercase letter or number")
            }
            ValidationError::ContainerNameInvalidEnd => {
                write!(f, "Container name must end with lowercase letter or number")
            }
            ValidationError::ContainerNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in container name: '{}'. Only lowercase letters, numbers, and hyphens allowed",
                    c
                )
            }
            ValidationError::ContainerNameConsecutiveHyphens => {
                write!(f, "Container name cannot contain consecutive hyphens")
            }
            ValidationError::ContainerNameLooksLikeIpAddress => {
                write!(f, "Container name cannot be formatted as an IP address")
            }

            ValidationError::EmptyId => write!(f, "Identifier cannot be empty"),

            ValidationError::InvalidPageLimit(limit) => {
                write!(f, "Page limit must be greater than zero, got {}", limit)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
