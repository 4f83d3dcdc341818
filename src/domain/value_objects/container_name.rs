use crate::domain::errors::ValidationError;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// A validated container name
///
/// Follows the S3 bucket naming rules so that every backend can use the name
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerName(String);

impl ContainerName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.len() < MIN_LEN {
            return Err(ValidationError::ContainerNameTooShort {
                actual: value.len(),
                min: MIN_LEN,
            });
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::ContainerNameTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        let is_edge_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

        if !value.chars().next().is_some_and(is_edge_char) {
            return Err(ValidationError::ContainerNameInvalidStart);
        }

        if !value.chars().last().is_some_and(is_edge_char) {
            return Err(ValidationError::ContainerNameInvalidEnd);
        }

        if Self::looks_like_ip_address(&value) {
            return Err(ValidationError::ContainerNameLooksLikeIpAddress);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(ValidationError::ContainerNameInvalidCharacter(c));
        }

        if value.contains("--") {
            return Err(ValidationError::ContainerNameConsecutiveHyphens);
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn looks_like_ip_address(s: &str) -> bool {
        let parts: Vec<&str> = s.split('.').collect();
        parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok())
    }
}

impl std::fmt::Display for ContainerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContainerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ContainerName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
