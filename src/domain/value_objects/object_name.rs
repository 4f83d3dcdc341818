use crate::domain::errors::ValidationError;

const MAX_LEN: usize = 1024;

/// A validated object name within a container
///
/// Names may contain `/` to emulate directories, but every segment must be
/// non-empty and must not be `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectName(String);

impl ObjectName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectName);
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::ObjectNameTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidObjectNameCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectNameStartsWithSlash);
        }

        if value.ends_with('/') {
            return Err(ValidationError::ObjectNameEndsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectNameContainsDoubleSlash);
        }

        if let Some(segment) = value.split('/').find(|s| *s == "." || *s == "..") {
            return Err(ValidationError::ObjectNameRelativeSegment(
                segment.to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last '/'
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// Everything after the last '/'
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    /// True when the last segment carries a `#<digits>` suffix
    ///
    /// Filesystem-backed stores use that suffix for in-progress part files
    /// and refuse to store such names.
    pub fn has_part_suffix(&self) -> bool {
        match self.file_name().split_once('#') {
            Some((_, suffix)) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ObjectName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
