use crate::domain::errors::ValidationError;

/// Page size used when a listing does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Paging parameters for container and object listings
///
/// `marker` is the id of the last item of the previous page; the next page
/// starts strictly after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: Option<usize>,
    pub marker: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Resolve the requested limit against a provider default
    pub fn effective_limit(&self, default: usize) -> Result<usize, ValidationError> {
        match self.limit {
            Some(0) => Err(ValidationError::InvalidPageLimit(0)),
            Some(limit) => Ok(limit),
            None => Ok(default),
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Marker for the following page, `None` on the last page
    pub next_marker: Option<String>,
}

impl<T> Page<T> {
    pub fn is_truncated(&self) -> bool {
        self.next_marker.is_some()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_marker: self.next_marker,
        }
    }

    /// Cut a page out of items already sorted by `key`
    pub fn from_sorted(
        items: impl IntoIterator<Item = T>,
        key: impl Fn(&T) -> &str,
        options: &ListOptions,
        default_limit: usize,
    ) -> Result<Self, ValidationError> {
        let limit = options.effective_limit(default_limit)?;

        let mut items: Vec<T> = items
            .into_iter()
            .filter(|item| match &options.marker {
                Some(marker) => key(item) > marker.as_str(),
                None => true,
            })
            .take(limit.saturating_add(1))
            .collect();

        let next_marker = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|item| key(item).to_string())
        } else {
            None
        };

        Ok(Self { items, next_marker })
    }
}
