//! Sort specifications, page windows and server pagination parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// The active sort: one key and one direction
///
/// # Format
/// - `field:asc` or `field` (ascending)
/// - `field:desc` (descending)
///
/// # Example
/// ```
/// use tabula::core::query::{SortDirection, SortSpec};
///
/// let spec: SortSpec = "created_at:desc".parse().unwrap();
/// assert_eq!(spec.key, "created_at");
/// assert_eq!(spec.direction, SortDirection::Descending);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Sort requested by clicking `key` while `current` is active
    ///
    /// Clicking the active key flips its direction; any other key becomes
    /// active in ascending order.
    pub fn toggle(current: Option<&SortSpec>, key: &str) -> SortSpec {
        match current {
            Some(spec) if spec.key == key => SortSpec {
                key: spec.key.clone(),
                direction: spec.direction.flip(),
            },
            _ => SortSpec::ascending(key),
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = match s.rsplit_once(':') {
            Some((key, "asc")) => (key, SortDirection::Ascending),
            Some((key, "desc")) => (key, SortDirection::Descending),
            Some((_, other)) => return Err(format!("Unknown sort direction '{}'", other)),
            None => (s, SortDirection::Ascending),
        };

        let key = key.trim();
        if key.is_empty() {
            return Err("Sort key cannot be empty".to_string());
        }

        Ok(Self {
            key: key.to_string(),
            direction,
        })
    }
}

impl TryFrom<String> for SortSpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortSpec> for String {
    fn from(spec: SortSpec) -> Self {
        spec.to_string()
    }
}

/// Page number, page size and total count of a paginated list
///
/// Navigation past either end is refused, never wrapped: `has_prev` and
/// `has_next` are what a view binds its previous/next controls to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total_count: usize,

    /// Total number of pages (0 when there are no items)
    pub total_pages: usize,
}

impl PageWindow {
    pub fn new(page: usize, page_size: usize, total_count: usize) -> Self {
        // Ensure page_size is at least 1 to avoid division by zero
        let page_size = page_size.max(1);
        let total_pages = if total_count == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };

        Self {
            page: page.max(1),
            page_size,
            total_count,
            total_pages,
        }
    }

    /// Window whose totals were computed by the server
    pub fn from_remote(page: usize, page_size: usize, total_count: usize, total_pages: usize) -> Self {
        Self {
            total_pages,
            ..Self::new(page, page_size, total_count)
        }
    }

    /// Index of the first item of the page
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Whether the previous-page control is enabled
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether the next-page control is enabled
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a direct jump to `page` is allowed
    pub fn can_go_to(&self, page: usize) -> bool {
        page >= 1 && page <= self.total_pages.max(1)
    }
}

/// Parameters of a server-paginated list request
///
/// Serializes to `?page=2&limit=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,
}

impl ListQuery {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// One page of a server-paginated list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Total number of items on the server
    pub total: usize,

    /// Total number of pages reported by the server
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_spec_parse() {
        assert_eq!("name".parse::<SortSpec>().unwrap(), SortSpec::ascending("name"));
        assert_eq!("name:asc".parse::<SortSpec>().unwrap(), SortSpec::ascending("name"));
        assert_eq!(
            "rating:desc".parse::<SortSpec>().unwrap(),
            SortSpec::descending("rating")
        );
        assert!("name:sideways".parse::<SortSpec>().is_err());
        assert!(":desc".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_sort_spec_display_roundtrip() {
        let spec = SortSpec::descending("created_at");
        assert_eq!(spec.to_string(), "created_at:desc");
        assert_eq!(spec.to_string().parse::<SortSpec>().unwrap(), spec);
    }

    #[test]
    fn test_toggle_same_key_flips_direction() {
        let current = SortSpec::ascending("name");
        let next = SortSpec::toggle(Some(&current), "name");
        assert_eq!(next, SortSpec::descending("name"));

        let back = SortSpec::toggle(Some(&next), "name");
        assert_eq!(back, SortSpec::ascending("name"));
    }

    #[test]
    fn test_toggle_new_key_resets_to_ascending() {
        let current = SortSpec::descending("name");
        assert_eq!(
            SortSpec::toggle(Some(&current), "email"),
            SortSpec::ascending("email")
        );
        assert_eq!(SortSpec::toggle(None, "email"), SortSpec::ascending("email"));
    }

    #[test]
    fn test_page_window_totals() {
        let window = PageWindow::new(1, 20, 145);
        assert_eq!(window.total_count, 145);
        assert_eq!(window.total_pages, 8);
        assert!(!window.has_prev());
        assert!(window.has_next());
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn test_page_window_empty() {
        let window = PageWindow::new(1, 10, 0);
        assert_eq!(window.total_pages, 0);
        assert!(!window.has_prev());
        assert!(!window.has_next());
        assert!(window.can_go_to(1));
        assert!(!window.can_go_to(2));
    }

    #[test]
    fn test_page_window_boundaries() {
        let first = PageWindow::new(1, 10, 50);
        assert_eq!(first.total_pages, 5);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = PageWindow::new(5, 10, 50);
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert_eq!(last.offset(), 40);
    }

    #[test]
    fn test_page_window_beyond_last_page_disables_next() {
        let window = PageWindow::new(9, 10, 30);
        assert_eq!(window.page, 9);
        assert!(!window.has_next());
        assert!(window.has_prev());
    }

    #[test]
    fn test_page_window_normalizes_zero_inputs() {
        let window = PageWindow::new(0, 0, 3);
        assert_eq!(window.page, 1);
        assert_eq!(window.page_size, 1);
        assert_eq!(window.total_pages, 3);
    }

    #[test]
    fn test_remote_window_trusts_server_pages() {
        let window = PageWindow::from_remote(2, 10, 35, 4);
        assert_eq!(window.total_pages, 4);
        assert!(window.has_next());
    }

    #[test]
    fn test_sort_spec_serde_as_string() {
        let spec: SortSpec = serde_json::from_str("\"title:desc\"").unwrap();
        assert_eq!(spec, SortSpec::descending("title"));
        assert_eq!(serde_json::to_string(&spec).unwrap(), "\"title:desc\"");
    }
}
