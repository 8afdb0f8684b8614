//! Search, sort and page parameters of one listing view

use crate::core::query::{PageWindow, SortSpec};
use crate::core::record::Record;
use crate::view::{filter, page, sort};

/// Result of running the filter → sort → page pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    /// Records of the current page
    pub items: Vec<T>,

    /// Window computed from the filtered length
    pub window: PageWindow,

    /// Number of records left after filtering
    pub filtered_count: usize,
}

impl<T> ListView<T> {
    pub fn is_empty(&self) -> bool {
        self.filtered_count == 0
    }
}

/// Transient list parameters owned by a view
///
/// Changing the search text or the page size sends the view back to page 1.
/// Navigation never wraps: at the boundaries `next_page`/`prev_page` refuse
/// and return `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    search: String,
    search_fields: Vec<String>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
}

impl ListState {
    pub fn new(page_size: usize, search_fields: Vec<String>, sort: Option<SortSpec>) -> Self {
        Self {
            search: String::new(),
            search_fields,
            sort,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// List state using the record type's searchable fields
    pub fn for_record<T: Record>(page_size: usize, sort: Option<SortSpec>) -> Self {
        let fields = T::searchable_fields().iter().map(|f| f.to_string()).collect();
        Self::new(page_size, fields, sort)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Change the search text; returns to page 1
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    /// Sort by `key`, flipping the direction if it is already active
    pub fn request_sort(&mut self, key: &str) -> &SortSpec {
        let next = SortSpec::toggle(self.sort.as_ref(), key);
        self.sort.insert(next)
    }

    /// Jump to `page`; page 0 is refused
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 {
            return false;
        }
        self.page = page;
        true
    }

    /// Go forward one page if the window allows it
    pub fn next_page(&mut self, window: &PageWindow) -> bool {
        if window.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page if the window allows it
    pub fn prev_page(&mut self, window: &PageWindow) -> bool {
        if window.has_prev() && self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Change the page size; returns to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Filter and sort without paginating
    pub fn arrange<T: Record>(&self, records: &[T]) -> Vec<T> {
        let filtered = filter::filter(records, &self.search, self.search_fields.as_slice());
        match &self.sort {
            Some(spec) => sort::sort(&filtered, spec),
            None => filtered,
        }
    }

    /// Run filter → sort → page over `records`
    pub fn apply<T: Record>(&self, records: &[T]) -> ListView<T> {
        let arranged = self.arrange(records);
        let window = PageWindow::new(self.page, self.page_size, arranged.len());
        let items = page::paginate(&arranged, self.page, self.page_size).to_vec();

        ListView {
            items,
            window,
            filtered_count: arranged.len(),
        }
    }
}
